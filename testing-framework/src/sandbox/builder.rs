//! BlockchainBuilder - Fluent API for configuring sandbox ledgers

use std::sync::Arc;

use log::debug;

use super::{Blockchain, SandboxConfig, SandboxError};
use crate::orchestrator::{Clock, SystemClock};

/// Builder for [`Blockchain`] instances
///
/// # Example
///
/// ```rust,ignore
/// use nft_testing_framework::sandbox::BlockchainBuilder;
///
/// let blockchain = BlockchainBuilder::new()
///     .with_clock(clock)
///     .with_treasury("deployer")
///     .with_treasury("user")
///     .build()
///     .await?;
/// ```
pub struct BlockchainBuilder {
    /// Ledger configuration, loaded from the environment when unset
    config: Option<SandboxConfig>,

    /// Clock implementation for transaction timestamps
    clock: Option<Arc<dyn Clock>>,

    /// Treasuries created before the ledger is handed out
    treasuries: Vec<String>,
}

impl BlockchainBuilder {
    /// Create new builder with defaults
    ///
    /// Default configuration:
    /// - config from `NFT_SANDBOX_CONFIG`, or [`SandboxConfig::default`]
    /// - SystemClock (real time)
    /// - no treasuries
    pub fn new() -> Self {
        Self {
            config: None,
            clock: None,
            treasuries: Vec::new(),
        }
    }

    /// Use `config` instead of loading one from the environment
    pub fn with_config(mut self, config: SandboxConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set clock implementation
    ///
    /// If not set, uses `SystemClock` by default.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Create the treasury `name` during `build()`
    pub fn with_treasury(mut self, name: impl Into<String>) -> Self {
        self.treasuries.push(name.into());
        self
    }

    /// Build the ledger
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the config file named by the environment cannot be read or parsed
    /// - the config fails validation
    pub async fn build(self) -> Result<Blockchain, SandboxError> {
        let config = match self.config {
            Some(config) => config,
            None => SandboxConfig::from_env().await?,
        };
        config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        debug!(
            "Building sandbox ledger (genesis_time={}, treasuries={})",
            config.genesis_time,
            self.treasuries.len()
        );

        let blockchain = Blockchain::create(config, clock);
        for name in &self.treasuries {
            blockchain.treasury(name).await?;
        }
        Ok(blockchain)
    }
}

impl Default for BlockchainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::LedgerSimulator;

    #[tokio::test]
    async fn test_builder_creates_treasuries() {
        let blockchain = BlockchainBuilder::new()
            .with_config(SandboxConfig::default())
            .with_treasury("deployer")
            .with_treasury("user")
            .build()
            .await
            .unwrap();

        let treasuries = blockchain.treasuries().await;
        assert_eq!(treasuries.len(), 2);
        assert_eq!(treasuries[0].name, "deployer");
        assert_eq!(
            blockchain.get_balance(&treasuries[1].address).await.unwrap(),
            SandboxConfig::default().treasury_balance
        );
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let result = BlockchainBuilder::new()
            .with_config(SandboxConfig {
                max_messages_per_send: 0,
                ..SandboxConfig::default()
            })
            .build()
            .await;
        assert!(matches!(result, Err(SandboxError::InvalidConfig(_))));
    }
}
