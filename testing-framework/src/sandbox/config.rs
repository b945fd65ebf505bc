// File: testing-framework/src/sandbox/config.rs
//
// Sandbox Configuration
//
// Every field has a default, so a config file only lists what it changes:
//
// ```yaml
// workchain: 0
// treasury_balance: "1000000"
// genesis_time: 1700000000
// max_messages_per_send: 1000
// fees:
//   compute_fee: "0.002"
//   forward_fee: "0.001"
// ```

use std::path::Path;

use log::debug;
use nft_common::config::{COIN_VALUE, DEFAULT_WORKCHAIN, GAS_CONSUMPTION};
use serde::{Deserialize, Serialize};

use super::SandboxError;
use crate::utilities::coins;

/// Environment variable holding the path of a YAML config file
pub const CONFIG_ENV_VAR: &str = "NFT_SANDBOX_CONFIG";

/// Flat fees charged by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Charged once per executed transaction
    #[serde(with = "coins")]
    pub compute_fee: u128,

    /// Charged once per internal message sent
    #[serde(with = "coins")]
    pub forward_fee: u128,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            compute_fee: COIN_VALUE / 500, // 0.002
            forward_fee: COIN_VALUE / 1000, // 0.001
        }
    }
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Workchain of every address derived by the sandbox
    pub workchain: i8,

    /// Initial balance of each treasury
    #[serde(with = "coins")]
    pub treasury_balance: u128,

    /// Unix time of the first transaction
    pub genesis_time: u32,

    /// Transactions one send may produce before it is rolled back
    pub max_messages_per_send: usize,

    pub fees: FeeConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workchain: DEFAULT_WORKCHAIN,
            treasury_balance: 1_000_000 * COIN_VALUE,
            genesis_time: 1_700_000_000,
            max_messages_per_send: 1_000,
            fees: FeeConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Parse a config from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, SandboxError> {
        let config: SandboxConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let path = path.as_ref();
        debug!("Loading sandbox config from {}", path.display());
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&yaml)
    }

    /// Load the file named by `NFT_SANDBOX_CONFIG`, or the defaults when unset
    pub async fn from_env() -> Result<Self, SandboxError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(path).await,
            _ => Ok(Self::default()),
        }
    }

    /// Reject configurations the ledger cannot run with
    pub fn validate(&self) -> Result<(), SandboxError> {
        if self.max_messages_per_send == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_messages_per_send must be positive".to_string(),
            ));
        }
        if self.treasury_balance == 0 {
            return Err(SandboxError::InvalidConfig(
                "treasury_balance must be positive".to_string(),
            ));
        }
        // Compute fee must fit in the gas reserve handlers keep back
        if self.fees.compute_fee > GAS_CONSUMPTION {
            return Err(SandboxError::InvalidConfig(format!(
                "compute_fee {} exceeds the contract gas reserve {}",
                self.fees.compute_fee, GAS_CONSUMPTION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SandboxConfig::from_yaml("genesis_time: 42\nfees:\n  forward_fee: \"0.005\"\n").unwrap();
        assert_eq!(config.genesis_time, 42);
        assert_eq!(config.fees.forward_fee, 5_000_000);
        assert_eq!(config.fees.compute_fee, FeeConfig::default().compute_fee);
        assert_eq!(config.treasury_balance, SandboxConfig::default().treasury_balance);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            SandboxConfig::from_yaml("max_messages_per_send: 0"),
            Err(SandboxError::InvalidConfig(_))
        ));
        assert!(matches!(
            SandboxConfig::from_yaml("fees:\n  compute_fee: \"1\""),
            Err(SandboxError::InvalidConfig(_))
        ));
        assert!(matches!(
            SandboxConfig::from_yaml("workchain: \"main\""),
            Err(SandboxError::Yaml(_))
        ));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandbox.yaml");
        tokio::fs::write(&path, "treasury_balance: 10\n").await.unwrap();

        let config = SandboxConfig::from_file(&path).await.unwrap();
        assert_eq!(config.treasury_balance, 10 * COIN_VALUE);
    }
}
