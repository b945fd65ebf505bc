// File: testing-framework/src/orchestrator/mod.rs
//
// Orchestrator Module
//
// Deterministic environment shared by ordered scenarios: one paused clock
// that every ledger built from the environment reads its time from.

/// Clock abstractions for deterministic time control in tests
pub mod clock;

use std::sync::Arc;

use crate::sandbox::{BlockchainBuilder, SandboxConfig};

/// Deterministic test environment
///
/// Holds the paused clock of a test. Ledgers built through
/// [`DeterministicTestEnv::blockchain`] stamp transactions from it, and
/// [`DeterministicTestEnv::advance_time`] moves their `now` forward.
///
/// # Examples
///
/// ```rust
/// use nft_testing_framework::orchestrator::DeterministicTestEnv;
/// use tokio::time::Duration;
///
/// #[tokio::test]
/// async fn test_time_advancement() {
///     let env = DeterministicTestEnv::new_time_paused();
///     let blockchain = env.blockchain().build().await.unwrap();
///     let before = blockchain.now();
///
///     env.advance_time(Duration::from_secs(3600)).await;
///
///     assert_eq!(blockchain.now(), before + 3600);
/// }
/// ```
pub struct DeterministicTestEnv {
    /// Paused clock driving transaction timestamps
    pub clock: Arc<PausedClock>,
}

impl DeterministicTestEnv {
    /// Create a new environment with time paused
    ///
    /// Environments are independent: advancing one leaves the others alone.
    pub fn new_time_paused() -> Self {
        Self {
            clock: Arc::new(PausedClock::new()),
        }
    }

    /// Builder for a ledger reading time from this environment
    pub fn blockchain(&self) -> BlockchainBuilder {
        BlockchainBuilder::new().with_clock(self.clock.clone())
    }

    /// Builder for a ledger with `config`, reading time from this environment
    pub fn blockchain_with_config(&self, config: SandboxConfig) -> BlockchainBuilder {
        self.blockchain().with_config(config)
    }

    /// Advance time by the specified duration
    pub async fn advance_time(&self, duration: tokio::time::Duration) {
        self.clock.advance(duration).await
    }
}

// Re-export key types for convenience
pub use clock::{Clock, PausedClock, SystemClock};
