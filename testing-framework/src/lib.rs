//! # NFT Testing Framework
//!
//! Deterministic in-process sandbox for testing the NFT collection and item
//! contracts.
//!
//! ## Architecture Overview
//!
//! - **sandbox**: ledger simulator with treasuries, a message queue and flat fees
//! - **wrappers**: typed contract proxies for sending messages and running getters
//! - **matchers**: partial-match assertions over transaction lists
//! - **scenarios**: YAML scenario DSL parsed and executed against the sandbox
//! - **invariants**: value conservation, mint monotonicity, royalty immutability
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nft_testing_framework::prelude::*;
//!
//! #[tokio::test]
//! async fn test_mint() -> anyhow::Result<()> {
//!     let blockchain = BlockchainBuilder::new().build().await?;
//!     let deployer = blockchain.treasury("deployer").await?;
//!     let royalty = RoyaltyParams::new(350, 1000, deployer.address.clone())?;
//!     let collection = blockchain.open_contract(NftCollection::from_init(
//!         deployer.address.clone(),
//!         Content::Offchain("https://example.com/c/".to_string()),
//!         royalty,
//!         0,
//!     )?);
//!
//!     let result = collection.send(&deployer, to_nano("1")?, CollectionMessage::Mint).await?;
//!     result.assert_has_transaction(
//!         &TransactionMatcher::new().from(&deployer.address).to(collection.address()).deploy(true),
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: paused clock, FIFO message order, flat fees
//! 2. **Atomic sends**: a send that fails mid-chain leaves the ledger untouched
//! 3. **Value conservation**: balances plus collected fees equal minted value

#![warn(clippy::all)]

/// Core orchestration - provides Clock and the deterministic environment
pub mod orchestrator;

/// Ledger simulator
pub mod sandbox;

/// Typed contract proxies
pub mod wrappers;

/// Partial transaction matchers
pub mod matchers;

/// Shared utilities
pub mod utilities;

// Core invariant checkers (value conservation, mint monotonicity, etc.)
pub mod invariants;

// DSL scenario parser and executor
pub mod scenarios;

// Convenient re-exports for common usage
pub mod prelude;

// Re-export commonly used types at crate root
pub use orchestrator::{Clock, DeterministicTestEnv, PausedClock, SystemClock};
pub use sandbox::{Blockchain, BlockchainBuilder};

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
