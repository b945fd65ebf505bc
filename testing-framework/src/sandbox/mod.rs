//! Sandbox ledger
//!
//! In-process ledger that runs the NFT contracts. A send from a treasury
//! starts a chain of internal messages that is drained to completion before
//! the send returns; the transactions come back in causal order.
//!
//! ## Fee model
//!
//! Fees are flat and configured in [`FeeConfig`]: one compute fee per
//! executed transaction, one forward fee per internal message. Value is
//! conserved: the sum of all balances plus the fees collected always equals
//! the value minted into treasuries.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nft_testing_framework::sandbox::BlockchainBuilder;
//!
//! let blockchain = BlockchainBuilder::new().build().await?;
//! let deployer = blockchain.treasury("deployer").await?;
//! ```

mod account;
mod blockchain;
mod builder;
mod config;
mod error;
mod executor;
mod transaction;

use async_trait::async_trait;
use nft_common::{cell::Cell, contract::StateInit, crypto::Address};

pub use account::{Account, AccountCode, GetMethod, GetMethodResult};
pub use blockchain::{Blockchain, LedgerSnapshot, LedgerState, Treasury};
pub use builder::BlockchainBuilder;
pub use config::{FeeConfig, SandboxConfig, CONFIG_ENV_VAR};
pub use error::SandboxError;
pub use executor::bounced_body;
pub use transaction::{SendMessageResult, Transaction};

/// Ledger operations contract wrappers run against
///
/// Implemented by [`Blockchain`]; wrappers hold it as
/// `Arc<dyn LedgerSimulator>` so a test can swap in another ledger.
#[async_trait]
pub trait LedgerSimulator: Send + Sync {
    /// Send `value` from the treasury `sender` to `to` and drain the
    /// resulting message chain
    ///
    /// Returns every transaction of the chain in causal order. Contract
    /// failures show up as unsuccessful transactions; an `Err` means the
    /// whole send was rejected and rolled back.
    async fn send_message(
        &self,
        sender: &Address,
        to: &Address,
        value: u128,
        body: Cell,
        init: Option<StateInit>,
        bounce: bool,
    ) -> Result<Vec<Transaction>, SandboxError>;

    /// Run a read-only getter on an active account
    async fn run_get_method(&self, address: &Address, method: GetMethod) -> Result<GetMethodResult, SandboxError>;

    /// Balance of `address`, zero for accounts the ledger has never seen
    async fn get_balance(&self, address: &Address) -> Result<u128, SandboxError>;
}
