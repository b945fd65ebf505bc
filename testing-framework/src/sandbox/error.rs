use nft_common::{cell::CellError, contract::ExitCode, crypto::Address, nft::MessageError};
use thiserror::Error;

/// Failures reported by the ledger before or instead of producing transactions
///
/// Execution failures inside contracts are never errors: they are recorded
/// as transactions with `success = false`.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Sender {0} is not a treasury of this ledger")]
    UnknownSender(Address),

    #[error("Account {0} is not active")]
    AccountNotActive(Address),

    #[error("Message chain exceeded {limit} transactions, send rolled back")]
    MessageLimitExceeded { limit: usize },

    #[error("Get method {method} failed on {address} with exit code {exit_code}")]
    GetMethodFailed {
        address: Address,
        method: &'static str,
        exit_code: ExitCode,
    },

    #[error("Get method {method} returned an unexpected result")]
    UnexpectedGetMethodResult { method: &'static str },

    #[error("Invalid sandbox config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Cell(#[from] CellError),

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
