use super::OutMessage;
use crate::{cell::Cell, crypto::Address};
use std::fmt::{Display, Formatter};

/// Contract execution trait for dependency injection
///
/// Contract logic lives in this crate and knows nothing about the ledger
/// executing it. The sandbox ledger owns the accounts, hands each handler a
/// copy of its state plus a [`RuntimeContext`], and only commits the copy
/// when the whole transaction succeeds.
///
/// ```text
/// Common Package (contract logic)
///     | defines trait
/// ContractLogic trait
///     ^ drives
/// Testing Framework (ledger simulator)
/// ```
pub trait ContractLogic: Clone + Send + Sync {
    /// Handle one inbound internal message
    ///
    /// Returns the outgoing messages in emission order. An `Err` aborts the
    /// compute phase: state changes and outgoing messages are discarded.
    fn receive(&mut self, ctx: &RuntimeContext, body: &Cell) -> Result<Vec<OutMessage>, ExitCode>;
}

/// Execution environment of a single inbound message
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Sender of the inbound message
    pub sender: Address,
    /// Value attached to the inbound message
    pub value: u128,
    /// Account balance at compute start, inbound value included
    pub balance: u128,
    /// Address of the executing contract
    pub my_address: Address,
    /// Unix time of the transaction
    pub now: u32,
    /// Logical time of the transaction
    pub lt: u64,
    /// Whether the inbound message is a bounce
    pub bounced: bool,
    /// Forward fee paid by the inbound message
    pub forward_fee: u128,
}

impl RuntimeContext {
    /// Balance before the inbound value was credited
    pub fn balance_before_message(&self) -> u128 {
        self.balance.saturating_sub(self.value)
    }
}

/// Transaction exit code
///
/// Ranges:
/// - 0: Success
/// - 1-127: Execution and action phase codes
/// - 128-255: Contract runtime codes
/// - 1000-1099: Collection errors
/// - 2000-2099: Item errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const CELL_OVERFLOW: ExitCode = ExitCode(8);
    pub const CELL_UNDERFLOW: ExitCode = ExitCode(9);
    pub const METHOD_NOT_FOUND: ExitCode = ExitCode(11);
    pub const OUT_OF_GAS: ExitCode = ExitCode(13);
    pub const NOT_ENOUGH_BALANCE: ExitCode = ExitCode(37);
    pub const INVALID_INCOMING_MESSAGE: ExitCode = ExitCode(130);

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Display for ExitCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
