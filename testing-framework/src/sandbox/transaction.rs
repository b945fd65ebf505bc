// File: testing-framework/src/sandbox/transaction.rs
//
// Transaction records produced by the ledger

use std::fmt::{self, Display, Formatter};

use nft_common::{crypto::Address, utils::from_nano};
use serde::{Deserialize, Serialize};

/// One executed (or skipped) inbound message on one account
///
/// Immutable once produced. A send returns its transactions in causal
/// order: the treasury's external transaction first, then breadth-first
/// through the messages each transaction emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Account the transaction ran on
    pub address: Address,

    /// Sender of the inbound message, `None` for external messages
    pub from: Option<Address>,

    /// Destination of the inbound message (same as `address`)
    pub to: Address,

    /// Value attached to the inbound message
    pub value: u128,

    /// First 32 bits of the inbound body, when present
    pub op: Option<u32>,

    /// Compute and action phases both succeeded
    pub success: bool,

    /// The account was deployed by this transaction
    pub deploy: bool,

    /// Execution did not complete (skipped or failed)
    pub aborted: bool,

    /// Exit code of the compute phase (or 37 for a failed action phase),
    /// `None` when compute was skipped
    pub exit_code: Option<i32>,

    /// The inbound message was a bounce
    pub bounced: bool,

    /// Logical time
    pub lt: u64,

    /// Unix time
    pub now: u32,

    /// Compute fee plus forward fees paid by this account
    pub total_fees: u128,

    /// Number of messages emitted
    pub out_messages: usize,
}

impl Transaction {
    /// Whether this transaction ran on behalf of an external message
    pub fn is_external(&self) -> bool {
        self.from.is_none()
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "lt={} ", self.lt)?;
        match &self.from {
            Some(from) => write!(f, "from={} ", from)?,
            None => write!(f, "from=<external> ")?,
        }
        write!(f, "to={} value={}", self.to, from_nano(self.value))?;
        if let Some(op) = self.op {
            write!(f, " op={:#010x}", op)?;
        }
        write!(
            f,
            " success={} deploy={} aborted={} bounced={}",
            self.success, self.deploy, self.aborted, self.bounced
        )?;
        match self.exit_code {
            Some(code) => write!(f, " exit_code={}", code),
            None => write!(f, " exit_code=<skipped>"),
        }
    }
}

/// Everything a single send produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResult {
    pub transactions: Vec<Transaction>,
}

impl SendMessageResult {
    /// Transactions that ran on `address`
    pub fn on_account<'a>(&'a self, address: &'a Address) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |tx| &tx.address == address)
    }

    /// Whether every transaction of the send succeeded
    pub fn all_succeeded(&self) -> bool {
        self.transactions.iter().all(|tx| tx.success)
    }
}

impl From<Vec<Transaction>> for SendMessageResult {
    fn from(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}
