// File: testing-framework/src/matchers.rs
//
// Partial Transaction Matching
//
// A TransactionMatcher names only the fields a test cares about; every
// unset field matches anything. Assertions print the pattern and the full
// transaction list on failure.

use std::fmt::{self, Display, Formatter};

use anyhow::{anyhow, Result};
use nft_common::{crypto::Address, utils::from_nano};
use serde::{Deserialize, Serialize};

use crate::sandbox::{SendMessageResult, Transaction};

/// Partial description of a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMatcher {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub success: Option<bool>,
    pub deploy: Option<bool>,
    pub aborted: Option<bool>,
    pub bounced: Option<bool>,
    pub exit_code: Option<i32>,
    pub op: Option<u32>,
    pub value: Option<u128>,
}

impl TransactionMatcher {
    /// Matcher accepting every transaction
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, address: &Address) -> Self {
        self.from = Some(address.clone());
        self
    }

    pub fn to(mut self, address: &Address) -> Self {
        self.to = Some(address.clone());
        self
    }

    pub fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn deploy(mut self, deploy: bool) -> Self {
        self.deploy = Some(deploy);
        self
    }

    pub fn aborted(mut self, aborted: bool) -> Self {
        self.aborted = Some(aborted);
        self
    }

    pub fn bounced(mut self, bounced: bool) -> Self {
        self.bounced = Some(bounced);
        self
    }

    pub fn exit_code(mut self, exit_code: impl Into<i32>) -> Self {
        self.exit_code = Some(exit_code.into());
        self
    }

    pub fn op(mut self, op: u32) -> Self {
        self.op = Some(op);
        self
    }

    pub fn value(mut self, value: u128) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether every set field equals the transaction's
    ///
    /// `from` never matches an external transaction, and `exit_code` never
    /// matches one whose compute phase was skipped.
    pub fn matches(&self, tx: &Transaction) -> bool {
        fn field<T: PartialEq>(expected: &Option<T>, actual: &T) -> bool {
            expected.as_ref().map_or(true, |expected| expected == actual)
        }

        let from = match &self.from {
            Some(from) => tx.from.as_ref() == Some(from),
            None => true,
        };
        let exit_code = match self.exit_code {
            Some(code) => tx.exit_code == Some(code),
            None => true,
        };
        let op = match self.op {
            Some(op) => tx.op == Some(op),
            None => true,
        };

        from && exit_code
            && op
            && field(&self.to, &tx.to)
            && field(&self.success, &tx.success)
            && field(&self.deploy, &tx.deploy)
            && field(&self.aborted, &tx.aborted)
            && field(&self.bounced, &tx.bounced)
            && field(&self.value, &tx.value)
    }
}

impl Display for TransactionMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(from) = &self.from {
            fields.push(format!("from={}", from));
        }
        if let Some(to) = &self.to {
            fields.push(format!("to={}", to));
        }
        if let Some(success) = self.success {
            fields.push(format!("success={}", success));
        }
        if let Some(deploy) = self.deploy {
            fields.push(format!("deploy={}", deploy));
        }
        if let Some(aborted) = self.aborted {
            fields.push(format!("aborted={}", aborted));
        }
        if let Some(bounced) = self.bounced {
            fields.push(format!("bounced={}", bounced));
        }
        if let Some(code) = self.exit_code {
            fields.push(format!("exit_code={}", code));
        }
        if let Some(op) = self.op {
            fields.push(format!("op={:#010x}", op));
        }
        if let Some(value) = self.value {
            fields.push(format!("value={}", from_nano(value)));
        }

        if fields.is_empty() {
            write!(f, "{{any}}")
        } else {
            write!(f, "{{{}}}", fields.join(", "))
        }
    }
}

fn describe(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| format!("  [{}] {}", i, tx))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Matching over a list of transactions
pub trait TransactionListExt {
    fn transactions(&self) -> &[Transaction];

    /// First transaction matching `matcher`
    fn find_transaction(&self, matcher: &TransactionMatcher) -> Option<&Transaction> {
        self.transactions().iter().find(|tx| matcher.matches(tx))
    }

    fn has_transaction(&self, matcher: &TransactionMatcher) -> bool {
        self.find_transaction(matcher).is_some()
    }

    /// Like [`assert_has_transaction`](Self::assert_has_transaction), but
    /// returns the failure instead of panicking
    fn expect_transaction(&self, matcher: &TransactionMatcher) -> Result<&Transaction> {
        self.find_transaction(matcher).ok_or_else(|| {
            anyhow!(
                "No transaction matches {}\nTransactions:\n{}",
                matcher,
                describe(self.transactions())
            )
        })
    }

    /// Panics unless some transaction matches `matcher`
    #[track_caller]
    fn assert_has_transaction(&self, matcher: &TransactionMatcher) -> &Transaction {
        match self.expect_transaction(matcher) {
            Ok(tx) => tx,
            Err(err) => panic!("{}", err),
        }
    }

    /// Panics if any transaction matches `matcher`
    #[track_caller]
    fn assert_not_has_transaction(&self, matcher: &TransactionMatcher) {
        if let Some(tx) = self.find_transaction(matcher) {
            panic!(
                "Unexpected transaction matching {}: {}\nTransactions:\n{}",
                matcher,
                tx,
                describe(self.transactions())
            );
        }
    }
}

impl TransactionListExt for [Transaction] {
    fn transactions(&self) -> &[Transaction] {
        self
    }
}

impl TransactionListExt for Vec<Transaction> {
    fn transactions(&self) -> &[Transaction] {
        self
    }
}

impl TransactionListExt for SendMessageResult {
    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
