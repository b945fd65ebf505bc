use super::StateInit;
use crate::{cell::Cell, crypto::Address};
use std::ops::BitOr;

/// Flags controlling how an outgoing message pays for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendMode(u8);

impl SendMode {
    /// Forward fee is deducted from the message value
    pub const REGULAR: SendMode = SendMode(0);
    /// Forward fee is paid from the contract balance on top of the value
    pub const PAY_FEES_SEPARATELY: SendMode = SendMode(1);
    /// A message that cannot be paid for is dropped instead of failing the action phase
    pub const IGNORE_ERRORS: SendMode = SendMode(2);
    /// Add what is left of the inbound value to the message value
    pub const CARRY_REMAINING_VALUE: SendMode = SendMode(64);
    /// Send the whole remaining balance
    pub const CARRY_ALL_BALANCE: SendMode = SendMode(128);

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn contains(&self, other: SendMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SendMode {
    type Output = SendMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        SendMode(self.0 | rhs.0)
    }
}

/// Internal message emitted by a contract handler
#[derive(Debug, Clone)]
pub struct OutMessage {
    pub to: Address,
    pub value: u128,
    pub mode: SendMode,
    pub bounce: bool,
    pub body: Cell,
    pub state_init: Option<StateInit>,
}

impl OutMessage {
    pub fn new(to: Address, value: u128, body: Cell) -> Self {
        Self {
            to,
            value,
            mode: SendMode::REGULAR,
            bounce: true,
            body,
            state_init: None,
        }
    }

    pub fn with_mode(mut self, mode: SendMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_bounce(mut self, bounce: bool) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_state_init(mut self, state_init: StateInit) -> Self {
        self.state_init = Some(state_init);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags_combine() {
        let mode = SendMode::PAY_FEES_SEPARATELY | SendMode::IGNORE_ERRORS;
        assert_eq!(mode.bits(), 3);
        assert!(mode.contains(SendMode::IGNORE_ERRORS));
        assert!(!mode.contains(SendMode::CARRY_REMAINING_VALUE));
        assert!(mode.contains(SendMode::REGULAR));
    }
}
