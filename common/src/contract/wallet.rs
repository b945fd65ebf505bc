use super::{code_cell, ContractLogic, ExitCode, OutMessage, RuntimeContext, StateInit};
use crate::{
    cell::{Cell, CellBuilder, CellError},
    config::TREASURY_WALLET_CODE,
};

/// Pre-funded wallet controlled by the test harness
///
/// Outgoing transfers are requested by the ledger directly (the sandbox
/// equivalent of a signed external message); inbound internal messages are
/// always accepted so excesses and bounces can land on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryWallet {
    label: String,
}

impl TreasuryWallet {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state_init(&self) -> Result<StateInit, CellError> {
        let data = CellBuilder::new().store_string_tail(&self.label)?.build();
        Ok(StateInit::new(code_cell(TREASURY_WALLET_CODE)?, data))
    }
}

impl ContractLogic for TreasuryWallet {
    fn receive(
        &mut self,
        _ctx: &RuntimeContext,
        _body: &Cell,
    ) -> Result<Vec<OutMessage>, ExitCode> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_keys_the_address() {
        let a = TreasuryWallet::new("deployer").state_init().unwrap();
        let b = TreasuryWallet::new("deployer").state_init().unwrap();
        let c = TreasuryWallet::new("user").state_init().unwrap();
        assert_eq!(a.address(0).unwrap(), b.address(0).unwrap());
        assert_ne!(a.address(0).unwrap(), c.address(0).unwrap());
    }
}
