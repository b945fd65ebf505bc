use crate::{
    cell::{Cell, CellBuilder, CellError},
    crypto::Address,
};

/// Code and initial data of a contract
///
/// The account address of a contract is the representation hash of its
/// `StateInit` cell, so addresses can be computed before deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInit {
    pub code: Cell,
    pub data: Cell,
}

impl StateInit {
    pub fn new(code: Cell, data: Cell) -> Self {
        Self { code, data }
    }

    /// Serialize as `split_depth:0 special:0 code:1 data:1 library:0`
    pub fn to_cell(&self) -> Result<Cell, CellError> {
        Ok(CellBuilder::new()
            .store_uint(0b00110, 5)?
            .store_ref(self.code.clone())?
            .store_ref(self.data.clone())?
            .build())
    }

    /// Address this state init deploys to
    pub fn address(&self, workchain: i8) -> Result<Address, CellError> {
        Ok(Address::new(workchain, self.to_cell()?.hash().clone()))
    }
}

/// Code cell standing in for the compiled code of a contract kind
pub fn code_cell(identifier: &str) -> Result<Cell, CellError> {
    Ok(CellBuilder::new().store_string_tail(identifier)?.build())
}
