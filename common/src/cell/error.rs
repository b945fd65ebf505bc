use thiserror::Error;

/// Errors raised while building or reading cells
///
/// Builder errors surface before a message ever reaches the ledger, so they
/// are the "non-constructible message" failures of the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("Cell overflow: need {needed} bits, {available} available")]
    BitOverflow { needed: usize, available: usize },

    #[error("Cell overflow: no reference slots left")]
    RefOverflow,

    #[error("Cell underflow: need {needed} bits, {available} available")]
    BitUnderflow { needed: usize, available: usize },

    #[error("Cell underflow: no references left")]
    RefUnderflow,

    #[error("Integer does not fit in {bits} bits")]
    IntegerOverflow { bits: usize },

    #[error("Coins amount exceeds VarUInteger 16 range")]
    CoinsOverflow,

    #[error("Invalid address tag: {0:#04b}")]
    InvalidAddressTag(u8),

    #[error("String tail is not byte aligned")]
    UnalignedStringTail,

    #[error("String tail is not valid UTF-8")]
    InvalidUtf8,
}
