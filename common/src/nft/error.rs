// NFT Contracts - Error Codes
// This module defines the exit codes NFT handlers abort with, and the
// errors raised while constructing or decoding NFT messages.
//
// Exit Code Ranges:
// - 0: Success
// - 1-127: Execution and action phase codes (see contract::ExitCode)
// - 128-255: Runtime codes (see contract::ExitCode)
// - 1000-1099: Collection errors
// - 2000-2099: Item errors

use crate::{cell::CellError, contract::ExitCode};
use thiserror::Error;

/// NFT handler result type
pub type NftResult<T> = Result<T, NftError>;

/// NFT handler failure with numeric exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[repr(i32)]
pub enum NftError {
    // ========================================
    // Collection errors (1000-1099)
    // ========================================
    #[error("Attached value does not cover storage and gas reserve")]
    InsufficientMintValue = 1001,

    #[error("Item index overflow")]
    IndexOverflow = 1002,

    // ========================================
    // Item errors (2000-2099)
    // ========================================
    #[error("Initialization must come from the collection")]
    NotFromCollection = 2001,

    #[error("Not the owner")]
    NotOwner = 2002,

    #[error("Not the editor")]
    NotEditor = 2003,

    #[error("Item is not initialized")]
    NotInitialized = 2004,

    #[error("Attached value does not cover reserve, forward amount and fees")]
    InsufficientValue = 2005,

    #[error("Initialization requires a custom payload")]
    MissingContent = 2006,
}

impl NftError {
    /// Get the numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<NftError> for ExitCode {
    fn from(err: NftError) -> Self {
        ExitCode(err.code())
    }
}

/// Message or parameter that cannot be built or decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error(transparent)]
    Cell(#[from] CellError),

    #[error("Message body is empty")]
    EmptyBody,

    #[error("Unknown opcode {0:#010x}")]
    UnknownOpcode(u32),

    #[error("Unknown text command {0:?}")]
    UnknownTextCommand(String),

    #[error("Invalid royalty {numerator}/{denominator}")]
    InvalidRoyalty { numerator: u16, denominator: u16 },
}

impl From<MessageError> for ExitCode {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Cell(err) => err.into(),
            _ => ExitCode::INVALID_INCOMING_MESSAGE,
        }
    }
}

impl From<CellError> for ExitCode {
    fn from(err: CellError) -> Self {
        match err {
            CellError::BitOverflow { .. }
            | CellError::RefOverflow
            | CellError::IntegerOverflow { .. }
            | CellError::CoinsOverflow => ExitCode::CELL_OVERFLOW,
            _ => ExitCode::CELL_UNDERFLOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_in_range() {
        assert_eq!(NftError::InsufficientMintValue.code(), 1001);
        assert_eq!(NftError::NotOwner.code(), 2002);
        assert_eq!(ExitCode::from(NftError::NotEditor), ExitCode(2003));
    }

    #[test]
    fn test_decode_errors_map_to_runtime_codes() {
        assert_eq!(
            ExitCode::from(MessageError::UnknownOpcode(0xdead)),
            ExitCode::INVALID_INCOMING_MESSAGE
        );
        assert_eq!(
            ExitCode::from(MessageError::Cell(CellError::RefUnderflow)),
            ExitCode::CELL_UNDERFLOW
        );
        assert_eq!(
            ExitCode::from(CellError::RefOverflow),
            ExitCode::CELL_OVERFLOW
        );
    }
}
