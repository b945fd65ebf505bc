// NFT Contracts
// This module provides the collection and item contracts exercised by the
// sandbox: their message codec, state, handlers and getters.
//
// Module Structure:
// - error: Exit codes and message codec errors
// - types: Royalty parameters, getter snapshots and content layouts
// - messages: Opcodes and the Message sum type
// - operations: Collection and item handlers (runtime agnostic)

mod error;
pub mod messages;
pub mod operations;
mod types;

pub use error::*;
pub use messages::Message;
pub use operations::*;
pub use types::*;
