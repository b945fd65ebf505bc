// NFT Operations Module
// This module contains the message handlers and getters of the NFT
// collection and item contracts.
//
// The operations are runtime-agnostic:
// - State is a plain value the caller owns and commits
// - Runtime values (sender, value, balance, time) arrive in a RuntimeContext
// - Side effects are returned as OutMessages instead of being sent

mod collection;
mod item;

pub use collection::*;
pub use item::*;

use crate::{
    cell::{Cell, CellBuilder, CellError},
    config::{GAS_CONSUMPTION, MIN_TONS_FOR_STORAGE},
    contract::RuntimeContext,
};

use super::types::content_tail_bytes;

// ========================================
// Shared Helpers
// ========================================

/// Inbound value left for outgoing messages
///
/// Tops the account back up to the storage reserve first, then keeps the
/// gas reserve. Returns `None` when the message does not cover both.
pub fn available_message_value(ctx: &RuntimeContext) -> Option<u128> {
    let balance_before = ctx.balance_before_message();
    let storage_fee = MIN_TONS_FOR_STORAGE - balance_before.min(MIN_TONS_FOR_STORAGE);
    ctx.value.checked_sub(storage_fee + GAS_CONSUMPTION)
}

/// Build a single string-tail cell from the tail of `content` followed by
/// each of `suffixes`
pub fn content_with_suffix(content: &Cell, suffixes: &[&str]) -> Result<Cell, CellError> {
    let mut bytes = content_tail_bytes(content)?;
    for suffix in suffixes {
        bytes.extend_from_slice(suffix.as_bytes());
    }
    Ok(CellBuilder::new().store_bytes_tail(&bytes)?.build())
}
