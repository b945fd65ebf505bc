// Cell Codec
// This module provides the bit-level data model every message, content blob
// and contract state init is encoded with.
//
// A cell holds up to 1023 data bits and up to 4 references to child cells.
// Cells are immutable once built and cheap to clone (reference counted).
// Equality is defined by the representation hash:
//   sha256(d1 || d2 || data + completion bit || ref depths || ref hashes)

mod builder;
mod error;
mod slice;

pub use builder::*;
pub use error::*;
pub use slice::*;

use crate::crypto::{hash, Hash, HASH_SIZE};
use lazy_static::lazy_static;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Maximum data bits in a single cell
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum child references in a single cell
pub const MAX_CELL_REFS: usize = 4;

lazy_static! {
    static ref EMPTY_CELL: Cell = Cell::new(Vec::new(), 0, Vec::new());
}

struct CellInner {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
    hash: Hash,
    depth: u16,
}

/// Immutable, reference counted cell
#[derive(Clone)]
pub struct Cell(Arc<CellInner>);

impl Cell {
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, refs: Vec<Cell>) -> Self {
        let depth = refs
            .iter()
            .map(|r| r.depth() + 1)
            .max()
            .unwrap_or(0);
        let hash = representation_hash(&data, bit_len, &refs);

        Self(Arc::new(CellInner {
            data,
            bit_len,
            refs,
            hash,
            depth,
        }))
    }

    /// The empty cell (no bits, no references)
    pub fn empty() -> Cell {
        EMPTY_CELL.clone()
    }

    pub fn bit_len(&self) -> usize {
        self.0.bit_len
    }

    /// Data bytes, the last one zero padded when `bit_len` is not byte aligned
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    pub fn refs(&self) -> &[Cell] {
        &self.0.refs
    }

    pub fn reference(&self, index: usize) -> Option<&Cell> {
        self.0.refs.get(index)
    }

    pub fn hash(&self) -> &Hash {
        &self.0.hash
    }

    pub fn depth(&self) -> u16 {
        self.0.depth
    }

    pub fn is_empty(&self) -> bool {
        self.0.bit_len == 0 && self.0.refs.is_empty()
    }

    /// Start reading this cell from its first bit
    pub fn as_slice(&self) -> CellSlice {
        CellSlice::new(self.clone())
    }

    /// Read bit `index` (0 = most significant bit of the first byte)
    pub(crate) fn bit_at(&self, index: usize) -> bool {
        (self.0.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }
}

fn representation_hash(data: &[u8], bit_len: usize, refs: &[Cell]) -> Hash {
    let full_bytes = bit_len.div_ceil(8);
    let mut repr = Vec::with_capacity(2 + full_bytes + refs.len() * (2 + HASH_SIZE));

    // d1: ordinary cell, level 0
    repr.push(refs.len() as u8);
    // d2: floor(bits / 8) + ceil(bits / 8), odd when a completion bit follows
    repr.push((bit_len / 8 + full_bytes) as u8);

    let start = repr.len();
    repr.extend_from_slice(&data[..full_bytes]);
    let rem = bit_len % 8;
    if rem != 0 {
        repr[start + full_bytes - 1] |= 1 << (7 - rem);
    }

    for r in refs {
        repr.extend_from_slice(&r.depth().to_be_bytes());
    }
    for r in refs {
        repr.extend_from_slice(r.hash().as_bytes());
    }

    hash(&repr)
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.bit_len())
            .field("refs", &self.refs().len())
            .field("hash", &self.hash().to_hex())
            .finish()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_hash() {
        // Well-known hash of the empty ordinary cell
        assert_eq!(
            Cell::empty().hash().to_hex(),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
        assert_eq!(Cell::empty().depth(), 0);
        assert!(Cell::empty().is_empty());
    }

    #[test]
    fn test_depth_follows_refs() {
        let leaf = Cell::empty();
        let mid = CellBuilder::new().store_ref(leaf).unwrap().build();
        let top = CellBuilder::new().store_ref(mid.clone()).unwrap().build();
        assert_eq!(mid.depth(), 1);
        assert_eq!(top.depth(), 2);
    }

    #[test]
    fn test_equality_is_by_hash() {
        let a = CellBuilder::new().store_uint(5, 3).unwrap().build();
        let b = CellBuilder::new()
            .store_bit(true)
            .unwrap()
            .store_bit(false)
            .unwrap()
            .store_bit(true)
            .unwrap()
            .build();
        assert_eq!(a, b);

        let c = CellBuilder::new().store_uint(5, 4).unwrap().build();
        assert_ne!(a, c);
    }
}
