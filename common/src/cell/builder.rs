use super::{Cell, CellError, CellSlice, MAX_CELL_BITS, MAX_CELL_REFS};
use crate::crypto::Address;

/// Coins are serialized as VarUInteger 16: at most 15 bytes of value
const MAX_COINS_BYTES: usize = 15;

/// Incremental writer producing a [`Cell`]
///
/// Every `store_*` method checks capacity first and returns `&mut Self`,
/// so writes chain with `?`:
///
/// ```
/// use nft_common::cell::CellBuilder;
///
/// let cell = CellBuilder::new()
///     .store_uint(0x01, 8)?
///     .store_string_ref_tail("https://example.com/meta/")?
///     .build();
/// assert_eq!(cell.refs().len(), 1);
/// # Ok::<(), nft_common::cell::CellError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(&self) -> usize {
        self.bit_len
    }

    pub fn bits_left(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    pub fn refs_left(&self) -> usize {
        MAX_CELL_REFS - self.refs.len()
    }

    fn ensure_bits(&self, needed: usize) -> Result<(), CellError> {
        if needed > self.bits_left() {
            return Err(CellError::BitOverflow {
                needed,
                available: self.bits_left(),
            });
        }
        Ok(())
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.ensure_bits(1)?;
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            self.data[self.bit_len / 8] |= 1 << (7 - self.bit_len % 8);
        }
        self.bit_len += 1;
        Ok(self)
    }

    /// Store the low `bits` bits of `value`, most significant first
    pub fn store_uint(&mut self, value: u128, bits: usize) -> Result<&mut Self, CellError> {
        if bits > 128 || (bits < 128 && value >> bits != 0) {
            return Err(CellError::IntegerOverflow { bits });
        }
        self.ensure_bits(bits)?;
        for i in (0..bits).rev() {
            self.store_bit((value >> i) & 1 == 1)?;
        }
        Ok(self)
    }

    /// Store a two's complement signed integer in `bits` bits
    pub fn store_int(&mut self, value: i128, bits: usize) -> Result<&mut Self, CellError> {
        if bits == 0 || bits > 128 {
            return Err(CellError::IntegerOverflow { bits });
        }
        if bits < 128 {
            let bound = 1i128 << (bits - 1);
            if value < -bound || value >= bound {
                return Err(CellError::IntegerOverflow { bits });
            }
        }
        let mask = if bits == 128 {
            u128::MAX
        } else {
            (1u128 << bits) - 1
        };
        self.store_uint(value as u128 & mask, bits)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        self.ensure_bits(bytes.len() * 8)?;
        for byte in bytes {
            self.store_uint(*byte as u128, 8)?;
        }
        Ok(self)
    }

    /// Store a coins amount as VarUInteger 16
    pub fn store_coins(&mut self, amount: u128) -> Result<&mut Self, CellError> {
        let len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if len > MAX_COINS_BYTES {
            return Err(CellError::CoinsOverflow);
        }
        self.ensure_bits(4 + len * 8)?;
        self.store_uint(len as u128, 4)?;
        self.store_uint(amount, len * 8)
    }

    /// Store a `MsgAddressInt` std address without anycast
    pub fn store_address(&mut self, address: &Address) -> Result<&mut Self, CellError> {
        self.ensure_bits(2 + 1 + 8 + 256)?;
        self.store_uint(0b10, 2)?;
        self.store_bit(false)?;
        self.store_int(address.workchain() as i128, 8)?;
        self.store_bytes(address.hash().as_bytes())
    }

    /// Store an address or `addr_none`
    pub fn store_maybe_address(
        &mut self,
        address: Option<&Address>,
    ) -> Result<&mut Self, CellError> {
        match address {
            Some(address) => self.store_address(address),
            None => self.store_uint(0, 2),
        }
    }

    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self, CellError> {
        if self.refs_left() == 0 {
            return Err(CellError::RefOverflow);
        }
        self.refs.push(cell);
        Ok(self)
    }

    pub fn store_maybe_ref(&mut self, cell: Option<&Cell>) -> Result<&mut Self, CellError> {
        match cell {
            Some(cell) => {
                if self.refs_left() == 0 {
                    return Err(CellError::RefOverflow);
                }
                self.store_bit(true)?;
                self.store_ref(cell.clone())
            }
            None => self.store_bit(false),
        }
    }

    /// Append the unread bits and references of `slice`
    pub fn store_slice(&mut self, slice: &CellSlice) -> Result<&mut Self, CellError> {
        let bits = slice.remaining_bits();
        self.ensure_bits(bits)?;
        if slice.remaining_refs() > self.refs_left() {
            return Err(CellError::RefOverflow);
        }
        let mut reader = slice.clone();
        for _ in 0..bits {
            self.store_bit(reader.load_bit()?)?;
        }
        while reader.remaining_refs() > 0 {
            self.store_ref(reader.load_ref()?)?;
        }
        Ok(self)
    }

    /// Append the whole content of `cell` inline
    pub fn store_cell_contents(&mut self, cell: &Cell) -> Result<&mut Self, CellError> {
        self.store_slice(&cell.as_slice())
    }

    /// Store bytes as a "string tail": fill this cell, then continue in a
    /// chain of child references
    pub fn store_bytes_tail(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        if bytes.is_empty() {
            return Ok(self);
        }

        let fits = self.bits_left() / 8;
        if bytes.len() <= fits {
            return self.store_bytes(bytes);
        }

        if self.refs_left() == 0 {
            return Err(CellError::RefOverflow);
        }
        let (head, rest) = bytes.split_at(fits);
        self.store_bytes(head)?;
        let mut tail = CellBuilder::new();
        tail.store_bytes_tail(rest)?;
        self.store_ref(tail.build())
    }

    pub fn store_string_tail(&mut self, value: &str) -> Result<&mut Self, CellError> {
        self.store_bytes_tail(value.as_bytes())
    }

    /// Store a string tail in a fresh child cell
    pub fn store_string_ref_tail(&mut self, value: &str) -> Result<&mut Self, CellError> {
        let mut tail = CellBuilder::new();
        tail.store_string_tail(value)?;
        self.store_ref(tail.build())
    }

    pub fn build(&self) -> Cell {
        Cell::new(self.data.clone(), self.bit_len, self.refs.clone())
    }
}
