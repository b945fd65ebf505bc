use super::{Cell, CellBuilder, CellError};
use crate::crypto::{Address, Hash, HASH_SIZE};

/// Read cursor over a [`Cell`]
#[derive(Clone, Debug)]
pub struct CellSlice {
    cell: Cell,
    bit_pos: usize,
    ref_pos: usize,
}

impl CellSlice {
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    pub fn remaining_refs(&self) -> usize {
        self.cell.refs().len() - self.ref_pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn ensure_bits(&self, needed: usize) -> Result<(), CellError> {
        if needed > self.remaining_bits() {
            return Err(CellError::BitUnderflow {
                needed,
                available: self.remaining_bits(),
            });
        }
        Ok(())
    }

    pub fn load_bit(&mut self) -> Result<bool, CellError> {
        self.ensure_bits(1)?;
        let bit = self.cell.bit_at(self.bit_pos);
        self.bit_pos += 1;
        Ok(bit)
    }

    pub fn skip_bits(&mut self, bits: usize) -> Result<(), CellError> {
        self.ensure_bits(bits)?;
        self.bit_pos += bits;
        Ok(())
    }

    pub fn load_uint(&mut self, bits: usize) -> Result<u128, CellError> {
        if bits > 128 {
            return Err(CellError::IntegerOverflow { bits });
        }
        self.ensure_bits(bits)?;
        let mut value = 0u128;
        for _ in 0..bits {
            value = (value << 1) | self.load_bit()? as u128;
        }
        Ok(value)
    }

    /// Read without advancing the cursor
    pub fn preload_uint(&self, bits: usize) -> Result<u128, CellError> {
        self.clone().load_uint(bits)
    }

    pub fn load_int(&mut self, bits: usize) -> Result<i128, CellError> {
        if bits == 0 || bits > 128 {
            return Err(CellError::IntegerOverflow { bits });
        }
        let raw = self.load_uint(bits)?;
        if bits == 128 {
            return Ok(raw as i128);
        }
        let sign = 1u128 << (bits - 1);
        if raw & sign != 0 {
            Ok(raw as i128 - (1i128 << bits))
        } else {
            Ok(raw as i128)
        }
    }

    pub fn load_u32(&mut self) -> Result<u32, CellError> {
        Ok(self.load_uint(32)? as u32)
    }

    pub fn load_u64(&mut self) -> Result<u64, CellError> {
        Ok(self.load_uint(64)? as u64)
    }

    pub fn load_bytes(&mut self, len: usize) -> Result<Vec<u8>, CellError> {
        self.ensure_bits(len * 8)?;
        (0..len).map(|_| Ok(self.load_uint(8)? as u8)).collect()
    }

    pub fn load_coins(&mut self) -> Result<u128, CellError> {
        let len = self.load_uint(4)? as usize;
        self.load_uint(len * 8)
    }

    pub fn load_address(&mut self) -> Result<Address, CellError> {
        let tag = self.load_uint(2)? as u8;
        if tag != 0b10 {
            return Err(CellError::InvalidAddressTag(tag));
        }
        if self.load_bit()? {
            // anycast is not supported
            return Err(CellError::InvalidAddressTag(tag));
        }
        let workchain = self.load_int(8)? as i8;
        let bytes = self.load_bytes(HASH_SIZE)?;
        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&bytes);
        Ok(Address::new(workchain, Hash::new(hash)))
    }

    pub fn load_maybe_address(&mut self) -> Result<Option<Address>, CellError> {
        if self.preload_uint(2)? == 0 {
            self.skip_bits(2)?;
            return Ok(None);
        }
        self.load_address().map(Some)
    }

    pub fn load_ref(&mut self) -> Result<Cell, CellError> {
        let cell = self
            .cell
            .reference(self.ref_pos)
            .cloned()
            .ok_or(CellError::RefUnderflow)?;
        self.ref_pos += 1;
        Ok(cell)
    }

    pub fn load_maybe_ref(&mut self) -> Result<Option<Cell>, CellError> {
        if self.load_bit()? {
            self.load_ref().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a string tail: the remaining bytes of this cell followed by the
    /// bytes of the first reference, recursively
    pub fn load_bytes_tail(&mut self) -> Result<Vec<u8>, CellError> {
        if self.remaining_bits() % 8 != 0 {
            return Err(CellError::UnalignedStringTail);
        }
        let mut bytes = self.load_bytes(self.remaining_bits() / 8)?;
        if self.remaining_refs() > 0 {
            let next = self.load_ref()?;
            bytes.extend(next.as_slice().load_bytes_tail()?);
        }
        Ok(bytes)
    }

    pub fn load_string_tail(&mut self) -> Result<String, CellError> {
        String::from_utf8(self.load_bytes_tail()?).map_err(|_| CellError::InvalidUtf8)
    }

    /// Consume everything left into a new cell
    pub fn load_remainder(&mut self) -> Result<Cell, CellError> {
        let mut builder = CellBuilder::new();
        builder.store_slice(self)?;
        self.bit_pos = self.cell.bit_len();
        self.ref_pos = self.cell.refs().len();
        Ok(builder.build())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn string_tail_survives_chaining(
            prefix in proptest::collection::vec(any::<u8>(), 0..120),
            tail in proptest::collection::vec(any::<u8>(), 0..600),
        ) {
            let mut builder = CellBuilder::new();
            builder.store_bytes(&prefix).unwrap();
            builder.store_bytes_tail(&tail).unwrap();
            let cell = builder.build();

            let mut slice = cell.as_slice();
            prop_assert_eq!(slice.load_bytes(prefix.len()).unwrap(), prefix);
            prop_assert_eq!(slice.load_bytes_tail().unwrap(), tail);
        }
    }
}
