// NFT Contracts - Core Types
// This module defines the data carried by NFT contracts and returned by
// their getters.

use crate::{
    cell::{Cell, CellBuilder, CellError},
    config::{OFFCHAIN_CONTENT_PREFIX, ONCHAIN_CONTENT_PREFIX},
    crypto::Address,
};
use serde::{Deserialize, Serialize};

use super::error::MessageError;

// ========================================
// Royalty Configuration
// ========================================

/// Royalty share of secondary sales, fixed at collection construction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyParams {
    /// Fraction numerator
    pub numerator: u16,

    /// Fraction denominator, never zero
    pub denominator: u16,

    /// Recipient of royalty payments
    pub destination: Address,
}

impl RoyaltyParams {
    /// Create royalty parameters, rejecting fractions above one
    pub fn new(numerator: u16, denominator: u16, destination: Address) -> Result<Self, MessageError> {
        let params = Self {
            numerator,
            denominator,
            destination,
        };
        params.validate()?;
        Ok(params)
    }

    /// Validate the royalty fraction
    pub fn validate(&self) -> Result<(), MessageError> {
        Self::validate_fraction(self.numerator, self.denominator)
    }

    /// Reject a zero denominator or a fraction above one
    pub fn validate_fraction(numerator: u16, denominator: u16) -> Result<(), MessageError> {
        if denominator == 0 || numerator > denominator {
            return Err(MessageError::InvalidRoyalty {
                numerator,
                denominator,
            });
        }
        Ok(())
    }

    /// Royalty owed on `price`, rounded down
    pub fn calculate(&self, price: u128) -> u128 {
        price * self.numerator as u128 / self.denominator as u128
    }

    pub fn to_cell(&self) -> Result<Cell, CellError> {
        Ok(CellBuilder::new()
            .store_uint(self.numerator as u128, 16)?
            .store_uint(self.denominator as u128, 16)?
            .store_address(&self.destination)?
            .build())
    }
}

// ========================================
// Getter Snapshots
// ========================================

/// Result of the collection `get_collection_data` getter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionData {
    pub next_item_index: u64,
    pub collection_content: Cell,
    pub owner_address: Address,
}

/// Result of the item `get_nft_data` getter
///
/// `owner` and `editor` are `None` until the collection initializes the item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftData {
    pub is_initialized: bool,
    pub index: u64,
    pub collection_address: Address,
    pub owner: Option<Address>,
    pub editor: Option<Address>,
    pub individual_content: Cell,
}

// ========================================
// Content
// ========================================

/// Metadata content layouts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// `0x01` prefix byte followed by a URI string in a reference chain
    Offchain(String),
    /// Bare string tail, as stored in item content
    Text(String),
}

impl Content {
    pub fn to_cell(&self) -> Result<Cell, CellError> {
        let mut builder = CellBuilder::new();
        match self {
            Content::Offchain(uri) => {
                builder
                    .store_int(OFFCHAIN_CONTENT_PREFIX as i128, 8)?
                    .store_string_ref_tail(uri)?;
            }
            Content::Text(text) => {
                builder.store_string_tail(text)?;
            }
        }
        Ok(builder.build())
    }

    /// Best effort decoding of a content cell
    ///
    /// Returns `None` for on-chain dictionaries and non UTF-8 data.
    pub fn parse(cell: &Cell) -> Option<Content> {
        let mut slice = cell.as_slice();
        if slice.remaining_bits() == 8 && slice.remaining_refs() == 1 {
            let prefix = slice.load_uint(8).ok()? as u8;
            if prefix == OFFCHAIN_CONTENT_PREFIX {
                let uri = slice.load_ref().ok()?.as_slice().load_string_tail().ok()?;
                return Some(Content::Offchain(uri));
            }
            if prefix == ONCHAIN_CONTENT_PREFIX {
                return None;
            }
        }
        cell.as_slice().load_string_tail().ok().map(Content::Text)
    }
}

/// Raw string-tail bytes of a content cell, prefix byte included
pub fn content_tail_bytes(cell: &Cell) -> Result<Vec<u8>, CellError> {
    cell.as_slice().load_bytes_tail()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;

    fn destination() -> Address {
        Address::new(0, Hash::new([1; 32]))
    }

    #[test]
    fn test_royalty_validation() {
        assert!(RoyaltyParams::new(350, 1000, destination()).is_ok());
        assert_eq!(
            RoyaltyParams::new(1, 0, destination()).unwrap_err(),
            MessageError::InvalidRoyalty {
                numerator: 1,
                denominator: 0
            }
        );
        assert!(RoyaltyParams::new(1001, 1000, destination()).is_err());
    }

    #[test]
    fn test_royalty_calculate() {
        let royalty = RoyaltyParams::new(350, 1000, destination()).unwrap();
        assert_eq!(royalty.calculate(1_000_000_000), 350_000_000);
        assert_eq!(royalty.calculate(3), 1);
    }

    #[test]
    fn test_offchain_content_layout() {
        let uri = "https://s.getgems.io/nft-staging/c/628f6ab8077060a7a8d52d63/";
        let cell = Content::Offchain(uri.to_string()).to_cell().unwrap();
        assert_eq!(cell.bit_len(), 8);
        assert_eq!(cell.data(), &[OFFCHAIN_CONTENT_PREFIX]);
        assert_eq!(cell.refs().len(), 1);
        assert_eq!(Content::parse(&cell), Some(Content::Offchain(uri.to_string())));
    }

    #[test]
    fn test_text_content() {
        let cell = Content::Text("Spite".to_string()).to_cell().unwrap();
        assert_eq!(Content::parse(&cell), Some(Content::Text("Spite".to_string())));
        assert_eq!(content_tail_bytes(&cell).unwrap(), b"Spite");
    }
}
