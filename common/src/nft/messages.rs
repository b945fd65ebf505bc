// NFT Contracts - Message Codec
// One variant per message discriminant. Every body starts with a 32-bit
// opcode; text commands use opcode 0 followed by the command string.

use crate::{
    cell::{Cell, CellBuilder, CellSlice},
    crypto::Address,
};

use super::error::MessageError;

// ========================================
// Opcodes
// ========================================

pub const OP_TEXT_COMMAND: u32 = 0x0000_0000;
pub const OP_TRANSFER: u32 = 0x5fcc_3d14;
pub const OP_OWNERSHIP_ASSIGNED: u32 = 0x0513_8d91;
pub const OP_EXCESSES: u32 = 0xd532_76db;
pub const OP_GET_STATIC_DATA: u32 = 0x2fcb_26a2;
pub const OP_REPORT_STATIC_DATA: u32 = 0x8b77_1735;
pub const OP_GET_ROYALTY_PARAMS: u32 = 0x693d_3950;
pub const OP_REPORT_ROYALTY_PARAMS: u32 = 0xa8cb_00ad;
pub const OP_TRANSFER_EDITORSHIP: u32 = 0x1c04_412a;
pub const OP_EDITORSHIP_ASSIGNED: u32 = 0x511a_4463;
pub const OP_UPDATE_NFT_CONTENT: u32 = 0x1a0b_9d51;
pub const OP_BOUNCED: u32 = 0xffff_ffff;

pub const MINT_COMMAND: &str = "Mint";

// ========================================
// Payloads
// ========================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub query_id: u64,
    pub new_owner: Address,
    pub response_destination: Address,
    pub custom_payload: Option<Cell>,
    pub forward_amount: u128,
    pub forward_payload: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferEditorship {
    pub query_id: u64,
    pub new_editor: Address,
    pub response_destination: Address,
    pub forward_amount: u128,
    pub forward_payload: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateNftContent {
    pub query_id: u64,
    pub new_content: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetStaticData {
    pub query_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportStaticData {
    pub query_id: u64,
    pub index: u64,
    pub collection: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetRoyaltyParams {
    pub query_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRoyaltyParams {
    pub query_id: u64,
    pub numerator: u16,
    pub denominator: u16,
    pub destination: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Excesses {
    pub query_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipAssigned {
    pub query_id: u64,
    pub prev_owner: Address,
    pub forward_payload: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorshipAssigned {
    pub query_id: u64,
    pub prev_editor: Address,
    pub forward_payload: Cell,
}

// ========================================
// Message
// ========================================

/// Any message understood or emitted by the NFT contracts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Mint,
    Transfer(Transfer),
    TransferEditorship(TransferEditorship),
    UpdateNftContent(UpdateNftContent),
    GetStaticData(GetStaticData),
    ReportStaticData(ReportStaticData),
    GetRoyaltyParams(GetRoyaltyParams),
    ReportRoyaltyParams(ReportRoyaltyParams),
    Excesses(Excesses),
    OwnershipAssigned(OwnershipAssigned),
    EditorshipAssigned(EditorshipAssigned),
}

impl Message {
    pub fn opcode(&self) -> u32 {
        match self {
            Message::Mint => OP_TEXT_COMMAND,
            Message::Transfer(_) => OP_TRANSFER,
            Message::TransferEditorship(_) => OP_TRANSFER_EDITORSHIP,
            Message::UpdateNftContent(_) => OP_UPDATE_NFT_CONTENT,
            Message::GetStaticData(_) => OP_GET_STATIC_DATA,
            Message::ReportStaticData(_) => OP_REPORT_STATIC_DATA,
            Message::GetRoyaltyParams(_) => OP_GET_ROYALTY_PARAMS,
            Message::ReportRoyaltyParams(_) => OP_REPORT_ROYALTY_PARAMS,
            Message::Excesses(_) => OP_EXCESSES,
            Message::OwnershipAssigned(_) => OP_OWNERSHIP_ASSIGNED,
            Message::EditorshipAssigned(_) => OP_EDITORSHIP_ASSIGNED,
        }
    }

    /// Discriminant name
    pub fn name(&self) -> &'static str {
        match self {
            Message::Mint => "Mint",
            Message::Transfer(_) => "Transfer",
            Message::TransferEditorship(_) => "TransferEditorship",
            Message::UpdateNftContent(_) => "UpdateNftContent",
            Message::GetStaticData(_) => "GetStaticData",
            Message::ReportStaticData(_) => "ReportStaticData",
            Message::GetRoyaltyParams(_) => "GetRoyaltyParams",
            Message::ReportRoyaltyParams(_) => "ReportRoyaltyParams",
            Message::Excesses(_) => "Excesses",
            Message::OwnershipAssigned(_) => "OwnershipAssigned",
            Message::EditorshipAssigned(_) => "EditorshipAssigned",
        }
    }

    /// Serialize into a message body
    pub fn to_cell(&self) -> Result<Cell, MessageError> {
        let mut b = CellBuilder::new();
        b.store_uint(self.opcode() as u128, 32)?;

        match self {
            Message::Mint => {
                b.store_string_tail(MINT_COMMAND)?;
            }
            Message::Transfer(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_address(&m.new_owner)?
                    .store_address(&m.response_destination)?
                    .store_maybe_ref(m.custom_payload.as_ref())?
                    .store_coins(m.forward_amount)?
                    .store_cell_contents(&m.forward_payload)?;
            }
            Message::TransferEditorship(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_address(&m.new_editor)?
                    .store_address(&m.response_destination)?
                    .store_coins(m.forward_amount)?
                    .store_cell_contents(&m.forward_payload)?;
            }
            Message::UpdateNftContent(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_ref(m.new_content.clone())?;
            }
            Message::GetStaticData(m) => {
                b.store_uint(m.query_id as u128, 64)?;
            }
            Message::ReportStaticData(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_uint(m.index as u128, 64)?
                    .store_address(&m.collection)?;
            }
            Message::GetRoyaltyParams(m) => {
                b.store_uint(m.query_id as u128, 64)?;
            }
            Message::ReportRoyaltyParams(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_uint(m.numerator as u128, 16)?
                    .store_uint(m.denominator as u128, 16)?
                    .store_address(&m.destination)?;
            }
            Message::Excesses(m) => {
                b.store_uint(m.query_id as u128, 64)?;
            }
            Message::OwnershipAssigned(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_address(&m.prev_owner)?
                    .store_cell_contents(&m.forward_payload)?;
            }
            Message::EditorshipAssigned(m) => {
                b.store_uint(m.query_id as u128, 64)?
                    .store_address(&m.prev_editor)?
                    .store_cell_contents(&m.forward_payload)?;
            }
        }

        Ok(b.build())
    }

    /// Decode a message body
    pub fn from_cell(cell: &Cell) -> Result<Message, MessageError> {
        let mut s = cell.as_slice();
        if s.remaining_bits() < 32 {
            return Err(MessageError::EmptyBody);
        }

        let op = s.load_u32()?;
        let message = match op {
            OP_TEXT_COMMAND => {
                let text = s.load_string_tail()?;
                if text != MINT_COMMAND {
                    return Err(MessageError::UnknownTextCommand(text));
                }
                Message::Mint
            }
            OP_TRANSFER => Message::Transfer(Transfer {
                query_id: s.load_u64()?,
                new_owner: s.load_address()?,
                response_destination: s.load_address()?,
                custom_payload: s.load_maybe_ref()?,
                forward_amount: s.load_coins()?,
                forward_payload: s.load_remainder()?,
            }),
            OP_TRANSFER_EDITORSHIP => Message::TransferEditorship(TransferEditorship {
                query_id: s.load_u64()?,
                new_editor: s.load_address()?,
                response_destination: s.load_address()?,
                forward_amount: s.load_coins()?,
                forward_payload: s.load_remainder()?,
            }),
            OP_UPDATE_NFT_CONTENT => Message::UpdateNftContent(UpdateNftContent {
                query_id: s.load_u64()?,
                new_content: s.load_ref()?,
            }),
            OP_GET_STATIC_DATA => Message::GetStaticData(GetStaticData {
                query_id: s.load_u64()?,
            }),
            OP_REPORT_STATIC_DATA => Message::ReportStaticData(ReportStaticData {
                query_id: s.load_u64()?,
                index: s.load_u64()?,
                collection: s.load_address()?,
            }),
            OP_GET_ROYALTY_PARAMS => Message::GetRoyaltyParams(GetRoyaltyParams {
                query_id: s.load_u64()?,
            }),
            OP_REPORT_ROYALTY_PARAMS => Message::ReportRoyaltyParams(ReportRoyaltyParams {
                query_id: s.load_u64()?,
                numerator: s.load_uint(16)? as u16,
                denominator: s.load_uint(16)? as u16,
                destination: s.load_address()?,
            }),
            OP_EXCESSES => Message::Excesses(Excesses {
                query_id: s.load_u64()?,
            }),
            OP_OWNERSHIP_ASSIGNED => Message::OwnershipAssigned(OwnershipAssigned {
                query_id: s.load_u64()?,
                prev_owner: s.load_address()?,
                forward_payload: s.load_remainder()?,
            }),
            OP_EDITORSHIP_ASSIGNED => Message::EditorshipAssigned(EditorshipAssigned {
                query_id: s.load_u64()?,
                prev_editor: s.load_address()?,
                forward_payload: s.load_remainder()?,
            }),
            other => return Err(MessageError::UnknownOpcode(other)),
        };

        Ok(message)
    }
}

/// Opcode of a body, if it carries one
pub fn body_opcode(body: &Cell) -> Option<u32> {
    let slice: CellSlice = body.as_slice();
    slice.preload_uint(32).ok().map(|op| op as u32)
}

macro_rules! impl_from_payload {
    ($($payload:ident),* $(,)?) => {
        $(
            impl From<$payload> for Message {
                fn from(payload: $payload) -> Self {
                    Message::$payload(payload)
                }
            }
        )*
    };
}

impl_from_payload!(
    Transfer,
    TransferEditorship,
    UpdateNftContent,
    GetStaticData,
    ReportStaticData,
    GetRoyaltyParams,
    ReportRoyaltyParams,
    Excesses,
    OwnershipAssigned,
    EditorshipAssigned,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cell::CellError, crypto::Hash};

    fn addr(byte: u8) -> Address {
        Address::new(0, Hash::new([byte; 32]))
    }

    #[test]
    fn test_mint_is_a_text_command() {
        let cell = Message::Mint.to_cell().unwrap();
        let mut slice = cell.as_slice();
        assert_eq!(slice.load_u32().unwrap(), OP_TEXT_COMMAND);
        assert_eq!(slice.load_string_tail().unwrap(), "Mint");
        assert_eq!(Message::from_cell(&cell).unwrap(), Message::Mint);
    }

    #[test]
    fn test_transfer_with_inline_forward_payload() {
        let forward_payload = CellBuilder::new().store_uint(0xbeef, 16).unwrap().build();
        let transfer = Transfer {
            query_id: 7,
            new_owner: addr(1),
            response_destination: addr(2),
            custom_payload: Some(Cell::empty()),
            forward_amount: 1_000,
            forward_payload: forward_payload.clone(),
        };
        let cell = Message::from(transfer.clone()).to_cell().unwrap();
        assert_eq!(body_opcode(&cell), Some(OP_TRANSFER));

        match Message::from_cell(&cell).unwrap() {
            Message::Transfer(decoded) => {
                assert_eq!(decoded, transfer);
                assert_eq!(decoded.forward_payload.hash(), forward_payload.hash());
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_empty_forward_payload_adds_no_bits() {
        let transfer = TransferEditorship {
            query_id: 0,
            new_editor: addr(1),
            response_destination: addr(1),
            forward_amount: 0,
            forward_payload: Cell::empty(),
        };
        let cell = Message::from(transfer).to_cell().unwrap();
        // opcode + query_id + 2 addresses + zero coins
        assert_eq!(cell.bit_len(), 32 + 64 + 267 * 2 + 4);
    }

    #[test]
    fn test_unknown_inputs() {
        let unknown = CellBuilder::new().store_uint(0x1234, 32).unwrap().build();
        assert_eq!(
            Message::from_cell(&unknown).unwrap_err(),
            MessageError::UnknownOpcode(0x1234)
        );

        let text = CellBuilder::new()
            .store_uint(0, 32)
            .unwrap()
            .store_string_tail("Burn")
            .unwrap()
            .build();
        assert_eq!(
            Message::from_cell(&text).unwrap_err(),
            MessageError::UnknownTextCommand("Burn".to_string())
        );

        assert_eq!(
            Message::from_cell(&Cell::empty()).unwrap_err(),
            MessageError::EmptyBody
        );
    }

    #[test]
    fn test_truncated_body() {
        let truncated = CellBuilder::new()
            .store_uint(OP_UPDATE_NFT_CONTENT as u128, 32)
            .unwrap()
            .store_uint(0, 64)
            .unwrap()
            .build();
        assert_eq!(
            Message::from_cell(&truncated).unwrap_err(),
            MessageError::Cell(CellError::RefUnderflow)
        );
    }

    #[test]
    fn test_forward_amount_out_of_range_is_not_constructible() {
        let transfer = Transfer {
            query_id: 0,
            new_owner: addr(1),
            response_destination: addr(1),
            custom_payload: None,
            forward_amount: u128::MAX,
            forward_payload: Cell::empty(),
        };
        assert_eq!(
            Message::from(transfer).to_cell().unwrap_err(),
            MessageError::Cell(CellError::CoinsOverflow)
        );
    }
}
