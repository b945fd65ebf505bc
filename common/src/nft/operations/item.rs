// NFT Item Operations
// Ownership, editorship and content handlers of a single item, plus the
// get_nft_data getter.

use log::{debug, trace};

use crate::{
    cell::{Cell, CellBuilder, CellError},
    config::{ITEM_METADATA_SUFFIX, NFT_ITEM_CODE},
    contract::{code_cell, ContractLogic, ExitCode, OutMessage, RuntimeContext, SendMode, StateInit},
    crypto::Address,
    nft::{
        messages::{
            EditorshipAssigned, Excesses, GetStaticData, Message, OwnershipAssigned,
            ReportStaticData, Transfer, TransferEditorship, UpdateNftContent,
        },
        NftData, NftError,
    },
};

use super::{available_message_value, content_with_suffix};

/// Code and initial data of the item with `index` in `collection`
pub fn item_state_init(collection: &Address, index: u64) -> Result<StateInit, CellError> {
    let data = CellBuilder::new()
        .store_address(collection)?
        .store_uint(index as u128, 64)?
        .build();
    Ok(StateInit::new(code_cell(NFT_ITEM_CODE)?, data))
}

// ========================================
// Item State
// ========================================

/// Persistent state of an NFT item contract
///
/// Deployed uninitialized; the first `Transfer` from the collection sets
/// owner, editor and content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftItemState {
    pub collection_address: Address,
    pub item_index: u64,
    pub is_initialized: bool,
    pub owner: Option<Address>,
    pub editor: Option<Address>,
    pub individual_content: Cell,
}

impl NftItemState {
    pub fn new(collection_address: Address, item_index: u64) -> Self {
        Self {
            collection_address,
            item_index,
            is_initialized: false,
            owner: None,
            editor: None,
            individual_content: Cell::empty(),
        }
    }

    pub fn state_init(&self) -> Result<StateInit, CellError> {
        item_state_init(&self.collection_address, self.item_index)
    }

    // ========================================
    // Handlers
    // ========================================

    pub fn transfer(&mut self, ctx: &RuntimeContext, msg: Transfer) -> Result<Vec<OutMessage>, ExitCode> {
        if !self.is_initialized {
            if ctx.sender != self.collection_address {
                return Err(NftError::NotFromCollection.into());
            }
            let content = msg.custom_payload.ok_or(NftError::MissingContent)?;
            let value = available_message_value(ctx).ok_or(NftError::InsufficientValue)?;

            self.is_initialized = true;
            self.owner = Some(msg.new_owner.clone());
            self.editor = Some(msg.new_owner.clone());
            self.individual_content = content;
            debug!("Item {} initialized for {}", self.item_index, msg.new_owner);

            let excesses = Message::from(Excesses { query_id: msg.query_id }).to_cell()?;
            return Ok(vec![OutMessage::new(msg.response_destination, value, excesses)
                .with_mode(SendMode::PAY_FEES_SEPARATELY)]);
        }

        if self.owner.as_ref() != Some(&ctx.sender) {
            return Err(NftError::NotOwner.into());
        }

        // authorization is checked before any value arithmetic
        let remaining = available_message_value(ctx)
            .and_then(|v| v.checked_sub(ctx.forward_fee))
            .and_then(|v| v.checked_sub(msg.forward_amount))
            .ok_or(NftError::InsufficientValue)?;

        self.owner = Some(msg.new_owner.clone());
        debug!("Item {} transferred from {} to {}", self.item_index, ctx.sender, msg.new_owner);

        let mut out = Vec::new();
        if msg.forward_amount > 0 {
            let body = Message::from(OwnershipAssigned {
                query_id: msg.query_id,
                prev_owner: ctx.sender.clone(),
                forward_payload: msg.forward_payload,
            })
            .to_cell()?;
            out.push(
                OutMessage::new(msg.new_owner, msg.forward_amount, body)
                    .with_mode(SendMode::IGNORE_ERRORS)
                    .with_bounce(false),
            );
        }
        if remaining > 0 {
            let body = Message::from(Excesses { query_id: msg.query_id }).to_cell()?;
            out.push(
                OutMessage::new(msg.response_destination, remaining, body)
                    .with_mode(SendMode::PAY_FEES_SEPARATELY),
            );
        }
        Ok(out)
    }

    pub fn transfer_editorship(
        &mut self,
        ctx: &RuntimeContext,
        msg: TransferEditorship,
    ) -> Result<Vec<OutMessage>, ExitCode> {
        if !self.is_initialized {
            return Err(NftError::NotInitialized.into());
        }
        if self.editor.as_ref() != Some(&ctx.sender) {
            return Err(NftError::NotEditor.into());
        }

        let remaining = available_message_value(ctx)
            .and_then(|v| v.checked_sub(ctx.forward_fee))
            .and_then(|v| v.checked_sub(msg.forward_amount))
            .ok_or(NftError::InsufficientValue)?;

        self.editor = Some(msg.new_editor.clone());
        debug!("Item {} editorship passed to {}", self.item_index, msg.new_editor);

        let mut out = Vec::new();
        if msg.forward_amount > 0 {
            let body = Message::from(EditorshipAssigned {
                query_id: msg.query_id,
                prev_editor: ctx.sender.clone(),
                forward_payload: msg.forward_payload,
            })
            .to_cell()?;
            out.push(
                OutMessage::new(msg.new_editor, msg.forward_amount, body)
                    .with_mode(SendMode::IGNORE_ERRORS)
                    .with_bounce(false),
            );
        }
        if remaining > 0 {
            let body = Message::from(Excesses { query_id: msg.query_id }).to_cell()?;
            out.push(
                OutMessage::new(msg.response_destination, remaining, body)
                    .with_mode(SendMode::PAY_FEES_SEPARATELY),
            );
        }
        Ok(out)
    }

    pub fn update_content(&mut self, ctx: &RuntimeContext, msg: UpdateNftContent) -> Result<Vec<OutMessage>, ExitCode> {
        if !self.is_initialized {
            return Err(NftError::NotInitialized.into());
        }
        if self.editor.as_ref() != Some(&ctx.sender) {
            return Err(NftError::NotEditor.into());
        }

        self.individual_content = msg.new_content;
        debug!("Item {} content updated by {}", self.item_index, ctx.sender);
        Ok(Vec::new())
    }

    pub fn report_static_data(
        &self,
        ctx: &RuntimeContext,
        request: GetStaticData,
    ) -> Result<Vec<OutMessage>, ExitCode> {
        let body = Message::from(ReportStaticData {
            query_id: request.query_id,
            index: self.item_index,
            collection: self.collection_address.clone(),
        })
        .to_cell()?;

        Ok(vec![OutMessage::new(ctx.sender.clone(), 0, body)
            .with_mode(SendMode::CARRY_REMAINING_VALUE)])
    }

    // ========================================
    // Getters
    // ========================================

    /// `get_nft_data`
    ///
    /// The reported content is the individual content followed by the
    /// decimal index and the metadata extension, as one string tail.
    pub fn get_nft_data(&self) -> Result<NftData, CellError> {
        let index = self.item_index.to_string();
        Ok(NftData {
            is_initialized: self.is_initialized,
            index: self.item_index,
            collection_address: self.collection_address.clone(),
            owner: self.owner.clone(),
            editor: self.editor.clone(),
            individual_content: content_with_suffix(
                &self.individual_content,
                &[&index, ITEM_METADATA_SUFFIX],
            )?,
        })
    }
}

impl ContractLogic for NftItemState {
    fn receive(&mut self, ctx: &RuntimeContext, body: &Cell) -> Result<Vec<OutMessage>, ExitCode> {
        if ctx.bounced {
            trace!("Item {} ignores bounced message from {}", self.item_index, ctx.sender);
            return Ok(Vec::new());
        }

        match Message::from_cell(body)? {
            Message::Transfer(msg) => self.transfer(ctx, msg),
            Message::TransferEditorship(msg) => self.transfer_editorship(ctx, msg),
            Message::UpdateNftContent(msg) => self.update_content(ctx, msg),
            Message::GetStaticData(msg) => self.report_static_data(ctx, msg),
            other => {
                debug!("Item {} rejects {} from {}", self.item_index, other.name(), ctx.sender);
                Err(ExitCode::INVALID_INCOMING_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::*;
    use super::*;
    use crate::config::{COIN_VALUE, GAS_CONSUMPTION};

    const COLLECTION: u8 = 10;
    const OWNER: u8 = 11;
    const USER: u8 = 12;

    fn initialized_item() -> NftItemState {
        let mut item = NftItemState::new(addr(COLLECTION), 2);
        let init = Transfer {
            query_id: 0,
            new_owner: addr(OWNER),
            response_destination: addr(OWNER),
            custom_payload: Some(CellBuilder::new().store_string_tail("Spite").unwrap().build()),
            forward_amount: 0,
            forward_payload: Cell::empty(),
        };
        let body = Message::from(init).to_cell().unwrap();
        item.receive(&ctx(addr(COLLECTION), addr(20), COIN_VALUE, 0), &body)
            .unwrap();
        item
    }

    fn transfer_to(new_owner: Address, forward_amount: u128) -> Cell {
        Message::from(Transfer {
            query_id: 1,
            new_owner: new_owner.clone(),
            response_destination: new_owner,
            custom_payload: None,
            forward_amount,
            forward_payload: Cell::empty(),
        })
        .to_cell()
        .unwrap()
    }

    #[test]
    fn test_initialization_only_from_collection() {
        let mut item = NftItemState::new(addr(COLLECTION), 0);
        let body = transfer_to(addr(USER), 0);
        let err = item
            .receive(&ctx(addr(USER), addr(20), COIN_VALUE, 0), &body)
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::NotFromCollection));
        assert!(!item.is_initialized);
    }

    #[test]
    fn test_initialization_requires_content() {
        let mut item = NftItemState::new(addr(COLLECTION), 0);
        let body = transfer_to(addr(USER), 0);
        let err = item
            .receive(&ctx(addr(COLLECTION), addr(20), COIN_VALUE, 0), &body)
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::MissingContent));
    }

    #[test]
    fn test_initialization_sets_owner_and_editor() {
        let item = initialized_item();
        assert!(item.is_initialized);
        assert_eq!(item.owner, Some(addr(OWNER)));
        assert_eq!(item.editor, Some(addr(OWNER)));
    }

    #[test]
    fn test_owner_transfer_sends_excesses() {
        let mut item = initialized_item();
        let out = item
            .receive(&ctx(addr(OWNER), addr(20), COIN_VALUE / 5, COIN_VALUE), &transfer_to(addr(USER), 0))
            .unwrap();
        assert_eq!(item.owner, Some(addr(USER)));
        assert_eq!(item.editor, Some(addr(OWNER)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, addr(USER));
        assert_eq!(out[0].value, COIN_VALUE / 5 - GAS_CONSUMPTION - 1_000_000);
        assert_eq!(out[0].mode, SendMode::PAY_FEES_SEPARATELY);
    }

    #[test]
    fn test_low_value_transfer_from_stranger_is_not_owner() {
        let mut item = initialized_item();
        let err = item
            .receive(&ctx(addr(USER), addr(20), 1_000, COIN_VALUE), &transfer_to(addr(USER), 0))
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::NotOwner));
        assert_eq!(item.owner, Some(addr(OWNER)));
    }

    #[test]
    fn test_low_value_transfer_from_owner_is_insufficient() {
        let mut item = initialized_item();
        let err = item
            .receive(&ctx(addr(OWNER), addr(20), 1_000, COIN_VALUE), &transfer_to(addr(USER), 0))
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::InsufficientValue));
        assert_eq!(item.owner, Some(addr(OWNER)));
    }

    #[test]
    fn test_forward_amount_notifies_new_owner() {
        let mut item = initialized_item();
        let out = item
            .receive(&ctx(addr(OWNER), addr(20), COIN_VALUE, COIN_VALUE), &transfer_to(addr(USER), 1_000))
            .unwrap();
        assert_eq!(out.len(), 2);
        match Message::from_cell(&out[0].body).unwrap() {
            Message::OwnershipAssigned(assigned) => assert_eq!(assigned.prev_owner, addr(OWNER)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(out[0].value, 1_000);
    }

    #[test]
    fn test_transfer_by_stranger_fails() {
        let mut item = initialized_item();
        let err = item
            .receive(&ctx(addr(USER), addr(20), COIN_VALUE, COIN_VALUE), &transfer_to(addr(USER), 0))
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::NotOwner));
        assert_eq!(item.owner, Some(addr(OWNER)));
    }

    #[test]
    fn test_editorship_and_content_update() {
        let mut item = initialized_item();
        let body = Message::from(TransferEditorship {
            query_id: 0,
            new_editor: addr(USER),
            response_destination: addr(USER),
            forward_amount: 0,
            forward_payload: Cell::empty(),
        })
        .to_cell()
        .unwrap();
        item.receive(&ctx(addr(OWNER), addr(20), COIN_VALUE / 5, COIN_VALUE), &body)
            .unwrap();
        assert_eq!(item.editor, Some(addr(USER)));
        assert_eq!(item.owner, Some(addr(OWNER)));

        let update = Message::from(UpdateNftContent {
            query_id: 0,
            new_content: CellBuilder::new().store_string_tail("Other").unwrap().build(),
        })
        .to_cell()
        .unwrap();
        let err = item
            .receive(&ctx(addr(OWNER), addr(20), COIN_VALUE / 5, COIN_VALUE), &update)
            .unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::NotEditor));

        item.receive(&ctx(addr(USER), addr(20), COIN_VALUE / 5, COIN_VALUE), &update)
            .unwrap();
        let expected = CellBuilder::new().store_string_tail("Other2.json").unwrap().build();
        assert_eq!(item.get_nft_data().unwrap().individual_content, expected);
    }

    #[test]
    fn test_nft_data_content_suffix() {
        let data = initialized_item().get_nft_data().unwrap();
        assert_eq!(data.index, 2);
        assert_eq!(
            data.individual_content.as_slice().load_string_tail().unwrap(),
            "Spite2.json"
        );
    }

    #[test]
    fn test_static_data_report() {
        let mut item = initialized_item();
        let body = Message::from(GetStaticData { query_id: 3 }).to_cell().unwrap();
        let out = item
            .receive(&ctx(addr(USER), addr(20), COIN_VALUE / 10, COIN_VALUE), &body)
            .unwrap();
        assert_eq!(out[0].mode, SendMode::CARRY_REMAINING_VALUE);
        match Message::from_cell(&out[0].body).unwrap() {
            Message::ReportStaticData(report) => {
                assert_eq!(report.index, 2);
                assert_eq!(report.collection, addr(COLLECTION));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_mint_command_is_rejected() {
        let mut item = initialized_item();
        let err = item
            .receive(&ctx(addr(OWNER), addr(20), COIN_VALUE, COIN_VALUE), &Message::Mint.to_cell().unwrap())
            .unwrap_err();
        assert_eq!(err, ExitCode::INVALID_INCOMING_MESSAGE);
    }
}
