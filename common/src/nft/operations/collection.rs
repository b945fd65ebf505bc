// NFT Collection Operations
// Mint handler, royalty query and read-only getters of the collection.

use log::{debug, trace};

use crate::{
    cell::{Cell, CellBuilder, CellError},
    config::{COLLECTION_METADATA_SUFFIX, NFT_COLLECTION_CODE},
    contract::{code_cell, ContractLogic, ExitCode, OutMessage, RuntimeContext, SendMode, StateInit},
    crypto::Address,
    nft::{
        messages::{GetRoyaltyParams, Message, ReportRoyaltyParams, Transfer},
        CollectionData, NftError, RoyaltyParams,
    },
};

use super::{available_message_value, content_with_suffix, item_state_init};

// ========================================
// Collection State
// ========================================

/// Persistent state of an NFT collection contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftCollectionState {
    /// Index the next minted item receives
    pub next_item_index: u64,
    pub owner_address: Address,
    pub collection_content: Cell,
    pub royalty_params: RoyaltyParams,
}

impl NftCollectionState {
    pub fn new(owner_address: Address, collection_content: Cell, royalty_params: RoyaltyParams) -> Self {
        Self {
            next_item_index: 0,
            owner_address,
            collection_content,
            royalty_params,
        }
    }

    /// Code and initial data the collection deploys with
    pub fn state_init(&self) -> Result<StateInit, CellError> {
        let data = CellBuilder::new()
            .store_address(&self.owner_address)?
            .store_ref(self.collection_content.clone())?
            .store_ref(self.royalty_params.to_cell()?)?
            .build();
        Ok(StateInit::new(code_cell(NFT_COLLECTION_CODE)?, data))
    }

    // ========================================
    // Handlers
    // ========================================

    /// Mint the item at `next_item_index` for the sender
    ///
    /// The item is deployed by the outgoing `Transfer`, which carries the
    /// item `StateInit` and the collection content as its initial content.
    pub fn mint(&mut self, ctx: &RuntimeContext) -> Result<Vec<OutMessage>, ExitCode> {
        let value = available_message_value(ctx).ok_or(NftError::InsufficientMintValue)?;

        let index = self.next_item_index;
        let next = index.checked_add(1).ok_or(NftError::IndexOverflow)?;

        let init = item_state_init(&ctx.my_address, index)?;
        let item_address = init.address(ctx.my_address.workchain())?;

        let transfer = Message::from(Transfer {
            query_id: 0,
            new_owner: ctx.sender.clone(),
            response_destination: self.owner_address.clone(),
            custom_payload: Some(self.collection_content.clone()),
            forward_amount: 0,
            forward_payload: Cell::empty(),
        });
        let body = transfer.to_cell()?;

        debug!("Minting item {} at {} for {}", index, item_address, ctx.sender);
        self.next_item_index = next;

        Ok(vec![OutMessage::new(item_address, value, body)
            .with_mode(SendMode::IGNORE_ERRORS)
            .with_bounce(false)
            .with_state_init(init)])
    }

    /// Reply with the royalty parameters, carrying the remaining value
    pub fn report_royalty_params(
        &self,
        ctx: &RuntimeContext,
        request: &GetRoyaltyParams,
    ) -> Result<Vec<OutMessage>, ExitCode> {
        let body = Message::from(ReportRoyaltyParams {
            query_id: request.query_id,
            numerator: self.royalty_params.numerator,
            denominator: self.royalty_params.denominator,
            destination: self.royalty_params.destination.clone(),
        })
        .to_cell()?;

        Ok(vec![OutMessage::new(ctx.sender.clone(), 0, body)
            .with_mode(SendMode::CARRY_REMAINING_VALUE)])
    }

    // ========================================
    // Getters
    // ========================================

    /// `get_collection_data`, with the metadata file name appended to the content
    pub fn get_collection_data(&self) -> Result<CollectionData, CellError> {
        Ok(CollectionData {
            next_item_index: self.next_item_index,
            collection_content: content_with_suffix(
                &self.collection_content,
                &[COLLECTION_METADATA_SUFFIX],
            )?,
            owner_address: self.owner_address.clone(),
        })
    }

    pub fn royalty_params(&self) -> RoyaltyParams {
        self.royalty_params.clone()
    }

    /// Address the item with `index` deploys to
    pub fn get_nft_address_by_index(&self, my_address: &Address, index: u64) -> Result<Address, CellError> {
        item_state_init(my_address, index)?.address(my_address.workchain())
    }

    /// Full content of an item from its individual content
    pub fn get_nft_content(&self, _index: u64, individual_content: &Cell) -> Result<Cell, CellError> {
        content_with_suffix(individual_content, &[])
    }
}

impl ContractLogic for NftCollectionState {
    fn receive(&mut self, ctx: &RuntimeContext, body: &Cell) -> Result<Vec<OutMessage>, ExitCode> {
        if ctx.bounced {
            trace!("Collection ignores bounced message from {}", ctx.sender);
            return Ok(Vec::new());
        }

        match Message::from_cell(body)? {
            Message::Mint => self.mint(ctx),
            Message::GetRoyaltyParams(request) => self.report_royalty_params(ctx, &request),
            other => {
                debug!("Collection rejects {} from {}", other.name(), ctx.sender);
                Err(ExitCode::INVALID_INCOMING_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::*;
    use super::*;
    use crate::{
        config::{COIN_VALUE, GAS_CONSUMPTION, MIN_TONS_FOR_STORAGE, NFT_ITEM_CODE},
        nft::{messages::OP_TRANSFER, Content},
    };

    fn collection() -> NftCollectionState {
        let content = Content::Offchain("https://example.com/c/".to_string())
            .to_cell()
            .unwrap();
        let royalty = RoyaltyParams::new(350, 1000, addr(1)).unwrap();
        NftCollectionState::new(addr(1), content, royalty)
    }

    #[test]
    fn test_mint_sends_deploying_transfer() {
        let mut state = collection();
        let me = addr(9);
        let ctx = ctx(addr(5), me.clone(), COIN_VALUE, 0);
        let body = Message::Mint.to_cell().unwrap();

        let out = state.receive(&ctx, &body).unwrap();
        assert_eq!(state.next_item_index, 1);
        assert_eq!(out.len(), 1);

        let msg = &out[0];
        assert_eq!(msg.to, state.get_nft_address_by_index(&me, 0).unwrap());
        assert_eq!(msg.value, COIN_VALUE - MIN_TONS_FOR_STORAGE - GAS_CONSUMPTION);
        assert_eq!(msg.mode, SendMode::IGNORE_ERRORS);
        assert!(!msg.bounce);

        let init = msg.state_init.as_ref().unwrap();
        assert_eq!(init.code, code_cell(NFT_ITEM_CODE).unwrap());

        match Message::from_cell(&msg.body).unwrap() {
            Message::Transfer(transfer) => {
                assert_eq!(transfer.new_owner, addr(5));
                assert_eq!(transfer.response_destination, addr(1));
                assert_eq!(transfer.custom_payload, Some(state.collection_content.clone()));
                assert_eq!(transfer.forward_amount, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(crate::nft::messages::body_opcode(&msg.body), Some(OP_TRANSFER));
    }

    #[test]
    fn test_mint_below_reserve_keeps_index() {
        let mut state = collection();
        let ctx = ctx(addr(5), addr(9), GAS_CONSUMPTION, 0);
        let err = state.receive(&ctx, &Message::Mint.to_cell().unwrap()).unwrap_err();
        assert_eq!(err, ExitCode::from(NftError::InsufficientMintValue));
        assert_eq!(state.next_item_index, 0);
    }

    #[test]
    fn test_item_addresses_are_distinct() {
        let state = collection();
        let me = addr(9);
        let first = state.get_nft_address_by_index(&me, 0).unwrap();
        let second = state.get_nft_address_by_index(&me, 1).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, state.get_nft_address_by_index(&me, 0).unwrap());
    }

    #[test]
    fn test_collection_data_appends_metadata_name() {
        let state = collection();
        let data = state.get_collection_data().unwrap();
        let mut expected = vec![0x01];
        expected.extend_from_slice(b"https://example.com/c/meta.json");
        assert_eq!(
            data.collection_content.as_slice().load_bytes_tail().unwrap(),
            expected
        );
    }

    #[test]
    fn test_royalty_report_carries_remaining_value() {
        let mut state = collection();
        let request = Message::from(GetRoyaltyParams { query_id: 42 }).to_cell().unwrap();
        let out = state
            .receive(&ctx(addr(5), addr(9), COIN_VALUE / 10, COIN_VALUE), &request)
            .unwrap();
        assert_eq!(out[0].to, addr(5));
        assert_eq!(out[0].mode, SendMode::CARRY_REMAINING_VALUE);
        match Message::from_cell(&out[0].body).unwrap() {
            Message::ReportRoyaltyParams(report) => {
                assert_eq!(report.query_id, 42);
                assert_eq!(report.numerator, 350);
                assert_eq!(report.denominator, 1000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_bounced_messages() {
        let mut state = collection();
        let unknown = CellBuilder::new().store_uint(0xdead, 32).unwrap().build();
        assert_eq!(
            state.receive(&ctx(addr(5), addr(9), COIN_VALUE, 0), &unknown).unwrap_err(),
            ExitCode::INVALID_INCOMING_MESSAGE
        );

        let mut bounced = ctx(addr(5), addr(9), COIN_VALUE, 0);
        bounced.bounced = true;
        assert!(state.receive(&bounced, &unknown).unwrap().is_empty());
        assert_eq!(state.next_item_index, 0);
    }
}
