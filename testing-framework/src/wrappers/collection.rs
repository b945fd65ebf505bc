use nft_common::{
    cell::Cell,
    contract::StateInit,
    crypto::Address,
    nft::{
        messages::{GetRoyaltyParams, Message},
        CollectionData, Content, NftCollectionState, RoyaltyParams,
    },
};

use super::{ContractWrapper, SandboxContract};
use crate::sandbox::{GetMethod, GetMethodResult, SandboxError};

/// Messages accepted by the NFT collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionMessage {
    Mint,
    GetRoyaltyParams(GetRoyaltyParams),
}

impl From<CollectionMessage> for Message {
    fn from(message: CollectionMessage) -> Self {
        match message {
            CollectionMessage::Mint => Message::Mint,
            CollectionMessage::GetRoyaltyParams(request) => Message::GetRoyaltyParams(request),
        }
    }
}

/// Handle on an NFT collection contract
#[derive(Debug, Clone)]
pub struct NftCollection {
    address: Address,
    init: Option<StateInit>,
}

impl NftCollection {
    /// Collection deployed by its first message
    pub fn from_init(
        owner: Address,
        content: Content,
        royalty: RoyaltyParams,
        workchain: i8,
    ) -> Result<Self, SandboxError> {
        let state = NftCollectionState::new(owner, content.to_cell()?, royalty);
        let init = state.state_init()?;
        Ok(Self {
            address: init.address(workchain)?,
            init: Some(init),
        })
    }

    /// Already deployed collection
    pub fn from_address(address: Address) -> Self {
        Self { address, init: None }
    }
}

impl ContractWrapper for NftCollection {
    type Message = CollectionMessage;

    fn address(&self) -> &Address {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}

impl SandboxContract<NftCollection> {
    pub async fn get_collection_data(&self) -> Result<CollectionData, SandboxError> {
        match self.get(GetMethod::CollectionData).await? {
            GetMethodResult::CollectionData(data) => Ok(data),
            _ => Err(SandboxError::UnexpectedGetMethodResult {
                method: "get_collection_data",
            }),
        }
    }

    pub async fn get_royalty_params(&self) -> Result<RoyaltyParams, SandboxError> {
        match self.get(GetMethod::RoyaltyParams).await? {
            GetMethodResult::RoyaltyParams(params) => Ok(params),
            _ => Err(SandboxError::UnexpectedGetMethodResult {
                method: "royalty_params",
            }),
        }
    }

    pub async fn get_nft_address_by_index(&self, index: u64) -> Result<Address, SandboxError> {
        match self.get(GetMethod::NftAddressByIndex(index)).await? {
            GetMethodResult::Address(address) => Ok(address),
            _ => Err(SandboxError::UnexpectedGetMethodResult {
                method: "get_nft_address_by_index",
            }),
        }
    }

    pub async fn get_nft_content(&self, index: u64, individual_content: Cell) -> Result<Cell, SandboxError> {
        let method = GetMethod::NftContent {
            index,
            individual_content,
        };
        match self.get(method).await? {
            GetMethodResult::Content(content) => Ok(content),
            _ => Err(SandboxError::UnexpectedGetMethodResult {
                method: "get_nft_content",
            }),
        }
    }
}
