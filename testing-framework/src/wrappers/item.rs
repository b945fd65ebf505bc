use nft_common::{
    contract::StateInit,
    crypto::Address,
    nft::{
        item_state_init,
        messages::{GetStaticData, Message, Transfer, TransferEditorship, UpdateNftContent},
        NftData,
    },
};

use super::{ContractWrapper, SandboxContract};
use crate::sandbox::{GetMethod, GetMethodResult, SandboxError};

/// Messages accepted by an NFT item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMessage {
    Transfer(Transfer),
    TransferEditorship(TransferEditorship),
    UpdateNftContent(UpdateNftContent),
    GetStaticData(GetStaticData),
}

impl From<ItemMessage> for Message {
    fn from(message: ItemMessage) -> Self {
        match message {
            ItemMessage::Transfer(msg) => Message::Transfer(msg),
            ItemMessage::TransferEditorship(msg) => Message::TransferEditorship(msg),
            ItemMessage::UpdateNftContent(msg) => Message::UpdateNftContent(msg),
            ItemMessage::GetStaticData(msg) => Message::GetStaticData(msg),
        }
    }
}

/// Handle on an NFT item contract
#[derive(Debug, Clone)]
pub struct NftItem {
    address: Address,
    init: Option<StateInit>,
}

impl NftItem {
    /// Item `index` of `collection`, at the address the collection mints it to
    pub fn from_init(collection: &Address, index: u64) -> Result<Self, SandboxError> {
        let init = item_state_init(collection, index)?;
        Ok(Self {
            address: init.address(collection.workchain())?,
            init: Some(init),
        })
    }

    /// Item at a known address, for example one read from a transaction
    pub fn from_address(address: Address) -> Self {
        Self { address, init: None }
    }
}

impl ContractWrapper for NftItem {
    type Message = ItemMessage;

    fn address(&self) -> &Address {
        &self.address
    }

    fn init(&self) -> Option<&StateInit> {
        self.init.as_ref()
    }
}

impl SandboxContract<NftItem> {
    pub async fn get_nft_data(&self) -> Result<NftData, SandboxError> {
        match self.get(GetMethod::NftData).await? {
            GetMethodResult::NftData(data) => Ok(data),
            _ => Err(SandboxError::UnexpectedGetMethodResult { method: "get_nft_data" }),
        }
    }
}
