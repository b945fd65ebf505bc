// File: testing-framework/src/sandbox/account.rs
//
// Accounts held by the ledger and the contract code they run

use nft_common::{
    cell::{Cell, CellError},
    config::{NFT_COLLECTION_CODE, NFT_ITEM_CODE, TREASURY_WALLET_CODE},
    contract::{code_cell, ContractLogic, ExitCode, OutMessage, RuntimeContext, StateInit, TreasuryWallet},
    crypto::Address,
    nft::{CollectionData, NftCollectionState, NftData, NftItemState, RoyaltyParams},
};

/// Contract code an active account runs, together with its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountCode {
    Wallet(TreasuryWallet),
    Collection(NftCollectionState),
    Item(NftItemState),
}

impl AccountCode {
    /// Decode the code and initial data of a deploying message
    ///
    /// Returns `None` for code this ledger cannot run.
    pub fn from_state_init(init: &StateInit) -> Result<Option<AccountCode>, CellError> {
        let code = &init.code;
        let mut data = init.data.as_slice();

        if *code == code_cell(NFT_COLLECTION_CODE)? {
            let owner = data.load_address()?;
            let content = data.load_ref()?;
            let mut royalty = data.load_ref()?.as_slice();
            let numerator = royalty.load_uint(16)? as u16;
            let denominator = royalty.load_uint(16)? as u16;
            let destination = royalty.load_address()?;
            // Construction already validated the fraction
            let royalty = RoyaltyParams {
                numerator,
                denominator,
                destination,
            };
            return Ok(Some(AccountCode::Collection(NftCollectionState::new(
                owner, content, royalty,
            ))));
        }

        if *code == code_cell(NFT_ITEM_CODE)? {
            let collection = data.load_address()?;
            let index = data.load_u64()?;
            return Ok(Some(AccountCode::Item(NftItemState::new(collection, index))));
        }

        if *code == code_cell(TREASURY_WALLET_CODE)? {
            let label = data.load_string_tail()?;
            return Ok(Some(AccountCode::Wallet(TreasuryWallet::new(label))));
        }

        Ok(None)
    }

    /// Short name of the contract kind
    pub fn kind(&self) -> &'static str {
        match self {
            AccountCode::Wallet(_) => "wallet",
            AccountCode::Collection(_) => "nft-collection",
            AccountCode::Item(_) => "nft-item",
        }
    }

    /// Run the inbound message handler
    pub fn receive(&mut self, ctx: &RuntimeContext, body: &Cell) -> Result<Vec<OutMessage>, ExitCode> {
        match self {
            AccountCode::Wallet(wallet) => wallet.receive(ctx, body),
            AccountCode::Collection(collection) => collection.receive(ctx, body),
            AccountCode::Item(item) => item.receive(ctx, body),
        }
    }

    /// Run a read-only getter
    ///
    /// Getters a contract does not implement fail with exit code 11.
    pub fn run_get_method(&self, my_address: &Address, method: &GetMethod) -> Result<GetMethodResult, ExitCode> {
        let result = match (self, method) {
            (AccountCode::Collection(collection), GetMethod::CollectionData) => {
                GetMethodResult::CollectionData(collection.get_collection_data()?)
            }
            (AccountCode::Collection(collection), GetMethod::RoyaltyParams) => {
                GetMethodResult::RoyaltyParams(collection.royalty_params())
            }
            (AccountCode::Collection(collection), GetMethod::NftAddressByIndex(index)) => {
                GetMethodResult::Address(collection.get_nft_address_by_index(my_address, *index)?)
            }
            (
                AccountCode::Collection(collection),
                GetMethod::NftContent {
                    index,
                    individual_content,
                },
            ) => GetMethodResult::Content(collection.get_nft_content(*index, individual_content)?),
            (AccountCode::Item(item), GetMethod::NftData) => GetMethodResult::NftData(item.get_nft_data()?),
            _ => return Err(ExitCode::METHOD_NOT_FOUND),
        };
        Ok(result)
    }
}

/// Account state kept by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub balance: u128,
    /// `None` while the account is uninitialized
    pub code: Option<AccountCode>,
    /// Logical time of the last transaction on this account
    pub last_lt: u64,
}

impl Account {
    pub fn uninit(address: Address) -> Self {
        Self {
            address,
            balance: 0,
            code: None,
            last_lt: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.code.is_some()
    }
}

/// Read-only getters understood by the NFT contracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetMethod {
    CollectionData,
    RoyaltyParams,
    NftAddressByIndex(u64),
    NftContent { index: u64, individual_content: Cell },
    NftData,
}

impl GetMethod {
    pub fn name(&self) -> &'static str {
        match self {
            GetMethod::CollectionData => "get_collection_data",
            GetMethod::RoyaltyParams => "royalty_params",
            GetMethod::NftAddressByIndex(_) => "get_nft_address_by_index",
            GetMethod::NftContent { .. } => "get_nft_content",
            GetMethod::NftData => "get_nft_data",
        }
    }
}

/// Typed getter output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetMethodResult {
    CollectionData(CollectionData),
    RoyaltyParams(RoyaltyParams),
    Address(Address),
    Content(Cell),
    NftData(NftData),
}
