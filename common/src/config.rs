use crate::crypto::BASECHAIN;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Coins are expressed in nano units
pub const COIN_DECIMALS: u8 = 9;
// 1 coin = 10^9 nano
pub const COIN_VALUE: u128 = 10u128.pow(COIN_DECIMALS as u32);

// Workchain used for every derived address unless configured otherwise
pub const DEFAULT_WORKCHAIN: i8 = BASECHAIN;

// Balance a contract keeps back for storage before forwarding any value.
// A message arriving at an account below this reserve pays the difference.
pub const MIN_TONS_FOR_STORAGE: u128 = COIN_VALUE * 3 / 100; // 0.03
// Value kept back by each handler to cover its own execution
pub const GAS_CONSUMPTION: u128 = COIN_VALUE * 3 / 100; // 0.03

// Content layout prefixes (TEP-64)
pub const ONCHAIN_CONTENT_PREFIX: u8 = 0x00;
pub const OFFCHAIN_CONTENT_PREFIX: u8 = 0x01;

// Suffixes appended to content string tails by the getters
pub const COLLECTION_METADATA_SUFFIX: &str = "meta.json";
pub const ITEM_METADATA_SUFFIX: &str = ".json";

// Code identifiers. Each one is the code cell of a contract kind and
// therefore part of every address derived for that kind.
pub const NFT_COLLECTION_CODE: &str = "nft-collection:v1";
pub const NFT_ITEM_CODE: &str = "nft-item:v1";
pub const TREASURY_WALLET_CODE: &str = "treasury-wallet:v1";
