// Allow some clippy lints
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::new_without_default)]

pub mod cell;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod nft;
pub mod utils;
