//! Convenient re-exports for sandbox tests
//!
//! ```rust,ignore
//! use nft_testing_framework::prelude::*;
//! ```

pub use std::sync::Arc;

pub use nft_common::{
    cell::{Cell, CellBuilder},
    crypto::Address,
    nft::{
        messages::{GetRoyaltyParams, GetStaticData, Transfer, TransferEditorship, UpdateNftContent},
        Content, RoyaltyParams,
    },
    utils::{from_nano, to_nano},
};

pub use crate::{
    invariants::{InvariantKind, InvariantTracker},
    matchers::{TransactionListExt, TransactionMatcher},
    orchestrator::{Clock, DeterministicTestEnv, PausedClock, SystemClock},
    sandbox::{
        Blockchain, BlockchainBuilder, LedgerSimulator, SandboxConfig, SandboxError, SendMessageResult, Transaction,
        Treasury,
    },
    scenarios::{parse_scenario, ExecutionReport, ScenarioExecutor, TestScenario},
    wrappers::{CollectionMessage, ContractWrapper, ItemMessage, NftCollection, NftItem, SandboxContract},
};
