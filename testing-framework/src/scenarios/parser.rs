//! YAML scenario format
//!
//! Scenarios are parsed into [`TestScenario`] and validated before anything
//! runs: every participant a step names must be a declared treasury,
//! `collection`, or `item:<index>`.

use std::{collections::HashSet, fmt, str::FromStr};

use anyhow::{bail, ensure, Context, Result};
use nft_common::{
    cell::{Cell, CellBuilder, CellError},
    nft::{messages, Content},
};
use serde::Deserialize;

use crate::{invariants::InvariantKind, sandbox::SandboxConfig, utilities::coins};

/// Complete scenario file
#[derive(Debug, Clone, Deserialize)]
pub struct TestScenario {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Ledger configuration, defaults when absent
    #[serde(default)]
    pub config: Option<SandboxConfig>,

    pub genesis: Genesis,

    pub steps: Vec<Step>,

    #[serde(default)]
    pub invariants: Option<Vec<String>>,
}

/// Accounts and contracts that exist before the first step
#[derive(Debug, Clone, Deserialize)]
pub struct Genesis {
    pub treasuries: Vec<GenesisTreasury>,

    #[serde(default)]
    pub collection: Option<CollectionGenesis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenesisTreasury {
    pub name: String,
}

/// Parameters of the collection; it deploys with the first message sent to it
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionGenesis {
    /// Treasury name
    pub owner: String,
    pub content: ContentSpec,
    pub royalty: RoyaltySpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoyaltySpec {
    pub numerator: u16,
    pub denominator: u16,
    /// Treasury name
    pub destination: String,
}

/// Content cell layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSpec {
    Offchain { uri: String },
    Text { value: String },
}

impl ContentSpec {
    pub fn to_content(&self) -> Content {
        match self {
            ContentSpec::Offchain { uri } => Content::Offchain(uri.clone()),
            ContentSpec::Text { value } => Content::Text(value.clone()),
        }
    }
}

/// Scenario step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Send {
        /// Treasury name
        from: String,
        /// `collection` or `item:<index>`
        to: String,
        #[serde(with = "coins")]
        value: u128,
        message: MessageSpec,
        #[serde(default)]
        expect: Vec<ExpectedTransaction>,
    },
    AssertCollectionData {
        #[serde(default)]
        next_item_index: Option<u64>,
        #[serde(default)]
        owner: Option<String>,
        /// Expected content string tail, suffix included
        #[serde(default)]
        content: Option<String>,
    },
    AssertNftData {
        item: u64,
        #[serde(default)]
        initialized: Option<bool>,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        editor: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
    AssertRoyaltyParams {
        #[serde(default)]
        numerator: Option<u16>,
        #[serde(default)]
        denominator: Option<u16>,
        #[serde(default)]
        destination: Option<String>,
    },
    AssertBalance {
        account: String,
        #[serde(flatten)]
        expect: BalanceExpect,
    },
    AdvanceTime {
        seconds: u64,
    },
}

/// Message body of a `send` step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageSpec {
    Mint,
    GetRoyaltyParams {
        #[serde(default)]
        query_id: u64,
    },
    Transfer {
        #[serde(default)]
        query_id: u64,
        new_owner: String,
        response_destination: String,
        #[serde(default)]
        custom_payload: Option<ContentSpec>,
        #[serde(default, with = "coins")]
        forward_amount: u128,
        #[serde(default)]
        forward_payload: Option<String>,
    },
    TransferEditorship {
        #[serde(default)]
        query_id: u64,
        new_editor: String,
        response_destination: String,
        #[serde(default, with = "coins")]
        forward_amount: u128,
        #[serde(default)]
        forward_payload: Option<String>,
    },
    UpdateNftContent {
        #[serde(default)]
        query_id: u64,
        content: ContentSpec,
    },
    GetStaticData {
        #[serde(default)]
        query_id: u64,
    },
}

impl MessageSpec {
    /// Whether the message goes to the collection rather than an item
    pub fn targets_collection(&self) -> bool {
        matches!(self, MessageSpec::Mint | MessageSpec::GetRoyaltyParams { .. })
    }

    /// Participant names the message refers to
    fn participants(&self) -> Vec<&str> {
        match self {
            MessageSpec::Transfer {
                new_owner,
                response_destination,
                ..
            } => vec![new_owner, response_destination],
            MessageSpec::TransferEditorship {
                new_editor,
                response_destination,
                ..
            } => vec![new_editor, response_destination],
            _ => Vec::new(),
        }
    }
}

/// Forward payload text as a cell, empty when absent
pub fn forward_payload_cell(text: &Option<String>) -> Result<Cell, CellError> {
    match text {
        Some(text) => Ok(CellBuilder::new().store_string_tail(text)?.build()),
        None => Ok(Cell::empty()),
    }
}

/// Expected transaction pattern of a `send` step
///
/// Unset fields match anything. With `absent: true` the step fails if a
/// matching transaction exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpectedTransaction {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub deploy: Option<bool>,
    #[serde(default)]
    pub aborted: Option<bool>,
    #[serde(default)]
    pub bounced: Option<bool>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Message name (`transfer`, `excesses`, ...) or hex opcode
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default, with = "coins::option")]
    pub value: Option<u128>,
    #[serde(default)]
    pub absent: bool,
}

/// Balance expectation (V3.0 format)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BalanceExpect {
    Eq {
        #[serde(with = "coins")]
        eq: u128,
    },
    Within {
        within: WithinSpec,
    },
    Compare {
        compare: CompareOp,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WithinSpec {
    #[serde(with = "coins")]
    pub target: u128,
    #[serde(with = "coins")]
    pub tolerance: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CompareOp {
    Gte {
        #[serde(with = "coins")]
        gte: u128,
    },
    Lte {
        #[serde(with = "coins")]
        lte: u128,
    },
    Gt {
        #[serde(with = "coins")]
        gt: u128,
    },
    Lt {
        #[serde(with = "coins")]
        lt: u128,
    },
}

/// Account a scenario refers to by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Participant {
    Collection,
    Item(u64),
    Treasury(String),
}

impl FromStr for Participant {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        if name == "collection" {
            return Ok(Participant::Collection);
        }
        if let Some(index) = name.strip_prefix("item:") {
            let index = index
                .parse()
                .with_context(|| format!("Invalid item index in '{}'", name))?;
            return Ok(Participant::Item(index));
        }
        ensure!(!name.is_empty(), "Empty participant name");
        Ok(Participant::Treasury(name.to_string()))
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Collection => write!(f, "collection"),
            Participant::Item(index) => write!(f, "item:{}", index),
            Participant::Treasury(name) => write!(f, "{}", name),
        }
    }
}

/// Opcode named by `op` in an expected transaction
pub fn parse_op(op: &str) -> Result<u32> {
    if let Some(hex) = op.strip_prefix("0x") {
        return u32::from_str_radix(hex, 16).with_context(|| format!("Invalid opcode '{}'", op));
    }
    let code = match op {
        "mint" | "text" => messages::OP_TEXT_COMMAND,
        "transfer" => messages::OP_TRANSFER,
        "ownership_assigned" => messages::OP_OWNERSHIP_ASSIGNED,
        "excesses" => messages::OP_EXCESSES,
        "get_static_data" => messages::OP_GET_STATIC_DATA,
        "report_static_data" => messages::OP_REPORT_STATIC_DATA,
        "get_royalty_params" => messages::OP_GET_ROYALTY_PARAMS,
        "report_royalty_params" => messages::OP_REPORT_ROYALTY_PARAMS,
        "transfer_editorship" => messages::OP_TRANSFER_EDITORSHIP,
        "editorship_assigned" => messages::OP_EDITORSHIP_ASSIGNED,
        "update_nft_content" => messages::OP_UPDATE_NFT_CONTENT,
        "bounced" => messages::OP_BOUNCED,
        other => bail!("Unknown message name '{}'", other),
    };
    Ok(code)
}

/// Parse and validate a scenario
///
/// # Errors
///
/// Returns error if:
/// - the YAML does not match the scenario format
/// - a treasury is declared twice or shadows `collection` / `item:<n>`
/// - a step names an undeclared participant or sends from a non-treasury
/// - a step needs the collection but genesis declares none
/// - an opcode name or invariant name is unknown
pub fn parse_scenario(yaml: &str) -> Result<TestScenario> {
    let scenario: TestScenario = serde_yaml::from_str(yaml).context("Failed to parse scenario YAML")?;
    validate(&scenario).with_context(|| format!("Invalid scenario '{}'", scenario.name))?;
    Ok(scenario)
}

fn validate(scenario: &TestScenario) -> Result<()> {
    ensure!(!scenario.steps.is_empty(), "Scenario has no steps");
    if let Some(config) = &scenario.config {
        config.validate()?;
    }

    let mut treasuries = HashSet::new();
    for treasury in &scenario.genesis.treasuries {
        match treasury.name.parse::<Participant>()? {
            Participant::Treasury(_) => {}
            other => bail!("Treasury name '{}' is reserved", other),
        }
        ensure!(
            treasuries.insert(treasury.name.as_str()),
            "Duplicate treasury '{}'",
            treasury.name
        );
    }

    let has_collection = scenario.genesis.collection.is_some();
    let check = |name: &str| -> Result<Participant> {
        let participant = name.parse::<Participant>()?;
        match &participant {
            Participant::Treasury(name) => {
                ensure!(treasuries.contains(name.as_str()), "Unknown treasury '{}'", name)
            }
            _ => ensure!(has_collection, "'{}' requires a genesis collection", participant),
        }
        Ok(participant)
    };

    if let Some(collection) = &scenario.genesis.collection {
        ensure!(
            matches!(check(&collection.owner)?, Participant::Treasury(_)),
            "Collection owner must be a treasury"
        );
        check(&collection.royalty.destination)?;
        nft_common::nft::RoyaltyParams::validate_fraction(
            collection.royalty.numerator,
            collection.royalty.denominator,
        )?;
    }

    for (idx, step) in scenario.steps.iter().enumerate() {
        validate_step(step, &check).with_context(|| format!("Step {}", idx + 1))?;
    }

    for name in scenario.invariants.iter().flatten() {
        name.parse::<InvariantKind>()?;
    }
    Ok(())
}

fn validate_step(step: &Step, check: &dyn Fn(&str) -> Result<Participant>) -> Result<()> {
    match step {
        Step::Send {
            from,
            to,
            message,
            expect,
            ..
        } => {
            ensure!(
                matches!(check(from)?, Participant::Treasury(_)),
                "Messages are sent from treasuries, not '{}'",
                from
            );
            match check(to)? {
                Participant::Collection => ensure!(
                    message.targets_collection(),
                    "The collection does not accept {:?}",
                    message
                ),
                Participant::Item(_) => ensure!(
                    !message.targets_collection(),
                    "Items do not accept {:?}",
                    message
                ),
                Participant::Treasury(name) => bail!("Cannot send NFT messages to treasury '{}'", name),
            }
            for name in message.participants() {
                check(name)?;
            }
            for expected in expect {
                for name in expected.from.iter().chain(expected.to.iter()) {
                    check(name)?;
                }
                if let Some(op) = &expected.op {
                    parse_op(op)?;
                }
            }
        }
        Step::AssertCollectionData { owner, .. } => {
            check("collection")?;
            if let Some(owner) = owner {
                check(owner)?;
            }
        }
        Step::AssertNftData {
            item, owner, editor, ..
        } => {
            check(&format!("item:{}", item))?;
            for name in owner.iter().chain(editor.iter()) {
                check(name)?;
            }
        }
        Step::AssertRoyaltyParams { destination, .. } => {
            check("collection")?;
            if let Some(destination) = destination {
                check(destination)?;
            }
        }
        Step::AssertBalance { account, .. } => {
            check(account)?;
        }
        Step::AdvanceTime { .. } => {}
    }
    Ok(())
}
