//! YAML scenario execution engine
//!
//! This module executes parsed YAML scenarios against a sandbox ledger,
//! providing a high-level DSL for NFT collection tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use nft_testing_framework::scenarios::{ScenarioExecutor, parse_scenario};
//!
//! let yaml = r#"
//! name: "Single Mint"
//! genesis:
//!   treasuries:
//!     - name: "deployer"
//!   collection:
//!     owner: "deployer"
//!     content: { type: offchain, uri: "https://example.com/c/" }
//!     royalty: { numerator: 350, denominator: 1000, destination: "deployer" }
//! steps:
//!   - action: "send"
//!     from: "deployer"
//!     to: "collection"
//!     value: "1"
//!     message: { type: mint }
//!     expect:
//!       - { from: "deployer", to: "collection", deploy: true, success: true }
//!   - action: "assert_collection_data"
//!     next_item_index: 1
//! "#;
//!
//! let scenario = parse_scenario(yaml)?;
//! let mut executor = ScenarioExecutor::new();
//! let report = executor.execute(scenario).await?;
//!
//! assert!(report.success);
//! ```

use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use indexmap::IndexMap;
use log::info;
use nft_common::{
    cell::Cell,
    config::OFFCHAIN_CONTENT_PREFIX,
    crypto::Address,
    nft::{
        content_tail_bytes,
        messages::{GetRoyaltyParams, GetStaticData, Transfer, TransferEditorship, UpdateNftContent},
        RoyaltyParams,
    },
    utils::from_nano,
};

use super::parser::{
    forward_payload_cell, parse_op, BalanceExpect, CompareOp, ExpectedTransaction, MessageSpec, Participant, Step,
    TestScenario,
};
use crate::{
    invariants::{InvariantKind, InvariantTracker},
    matchers::{TransactionListExt, TransactionMatcher},
    orchestrator::{Clock, PausedClock},
    sandbox::{Blockchain, BlockchainBuilder, LedgerSimulator, Transaction, Treasury},
    wrappers::{CollectionMessage, ContractWrapper, ItemMessage, NftCollection, NftItem, SandboxContract},
};

/// Scenario executor that runs parsed YAML scenarios
pub struct ScenarioExecutor {
    /// Ledger of the running scenario
    blockchain: Option<Blockchain>,

    /// Clock for deterministic time control, created on first use
    clock: Option<Arc<PausedClock>>,

    /// Named treasuries (name → treasury)
    treasuries: IndexMap<String, Treasury>,

    /// Collection declared in genesis
    collection: Option<SandboxContract<NftCollection>>,

    /// State for invariant checks
    tracker: InvariantTracker,

    /// Every transaction of the scenario, in execution order
    transactions: Vec<Transaction>,

    /// Execution log
    log: Vec<String>,

    /// Current step number (1-indexed)
    current_step: usize,
}

impl ScenarioExecutor {
    /// Create new executor
    pub fn new() -> Self {
        Self {
            blockchain: None,
            clock: None,
            treasuries: IndexMap::new(),
            collection: None,
            tracker: InvariantTracker::default(),
            transactions: Vec::new(),
            log: Vec::new(),
            current_step: 0,
        }
    }

    /// Execute a complete scenario
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Genesis setup fails
    /// - Any step execution fails
    /// - Any assertion or invariant fails
    pub async fn execute(&mut self, scenario: TestScenario) -> Result<ExecutionReport> {
        self.log.clear();
        self.transactions.clear();
        self.current_step = 0;

        self.log(format!("Starting scenario: {}", scenario.name));
        if let Some(desc) = &scenario.description {
            self.log(format!("Description: {}", desc));
        }

        self.setup_genesis(&scenario).await?;

        for (idx, step) in scenario.steps.iter().enumerate() {
            self.current_step = idx + 1;
            self.log(format!("\n--- Step {}: {:?} ---", self.current_step, step));

            self.execute_step(step)
                .await
                .with_context(|| format!("Failed at step {} ({:?})", self.current_step, step))?;
        }

        if let Some(invariants) = &scenario.invariants {
            self.log("\n--- Checking Invariants ---".to_string());
            for name in invariants {
                let kind: InvariantKind = name.parse()?;
                self.check_invariant(kind)
                    .await
                    .with_context(|| format!("Invariant {} violated", kind))?;
            }
        }

        self.log("\n=== Scenario completed successfully ===".to_string());
        info!("Scenario '{}' passed ({} steps)", scenario.name, self.current_step);

        Ok(ExecutionReport {
            scenario_name: scenario.name,
            steps_executed: self.current_step,
            success: true,
            transactions: self.transactions.len(),
            log: self.log.clone(),
        })
    }

    /// Setup the ledger, treasuries and collection wrapper
    async fn setup_genesis(&mut self, scenario: &TestScenario) -> Result<()> {
        self.log("Setting up genesis...".to_string());

        let clock = match &self.clock {
            Some(clock) => clock.clone(),
            None => {
                let clock = Arc::new(PausedClock::new());
                self.clock = Some(clock.clone());
                clock
            }
        };

        let config = scenario.config.clone().unwrap_or_default();
        let workchain = config.workchain;
        let blockchain = BlockchainBuilder::new()
            .with_config(config)
            .with_clock(clock as Arc<dyn Clock>)
            .build()
            .await?;

        self.treasuries.clear();
        for genesis_treasury in &scenario.genesis.treasuries {
            let treasury = blockchain.treasury(&genesis_treasury.name).await?;
            self.log(format!("  Treasury '{}': {}", treasury.name, treasury.address));
            self.treasuries.insert(treasury.name.clone(), treasury);
        }
        self.blockchain = Some(blockchain);

        self.collection = None;
        self.tracker = InvariantTracker::default();
        if let Some(genesis) = &scenario.genesis.collection {
            let owner = self.treasury(&genesis.owner)?.address.clone();
            let destination = self.address_of(&genesis.royalty.destination.parse()?)?;
            let royalty = RoyaltyParams::new(genesis.royalty.numerator, genesis.royalty.denominator, destination)?;

            let wrapper = NftCollection::from_init(owner, genesis.content.to_content(), royalty.clone(), workchain)?;
            let collection = self.blockchain()?.open_contract(wrapper);
            self.log(format!("  Collection: {} (deploys on first message)", collection.address()));

            self.collection = Some(collection);
            self.tracker = InvariantTracker::new(Some(royalty));
        }

        self.log(format!("Genesis complete: {} treasuries", self.treasuries.len()));
        Ok(())
    }

    /// Execute a single step
    async fn execute_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Send {
                from,
                to,
                value,
                message,
                expect,
            } => self.execute_send(from, to, *value, message, expect).await,
            Step::AssertCollectionData {
                next_item_index,
                owner,
                content,
            } => {
                self.execute_assert_collection_data(*next_item_index, owner.as_deref(), content.as_deref())
                    .await
            }
            Step::AssertNftData {
                item,
                initialized,
                owner,
                editor,
                content,
            } => {
                self.execute_assert_nft_data(*item, *initialized, owner.as_deref(), editor.as_deref(), content.as_deref())
                    .await
            }
            Step::AssertRoyaltyParams {
                numerator,
                denominator,
                destination,
            } => {
                self.execute_assert_royalty_params(*numerator, *denominator, destination.as_deref())
                    .await
            }
            Step::AssertBalance { account, expect } => self.execute_assert_balance(account, expect).await,
            Step::AdvanceTime { seconds } => self.execute_advance_time(*seconds).await,
        }
    }

    /// Execute send action
    async fn execute_send(
        &mut self,
        from: &str,
        to: &str,
        value: u128,
        message: &MessageSpec,
        expect: &[ExpectedTransaction],
    ) -> Result<()> {
        let via = self.treasury(from)?.clone();
        let target: Participant = to.parse()?;

        self.log(format!("Send: {} → {} (value={}, message={:?})", from, to, from_nano(value), message));

        let result = match target {
            Participant::Collection => {
                let message = match message {
                    MessageSpec::Mint => CollectionMessage::Mint,
                    MessageSpec::GetRoyaltyParams { query_id } => {
                        CollectionMessage::GetRoyaltyParams(GetRoyaltyParams { query_id: *query_id })
                    }
                    other => bail!("The collection does not accept {:?}", other),
                };
                self.collection()?.send(&via, value, message).await?
            }
            Participant::Item(index) => {
                let message = self.item_message(message)?;
                self.item(index)?.send(&via, value, message).await?
            }
            Participant::Treasury(name) => bail!("Cannot send NFT messages to treasury '{}'", name),
        };

        for tx in &result.transactions {
            self.log(format!("  {}", tx));
        }
        let collection = self.collection.as_ref().map(|collection| collection.address().clone());
        self.tracker.record(collection.as_ref(), &result.transactions);
        self.transactions.extend(result.transactions.iter().cloned());

        for expected in expect {
            let matcher = self.matcher(expected)?;
            if expected.absent {
                if let Some(tx) = result.find_transaction(&matcher) {
                    bail!("Unexpected transaction matching {}: {}", matcher, tx);
                }
                self.log(format!("  ✓ No transaction matches {}", matcher));
            } else {
                result.expect_transaction(&matcher)?;
                self.log(format!("  ✓ Found transaction matching {}", matcher));
            }
        }
        Ok(())
    }

    /// Encode an item-bound message, resolving participant names
    fn item_message(&self, message: &MessageSpec) -> Result<ItemMessage> {
        let message = match message {
            MessageSpec::Transfer {
                query_id,
                new_owner,
                response_destination,
                custom_payload,
                forward_amount,
                forward_payload,
            } => ItemMessage::Transfer(Transfer {
                query_id: *query_id,
                new_owner: self.address_of(&new_owner.parse()?)?,
                response_destination: self.address_of(&response_destination.parse()?)?,
                custom_payload: custom_payload
                    .as_ref()
                    .map(|content| content.to_content().to_cell())
                    .transpose()?,
                forward_amount: *forward_amount,
                forward_payload: forward_payload_cell(forward_payload)?,
            }),
            MessageSpec::TransferEditorship {
                query_id,
                new_editor,
                response_destination,
                forward_amount,
                forward_payload,
            } => ItemMessage::TransferEditorship(TransferEditorship {
                query_id: *query_id,
                new_editor: self.address_of(&new_editor.parse()?)?,
                response_destination: self.address_of(&response_destination.parse()?)?,
                forward_amount: *forward_amount,
                forward_payload: forward_payload_cell(forward_payload)?,
            }),
            MessageSpec::UpdateNftContent { query_id, content } => ItemMessage::UpdateNftContent(UpdateNftContent {
                query_id: *query_id,
                new_content: content.to_content().to_cell()?,
            }),
            MessageSpec::GetStaticData { query_id } => {
                ItemMessage::GetStaticData(GetStaticData { query_id: *query_id })
            }
            other => bail!("Items do not accept {:?}", other),
        };
        Ok(message)
    }

    /// Build a matcher from an expected transaction pattern
    fn matcher(&self, expected: &ExpectedTransaction) -> Result<TransactionMatcher> {
        let mut matcher = TransactionMatcher::new();
        if let Some(from) = &expected.from {
            matcher = matcher.from(&self.address_of(&from.parse()?)?);
        }
        if let Some(to) = &expected.to {
            matcher = matcher.to(&self.address_of(&to.parse()?)?);
        }
        if let Some(op) = &expected.op {
            matcher = matcher.op(parse_op(op)?);
        }
        matcher.success = expected.success;
        matcher.deploy = expected.deploy;
        matcher.aborted = expected.aborted;
        matcher.bounced = expected.bounced;
        matcher.exit_code = expected.exit_code;
        matcher.value = expected.value;
        Ok(matcher)
    }

    /// Execute assert_collection_data action
    async fn execute_assert_collection_data(
        &mut self,
        next_item_index: Option<u64>,
        owner: Option<&str>,
        content: Option<&str>,
    ) -> Result<()> {
        let data = self.collection()?.get_collection_data().await?;
        self.log(format!(
            "Assert collection data: next_item_index={} owner={}",
            data.next_item_index, data.owner_address
        ));

        if let Some(expected) = next_item_index {
            ensure!(
                data.next_item_index == expected,
                "next_item_index: expected {}, got {}",
                expected,
                data.next_item_index
            );
            self.log(format!("  ✓ next_item_index equals {}", expected));
        }
        if let Some(owner) = owner {
            let expected = self.address_of(&owner.parse()?)?;
            ensure!(
                data.owner_address == expected,
                "owner: expected {} ({}), got {}",
                owner,
                expected,
                data.owner_address
            );
            self.log(format!("  ✓ owner is {}", owner));
        }
        if let Some(expected) = content {
            assert_content("collection content", &data.collection_content, expected)?;
            self.log(format!("  ✓ content is {:?}", expected));
        }
        Ok(())
    }

    /// Execute assert_nft_data action
    async fn execute_assert_nft_data(
        &mut self,
        index: u64,
        initialized: Option<bool>,
        owner: Option<&str>,
        editor: Option<&str>,
        content: Option<&str>,
    ) -> Result<()> {
        let data = self.item(index)?.get_nft_data().await?;
        self.log(format!(
            "Assert item {}: initialized={} owner={:?}",
            index, data.is_initialized, data.owner
        ));

        ensure!(data.index == index, "item index: expected {}, got {}", index, data.index);
        if let Some(expected) = initialized {
            ensure!(
                data.is_initialized == expected,
                "is_initialized: expected {}, got {}",
                expected,
                data.is_initialized
            );
        }
        for (field, name, actual) in [("owner", owner, &data.owner), ("editor", editor, &data.editor)] {
            if let Some(name) = name {
                let expected = self.address_of(&name.parse()?)?;
                ensure!(
                    actual.as_ref() == Some(&expected),
                    "{}: expected {} ({}), got {:?}",
                    field,
                    name,
                    expected,
                    actual
                );
                self.log(format!("  ✓ {} is {}", field, name));
            }
        }
        if let Some(expected) = content {
            assert_content("item content", &data.individual_content, expected)?;
            self.log(format!("  ✓ content is {:?}", expected));
        }
        Ok(())
    }

    /// Execute assert_royalty_params action
    async fn execute_assert_royalty_params(
        &mut self,
        numerator: Option<u16>,
        denominator: Option<u16>,
        destination: Option<&str>,
    ) -> Result<()> {
        let params = self.collection()?.get_royalty_params().await?;
        self.log(format!(
            "Assert royalty params: {}/{} to {}",
            params.numerator, params.denominator, params.destination
        ));

        if let Some(expected) = numerator {
            ensure!(params.numerator == expected, "numerator: expected {}, got {}", expected, params.numerator);
        }
        if let Some(expected) = denominator {
            ensure!(
                params.denominator == expected,
                "denominator: expected {}, got {}",
                expected,
                params.denominator
            );
        }
        if let Some(name) = destination {
            let expected = self.address_of(&name.parse()?)?;
            ensure!(
                params.destination == expected,
                "destination: expected {}, got {}",
                name,
                params.destination
            );
        }
        self.log("  ✓ Royalty params match".to_string());
        Ok(())
    }

    /// Execute assert_balance action
    async fn execute_assert_balance(&mut self, account: &str, expect: &BalanceExpect) -> Result<()> {
        let address = self.address_of(&account.parse()?)?;
        let actual = self.blockchain()?.get_balance(&address).await?;

        self.log(format!("Assert balance for '{}': actual={}", account, from_nano(actual)));

        match expect {
            BalanceExpect::Eq { eq } => {
                ensure!(
                    actual == *eq,
                    "Balance assertion failed: expected {}, got {}",
                    from_nano(*eq),
                    from_nano(actual)
                );
                self.log(format!("  ✓ Balance equals {}", from_nano(*eq)));
            }
            BalanceExpect::Within { within } => {
                let min = within.target.saturating_sub(within.tolerance);
                let max = within.target.saturating_add(within.tolerance);

                ensure!(
                    actual >= min && actual <= max,
                    "Balance out of tolerance: expected {} ± {}, got {}",
                    from_nano(within.target),
                    from_nano(within.tolerance),
                    from_nano(actual)
                );
                self.log(format!(
                    "  ✓ Balance within {} ± {}",
                    from_nano(within.target),
                    from_nano(within.tolerance)
                ));
            }
            BalanceExpect::Compare { compare } => {
                let (holds, op, bound) = match compare {
                    CompareOp::Gte { gte } => (actual >= *gte, ">=", *gte),
                    CompareOp::Lte { lte } => (actual <= *lte, "<=", *lte),
                    CompareOp::Gt { gt } => (actual > *gt, ">", *gt),
                    CompareOp::Lt { lt } => (actual < *lt, "<", *lt),
                };
                ensure!(
                    holds,
                    "Balance {} is not {} {}",
                    from_nano(actual),
                    op,
                    from_nano(bound)
                );
                self.log(format!("  ✓ Balance {} {}", op, from_nano(bound)));
            }
        }
        Ok(())
    }

    /// Execute advance_time action
    async fn execute_advance_time(&mut self, seconds: u64) -> Result<()> {
        self.log(format!("Advancing time by {} seconds...", seconds));

        let clock = self.clock.as_ref().context("Clock not initialized")?;
        clock.advance(tokio::time::Duration::from_secs(seconds)).await;

        self.log(format!("  ✓ Time advanced by {}s", seconds));
        Ok(())
    }

    /// Check invariant
    async fn check_invariant(&mut self, kind: InvariantKind) -> Result<()> {
        let blockchain = self.blockchain()?;
        self.tracker.check(kind, blockchain, self.collection.as_ref()).await?;
        self.log(format!("  ✓ {}", kind));
        Ok(())
    }

    fn blockchain(&self) -> Result<&Blockchain> {
        self.blockchain.as_ref().context("Blockchain not initialized")
    }

    fn collection(&self) -> Result<&SandboxContract<NftCollection>> {
        self.collection.as_ref().context("Scenario has no collection")
    }

    /// Get treasury by name
    fn treasury(&self, name: &str) -> Result<&Treasury> {
        self.treasuries
            .get(name)
            .with_context(|| format!("Treasury '{}' not found", name))
    }

    /// Wrapper for item `index` of the collection
    ///
    /// Opened by address only, so messages never deploy an item the
    /// collection has not minted.
    fn item(&self, index: u64) -> Result<SandboxContract<NftItem>> {
        let address = NftItem::from_init(self.collection()?.address(), index)?.address().clone();
        Ok(self.blockchain()?.open_contract(NftItem::from_address(address)))
    }

    /// Resolve a participant to its address
    fn address_of(&self, participant: &Participant) -> Result<Address> {
        match participant {
            Participant::Treasury(name) => Ok(self.treasury(name)?.address.clone()),
            Participant::Collection => Ok(self.collection()?.address().clone()),
            Participant::Item(index) => Ok(self.item(*index)?.address().clone()),
        }
    }

    /// Add log entry
    fn log(&mut self, message: String) {
        self.log.push(message);
    }

    /// Get execution log
    pub fn get_log(&self) -> &[String] {
        &self.log
    }

    /// Transactions of the last executed scenario
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Ledger of the last executed scenario
    pub fn ledger(&self) -> Option<&Blockchain> {
        self.blockchain.as_ref()
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare the string tail of a content cell with `expected`
///
/// The off-chain prefix byte is not part of the compared text.
fn assert_content(what: &str, cell: &Cell, expected: &str) -> Result<()> {
    let bytes = content_tail_bytes(cell).with_context(|| format!("Failed to read {}", what))?;
    let text = bytes.strip_prefix(&[OFFCHAIN_CONTENT_PREFIX]).unwrap_or(&bytes[..]);
    let actual = std::str::from_utf8(text).with_context(|| format!("{} is not valid UTF-8", what))?;
    ensure!(actual == expected, "{}: expected {:?}, got {:?}", what, expected, actual);
    Ok(())
}

/// Execution report
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Scenario name
    pub scenario_name: String,

    /// Number of steps executed
    pub steps_executed: usize,

    /// Whether execution succeeded
    pub success: bool,

    /// Number of transactions produced
    pub transactions: usize,

    /// Execution log
    pub log: Vec<String>,
}

impl ExecutionReport {
    /// Print report to stdout
    pub fn print(&self) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║  Scenario Execution Report                                 ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Name: {:<50} ║", self.scenario_name);
        println!("║  Steps: {:<48} ║", self.steps_executed);
        println!("║  Transactions: {:<41} ║", self.transactions);
        println!(
            "║  Status: {:<47} ║",
            if self.success { "SUCCESS ✓" } else { "FAILED ✗" }
        );
        println!("╚════════════════════════════════════════════════════════════╝\n");

        println!("Execution Log:");
        println!("═════════════");
        for entry in &self.log {
            println!("{}", entry);
        }
    }
}
