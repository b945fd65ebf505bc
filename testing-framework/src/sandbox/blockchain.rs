// File: testing-framework/src/sandbox/blockchain.rs
//
// In-memory Ledger
//
// Accounts, treasuries and fee accounting behind one async RwLock. Each
// send takes the write lock for its whole message chain, so sends are
// serialized and a failed chain is rolled back from the copy taken before
// it started.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, info};
use nft_common::{cell::Cell, contract::StateInit, contract::TreasuryWallet, crypto::Address};
use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, time::Instant};

use super::{
    account::{Account, AccountCode, GetMethod, GetMethodResult},
    executor::Executor,
    LedgerSimulator, SandboxConfig, SandboxError, Transaction,
};
use crate::{
    orchestrator::Clock,
    wrappers::{ContractWrapper, SandboxContract},
};

/// Everything the ledger tracks
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    /// Accounts in creation order
    pub accounts: IndexMap<Address, Account>,
    /// Treasury name to wallet address
    pub treasuries: IndexMap<String, Address>,
    /// Logical time of the last transaction
    pub lt: u64,
    /// Compute and forward fees charged so far
    pub fees_collected: u128,
    /// Value created by treasury funding
    pub total_minted: u128,
}

impl LedgerState {
    /// Sum of all account balances
    pub fn total_balance(&self) -> u128 {
        self.accounts.values().map(|account| account.balance).sum()
    }
}

/// Pre-funded wallet the harness sends from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Treasury {
    pub name: String,
    pub address: Address,
}

/// Serializable view of balances and fee accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub balances: IndexMap<Address, u128>,
    pub fees_collected: u128,
    pub total_minted: u128,
    pub lt: u64,
}

impl LedgerSnapshot {
    /// Value held by accounts plus value burned as fees
    pub fn accounted_value(&self) -> u128 {
        self.balances.values().sum::<u128>() + self.fees_collected
    }
}

/// Sandbox ledger
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct Blockchain {
    state: Arc<RwLock<LedgerState>>,
    config: Arc<SandboxConfig>,
    clock: Arc<dyn Clock>,
    started_at: Instant,
}

impl Blockchain {
    /// Create an empty ledger
    ///
    /// Prefer [`BlockchainBuilder`](super::BlockchainBuilder), which also
    /// loads the config and creates treasuries.
    pub fn create(config: SandboxConfig, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            config: Arc::new(config),
            clock,
            started_at,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Unix time the next transaction will carry
    pub fn now(&self) -> u32 {
        let elapsed = self.clock.now().saturating_duration_since(self.started_at);
        self.config.genesis_time.saturating_add(elapsed.as_secs() as u32)
    }

    /// Get or create the treasury called `name`
    ///
    /// A new treasury is an active wallet funded with the configured
    /// treasury balance. Asking again for the same name returns the same
    /// wallet without funding it twice.
    pub async fn treasury(&self, name: &str) -> Result<Treasury, SandboxError> {
        let mut state = self.state.write().await;
        if let Some(address) = state.treasuries.get(name) {
            return Ok(Treasury {
                name: name.to_string(),
                address: address.clone(),
            });
        }

        let wallet = TreasuryWallet::new(name);
        let address = wallet.state_init()?.address(self.config.workchain)?;
        let balance = self.config.treasury_balance;

        state.accounts.insert(
            address.clone(),
            Account {
                address: address.clone(),
                balance,
                code: Some(AccountCode::Wallet(wallet)),
                last_lt: 0,
            },
        );
        state.treasuries.insert(name.to_string(), address.clone());
        state.total_minted += balance;
        info!("Treasury '{}' created at {}", name, address);

        Ok(Treasury {
            name: name.to_string(),
            address,
        })
    }

    /// All treasuries in creation order
    pub async fn treasuries(&self) -> Vec<Treasury> {
        let state = self.state.read().await;
        state
            .treasuries
            .iter()
            .map(|(name, address)| Treasury {
                name: name.clone(),
                address: address.clone(),
            })
            .collect()
    }

    /// Bind a contract wrapper to this ledger
    pub fn open_contract<C: ContractWrapper>(&self, contract: C) -> SandboxContract<C> {
        SandboxContract::new(contract, Arc::new(self.clone()))
    }

    /// Copy of the account at `address`, if the ledger has seen it
    pub async fn get_account(&self, address: &Address) -> Option<Account> {
        self.state.read().await.accounts.get(address).cloned()
    }

    /// Balances and fee accounting at this point
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().await;
        LedgerSnapshot {
            balances: state
                .accounts
                .iter()
                .map(|(address, account)| (address.clone(), account.balance))
                .collect(),
            fees_collected: state.fees_collected,
            total_minted: state.total_minted,
            lt: state.lt,
        }
    }
}

#[async_trait]
impl LedgerSimulator for Blockchain {
    async fn send_message(
        &self,
        sender: &Address,
        to: &Address,
        value: u128,
        body: Cell,
        init: Option<StateInit>,
        bounce: bool,
    ) -> Result<Vec<Transaction>, SandboxError> {
        let now = self.now();
        let mut state = self.state.write().await;
        let backup = state.clone();

        let result = Executor::new(&mut state, &self.config, now).run(sender, to.clone(), value, body, init, bounce);
        match result {
            Ok(transactions) => {
                debug!("Send from {} to {} produced {} transactions", sender, to, transactions.len());
                Ok(transactions)
            }
            Err(err) => {
                debug!("Send from {} to {} rolled back: {}", sender, to, err);
                *state = backup;
                Err(err)
            }
        }
    }

    async fn run_get_method(&self, address: &Address, method: GetMethod) -> Result<GetMethodResult, SandboxError> {
        let state = self.state.read().await;
        let code = state
            .accounts
            .get(address)
            .and_then(|account| account.code.as_ref())
            .ok_or_else(|| SandboxError::AccountNotActive(address.clone()))?;

        code.run_get_method(address, &method)
            .map_err(|exit_code| SandboxError::GetMethodFailed {
                address: address.clone(),
                method: method.name(),
                exit_code,
            })
    }

    async fn get_balance(&self, address: &Address) -> Result<u128, SandboxError> {
        let state = self.state.read().await;
        Ok(state.accounts.get(address).map(|account| account.balance).unwrap_or(0))
    }
}
