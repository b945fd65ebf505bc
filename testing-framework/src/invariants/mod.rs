//! Core invariant checkers
//!
//! Implements ledger and NFT invariants:
//! - Value conservation (balances plus collected fees equal minted value)
//! - Mint monotonicity (`next_item_index` equals the accepted mint count)
//! - Royalty immutability (royalty params equal their construction values)
//! - Transfer outcome (owner follows transfer success)

use std::{fmt, str::FromStr};

use anyhow::{bail, ensure, Result};
use log::debug;
use nft_common::{
    crypto::Address,
    nft::{messages::OP_TEXT_COMMAND, RoyaltyParams},
};

use crate::{
    sandbox::{Blockchain, LedgerSnapshot, SandboxError, Transaction},
    wrappers::{NftCollection, SandboxContract},
};

/// Invariants a scenario can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    ValueConservation,
    MintMonotonicity,
    RoyaltyImmutability,
}

impl InvariantKind {
    pub fn name(&self) -> &'static str {
        match self {
            InvariantKind::ValueConservation => "value_conservation",
            InvariantKind::MintMonotonicity => "mint_monotonicity",
            InvariantKind::RoyaltyImmutability => "royalty_immutability",
        }
    }
}

impl FromStr for InvariantKind {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "value_conservation" => Ok(InvariantKind::ValueConservation),
            "mint_monotonicity" => Ok(InvariantKind::MintMonotonicity),
            "royalty_immutability" => Ok(InvariantKind::RoyaltyImmutability),
            other => bail!("Unknown invariant '{}'", other),
        }
    }
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check value conservation
pub fn check_value_conservation(snapshot: &LedgerSnapshot) -> Result<()> {
    let accounted = snapshot.accounted_value();
    ensure!(
        accounted == snapshot.total_minted,
        "Value not conserved: balances {} + fees {} != minted {}",
        accounted - snapshot.fees_collected,
        snapshot.fees_collected,
        snapshot.total_minted
    );
    Ok(())
}

/// Check that the collection index advanced once per accepted mint
pub fn check_mint_monotonicity(next_item_index: u64, accepted_mints: u64) -> Result<()> {
    ensure!(
        next_item_index == accepted_mints,
        "next_item_index is {} after {} accepted mints",
        next_item_index,
        accepted_mints
    );
    Ok(())
}

/// Check royalty parameters against their construction values
pub fn check_royalty_immutability(initial: &RoyaltyParams, current: &RoyaltyParams) -> Result<()> {
    ensure!(
        initial == current,
        "Royalty params changed from {}/{} to {}/{}",
        initial.numerator,
        initial.denominator,
        current.numerator,
        current.denominator
    );
    Ok(())
}

/// Check an item owner after a transfer attempt
///
/// A successful transfer leaves `new_owner` in place; a failed one leaves
/// `prior_owner`.
pub fn check_transfer_outcome(
    prior_owner: &Address,
    new_owner: &Address,
    succeeded: bool,
    actual: Option<&Address>,
) -> Result<()> {
    let expected = if succeeded { new_owner } else { prior_owner };
    match actual {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => bail!(
            "Owner is {} after {} transfer, expected {}",
            actual,
            if succeeded { "a successful" } else { "a failed" },
            expected
        ),
        None => bail!("Item has no owner after a transfer"),
    }
}

/// Mint count of one send: successful text-command transactions on the
/// collection
pub fn accepted_mints(collection: &Address, transactions: &[Transaction]) -> u64 {
    transactions
        .iter()
        .filter(|tx| &tx.address == collection && tx.success && tx.op == Some(OP_TEXT_COMMAND))
        .count() as u64
}

/// State the stateful invariants compare against
#[derive(Debug, Clone, Default)]
pub struct InvariantTracker {
    initial_royalty: Option<RoyaltyParams>,
    accepted_mints: u64,
}

impl InvariantTracker {
    pub fn new(initial_royalty: Option<RoyaltyParams>) -> Self {
        Self {
            initial_royalty,
            accepted_mints: 0,
        }
    }

    pub fn accepted_mints(&self) -> u64 {
        self.accepted_mints
    }

    /// Account for the transactions of one send
    pub fn record(&mut self, collection: Option<&Address>, transactions: &[Transaction]) {
        if let Some(collection) = collection {
            self.accepted_mints += accepted_mints(collection, transactions);
        }
    }

    /// Check `kind` against the current ledger state
    pub async fn check(
        &self,
        kind: InvariantKind,
        blockchain: &Blockchain,
        collection: Option<&SandboxContract<NftCollection>>,
    ) -> Result<()> {
        debug!("Checking invariant {}", kind);
        match kind {
            InvariantKind::ValueConservation => check_value_conservation(&blockchain.snapshot().await),
            InvariantKind::MintMonotonicity => {
                let Some(collection) = collection else {
                    bail!("{} needs a collection", kind);
                };
                let next_item_index = match collection.get_collection_data().await {
                    Ok(data) => data.next_item_index,
                    // Not deployed yet
                    Err(SandboxError::AccountNotActive(_)) => 0,
                    Err(err) => return Err(err.into()),
                };
                check_mint_monotonicity(next_item_index, self.accepted_mints)
            }
            InvariantKind::RoyaltyImmutability => {
                let (Some(collection), Some(initial)) = (collection, &self.initial_royalty) else {
                    bail!("{} needs a collection", kind);
                };
                match collection.get_royalty_params().await {
                    Ok(current) => check_royalty_immutability(initial, &current),
                    Err(SandboxError::AccountNotActive(_)) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}
