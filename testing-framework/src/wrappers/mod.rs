// File: testing-framework/src/wrappers/mod.rs
//
// Contract Proxies
//
// Typed handles on contracts living in a sandbox ledger. A wrapper knows an
// address and, for contracts it deploys, the StateInit to attach; binding it
// to a ledger through `Blockchain::open_contract` yields a SandboxContract
// that encodes messages and decodes getter results.

mod collection;
mod item;

use std::sync::Arc;

use log::debug;
use nft_common::{
    contract::StateInit,
    crypto::Address,
    nft::messages::Message,
};

use crate::sandbox::{GetMethod, GetMethodResult, LedgerSimulator, SandboxError, SendMessageResult, Treasury};

pub use collection::{CollectionMessage, NftCollection};
pub use item::{ItemMessage, NftItem};

/// Contract that can be opened on a ledger
pub trait ContractWrapper: Send + Sync {
    /// Messages this contract accepts
    type Message: Into<Message> + Clone + Send;

    fn address(&self) -> &Address;

    /// StateInit attached to every send, so the first one deploys
    fn init(&self) -> Option<&StateInit>;
}

/// Contract wrapper bound to a ledger
pub struct SandboxContract<C> {
    contract: C,
    ledger: Arc<dyn LedgerSimulator>,
}

impl<C: ContractWrapper> SandboxContract<C> {
    pub fn new(contract: C, ledger: Arc<dyn LedgerSimulator>) -> Self {
        Self { contract, ledger }
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Send `message` with `value` from the treasury `via`
    ///
    /// The message is bounceable and carries the contract StateInit when
    /// the wrapper has one.
    pub async fn send(
        &self,
        via: &Treasury,
        value: u128,
        message: C::Message,
    ) -> Result<SendMessageResult, SandboxError> {
        let message: Message = message.into();
        debug!("{} sends {} to {}", via.name, message.name(), self.address());

        let body = message.to_cell()?;
        let transactions = self
            .ledger
            .send_message(
                &via.address,
                self.address(),
                value,
                body,
                self.contract.init().cloned(),
                true,
            )
            .await?;
        Ok(transactions.into())
    }

    pub async fn get_balance(&self) -> Result<u128, SandboxError> {
        self.ledger.get_balance(self.address()).await
    }

    async fn get(&self, method: GetMethod) -> Result<GetMethodResult, SandboxError> {
        self.ledger.run_get_method(self.address(), method).await
    }
}
