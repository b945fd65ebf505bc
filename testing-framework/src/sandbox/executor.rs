// File: testing-framework/src/sandbox/executor.rs
//
// Message Queue Executor
//
// Drains the messages of one send in FIFO order. Each message becomes one
// transaction on its destination account:
//
// 1. credit the inbound value
// 2. deploy when a matching StateInit is attached to an inactive account
// 3. charge the compute fee and run the handler on a copy of the state
// 4. validate the action phase (outgoing values and separately paid fees)
// 5. commit the copy and queue outgoing messages, or bounce on failure

use std::collections::VecDeque;

use log::{debug, info, log_enabled, trace, Level};
use nft_common::{
    cell::{Cell, CellBuilder, CellError},
    contract::{ExitCode, OutMessage, RuntimeContext, SendMode, StateInit},
    crypto::Address,
    nft::messages::{body_opcode, OP_BOUNCED},
};

use super::{
    account::{Account, AccountCode},
    LedgerState, SandboxConfig, SandboxError, Transaction,
};

/// Bits of the original body a bounce carries back
const BOUNCED_BODY_BITS: usize = 256;

/// Internal message waiting in the queue
#[derive(Debug, Clone)]
pub(crate) struct QueuedMessage {
    pub from: Address,
    pub to: Address,
    pub value: u128,
    pub body: Cell,
    pub init: Option<StateInit>,
    pub bounce: bool,
    pub bounced: bool,
}

/// Result of a successful action phase
struct Actions {
    balance: u128,
    fees: u128,
    messages: Vec<QueuedMessage>,
}

/// Executes one send against a ledger state
pub(crate) struct Executor<'a> {
    state: &'a mut LedgerState,
    config: &'a SandboxConfig,
    now: u32,
    queue: VecDeque<QueuedMessage>,
    transactions: Vec<Transaction>,
}

impl<'a> Executor<'a> {
    pub fn new(state: &'a mut LedgerState, config: &'a SandboxConfig, now: u32) -> Self {
        Self {
            state,
            config,
            now,
            queue: VecDeque::new(),
            transactions: Vec::new(),
        }
    }

    /// Run a treasury send to completion
    ///
    /// The caller rolls the state back when this returns an error.
    pub fn run(
        mut self,
        sender: &Address,
        to: Address,
        value: u128,
        body: Cell,
        init: Option<StateInit>,
        bounce: bool,
    ) -> Result<Vec<Transaction>, SandboxError> {
        self.external(sender, to, value, body, init, bounce)?;

        while let Some(message) = self.queue.pop_front() {
            if self.transactions.len() >= self.config.max_messages_per_send {
                return Err(SandboxError::MessageLimitExceeded {
                    limit: self.config.max_messages_per_send,
                });
            }
            self.internal(message)?;
        }

        Ok(self.transactions)
    }

    fn next_lt(&mut self) -> u64 {
        self.state.lt += 1;
        self.state.lt
    }

    /// Treasury transaction: pay value and forward fee, emit the message
    fn external(
        &mut self,
        sender: &Address,
        to: Address,
        value: u128,
        body: Cell,
        init: Option<StateInit>,
        bounce: bool,
    ) -> Result<(), SandboxError> {
        let mut account = match self.state.accounts.get(sender) {
            Some(account) if matches!(account.code, Some(AccountCode::Wallet(_))) => account.clone(),
            _ => return Err(SandboxError::UnknownSender(sender.clone())),
        };

        let config = self.config;
        let fees = &config.fees;
        let lt = self.next_lt();
        account.last_lt = lt;

        let compute = fees.compute_fee.min(account.balance);
        account.balance -= compute;
        let mut total_fees = compute;

        let cost = value.saturating_add(fees.forward_fee);
        let success = cost <= account.balance;
        if success {
            account.balance -= cost;
            total_fees += fees.forward_fee;
            self.queue.push_back(QueuedMessage {
                from: sender.clone(),
                to,
                value,
                body,
                init,
                bounce,
                bounced: false,
            });
        } else {
            debug!(
                "Treasury {} cannot cover {} plus forward fee (balance {})",
                sender, value, account.balance
            );
        }
        self.state.fees_collected += total_fees;

        self.record(Transaction {
            address: sender.clone(),
            from: None,
            to: sender.clone(),
            value: 0,
            op: None,
            success,
            deploy: false,
            aborted: !success,
            exit_code: Some(if success {
                ExitCode::SUCCESS.code()
            } else {
                ExitCode::NOT_ENOUGH_BALANCE.code()
            }),
            bounced: false,
            lt,
            now: self.now,
            total_fees,
            out_messages: usize::from(success),
        });
        self.state.accounts.insert(sender.clone(), account);
        Ok(())
    }

    /// Internal message transaction
    fn internal(&mut self, message: QueuedMessage) -> Result<(), SandboxError> {
        let lt = self.next_lt();
        let to = message.to.clone();
        let mut account = self
            .state
            .accounts
            .get(&to)
            .cloned()
            .unwrap_or_else(|| Account::uninit(to.clone()));

        account.balance += message.value;
        account.last_lt = lt;

        let deploy = !account.is_active() && self.try_deploy(&mut account, &message);

        let mut tx = Transaction {
            address: to.clone(),
            from: Some(message.from.clone()),
            to: to.clone(),
            value: message.value,
            op: body_opcode(&message.body),
            success: false,
            deploy,
            aborted: true,
            exit_code: None,
            bounced: message.bounced,
            lt,
            now: self.now,
            total_fees: 0,
            out_messages: 0,
        };

        let Some(code) = account.code.clone() else {
            // Compute skipped: the value stays on the uninitialized account
            trace!("No code at {}, compute skipped", to);
            self.bounce(&mut account, &message, message.value, &mut tx)?;
            self.commit(account, tx);
            return Ok(());
        };

        let config = self.config;
        let fees = &config.fees;
        let ctx = RuntimeContext {
            sender: message.from.clone(),
            value: message.value,
            balance: account.balance,
            my_address: to.clone(),
            now: self.now,
            lt,
            bounced: message.bounced,
            forward_fee: fees.forward_fee,
        };

        let mut next = code;
        let outcome = if account.balance < fees.compute_fee {
            Err(ExitCode::OUT_OF_GAS)
        } else {
            next.receive(&ctx, &message.body)
        };

        let compute = fees.compute_fee.min(account.balance);
        account.balance -= compute;
        tx.total_fees = compute;
        self.state.fees_collected += compute;

        let remaining_value = message.value.saturating_sub(compute);
        let outcome =
            outcome.and_then(|out| self.action_phase(account.balance, remaining_value, &to, out));

        match outcome {
            Ok(actions) => {
                account.balance = actions.balance;
                account.code = Some(next);
                tx.success = true;
                tx.aborted = false;
                tx.exit_code = Some(ExitCode::SUCCESS.code());
                tx.total_fees += actions.fees;
                tx.out_messages = actions.messages.len();
                self.state.fees_collected += actions.fees;
                self.queue.extend(actions.messages);
            }
            Err(exit_code) => {
                debug!("Transaction on {} failed with exit code {}", to, exit_code);
                tx.exit_code = Some(exit_code.code());
                self.bounce(&mut account, &message, remaining_value, &mut tx)?;
            }
        }

        self.commit(account, tx);
        Ok(())
    }

    /// Deploy `account` from the message's StateInit when it hashes to the
    /// account address
    fn try_deploy(&self, account: &mut Account, message: &QueuedMessage) -> bool {
        let Some(init) = &message.init else {
            return false;
        };
        match init.address(message.to.workchain()) {
            Ok(address) if address == message.to => {}
            _ => {
                debug!("StateInit does not match {}, not deploying", message.to);
                return false;
            }
        }

        match AccountCode::from_state_init(init) {
            Ok(Some(code)) => {
                info!("Deployed {} at {}", code.kind(), message.to);
                account.code = Some(code);
                true
            }
            Ok(None) => {
                debug!("Unknown code for {}, not deploying", message.to);
                false
            }
            Err(err) => {
                debug!("Malformed StateInit for {}: {}", message.to, err);
                false
            }
        }
    }

    /// Validate and price outgoing messages against `balance`
    fn action_phase(
        &self,
        balance: u128,
        remaining_value: u128,
        from: &Address,
        out: Vec<OutMessage>,
    ) -> Result<Actions, ExitCode> {
        let forward_fee = self.config.fees.forward_fee;
        let mut balance = balance;
        let mut fees = 0;
        let mut messages = Vec::with_capacity(out.len());

        for message in out {
            let value = if message.mode.contains(SendMode::CARRY_ALL_BALANCE) {
                balance
            } else if message.mode.contains(SendMode::CARRY_REMAINING_VALUE) {
                message.value.saturating_add(remaining_value)
            } else {
                message.value
            };

            let (cost, delivered) = if message.mode.contains(SendMode::PAY_FEES_SEPARATELY) {
                (value.checked_add(forward_fee), Some(value))
            } else {
                (Some(value), value.checked_sub(forward_fee))
            };

            let priced = match (cost, delivered) {
                (Some(cost), Some(delivered)) if cost <= balance => Some((cost, delivered)),
                _ => None,
            };
            let Some((cost, delivered)) = priced else {
                if message.mode.contains(SendMode::IGNORE_ERRORS) {
                    debug!("Dropping unpayable message from {} to {}", from, message.to);
                    continue;
                }
                return Err(ExitCode::NOT_ENOUGH_BALANCE);
            };

            balance -= cost;
            fees += forward_fee;
            messages.push(QueuedMessage {
                from: from.clone(),
                to: message.to,
                value: delivered,
                body: message.body,
                init: message.state_init,
                bounce: message.bounce,
                bounced: false,
            });
        }

        Ok(Actions {
            balance,
            fees,
            messages,
        })
    }

    /// Return up to `value` to the sender of a failed bounceable message
    fn bounce(
        &mut self,
        account: &mut Account,
        message: &QueuedMessage,
        value: u128,
        tx: &mut Transaction,
    ) -> Result<(), SandboxError> {
        if !message.bounce || message.bounced {
            return Ok(());
        }

        let forward_fee = self.config.fees.forward_fee;
        let value = value.min(account.balance);
        if value <= forward_fee {
            debug!("Bounce from {} cannot pay its forward fee", account.address);
            return Ok(());
        }

        account.balance -= value;
        tx.total_fees += forward_fee;
        tx.out_messages += 1;
        self.state.fees_collected += forward_fee;
        self.queue.push_back(QueuedMessage {
            from: account.address.clone(),
            to: message.from.clone(),
            value: value - forward_fee,
            body: bounced_body(&message.body)?,
            init: None,
            bounce: false,
            bounced: true,
        });
        Ok(())
    }

    fn commit(&mut self, account: Account, tx: Transaction) {
        self.state.accounts.insert(account.address.clone(), account);
        self.record(tx);
    }

    fn record(&mut self, tx: Transaction) {
        if log_enabled!(Level::Debug) {
            debug!("{}", tx);
        }
        self.transactions.push(tx);
    }
}

/// `0xffffffff` followed by the first 256 bits of the original body
pub fn bounced_body(body: &Cell) -> Result<Cell, CellError> {
    let mut slice = body.as_slice();
    let mut builder = CellBuilder::new();
    builder.store_uint(OP_BOUNCED as u128, 32)?;

    let mut left = slice.remaining_bits().min(BOUNCED_BODY_BITS);
    while left > 0 {
        let chunk = left.min(64);
        builder.store_uint(slice.load_uint(chunk)?, chunk)?;
        left -= chunk;
    }
    Ok(builder.build())
}
