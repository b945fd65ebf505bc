// Contract Runtime Interface
// Types shared between contract logic and the ledger that executes it.

mod executor;
mod message;
mod state_init;
mod wallet;

pub use executor::*;
pub use message::*;
pub use state_init::*;
pub use wallet::*;
