//! DSL scenario parser and executor
//!
//! Parses YAML scenario files:
//! - coin amounts as decimal strings (`"0.2"`) or whole coin integers
//! - participants named `collection`, `item:<index>` or a treasury name
//! - `within {target, tolerance}` and `compare {gte|lte|gt|lt}` balance assertions
//! - partial transaction expectations, with `absent: true` for negative ones
//!
//! ## Example Scenario
//!
//! ```yaml
//! name: "Mint and transfer"
//! description: "User mints item 0 and hands it to the deployer"
//! genesis:
//!   treasuries:
//!     - name: "deployer"
//!     - name: "user"
//!   collection:
//!     owner: "deployer"
//!     content:
//!       type: offchain
//!       uri: "https://example.com/c/"
//!     royalty:
//!       numerator: 350
//!       denominator: 1000
//!       destination: "deployer"
//! steps:
//!   - action: "send"
//!     from: "user"
//!     to: "collection"
//!     value: "1"
//!     message:
//!       type: mint
//!     expect:
//!       - { from: "collection", to: "item:0", deploy: true, success: true }
//!   - action: "send"
//!     from: "user"
//!     to: "item:0"
//!     value: "0.2"
//!     message:
//!       type: transfer
//!       new_owner: "deployer"
//!       response_destination: "user"
//!   - action: "assert_nft_data"
//!     item: 0
//!     owner: "deployer"
//!   - action: "assert_balance"
//!     account: "user"
//!     compare:
//!       lt: "1000000"
//! invariants:
//!   - "value_conservation"
//!   - "mint_monotonicity"
//! ```

pub mod executor;
pub mod parser;

pub use executor::{ExecutionReport, ScenarioExecutor};
pub use parser::{parse_scenario, TestScenario};
