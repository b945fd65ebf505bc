#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//! Standalone test for scenarios parser
//!
//! Tests parser functionality independently of the sandbox ledger

use nft_testing_framework::scenarios::{
    parse_scenario,
    parser::{MessageSpec, Step},
};

#[test]
fn test_parse_simple_scenario() {
    let yaml = r#"
name: "Test Scenario"
description: "A simple mint"
genesis:
  treasuries:
    - name: "alice"
  collection:
    owner: "alice"
    content: { type: offchain, uri: "https://example.com/c/" }
    royalty: { numerator: 1, denominator: 10, destination: "alice" }
steps:
  - action: "send"
    from: "alice"
    to: "collection"
    value: "1"
    message: { type: mint }
  - action: "assert_collection_data"
    next_item_index: 1
  - action: "assert_balance"
    account: "alice"
    compare:
      gt: "999998"
invariants:
  - "value_conservation"
"#;

    let scenario = parse_scenario(yaml).expect("Failed to parse");
    assert_eq!(scenario.name, "Test Scenario");
    assert_eq!(scenario.genesis.treasuries.len(), 1);
    assert_eq!(scenario.steps.len(), 3);
    assert!(matches!(
        &scenario.steps[0],
        Step::Send {
            message: MessageSpec::Mint,
            ..
        }
    ));
}

#[test]
fn test_parse_all_scenarios() {
    let scenarios = vec![
        include_str!("../scenarios/mint_and_transfer.yaml"),
        include_str!("../scenarios/unauthorized_transfer.yaml"),
        include_str!("../scenarios/editorship_and_content.yaml"),
    ];

    for (idx, yaml) in scenarios.iter().enumerate() {
        match parse_scenario(yaml) {
            Ok(scenario) => {
                println!(
                    "✓ Scenario {}: {} parsed successfully",
                    idx + 1,
                    scenario.name
                );
            }
            Err(e) => {
                panic!("Failed to parse scenario {}: {:#}", idx + 1, e);
            }
        }
    }
}

#[test]
fn test_validation_errors() {
    // Duplicate treasuries
    let bad_yaml1 = r#"
name: "Bad"
genesis:
  treasuries:
    - name: "alice"
    - name: "alice"
steps:
  - action: "advance_time"
    seconds: 1
"#;
    assert!(parse_scenario(bad_yaml1).is_err());

    // Unknown sender
    let bad_yaml2 = r#"
name: "Bad"
genesis:
  treasuries:
    - name: "alice"
  collection:
    owner: "alice"
    content: { type: offchain, uri: "https://example.com/c/" }
    royalty: { numerator: 1, denominator: 10, destination: "alice" }
steps:
  - action: "send"
    from: "charlie"
    to: "collection"
    value: "1"
    message: { type: mint }
"#;
    assert!(parse_scenario(bad_yaml2).is_err());

    // Royalty numerator above denominator
    let bad_yaml3 = r#"
name: "Bad"
genesis:
  treasuries:
    - name: "alice"
  collection:
    owner: "alice"
    content: { type: offchain, uri: "https://example.com/c/" }
    royalty: { numerator: 11, denominator: 10, destination: "alice" }
steps:
  - action: "advance_time"
    seconds: 1
"#;
    assert!(parse_scenario(bad_yaml3).is_err());

    // Empty steps
    let bad_yaml4 = r#"
name: "Bad"
genesis:
  treasuries:
    - name: "alice"
steps: []
"#;
    assert!(parse_scenario(bad_yaml4).is_err());

    // Unknown invariant
    let bad_yaml5 = r#"
name: "Bad"
genesis:
  treasuries:
    - name: "alice"
steps:
  - action: "advance_time"
    seconds: 1
invariants:
  - "nonce_monotonicity"
"#;
    assert!(parse_scenario(bad_yaml5).is_err());
}
