// File: testing-framework/src/utilities/replay.rs
//
// Artifact Replay Utilities
//
// Loading, summarizing and validating saved failure artifacts.

use super::artifacts::{ArtifactCollector, TestArtifact};
use anyhow::{bail, Result};
use nft_common::utils::from_nano;
use std::path::Path;

/// Load artifact from disk
pub async fn load_artifact(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
    ArtifactCollector::load(filepath).await
}

/// Human-readable summary of an artifact
///
/// ```rust,ignore
/// let artifact = load_artifact("./artifacts/test_transfer_20261019_101500.json").await?;
/// println!("{}", artifact_summary(&artifact));
/// ```
pub fn artifact_summary(artifact: &TestArtifact) -> String {
    let mut lines = vec![
        "TEST FAILURE ARTIFACT SUMMARY".to_string(),
        format!("Test Name:     {}", artifact.metadata.test_name),
        format!("Timestamp:     {}", artifact.metadata.timestamp),
        format!("Duration:      {} ms", artifact.metadata.duration_ms),
    ];

    if let Some(reason) = &artifact.metadata.failure_reason {
        lines.push("FAILURE REASON:".to_string());
        lines.extend(textwrap::wrap(reason, 62).into_iter().map(|line| format!("  {}", line)));
    }

    if let Some(ledger) = &artifact.ledger {
        lines.push(format!(
            "Ledger:        {} accounts, lt={}, fees={}, minted={}",
            ledger.balances.len(),
            ledger.lt,
            from_nano(ledger.fees_collected),
            from_nano(ledger.total_minted)
        ));
    }
    lines.push(format!("Transactions:  {} recorded", artifact.transactions.len()));
    for (i, tx) in artifact.transactions.iter().enumerate().filter(|(_, tx)| !tx.success) {
        lines.push(format!("  failed [{}]:", i));
        lines.extend(
            textwrap::wrap(&tx.to_string(), 60)
                .into_iter()
                .map(|line| format!("    {}", line)),
        );
    }

    if !artifact.logs.is_empty() {
        lines.push("RECENT LOGS (last 5):".to_string());
        for log in artifact.logs.iter().rev().take(5).rev() {
            lines.push(format!("  [{:5}] {}", log.level, log.message));
        }
    }

    lines.push(format!("REPLAY: {}", get_replay_command(artifact)));
    lines.join("\n")
}

/// Print artifact summary to stdout
pub fn print_artifact_summary(artifact: &TestArtifact) {
    println!("{}", artifact_summary(artifact));
}

/// Shell command that reruns the failed test with the same sandbox config
pub fn get_replay_command(artifact: &TestArtifact) -> String {
    match &artifact.metadata.config_path {
        Some(path) => format!(
            "{}={} cargo test {}",
            crate::sandbox::CONFIG_ENV_VAR,
            path,
            artifact.metadata.test_name
        ),
        None => format!("cargo test {}", artifact.metadata.test_name),
    }
}

/// Validate artifact integrity
///
/// Checks required metadata and, when a ledger snapshot is present, that
/// balances plus collected fees equal the minted value.
pub fn validate_artifact(artifact: &TestArtifact) -> Result<()> {
    if artifact.metadata.test_name.is_empty() {
        bail!("Artifact has empty test name");
    }
    if artifact.metadata.timestamp.is_empty() {
        bail!("Artifact has empty timestamp");
    }

    if let Some(ledger) = &artifact.ledger {
        if ledger.accounted_value() != ledger.total_minted {
            bail!(
                "Ledger value mismatch: minted={}, balances+fees={}",
                ledger.total_minted,
                ledger.accounted_value()
            );
        }
    }

    if !artifact.transactions.windows(2).all(|pair| pair[0].lt < pair[1].lt) {
        bail!("Transactions are not ordered by logical time");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sandbox::LedgerSnapshot,
        utilities::artifacts::{LogEntry, TestMetadata},
    };
    use indexmap::IndexMap;
    use nft_common::crypto::{Address, Hash};

    fn artifact(config_path: Option<&str>) -> TestArtifact {
        TestArtifact {
            metadata: TestMetadata {
                test_name: "test_example".to_string(),
                config_path: config_path.map(str::to_string),
                timestamp: "2026-10-19T12:00:00Z".to_string(),
                duration_ms: 1000,
                failure_reason: Some("Owner mismatch after transfer".to_string()),
            },
            ledger: Some(LedgerSnapshot {
                balances: IndexMap::from([(Address::new(0, Hash::zero()), 95)]),
                fees_collected: 5,
                total_minted: 100,
                lt: 4,
            }),
            transactions: vec![],
            logs: vec![LogEntry {
                level: "ERROR".to_string(),
                message: "bounced".to_string(),
                timestamp: "2026-10-19T12:00:00Z".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_load_artifact() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("test_load");

        let filepath = collector.save(temp_dir.path()).await?;
        let loaded = load_artifact(&filepath).await?;

        assert_eq!(loaded.metadata.test_name, "test_load");
        validate_artifact(&loaded)?;
        Ok(())
    }

    #[test]
    fn test_replay_command() {
        assert_eq!(get_replay_command(&artifact(None)), "cargo test test_example");
        assert_eq!(
            get_replay_command(&artifact(Some("fees.yaml"))),
            "NFT_SANDBOX_CONFIG=fees.yaml cargo test test_example"
        );
    }

    #[test]
    fn test_summary_mentions_failure() {
        let summary = artifact_summary(&artifact(None));
        assert!(summary.contains("Owner mismatch after transfer"));
        assert!(summary.contains("[ERROR] bounced"));
        assert!(summary.contains("REPLAY: cargo test test_example"));
    }

    #[test]
    fn test_validate_artifact() {
        assert!(validate_artifact(&artifact(None)).is_ok());

        let mut broken = artifact(None);
        if let Some(ledger) = broken.ledger.as_mut() {
            ledger.fees_collected = 0;
        }
        assert!(validate_artifact(&broken).is_err());

        let mut unnamed = artifact(None);
        unnamed.metadata.test_name.clear();
        assert!(validate_artifact(&unnamed).is_err());
    }
}
