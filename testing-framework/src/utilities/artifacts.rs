// File: testing-framework/src/utilities/artifacts.rs
//
// Failure Artifact Collection System
//
// Captures the ledger state, the transactions of a failing test and its
// log lines into one JSON file, so a failure can be inspected after the run.

use anyhow::{Context, Result};
use nft_common::utils::from_nano;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::sandbox::{Blockchain, LedgerSnapshot, Transaction};

/// Complete test failure artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestArtifact {
    /// Test metadata
    pub metadata: TestMetadata,
    /// Ledger balances and fee accounting at capture time
    pub ledger: Option<LedgerSnapshot>,
    /// Transactions in execution order
    pub transactions: Vec<Transaction>,
    /// Captured logs
    pub logs: Vec<LogEntry>,
}

/// Test metadata for reproduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Test name
    pub test_name: String,
    /// Sandbox config file the test ran with (if any)
    pub config_path: Option<String>,
    /// Timestamp when the artifact was created
    pub timestamp: String,
    /// Test duration (milliseconds)
    pub duration_ms: u64,
    /// Failure reason (if available)
    pub failure_reason: Option<String>,
}

/// Log entry captured during test execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,
    /// Log message
    pub message: String,
    /// Timestamp
    pub timestamp: String,
}

/// Artifact collector for capturing test failure state
///
/// # Examples
///
/// ```rust,ignore
/// use nft_testing_framework::utilities::artifacts::ArtifactCollector;
///
/// let mut collector = ArtifactCollector::new("test_transfer_chain");
/// let result = item.send(&user, to_nano("0.2")?, transfer).await?;
/// collector.add_transactions(&result.transactions);
///
/// if let Err(e) = check_owner(&item).await {
///     collector.capture_ledger(&blockchain).await;
///     collector.set_failure_reason(format!("{:?}", e));
///     collector.save("./artifacts/").await?;
/// }
/// ```
pub struct ArtifactCollector {
    metadata: TestMetadata,
    ledger: Option<LedgerSnapshot>,
    transactions: Vec<Transaction>,
    logs: Vec<LogEntry>,
    start_time: std::time::Instant,
}

impl ArtifactCollector {
    /// Create a new artifact collector for a test
    ///
    /// Records the sandbox config path from `NFT_SANDBOX_CONFIG` when set.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            metadata: TestMetadata {
                test_name: test_name.into(),
                config_path: std::env::var(crate::sandbox::CONFIG_ENV_VAR).ok(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                duration_ms: 0,
                failure_reason: None,
            },
            ledger: None,
            transactions: Vec::new(),
            logs: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Set the failure reason
    pub fn set_failure_reason(&mut self, reason: String) {
        self.metadata.failure_reason = Some(reason);
    }

    /// Snapshot balances and fee accounting of `blockchain`
    pub async fn capture_ledger(&mut self, blockchain: &Blockchain) {
        self.ledger = Some(blockchain.snapshot().await);
    }

    /// Append transactions to the history
    pub fn add_transactions(&mut self, transactions: &[Transaction]) {
        self.transactions.extend_from_slice(transactions);
    }

    /// Capture a log entry
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nft_testing_framework::utilities::artifacts::ArtifactCollector;
    ///
    /// let mut collector = ArtifactCollector::new("test_name");
    /// collector.capture_log("ERROR", "Transfer bounced");
    /// collector.capture_log("INFO", "Minted item 2");
    /// ```
    pub fn capture_log(&mut self, level: impl Into<String>, message: impl Into<String>) {
        self.logs.push(LogEntry {
            level: level.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Build the artifact from everything collected so far
    pub fn artifact(&self) -> TestArtifact {
        let mut metadata = self.metadata.clone();
        metadata.duration_ms = self.start_time.elapsed().as_millis() as u64;
        TestArtifact {
            metadata,
            ledger: self.ledger.clone(),
            transactions: self.transactions.clone(),
            logs: self.logs.clone(),
        }
    }

    /// Save artifact to disk
    ///
    /// Creates a JSON file named after the test and the current time in
    /// `output_dir`, creating the directory if needed. Returns its path.
    pub async fn save(&mut self, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let artifact = self.artifact();

        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)
            .await
            .context("Failed to create artifact directory")?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.json", self.metadata.test_name, timestamp);
        let filepath = output_dir.join(filename);

        let json = serde_json::to_string_pretty(&artifact).context("Failed to serialize artifact")?;

        let mut file = fs::File::create(&filepath)
            .await
            .context("Failed to create artifact file")?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write artifact data")?;
        file.flush().await.context("Failed to flush artifact file")?;

        Ok(filepath)
    }

    /// Load artifact from disk
    pub async fn load(filepath: impl AsRef<Path>) -> Result<TestArtifact> {
        let filepath = filepath.as_ref();
        let content = fs::read_to_string(filepath)
            .await
            .with_context(|| format!("Failed to read artifact file {}", filepath.display()))?;

        let artifact: TestArtifact = serde_json::from_str(&content).context("Failed to parse artifact JSON")?;

        Ok(artifact)
    }
}

impl TestArtifact {
    /// Sum of all balances in the captured ledger, in coins
    pub fn total_balance(&self) -> Option<String> {
        self.ledger
            .as_ref()
            .map(|ledger| from_nano(ledger.balances.values().sum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::{BlockchainBuilder, SandboxConfig};

    #[test]
    fn test_artifact_collector_creation() {
        let collector = ArtifactCollector::new("test_example");
        assert_eq!(collector.metadata.test_name, "test_example");
        assert!(collector.metadata.failure_reason.is_none());
        assert!(collector.ledger.is_none());
    }

    #[test]
    fn test_capture_log() {
        let mut collector = ArtifactCollector::new("test_example");
        collector.capture_log("ERROR", "Test error message");
        collector.capture_log("INFO", "Test info message");

        assert_eq!(collector.logs.len(), 2);
        assert_eq!(collector.logs[0].level, "ERROR");
        assert_eq!(collector.logs[1].level, "INFO");
    }

    #[tokio::test]
    async fn test_save_and_load_artifact() -> Result<()> {
        let blockchain = BlockchainBuilder::new()
            .with_config(SandboxConfig::default())
            .with_treasury("deployer")
            .build()
            .await?;

        let temp_dir = tempfile::tempdir()?;
        let mut collector = ArtifactCollector::new("test_save_load");
        collector.capture_ledger(&blockchain).await;
        collector.set_failure_reason("Owner mismatch".to_string());
        collector.capture_log("ERROR", "Test log");

        let filepath = collector.save(temp_dir.path()).await?;
        assert!(filepath.exists());

        let loaded = ArtifactCollector::load(&filepath).await?;
        assert_eq!(loaded.metadata.test_name, "test_save_load");
        assert_eq!(loaded.metadata.failure_reason, Some("Owner mismatch".to_string()));
        assert_eq!(loaded.logs.len(), 1);
        assert_eq!(loaded.ledger, Some(blockchain.snapshot().await));
        assert_eq!(loaded.total_balance(), Some("1000000".to_string()));

        Ok(())
    }
}
