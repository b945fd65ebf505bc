//! Scenarios Demo
//!
//! Runs YAML scenario files against a fresh sandbox ledger each:
//! - parsing and validating the scenario
//! - executing its steps and invariants
//! - saving a failure artifact when a scenario fails
//!
//! Run with: cargo run --example scenarios_demo -- scenarios/mint_and_transfer.yaml
//!
//! Without arguments every file under `scenarios/` runs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nft_testing_framework::{
    scenarios::{parse_scenario, ScenarioExecutor},
    utilities::{print_artifact_summary, ArtifactCollector},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("=== NFT Testing Framework - Scenarios Demo ===\n");

    let mut paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        paths = scenario_files(Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios")).await?;
    }

    let mut failed = 0;
    for path in &paths {
        if let Err(err) = run(path).await {
            println!("✗ {}: {:#}\n", path.display(), err);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} scenarios failed", failed, paths.len());
    }
    println!("\n=== All {} Scenarios Passed ===", paths.len());
    Ok(())
}

async fn scenario_files(dir: PathBuf) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "yaml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn run(path: &Path) -> Result<()> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let scenario = parse_scenario(&yaml)?;
    println!("Running '{}' ({} steps)", scenario.name, scenario.steps.len());

    let mut executor = ScenarioExecutor::new();
    match executor.execute(scenario).await {
        Ok(report) => {
            report.print();
            Ok(())
        }
        Err(err) => {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scenario".to_string());
            let mut collector = ArtifactCollector::new(name);
            collector.set_failure_reason(format!("{:#}", err));
            collector.add_transactions(executor.transactions());
            if let Some(blockchain) = executor.ledger() {
                collector.capture_ledger(blockchain).await;
            }
            let saved = collector.save("./artifacts/").await?;
            print_artifact_summary(&collector.artifact());
            println!("Artifact saved to {}", saved.display());
            Err(err)
        }
    }
}
