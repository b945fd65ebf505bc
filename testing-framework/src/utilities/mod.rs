// File: testing-framework/src/utilities/mod.rs
//
// Testing Utilities
//
// Helpers shared by sandbox tests and the scenario runner: coin amount
// serde adapters and failure artifact capture and replay.

/// Serde adapters for coin amounts written as decimal strings
pub mod coins;

/// Failure artifact collection for test debugging and reproduction
pub mod artifacts;

/// Artifact replay utilities for reproducing test failures
pub mod replay;

// Re-export commonly used utilities
pub use artifacts::{ArtifactCollector, TestArtifact};
pub use replay::{get_replay_command, load_artifact, print_artifact_summary, validate_artifact};
