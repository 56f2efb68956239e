//! Internal stage errors
//!
//! A failing stage never aborts a grouping call; the orchestrator logs the
//! error and treats the stage as having produced no groups.

use thiserror::Error;

/// Failure of a single matcher stage.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("seed matching failed: {0}")]
    Seed(String),

    #[error("pattern matching failed: {0}")]
    Pattern(String),

    #[error("normalization grouping failed: {0}")]
    Exact(String),

    #[error("abbreviation matching failed: {0}")]
    Abbreviation(String),

    #[error("similarity clustering failed: {0}")]
    Similarity(String),
}
