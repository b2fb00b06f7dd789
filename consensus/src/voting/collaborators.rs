//! External collaborators consulted during a voting run
//!
//! Both collaborators are optional and their failures are never fatal: the
//! engine logs the error and continues with its documented fallback.
//!
//! Implementations must be `Send + Sync`. Any state they keep across calls
//! (for example a rolling per-strategy performance history) must be
//! synchronized by the implementation itself; the engine may call them from
//! many tasks at once.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::model::{StrategyVote, VotingResult};

/// Error returned by a collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Collaborator call cancelled")]
    Cancelled,

    #[error("Collaborator failed: {0}")]
    Failed(String),

    #[error("Malformed collaborator output: {0}")]
    MalformedOutput(String),
}

/// Result type for collaborator calls
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Recomputes per-strategy weights for a vote set.
#[async_trait]
pub trait AdaptiveWeightCalculator: Send + Sync {
    /// Return the same votes, in the same order, with adjusted `weight`s.
    async fn calculate_adaptive_weights(
        &self,
        cancel: &CancellationToken,
        votes: &[StrategyVote],
    ) -> CollaboratorResult<Vec<StrategyVote>>;
}

/// Outcome of post-hoc validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub validation_score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Quality-indicator tags describing this report.
    pub fn indicator_tags(&self) -> Vec<String> {
        let mut tags = vec![format!("validation_score:{:.3}", self.validation_score)];
        if !self.is_valid {
            tags.push("validation_failed".to_string());
        }
        if !self.issues.is_empty() {
            tags.push(format!("validation_issues:{}", self.issues.len()));
        }
        if !self.warnings.is_empty() {
            tags.push(format!("validation_warnings:{}", self.warnings.len()));
        }
        tags
    }
}

/// Checks a finished voting result against the votes that produced it.
#[async_trait]
pub trait ResultValidator: Send + Sync {
    async fn validate_voting_result(
        &self,
        cancel: &CancellationToken,
        result: &VotingResult,
        votes: &[StrategyVote],
    ) -> CollaboratorResult<ValidationReport>;
}

/// Check that re-weighted votes have the shape of the originals.
pub(crate) fn check_reweighted(
    original: &[StrategyVote],
    reweighted: &[StrategyVote],
) -> CollaboratorResult<()> {
    if original.len() != reweighted.len() {
        return Err(CollaboratorError::MalformedOutput(format!(
            "expected {} votes, got {}",
            original.len(),
            reweighted.len()
        )));
    }
    for (before, after) in original.iter().zip(reweighted) {
        if before.strategy_name != after.strategy_name {
            return Err(CollaboratorError::MalformedOutput(format!(
                "vote order changed: expected {}, got {}",
                before.strategy_name, after.strategy_name
            )));
        }
        if !(0.0..=1.0).contains(&after.weight) {
            return Err(CollaboratorError::MalformedOutput(format!(
                "weight {} for {} is outside [0, 1]",
                after.weight, after.strategy_name
            )));
        }
        if after.results.is_empty() {
            return Err(CollaboratorError::MalformedOutput(format!(
                "results for {} were dropped",
                after.strategy_name
            )));
        }
    }
    Ok(())
}
