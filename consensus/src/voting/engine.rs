//! Voting engine - public entry point for combining strategy votes
//!
//! The engine validates the votes, consults the optional collaborators, and
//! runs the synchronous [`tally`] pipeline:
//!
//! ```text
//! votes → validate → adaptive weights → outlier filter → aggregate
//!       → strategy → tie-break → quality → metadata → validation
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use super::aggregation::aggregate_by_code;
use super::collaborators::{
    check_reweighted, AdaptiveWeightCalculator, CollaboratorError, ResultValidator,
};
use super::config::{ConfigError, VotingConfig};
use super::metadata::build_metadata;
use super::outliers::{filter_outliers, OutlierPartition};
use super::quality::{quality_indicators, score_quality};
use super::strategies::apply_strategy;
use super::tie_break::{break_ties, sort_by_confidence};
use crate::model::{StrategyVote, VotingResult};
use crate::otel;

/// Error type for voting operations
#[derive(Debug, thiserror::Error)]
pub enum VotingError {
    #[error("Not enough votes: got {got}, need {need}")]
    InsufficientVotes { got: usize, need: usize },

    #[error("Vote {index} has no strategy name")]
    MissingStrategyName { index: usize },

    #[error("Vote from {strategy} has no results")]
    EmptyResults { strategy: String },

    #[error("Vote from {strategy} has weight {weight} outside [0, 1]")]
    InvalidWeight { strategy: String, weight: f64 },

    #[error("Vote from {strategy} gives {code} confidence {confidence} outside [0, 1]")]
    InvalidConfidence {
        strategy: String,
        code: String,
        confidence: f64,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for voting operations
pub type EngineResult<T> = Result<T, VotingError>;

/// Shared reference to a VotingEngine
pub type SharedVotingEngine = Arc<VotingEngine>;

/// Stateless voting engine.
///
/// The only state is the configuration snapshot, replaced wholesale by
/// [`VotingEngine::reconfigure`]; each call reads one snapshot at entry.
pub struct VotingEngine {
    config: RwLock<Arc<VotingConfig>>,
    weight_calculator: Option<Arc<dyn AdaptiveWeightCalculator>>,
    validator: Option<Arc<dyn ResultValidator>>,
}

impl VotingEngine {
    /// Create an engine, rejecting an invalid configuration.
    pub fn new(config: VotingConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            weight_calculator: None,
            validator: None,
        })
    }

    /// Set the adaptive weight calculator
    pub fn with_weight_calculator(mut self, calculator: Arc<dyn AdaptiveWeightCalculator>) -> Self {
        self.weight_calculator = Some(calculator);
        self
    }

    /// Set the post-hoc result validator
    pub fn with_result_validator(mut self, validator: Arc<dyn ResultValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Create a shared reference to this engine
    pub fn shared(self) -> SharedVotingEngine {
        Arc::new(self)
    }

    /// Current configuration snapshot.
    pub async fn config(&self) -> Arc<VotingConfig> {
        self.config.read().await.clone()
    }

    /// Validate and atomically replace the configuration. Calls already in
    /// flight keep the snapshot they started with.
    pub async fn reconfigure(&self, config: VotingConfig) -> EngineResult<()> {
        config.validate()?;
        info!(strategy = %config.strategy, "Voting configuration replaced");
        *self.config.write().await = Arc::new(config);
        Ok(())
    }

    /// Combine the votes into one ranked, explainable result.
    ///
    /// Fails only on invalid input; collaborator failures fall back to the
    /// original weights or an unvalidated result.
    pub async fn conduct_voting(
        &self,
        cancel: &CancellationToken,
        votes: &[StrategyVote],
    ) -> EngineResult<VotingResult> {
        let started = Instant::now();
        let config = self.config().await;
        let span = otel::voting_span(&config.strategy.to_string(), votes.len());

        let outcome = self
            .run(cancel, &config, votes, started)
            .instrument(span.clone())
            .await;

        let label = match &outcome {
            Ok(result) if result.final_results.is_empty() => "no_consensus",
            Ok(_) => "ok",
            Err(_) => "rejected",
        };
        otel::record_voting_result(&span, label, started.elapsed().as_millis() as u64);
        outcome
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        config: &VotingConfig,
        votes: &[StrategyVote],
        started: Instant,
    ) -> EngineResult<VotingResult> {
        validate_votes(votes, config.min_voters)?;

        info!(
            votes = votes.len(),
            strategy = %config.strategy,
            "Starting voting"
        );

        let working = self.apply_adaptive_weights(cancel, votes).await;
        let mut result = tally(config, &working);
        self.apply_validation(cancel, &mut result, votes).await;

        result.metadata.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            results = result.final_results.len(),
            voting_score = result.voting_score,
            participating = result.participating_votes,
            "Voting complete"
        );
        Ok(result)
    }

    /// Re-weight votes, falling back to the originals on any failure.
    async fn apply_adaptive_weights(
        &self,
        cancel: &CancellationToken,
        votes: &[StrategyVote],
    ) -> Vec<StrategyVote> {
        let Some(calculator) = &self.weight_calculator else {
            return votes.to_vec();
        };

        let span = otel::collaborator_span(otel::COLLABORATOR_ADAPTIVE_WEIGHTS);
        let outcome = async {
            if cancel.is_cancelled() {
                return Err(CollaboratorError::Cancelled);
            }
            let reweighted = calculator.calculate_adaptive_weights(cancel, votes).await?;
            check_reweighted(votes, &reweighted)?;
            Ok(reweighted)
        }
        .instrument(span.clone())
        .await;

        otel::record_collaborator_result(&span, outcome.is_ok());
        match outcome {
            Ok(reweighted) => {
                debug!("Applied adaptive weights");
                reweighted
            }
            Err(e) => {
                warn!(error = %e, "Adaptive weight calculation failed, using original weights");
                votes.to_vec()
            }
        }
    }

    /// Append validation tags, leaving the result unvalidated on failure.
    async fn apply_validation(
        &self,
        cancel: &CancellationToken,
        result: &mut VotingResult,
        votes: &[StrategyVote],
    ) {
        let Some(validator) = &self.validator else {
            return;
        };

        let span = otel::collaborator_span(otel::COLLABORATOR_RESULT_VALIDATOR);
        let outcome = async {
            if cancel.is_cancelled() {
                return Err(CollaboratorError::Cancelled);
            }
            validator.validate_voting_result(cancel, result, votes).await
        }
        .instrument(span.clone())
        .await;

        otel::record_collaborator_result(&span, outcome.is_ok());
        match outcome {
            Ok(report) => {
                debug!(
                    is_valid = report.is_valid,
                    score = report.validation_score,
                    issues = report.issues.len(),
                    "Voting result validated"
                );
                result
                    .metadata
                    .quality_indicators
                    .extend(report.indicator_tags());
            }
            Err(e) => {
                warn!(error = %e, "Result validation failed, returning unvalidated result");
            }
        }
    }
}

/// Reject vote sets the engine cannot aggregate.
pub fn validate_votes(votes: &[StrategyVote], min_voters: usize) -> EngineResult<()> {
    if votes.len() < min_voters {
        return Err(VotingError::InsufficientVotes {
            got: votes.len(),
            need: min_voters,
        });
    }
    for (index, vote) in votes.iter().enumerate() {
        if vote.strategy_name.trim().is_empty() {
            return Err(VotingError::MissingStrategyName { index });
        }
        if vote.results.is_empty() {
            return Err(VotingError::EmptyResults {
                strategy: vote.strategy_name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&vote.weight) {
            return Err(VotingError::InvalidWeight {
                strategy: vote.strategy_name.clone(),
                weight: vote.weight,
            });
        }
        // Range check also rejects NaN.
        if let Some(bad) = vote
            .results
            .iter()
            .find(|r| !(0.0..=1.0).contains(&r.confidence))
        {
            return Err(VotingError::InvalidConfidence {
                strategy: vote.strategy_name.clone(),
                code: bad.code.to_string(),
                confidence: bad.confidence,
            });
        }
    }
    Ok(())
}

/// Run the synchronous part of the pipeline over already-validated votes.
///
/// Deterministic: identical inputs give identical results apart from
/// `metadata.processing_time_ms`.
pub fn tally(config: &VotingConfig, votes: &[StrategyVote]) -> VotingResult {
    let started = Instant::now();

    let partition = if config.enable_outlier_filtering {
        filter_outliers(votes, config.outlier_threshold)
    } else {
        OutlierPartition::keep_all(votes)
    };

    let aggregations = aggregate_by_code(&partition.kept);
    let mut final_results = apply_strategy(config, &aggregations, partition.kept.len());

    let tie_breaking_applied = config.enable_tie_breaking && break_ties(&mut final_results);
    sort_by_confidence(&mut final_results);

    let scores = score_quality(&aggregations, config);
    let indicators = quality_indicators(
        &scores,
        partition.excluded.len(),
        tie_breaking_applied,
        final_results.len(),
    );
    let metadata = build_metadata(
        votes,
        &partition,
        tie_breaking_applied,
        started.elapsed(),
        indicators,
    );

    VotingResult {
        final_results,
        voting_score: scores.voting_score,
        agreement: scores.agreement,
        consistency: scores.consistency,
        diversity: scores.diversity,
        participating_votes: partition.kept.len(),
        voting_strategy: config.strategy,
        metadata,
    }
}
