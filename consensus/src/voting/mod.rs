//! Voting/consensus engine for industry-code classification
//!
//! Several independent classification strategies (keyword, ML, similarity,
//! security heuristics) each cast one ranked vote of candidate codes. This
//! module combines those votes into a single ranked result with quality
//! metrics and an audit trail.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      VotingEngine                          │
//! │  • Validates votes, snapshots config                       │
//! │  • Consults AdaptiveWeightCalculator / ResultValidator     │
//! └─────────────────────────┬─────────────────────────────────┘
//!                           │ tally()
//!       ┌──────────┬────────┼─────────┬──────────┬──────────┐
//!       ▼          ▼        ▼         ▼          ▼          ▼
//!   Outlier    Code      Strategy   Tie       Quality    Metadata
//!   Filter     Aggregator Algorithms Breaker   Scorer     Builder
//! ```
//!
//! # Strategies
//!
//! - **Majority**: codes proposed by at least half of the voters
//! - **WeightedAverage**: weight-scaled confidence plus an agreement bonus
//! - **BordaCount**: rank-position points summed across voters
//! - **Consensus**: codes whose contributors agree above a threshold
//! - **RankAggregation**: lowest average rank first
//!
//! # Usage
//!
//! ```ignore
//! use industry_consensus::voting::{VotingConfig, VotingEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = VotingEngine::new(VotingConfig::from_env()?)?.shared();
//! let result = engine.conduct_voting(&CancellationToken::new(), &votes).await?;
//! println!("Top code: {:?}", result.top());
//! ```

pub mod aggregation;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod metadata;
pub mod outliers;
pub mod quality;
pub mod strategies;
pub mod tie_break;

pub use aggregation::{aggregate_by_code, CodeVoteAggregation, VoteContribution};
pub use collaborators::{
    AdaptiveWeightCalculator, CollaboratorError, CollaboratorResult, ResultValidator,
    ValidationReport,
};
pub use config::{ConfigError, ConfigResult, VotingConfig, VotingStrategy};
pub use engine::{tally, validate_votes, EngineResult, SharedVotingEngine, VotingEngine, VotingError};
pub use outliers::{filter_outliers, OutlierPartition};
pub use quality::QualityScores;
