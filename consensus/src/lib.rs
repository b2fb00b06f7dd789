//! Industry Consensus Library
//!
//! Combines conflicting, differently-confident industry-code votes
//! (MCC, SIC, NAICS) from independent classification strategies into one
//! ranked, explainable classification.
//!
//! # Features
//!
//! - Five aggregation algorithms: majority, weighted average, Borda count,
//!   consensus threshold and rank aggregation
//! - z-score outlier rejection on strategy confidence
//! - Deterministic tie breaking
//! - Agreement, consistency and diversity scoring with an audit trail
//! - Optional adaptive re-weighting and post-hoc validation collaborators,
//!   whose failures never abort a vote

#![allow(clippy::uninlined_format_args)]

pub mod model;
pub mod otel;
pub mod voting;

// Re-export key model types
pub use model::{
    ClassificationResult, CodeType, IndustryCode, StrategyVote, StrategyVoteSummary,
    VotingMetadata, VotingResult,
};

// Re-export key voting types
pub use voting::{
    AdaptiveWeightCalculator, CollaboratorError, ResultValidator, SharedVotingEngine,
    ValidationReport, VotingConfig, VotingEngine, VotingError, VotingStrategy,
};
