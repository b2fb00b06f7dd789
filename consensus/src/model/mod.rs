//! Industry-code data model shared by strategies, the engine and callers

pub mod types;

pub use types::{
    clamp_unit, ClassificationResult, CodeKey, CodeType, IndustryCode, StrategyVote,
    StrategyVoteSummary, VotingMetadata, VotingResult, KNOWN_CODE_SYSTEMS,
};
