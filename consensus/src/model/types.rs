//! Core data types for industry-code voting
//!
//! These types cross the engine boundary: strategies produce
//! [`StrategyVote`]s, the engine returns a [`VotingResult`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of industry code systems the engine knows about.
pub const KNOWN_CODE_SYSTEMS: usize = 3;

/// Industry classification code system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CodeType {
    /// Merchant Category Code
    Mcc,
    /// Standard Industrial Classification
    Sic,
    /// North American Industry Classification System
    Naics,
}

impl std::fmt::Display for CodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mcc => write!(f, "MCC"),
            Self::Sic => write!(f, "SIC"),
            Self::Naics => write!(f, "NAICS"),
        }
    }
}

/// A standardized industry code, identified by `(code_type, code)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndustryCode {
    pub code_type: CodeType,
    pub code: String,
    pub description: String,
}

/// Aggregation key for an industry code.
pub type CodeKey = (CodeType, String);

impl IndustryCode {
    pub fn new(code_type: CodeType, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code_type,
            code: code.into(),
            description: description.into(),
        }
    }

    /// Identity key, ignoring the description.
    pub fn key(&self) -> CodeKey {
        (self.code_type, self.code.clone())
    }
}

impl std::fmt::Display for IndustryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.code_type, self.code)
    }
}

/// A single ranked candidate code.
///
/// Strategies fill `code` and `confidence`; the engine fills the remaining
/// fields on its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub code: IndustryCode,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Label of the algorithm that produced this result
    #[serde(default)]
    pub match_type: String,
    /// Labels explaining the match (contributing strategy names)
    #[serde(default)]
    pub matched_on: Vec<String>,
    /// Human-readable reasons
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub weight: f64,
}

impl ClassificationResult {
    /// Create a candidate with only a code and a confidence.
    pub fn candidate(code: IndustryCode, confidence: f64) -> Self {
        Self {
            code,
            confidence,
            match_type: String::new(),
            matched_on: Vec::new(),
            reasons: Vec::new(),
            weight: 0.0,
        }
    }
}

/// One strategy's ranked vote for a single classification request.
///
/// `results[0]` is the strategy's top pick; rank is the position in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVote {
    pub strategy_name: String,
    pub results: Vec<ClassificationResult>,
    /// Strategy weight in [0, 1]
    pub weight: f64,
    /// The strategy's self-reported confidence in this vote as a whole
    pub confidence: f64,
    pub vote_time: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl StrategyVote {
    /// Create a new vote timestamped now.
    pub fn new(
        strategy_name: impl Into<String>,
        results: Vec<ClassificationResult>,
        weight: f64,
        confidence: f64,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            results,
            weight,
            confidence,
            vote_time: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The strategy's top-ranked result, if any.
    pub fn top_result(&self) -> Option<&ClassificationResult> {
        self.results.first()
    }

    /// Mean confidence across this vote's results (0.0 when empty).
    pub fn average_result_confidence(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().map(|r| r.confidence).sum::<f64>() / self.results.len() as f64
    }
}

/// Per-strategy summary in the voting audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVoteSummary {
    pub strategy_name: String,
    /// Top code voted, e.g. `MCC-5812`
    pub top_code: Option<String>,
    pub average_confidence: f64,
    pub results_count: usize,
    pub weight: f64,
    /// Whether the outlier filter excluded this vote
    pub excluded: bool,
}

/// Human-auditable summary of a voting run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VotingMetadata {
    pub vote_breakdown: Vec<StrategyVoteSummary>,
    /// Pairwise strategy agreement (Jaccard overlap of proposed codes)
    pub agreement_matrix: BTreeMap<String, BTreeMap<String, f64>>,
    /// Strategy names excluded as confidence outliers
    pub outliers_detected: Vec<String>,
    pub tie_breaking_applied: bool,
    pub processing_time_ms: u64,
    pub quality_indicators: Vec<String>,
}

/// Final output of a voting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingResult {
    /// Ranked results, confidence descending
    pub final_results: Vec<ClassificationResult>,
    pub voting_score: f64,
    pub agreement: f64,
    pub consistency: f64,
    pub diversity: f64,
    pub participating_votes: usize,
    pub voting_strategy: crate::voting::VotingStrategy,
    pub metadata: VotingMetadata,
}

impl VotingResult {
    /// Top-ranked result, if any code survived voting.
    pub fn top(&self) -> Option<&ClassificationResult> {
        self.final_results.first()
    }

    /// Whether the given code appears in the final results.
    pub fn contains(&self, code_type: CodeType, code: &str) -> bool {
        self.final_results
            .iter()
            .any(|r| r.code.code_type == code_type && r.code.code == code)
    }
}

/// Clamp a score to [0, 1], mapping non-finite values to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
