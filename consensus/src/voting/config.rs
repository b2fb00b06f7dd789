//! Voting configuration
//!
//! A [`VotingConfig`] is an immutable snapshot handed to the engine at
//! construction. It can be built from defaults, a TOML file, and
//! environment overrides, in that order of precedence.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `CONSENSUS_STRATEGY` | `weighted_average` | Aggregation algorithm |
//! | `CONSENSUS_MIN_VOTERS` | `2` | Minimum votes required |
//! | `CONSENSUS_REQUIRED_AGREEMENT` | `0.5` | Consensus inclusion threshold |
//! | `CONSENSUS_CONFIDENCE_WEIGHT` | `0.4` | Agreement share of the voting score |
//! | `CONSENSUS_CONSISTENCY_WEIGHT` | `0.3` | Consistency share of the voting score |
//! | `CONSENSUS_DIVERSITY_WEIGHT` | `0.3` | Diversity share of the voting score |
//! | `CONSENSUS_TIE_BREAKING_ENABLED` | `true` | Tie breaker toggle |
//! | `CONSENSUS_OUTLIER_FILTERING_ENABLED` | `true` | Outlier filter toggle |
//! | `CONSENSUS_OUTLIER_THRESHOLD` | `2.0` | z-score cutoff |

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error type for configuration loading and validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported voting strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Aggregation algorithm used to turn per-code aggregations into results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStrategy {
    /// Codes proposed by at least half of the voters
    Majority,
    /// Weight-scaled confidence with an agreement bonus
    WeightedAverage,
    /// Rank-position points summed across voters
    BordaCount,
    /// Codes whose contributors agree above a threshold
    Consensus,
    /// Average rank position across voters
    RankAggregation,
}

impl VotingStrategy {
    pub const ALL: [VotingStrategy; 5] = [
        Self::Majority,
        Self::WeightedAverage,
        Self::BordaCount,
        Self::Consensus,
        Self::RankAggregation,
    ];

    /// Label written into `ClassificationResult::match_type`.
    pub fn match_type(&self) -> &'static str {
        match self {
            Self::Majority => "majority_vote",
            Self::WeightedAverage => "weighted_average",
            Self::BordaCount => "borda_count",
            Self::Consensus => "consensus",
            Self::RankAggregation => "rank_aggregation",
        }
    }
}

impl std::fmt::Display for VotingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Majority => write!(f, "majority"),
            Self::WeightedAverage => write!(f, "weighted_average"),
            Self::BordaCount => write!(f, "borda_count"),
            Self::Consensus => write!(f, "consensus"),
            Self::RankAggregation => write!(f, "rank_aggregation"),
        }
    }
}

impl FromStr for VotingStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "majority" | "majority_vote" => Ok(Self::Majority),
            "weighted_average" | "weighted" => Ok(Self::WeightedAverage),
            "borda_count" | "borda" => Ok(Self::BordaCount),
            "consensus" | "consensus_threshold" => Ok(Self::Consensus),
            "rank_aggregation" | "rank" => Ok(Self::RankAggregation),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Configuration for the voting engine.
///
/// Treat as read-only once handed to an engine; to change behaviour, build a
/// new value and swap it in with `VotingEngine::reconfigure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub strategy: VotingStrategy,
    pub min_voters: usize,
    /// Minimum agreement score for the consensus strategy
    pub required_agreement: f64,
    pub confidence_weight: f64,
    pub consistency_weight: f64,
    pub diversity_weight: f64,
    pub enable_tie_breaking: bool,
    pub enable_outlier_filtering: bool,
    /// z-score above which a vote is an outlier
    pub outlier_threshold: f64,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            strategy: VotingStrategy::WeightedAverage,
            min_voters: 2,
            required_agreement: 0.5,
            confidence_weight: 0.4,
            consistency_weight: 0.3,
            diversity_weight: 0.3,
            enable_tie_breaking: true,
            enable_outlier_filtering: true,
            outlier_threshold: 2.0,
        }
    }
}

impl VotingConfig {
    /// Defaults with a different strategy.
    pub fn with_strategy(strategy: VotingStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// An unrecognized `strategy` value surfaces as
    /// [`ConfigError::UnknownStrategy`].
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let mut table: toml::Table = s.parse()?;

        // Parse the strategy by hand so aliases and the dedicated error apply.
        let strategy = match table.remove("strategy") {
            Some(toml::Value::String(name)) => Some(name.parse::<VotingStrategy>()?),
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "strategy",
                    reason: format!("expected a string, got {}", other.type_str()),
                })
            }
            None => None,
        };

        let mut config: VotingConfig = toml::Value::Table(table).try_into()?;
        if let Some(strategy) = strategy {
            config.strategy = strategy;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CONSENSUS_*` environment overrides. Unset variables leave the
    /// current value unchanged; malformed values are an error.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        if let Ok(v) = std::env::var("CONSENSUS_STRATEGY") {
            self.strategy = v.parse()?;
        }
        if let Some(v) = parse_env("CONSENSUS_MIN_VOTERS", "min_voters")? {
            self.min_voters = v;
        }
        if let Some(v) = parse_env("CONSENSUS_REQUIRED_AGREEMENT", "required_agreement")? {
            self.required_agreement = v;
        }
        if let Some(v) = parse_env("CONSENSUS_CONFIDENCE_WEIGHT", "confidence_weight")? {
            self.confidence_weight = v;
        }
        if let Some(v) = parse_env("CONSENSUS_CONSISTENCY_WEIGHT", "consistency_weight")? {
            self.consistency_weight = v;
        }
        if let Some(v) = parse_env("CONSENSUS_DIVERSITY_WEIGHT", "diversity_weight")? {
            self.diversity_weight = v;
        }
        if let Some(v) = parse_bool_env("CONSENSUS_TIE_BREAKING_ENABLED") {
            self.enable_tie_breaking = v;
        }
        if let Some(v) = parse_bool_env("CONSENSUS_OUTLIER_FILTERING_ENABLED") {
            self.enable_outlier_filtering = v;
        }
        if let Some(v) = parse_env("CONSENSUS_OUTLIER_THRESHOLD", "outlier_threshold")? {
            self.outlier_threshold = v;
        }
        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_voters == 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_voters",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.required_agreement) {
            return Err(ConfigError::InvalidValue {
                field: "required_agreement",
                reason: format!("{} is outside [0, 1]", self.required_agreement),
            });
        }
        for (field, value) in [
            ("confidence_weight", self.confidence_weight),
            ("consistency_weight", self.consistency_weight),
            ("diversity_weight", self.diversity_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{} must be a non-negative number", value),
                });
            }
        }
        if self.confidence_weight + self.consistency_weight + self.diversity_weight <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "confidence_weight",
                reason: "quality weights must not all be zero".to_string(),
            });
        }
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "outlier_threshold",
                reason: format!("{} must be a positive number", self.outlier_threshold),
            });
        }
        Ok(())
    }
}

/// Parse an env var into `T`. `Ok(None)` when unset.
fn parse_env<T: FromStr>(var: &str, field: &'static str) -> ConfigResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field,
                reason: format!("{}={:?}: {}", var, raw, e),
            }),
        Err(_) => Ok(None),
    }
}

/// Accepts "1", "true", or "yes" (case-insensitive) as enabled; any other
/// set value means disabled. `None` when unset.
fn parse_bool_env(var: &str) -> Option<bool> {
    std::env::var(var)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
