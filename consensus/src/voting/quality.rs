//! Quality scoring for a voting run

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::aggregation::{mean, CodeVoteAggregation};
use super::config::VotingConfig;
use crate::model::{clamp_unit, KNOWN_CODE_SYSTEMS};

const HIGH_AGREEMENT: f64 = 0.8;
const LOW_AGREEMENT: f64 = 0.5;
const HIGH_CONSISTENCY: f64 = 0.8;

/// Agreement, consistency and diversity of a run, plus their weighted blend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub agreement: f64,
    pub consistency: f64,
    pub diversity: f64,
    pub voting_score: f64,
}

/// Score the aggregations of a run.
///
/// With no aggregations every score is 0.
pub fn score_quality(aggregations: &[CodeVoteAggregation], config: &VotingConfig) -> QualityScores {
    if aggregations.is_empty() {
        return QualityScores::default();
    }

    let agreements: Vec<f64> = aggregations.iter().map(|a| a.agreement_score).collect();
    let consistencies: Vec<f64> = aggregations
        .iter()
        .map(|a| 1.0 - a.confidence_variance.min(1.0))
        .collect();
    let systems: BTreeSet<_> = aggregations.iter().map(|a| a.code.code_type).collect();

    let agreement = clamp_unit(mean(&agreements));
    let consistency = clamp_unit(mean(&consistencies));
    let diversity = clamp_unit(systems.len() as f64 / KNOWN_CODE_SYSTEMS as f64);
    let voting_score = clamp_unit(
        agreement * config.confidence_weight
            + consistency * config.consistency_weight
            + diversity * config.diversity_weight,
    );

    QualityScores {
        agreement,
        consistency,
        diversity,
        voting_score,
    }
}

/// Tags describing the quality of a run, in a fixed order.
pub fn quality_indicators(
    scores: &QualityScores,
    outliers_removed: usize,
    tie_breaking_applied: bool,
    result_count: usize,
) -> Vec<String> {
    let mut tags = Vec::new();

    if scores.agreement >= HIGH_AGREEMENT {
        tags.push("high_agreement".to_string());
    } else if scores.agreement < LOW_AGREEMENT {
        tags.push("low_agreement".to_string());
    }
    if scores.consistency >= HIGH_CONSISTENCY {
        tags.push("high_consistency".to_string());
    }
    if scores.diversity > 1.0 / KNOWN_CODE_SYSTEMS as f64 {
        tags.push("multi_system".to_string());
    } else if scores.diversity > 0.0 {
        tags.push("single_system".to_string());
    }
    if outliers_removed > 0 {
        tags.push(format!("outliers_removed:{}", outliers_removed));
    }
    if tie_breaking_applied {
        tags.push("tie_breaking_applied".to_string());
    }
    if result_count == 0 {
        tags.push("no_consensus".to_string());
    }
    tags
}
