//! z-score outlier filtering on vote confidence

use tracing::{debug, info};

use super::aggregation::{mean, sample_variance};
use crate::model::StrategyVote;

/// Minimum number of votes for which a deviation is meaningful.
const MIN_VOTES_FOR_FILTERING: usize = 3;

/// Votes split into those kept and those rejected as outliers.
#[derive(Debug, Clone, Default)]
pub struct OutlierPartition {
    pub kept: Vec<StrategyVote>,
    /// Strategy names of excluded votes, in input order
    pub excluded: Vec<String>,
    /// Input positions of excluded votes
    pub excluded_indices: Vec<usize>,
}

impl OutlierPartition {
    /// Partition that keeps every vote.
    pub fn keep_all(votes: &[StrategyVote]) -> Self {
        Self {
            kept: votes.to_vec(),
            ..Default::default()
        }
    }
}

/// Exclude votes whose confidence z-score exceeds `threshold`.
///
/// Uses the sample standard deviation. With two or fewer votes, or zero
/// deviation, every vote is kept.
pub fn filter_outliers(votes: &[StrategyVote], threshold: f64) -> OutlierPartition {
    if votes.len() < MIN_VOTES_FOR_FILTERING {
        debug!(votes = votes.len(), "Skipping outlier filtering");
        return OutlierPartition::keep_all(votes);
    }

    let confidences: Vec<f64> = votes.iter().map(|v| v.confidence).collect();
    let m = mean(&confidences);
    let std_dev = sample_variance(&confidences).sqrt();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return OutlierPartition::keep_all(votes);
    }

    let mut partition = OutlierPartition::default();
    for (idx, vote) in votes.iter().enumerate() {
        let z = (vote.confidence - m).abs() / std_dev;
        if z > threshold {
            info!(
                strategy = %vote.strategy_name,
                confidence = vote.confidence,
                z_score = z,
                "Excluding outlier vote"
            );
            partition.excluded.push(vote.strategy_name.clone());
            partition.excluded_indices.push(idx);
        } else {
            partition.kept.push(vote.clone());
        }
    }
    partition
}
