//! Audit-trail assembly for a voting run

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::outliers::OutlierPartition;
use crate::model::{clamp_unit, CodeKey, StrategyVote, StrategyVoteSummary, VotingMetadata};

/// Summarize one vote for the breakdown.
pub fn summarize_vote(vote: &StrategyVote, excluded: bool) -> StrategyVoteSummary {
    StrategyVoteSummary {
        strategy_name: vote.strategy_name.clone(),
        top_code: vote.top_result().map(|r| r.code.to_string()),
        average_confidence: clamp_unit(vote.average_result_confidence()),
        results_count: vote.results.len(),
        weight: vote.weight,
        excluded,
    }
}

/// Pairwise Jaccard overlap of the code sets proposed by each strategy.
///
/// Symmetric, with 1.0 on the diagonal.
pub fn agreement_matrix(votes: &[StrategyVote]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let code_sets: Vec<(&str, BTreeSet<CodeKey>)> = votes
        .iter()
        .map(|v| {
            (
                v.strategy_name.as_str(),
                v.results.iter().map(|r| r.code.key()).collect(),
            )
        })
        .collect();

    let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (name_a, set_a) in &code_sets {
        let row = matrix.entry(name_a.to_string()).or_default();
        for (name_b, set_b) in &code_sets {
            row.insert(name_b.to_string(), jaccard(set_a, set_b));
        }
    }
    matrix
}

fn jaccard(a: &BTreeSet<CodeKey>, b: &BTreeSet<CodeKey>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Build the run metadata.
///
/// `working` are the votes after re-weighting; `partition` is the outcome
/// of outlier filtering over them.
pub fn build_metadata(
    working: &[StrategyVote],
    partition: &OutlierPartition,
    tie_breaking_applied: bool,
    elapsed: Duration,
    quality_indicators: Vec<String>,
) -> VotingMetadata {
    let vote_breakdown = working
        .iter()
        .enumerate()
        .map(|(idx, vote)| summarize_vote(vote, partition.excluded_indices.contains(&idx)))
        .collect();

    VotingMetadata {
        vote_breakdown,
        agreement_matrix: agreement_matrix(&partition.kept),
        outliers_detected: partition.excluded.clone(),
        tie_breaking_applied,
        processing_time_ms: elapsed.as_millis() as u64,
        quality_indicators,
    }
}
