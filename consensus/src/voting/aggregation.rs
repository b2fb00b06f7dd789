//! Code aggregation
//!
//! Groups every `(rank, result)` pair across all votes into one
//! [`CodeVoteAggregation`] per distinct `(code_type, code)` key and derives
//! the statistics the strategy algorithms rank on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{clamp_unit, CodeKey, IndustryCode, StrategyVote};

/// Assumed maximum candidate-list length per vote, used by Borda scoring.
pub const MAX_CANDIDATES_PER_VOTE: u32 = 10;

/// One vote's contribution to a code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteContribution {
    pub strategy_name: String,
    /// 0-based rank within the vote
    pub rank: usize,
    pub confidence: f64,
    /// Weight of the contributing vote
    pub weight: f64,
}

/// Aggregated statistics for one industry code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeVoteAggregation {
    pub code: IndustryCode,
    pub contributions: Vec<VoteContribution>,
    pub total_votes: usize,
    /// Sum of `confidence * vote.weight`
    pub weighted_score: f64,
    pub average_confidence: f64,
    /// Sample variance of contributed confidences; 0 with fewer than 2
    pub confidence_variance: f64,
    /// Mean pairwise `1 - |c_i - c_j|`; 1.0 with a single contributor
    pub agreement_score: f64,
    pub borda_points: u32,
    /// Sum of 1-based ranks
    pub rank_sum: u32,
}

impl CodeVoteAggregation {
    fn new(code: IndustryCode) -> Self {
        Self {
            code,
            contributions: Vec::new(),
            total_votes: 0,
            weighted_score: 0.0,
            average_confidence: 0.0,
            confidence_variance: 0.0,
            agreement_score: 0.0,
            borda_points: 0,
            rank_sum: 0,
        }
    }

    pub fn key(&self) -> CodeKey {
        self.code.key()
    }

    /// Contributing strategy names in vote order, deduplicated.
    pub fn strategy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.contributions.len());
        for c in &self.contributions {
            if !names.contains(&c.strategy_name) {
                names.push(c.strategy_name.clone());
            }
        }
        names
    }

    /// Mean weight of contributing votes.
    pub fn average_weight(&self) -> f64 {
        if self.contributions.is_empty() {
            return 0.0;
        }
        self.contributions.iter().map(|c| c.weight).sum::<f64>() / self.contributions.len() as f64
    }

    /// Average 1-based rank (lower is better).
    pub fn average_rank(&self) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        self.rank_sum as f64 / self.total_votes as f64
    }

    fn finalize(&mut self) {
        let confidences: Vec<f64> = self.contributions.iter().map(|c| c.confidence).collect();
        self.average_confidence = mean(&confidences);
        self.confidence_variance = sample_variance(&confidences);
        self.agreement_score = pairwise_agreement(&confidences);
    }
}

/// Aggregate all votes by code.
///
/// The result is ordered by `(code_type, code)`, independent of input order.
pub fn aggregate_by_code(votes: &[StrategyVote]) -> Vec<CodeVoteAggregation> {
    let mut by_code: BTreeMap<CodeKey, CodeVoteAggregation> = BTreeMap::new();

    for vote in votes {
        let list_len = vote.results.len();
        for (rank, result) in vote.results.iter().enumerate() {
            let agg = by_code
                .entry(result.code.key())
                .or_insert_with(|| CodeVoteAggregation::new(result.code.clone()));

            agg.total_votes += 1;
            agg.weighted_score += result.confidence * vote.weight;
            agg.borda_points += borda_points(list_len, rank);
            agg.rank_sum += rank as u32 + 1;
            agg.contributions.push(VoteContribution {
                strategy_name: vote.strategy_name.clone(),
                rank,
                confidence: result.confidence,
                weight: vote.weight,
            });
        }
    }

    by_code
        .into_values()
        .map(|mut agg| {
            agg.finalize();
            agg
        })
        .collect()
}

/// Points for a result at `rank` in a list of `list_len`, capped at
/// [`MAX_CANDIDATES_PER_VOTE`].
fn borda_points(list_len: usize, rank: usize) -> u32 {
    (list_len.saturating_sub(rank) as u32).min(MAX_CANDIDATES_PER_VOTE)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) variance; 0 for fewer than two values.
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Mean of `1 - |c_i - c_j|` over all unordered pairs.
fn pairwise_agreement(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            total += 1.0 - (values[i] - values[j]).abs();
            pairs += 1;
        }
    }
    clamp_unit(total / pairs as f64)
}
