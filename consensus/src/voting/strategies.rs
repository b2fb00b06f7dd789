//! Strategy algorithms
//!
//! Each algorithm is a pure function from the code aggregations to a ranked
//! result list. All sorts are stable and end on the `(code_type, code)` key,
//! so equal scores always rank the same way.

use std::cmp::Ordering;

use tracing::debug;

use super::aggregation::{CodeVoteAggregation, MAX_CANDIDATES_PER_VOTE};
use super::config::{VotingConfig, VotingStrategy};
use crate::model::{clamp_unit, ClassificationResult};

/// Maximum number of results any algorithm returns.
pub const MAX_RESULTS: usize = 10;

/// Bonus applied per unit of agreement by the weighted-average algorithm.
const AGREEMENT_BONUS: f64 = 0.2;

/// Floor for rank-aggregation confidence.
const MIN_RANK_CONFIDENCE: f64 = 0.1;

/// Run the configured algorithm.
///
/// `voter_count` is the number of votes that took part in aggregation.
pub fn apply_strategy(
    config: &VotingConfig,
    aggregations: &[CodeVoteAggregation],
    voter_count: usize,
) -> Vec<ClassificationResult> {
    debug!(
        strategy = %config.strategy,
        codes = aggregations.len(),
        voter_count,
        "Applying voting strategy"
    );

    match config.strategy {
        VotingStrategy::Majority => majority(aggregations, voter_count),
        VotingStrategy::WeightedAverage => weighted_average(aggregations),
        VotingStrategy::BordaCount => borda_count(aggregations),
        VotingStrategy::Consensus => consensus(aggregations, config.required_agreement),
        VotingStrategy::RankAggregation => rank_aggregation(aggregations),
    }
}

/// Codes proposed by at least half of the voters, most-voted first.
pub fn majority(
    aggregations: &[CodeVoteAggregation],
    voter_count: usize,
) -> Vec<ClassificationResult> {
    let threshold = voter_count.div_ceil(2);

    let mut ranked: Vec<&CodeVoteAggregation> = aggregations.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_votes
            .cmp(&a.total_votes)
            .then_with(|| desc(a.average_confidence, b.average_confidence))
            .then_with(|| a.key().cmp(&b.key()))
    });

    ranked
        .into_iter()
        .take_while(|agg| agg.total_votes >= threshold)
        .take(MAX_RESULTS)
        .map(|agg| {
            build_result(
                agg,
                VotingStrategy::Majority,
                agg.average_confidence,
                vec![
                    format!("{}/{} votes", agg.total_votes, voter_count),
                    // Differs from the raw count when a vote repeats a code.
                    format!(
                        "{} of {} strategies",
                        agg.strategy_names().len(),
                        voter_count
                    ),
                    format!("average confidence {:.3}", agg.average_confidence),
                ],
            )
        })
        .collect()
}

/// Weight-scaled mean confidence plus an agreement bonus, ranked by
/// weighted score.
pub fn weighted_average(aggregations: &[CodeVoteAggregation]) -> Vec<ClassificationResult> {
    let mut ranked: Vec<&CodeVoteAggregation> = aggregations.iter().collect();
    ranked.sort_by(|a, b| {
        desc(a.weighted_score, b.weighted_score)
            .then_with(|| desc(a.average_confidence, b.average_confidence))
            .then_with(|| a.key().cmp(&b.key()))
    });

    ranked
        .into_iter()
        .take(MAX_RESULTS)
        .map(|agg| {
            let score = clamp_unit(agg.weighted_score / agg.total_votes.max(1) as f64);
            let confidence = score + AGREEMENT_BONUS * clamp_unit(agg.agreement_score);
            build_result(
                agg,
                VotingStrategy::WeightedAverage,
                confidence,
                vec![
                    format!("weighted score {:.3}", score),
                    format!("agreement {:.3}", agg.agreement_score),
                ],
            )
        })
        .collect()
}

/// Rank-position points summed across voters.
pub fn borda_count(aggregations: &[CodeVoteAggregation]) -> Vec<ClassificationResult> {
    let mut ranked: Vec<&CodeVoteAggregation> = aggregations.iter().collect();
    ranked.sort_by(|a, b| {
        b.borda_points
            .cmp(&a.borda_points)
            .then_with(|| desc(a.average_confidence, b.average_confidence))
            .then_with(|| a.key().cmp(&b.key()))
    });

    ranked
        .into_iter()
        .take(MAX_RESULTS)
        .map(|agg| {
            let max_points = agg.total_votes.max(1) as f64 * MAX_CANDIDATES_PER_VOTE as f64;
            let confidence = (agg.borda_points as f64 / max_points).min(1.0);
            build_result(
                agg,
                VotingStrategy::BordaCount,
                confidence,
                vec![format!(
                    "{} Borda points from {} votes",
                    agg.borda_points, agg.total_votes
                )],
            )
        })
        .collect()
}

/// Codes whose contributors agree at least `required_agreement`.
pub fn consensus(
    aggregations: &[CodeVoteAggregation],
    required_agreement: f64,
) -> Vec<ClassificationResult> {
    let mut scored: Vec<(&CodeVoteAggregation, f64)> = aggregations
        .iter()
        .filter(|agg| agg.agreement_score >= required_agreement)
        .map(|agg| (agg, agg.average_confidence * agg.agreement_score))
        .collect();

    scored.sort_by(|(a, sa), (b, sb)| desc(*sa, *sb).then_with(|| a.key().cmp(&b.key())));

    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(agg, confidence)| {
            build_result(
                agg,
                VotingStrategy::Consensus,
                confidence,
                vec![format!(
                    "agreement {:.3} >= {:.3}",
                    agg.agreement_score, required_agreement
                )],
            )
        })
        .collect()
}

/// Lowest average rank first.
pub fn rank_aggregation(aggregations: &[CodeVoteAggregation]) -> Vec<ClassificationResult> {
    let mut ranked: Vec<&CodeVoteAggregation> = aggregations.iter().collect();
    ranked.sort_by(|a, b| {
        a.average_rank()
            .total_cmp(&b.average_rank())
            .then_with(|| desc(a.average_confidence, b.average_confidence))
            .then_with(|| a.key().cmp(&b.key()))
    });

    ranked
        .into_iter()
        .take(MAX_RESULTS)
        .map(|agg| {
            let avg_rank = agg.average_rank();
            let confidence = (1.0 - (avg_rank - 1.0) / 10.0).max(MIN_RANK_CONFIDENCE);
            build_result(
                agg,
                VotingStrategy::RankAggregation,
                confidence,
                vec![format!("average rank {:.2}", avg_rank)],
            )
        })
        .collect()
}

fn build_result(
    agg: &CodeVoteAggregation,
    strategy: VotingStrategy,
    confidence: f64,
    reasons: Vec<String>,
) -> ClassificationResult {
    ClassificationResult {
        code: agg.code.clone(),
        confidence: clamp_unit(confidence),
        match_type: strategy.match_type().to_string(),
        matched_on: agg.strategy_names(),
        reasons,
        weight: clamp_unit(agg.average_weight()),
    }
}

/// Descending order on floats.
fn desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeType, IndustryCode, StrategyVote};
    use crate::voting::aggregation::aggregate_by_code;

    fn vote(name: &str, results: &[(&str, f64)]) -> StrategyVote {
        StrategyVote::new(
            name,
            results
                .iter()
                .map(|(c, conf)| {
                    ClassificationResult::candidate(
                        IndustryCode::new(CodeType::Mcc, *c, format!("MCC {}", c)),
                        *conf,
                    )
                })
                .collect(),
            1.0,
            0.8,
        )
    }

    fn codes(results: &[ClassificationResult]) -> Vec<&str> {
        results.iter().map(|r| r.code.code.as_str()).collect()
    }

    #[test]
    fn test_majority_stops_below_threshold() {
        let votes = vec![
            vote("keyword", &[("A", 0.8), ("C", 0.4)]),
            vote("ml", &[("A", 0.7)]),
            vote("similarity", &[("B", 0.9)]),
        ];
        let results = majority(&aggregate_by_code(&votes), votes.len());
        assert_eq!(codes(&results), vec!["A"]);
        assert_eq!(results[0].match_type, "majority_vote");
        assert!(results[0].reasons.iter().any(|r| r == "2/3 votes"));
        assert!((results[0].confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_majority_even_voter_count() {
        // ceil(4 / 2) = 2
        let votes = vec![
            vote("a", &[("A", 0.8)]),
            vote("b", &[("A", 0.7)]),
            vote("c", &[("B", 0.9)]),
            vote("d", &[("B", 0.5)]),
        ];
        let results = majority(&aggregate_by_code(&votes), votes.len());
        // Equal vote counts: higher average confidence first
        assert_eq!(codes(&results), vec!["A", "B"]);
    }

    #[test]
    fn test_majority_reasons_count_distinct_strategies() {
        let votes = vec![
            vote("a", &[("A", 0.9), ("A", 0.8)]),
            vote("b", &[("B", 0.7)]),
            vote("c", &[("C", 0.6)]),
        ];
        let results = majority(&aggregate_by_code(&votes), 3);

        assert_eq!(codes(&results), vec!["A"]);
        assert!(results[0].reasons.contains(&"2/3 votes".to_string()));
        assert!(results[0].reasons.contains(&"1 of 3 strategies".to_string()));
        assert_eq!(results[0].matched_on, vec!["a"]);
    }

    #[test]
    fn test_weighted_average_agreement_bonus() {
        let votes = vec![
            vote("a", &[("5812", 0.6)]),
            vote("b", &[("5812", 0.6)]),
        ];
        let results = weighted_average(&aggregate_by_code(&votes));
        // score 0.6 + 0.2 * 1.0
        assert!((results[0].confidence - 0.8).abs() < 1e-9);
        assert_eq!(results[0].match_type, "weighted_average");
    }

    #[test]
    fn test_weighted_average_non_finite_scores_clamp_to_zero() {
        let votes = vec![
            vote("a", &[("1", f64::NAN), ("2", 1.7)]),
            vote("b", &[("1", -0.3), ("2", 0.5)]),
            vote("c", &[("2", f64::INFINITY)]),
        ];
        let results = weighted_average(&aggregate_by_code(&votes));

        let nan_code = results.iter().find(|r| r.code.code == "1").unwrap();
        assert_eq!(nan_code.confidence, 0.0);
        let inf_code = results.iter().find(|r| r.code.code == "2").unwrap();
        assert!(inf_code.confidence.is_finite() && inf_code.confidence <= 1.0);
    }

    #[test]
    fn test_weighted_average_respects_vote_weight() {
        let mut heavy = vote("heavy", &[("A", 0.6)]);
        heavy.weight = 1.0;
        let mut light = vote("light", &[("B", 0.9)]);
        light.weight = 0.2;

        let results = weighted_average(&aggregate_by_code(&[heavy, light]));
        assert_eq!(codes(&results), vec!["A", "B"]);
    }

    #[test]
    fn test_borda_ranks_by_points() {
        let votes = vec![
            vote("a", &[("X", 0.5), ("Y", 0.9), ("Z", 0.1)]),
            vote("b", &[("X", 0.5), ("Z", 0.4), ("Y", 0.3)]),
        ];
        let results = borda_count(&aggregate_by_code(&votes));
        assert_eq!(codes(&results), vec!["X", "Y", "Z"]);
        // X: 3 + 3 = 6 points over 2 votes → 6 / 20
        assert!((results[0].confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_consensus_filters_low_agreement() {
        let votes = vec![
            vote("a", &[("A", 0.95), ("B", 0.8)]),
            vote("b", &[("A", 0.50), ("B", 0.8)]),
        ];
        let aggs = aggregate_by_code(&votes);

        let strict = consensus(&aggs, 0.9);
        assert_eq!(codes(&strict), vec!["B"]);
        assert!((strict[0].confidence - 0.8).abs() < 1e-9);

        let lenient = consensus(&aggs, 0.5);
        assert_eq!(codes(&lenient), vec!["B", "A"]);
        // A: 0.725 * 0.55
        assert!((lenient[1].confidence - 0.725 * 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_rank_aggregation_confidence() {
        let votes = vec![
            vote("a", &[("A", 0.9), ("B", 0.5), ("C", 0.2)]),
            vote("b", &[("A", 0.8), ("C", 0.5), ("B", 0.2)]),
        ];
        let results = rank_aggregation(&aggregate_by_code(&votes));
        assert_eq!(results[0].code.code, "A");
        assert_eq!(results[0].confidence, 1.0);
        // B and C both average rank 2.5 with equal average confidence; key decides
        assert!((results[1].confidence - 0.85).abs() < 1e-9);
        assert_eq!(codes(&results), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rank_aggregation_floor() {
        let results: Vec<(String, f64)> = (0..30).map(|i| (format!("{:02}", i), 0.5)).collect();
        let refs: Vec<(&str, f64)> = results.iter().map(|(c, f)| (c.as_str(), *f)).collect();
        let out = rank_aggregation(&aggregate_by_code(&[vote("a", &refs)]));
        assert_eq!(out.len(), MAX_RESULTS);
        assert!(out.iter().all(|r| r.confidence >= MIN_RANK_CONFIDENCE));
    }

    #[test]
    fn test_results_capped() {
        let many: Vec<(String, f64)> = (0..25).map(|i| (format!("{:02}", i), 0.5)).collect();
        let refs: Vec<(&str, f64)> = many.iter().map(|(c, f)| (c.as_str(), *f)).collect();
        let aggs = aggregate_by_code(&[vote("a", &refs), vote("b", &refs)]);

        for strategy in VotingStrategy::ALL {
            let config = VotingConfig::with_strategy(strategy);
            assert!(apply_strategy(&config, &aggs, 2).len() <= MAX_RESULTS);
        }
    }

    #[test]
    fn test_matched_on_lists_contributors() {
        let votes = vec![vote("keyword", &[("A", 0.8)]), vote("ml", &[("A", 0.7)])];
        let results = weighted_average(&aggregate_by_code(&votes));
        assert_eq!(results[0].matched_on, vec!["keyword", "ml"]);
        assert_eq!(results[0].weight, 1.0);
    }
}
