//! Voting property tests - randomized validation of engine invariants
//! across varied vote sets.
//!
//! Tests verify:
//! - Final confidences lie in [0, 1] and are sorted descending
//! - Single-contributor aggregations have agreement exactly 1.0
//! - Borda points never exceed contributors × 10
//! - Repeated tallies of the same votes are identical
//! - Vote-set validation rejects anything below min_voters

use industry_consensus::voting::{aggregate_by_code, tally, validate_votes};
use industry_consensus::{
    ClassificationResult, CodeType, IndustryCode, StrategyVote, VotingConfig, VotingResult,
    VotingStrategy,
};
use proptest::prelude::*;

const CODE_POOL: [(CodeType, &str, &str); 8] = [
    (CodeType::Mcc, "5812", "Eating Places and Restaurants"),
    (CodeType::Mcc, "5814", "Fast Food Restaurants"),
    (CodeType::Mcc, "5999", "Miscellaneous Retail"),
    (CodeType::Sic, "5812", "Eating Places"),
    (CodeType::Sic, "7372", "Prepackaged Software"),
    (CodeType::Naics, "722511", "Full-Service Restaurants"),
    (CodeType::Naics, "722513", "Limited-Service Restaurants"),
    (CodeType::Naics, "511210", "Software Publishers"),
];

fn build_vote(index: usize, weight: f64, confidence: f64, picks: &[(usize, f64)]) -> StrategyVote {
    let results = picks
        .iter()
        .map(|(code_idx, conf)| {
            let (t, c, d) = CODE_POOL[*code_idx % CODE_POOL.len()];
            ClassificationResult::candidate(IndustryCode::new(t, c, d), *conf)
        })
        .collect();
    StrategyVote::new(format!("strategy-{}", index), results, weight, confidence)
}

fn vote_strategy() -> impl Strategy<Value = (f64, f64, Vec<(usize, f64)>)> {
    (
        0.0f64..=1.0,
        0.0f64..=1.0,
        prop::collection::vec((0usize..CODE_POOL.len(), 0.0f64..=1.0), 1..12),
    )
}

fn votes_strategy() -> impl Strategy<Value = Vec<StrategyVote>> {
    prop::collection::vec(vote_strategy(), 2..9).prop_map(|raw| {
        raw.iter()
            .enumerate()
            .map(|(i, (w, c, picks))| build_vote(i, *w, *c, picks))
            .collect()
    })
}

fn strategy_choice() -> impl Strategy<Value = VotingStrategy> {
    prop::sample::select(VotingStrategy::ALL.to_vec())
}

fn without_timing(mut result: VotingResult) -> VotingResult {
    result.metadata.processing_time_ms = 0;
    result
}

proptest! {
    #[test]
    fn prop_final_results_clamped_and_sorted(
        votes in votes_strategy(),
        strategy in strategy_choice(),
        tie_breaking in any::<bool>(),
    ) {
        let config = VotingConfig {
            strategy,
            enable_tie_breaking: tie_breaking,
            ..Default::default()
        };
        let result = tally(&config, &votes);

        for r in &result.final_results {
            prop_assert!((0.0..=1.0).contains(&r.confidence), "confidence {}", r.confidence);
        }
        for pair in result.final_results.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }
        for score in [result.voting_score, result.agreement, result.consistency, result.diversity] {
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn prop_single_contributor_agreement_is_one(votes in votes_strategy()) {
        for agg in aggregate_by_code(&votes) {
            if agg.total_votes == 1 {
                prop_assert_eq!(agg.agreement_score, 1.0);
                prop_assert_eq!(agg.confidence_variance, 0.0);
            }
        }
    }

    #[test]
    fn prop_borda_points_bounded(votes in votes_strategy()) {
        for agg in aggregate_by_code(&votes) {
            prop_assert!(agg.borda_points as usize <= agg.total_votes * 10);
        }
    }

    #[test]
    fn prop_tally_is_idempotent(votes in votes_strategy(), strategy in strategy_choice()) {
        let config = VotingConfig::with_strategy(strategy);
        let first = without_timing(tally(&config, &votes));
        let second = without_timing(tally(&config, &votes));

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

// ── Loop-driven properties ─────────────────────────────────────────

#[test]
fn prop_below_min_voters_always_rejected() {
    for min_voters in 1..6 {
        for count in 0..min_voters {
            let votes: Vec<StrategyVote> =
                (0..count).map(|i| build_vote(i, 1.0, 0.8, &[(0, 0.9)])).collect();
            assert!(
                validate_votes(&votes, min_voters).is_err(),
                "{} votes accepted with min_voters={}",
                count,
                min_voters
            );
        }
    }
}

#[test]
fn prop_every_vote_accounted_without_filtering() {
    for vote_count in [2, 5, 10, 20] {
        let votes: Vec<StrategyVote> = (0..vote_count)
            .map(|i| {
                // Spread confidences widely so filtering would otherwise trigger
                let confidence = if i == 0 { 0.01 } else { 0.95 };
                build_vote(i, 0.5, confidence, &[(i, 0.6), (i + 3, 0.4)])
            })
            .collect();
        let config = VotingConfig {
            enable_outlier_filtering: false,
            ..Default::default()
        };

        let result = tally(&config, &votes);
        assert_eq!(result.participating_votes, vote_count);
        assert_eq!(result.metadata.vote_breakdown.len(), vote_count);

        let accounted: usize = aggregate_by_code(&votes).iter().map(|a| a.total_votes).sum();
        assert_eq!(accounted, vote_count * 2);
    }
}

#[test]
fn prop_input_order_does_not_change_ranking_keys() {
    let votes: Vec<StrategyVote> = (0..6)
        .map(|i| build_vote(i, 1.0, 0.8, &[(i, 0.7), ((i + 1) % 8, 0.7)]))
        .collect();
    let mut reversed = votes.clone();
    reversed.reverse();

    let keys = |vs: &[StrategyVote]| -> Vec<(CodeType, String)> {
        aggregate_by_code(vs).iter().map(|a| a.key()).collect()
    };
    assert_eq!(keys(&votes), keys(&reversed));
}
