//! Tie breaking for near-equal final confidences
//!
//! Adjacent results closer than [`TIE_EPSILON`] are separated by giving the
//! more specific code (longer description) a small bonus.

use tracing::debug;

use crate::model::{clamp_unit, ClassificationResult};

/// Confidence difference below which two results count as tied.
pub const TIE_EPSILON: f64 = 0.01;

/// Bonus added to the more specific result of a tied pair.
pub const TIE_BONUS: f64 = 0.005;

/// Break ties in an already-ranked list and re-sort it by confidence.
///
/// Pairs are judged on the confidences as they were before any bonus is
/// applied. Returns `true` if any bonus was applied.
pub fn break_ties(results: &mut [ClassificationResult]) -> bool {
    if results.len() < 2 {
        return false;
    }

    let original: Vec<f64> = results.iter().map(|r| r.confidence).collect();
    let mut bonus = vec![0.0_f64; results.len()];

    for i in 0..results.len() - 1 {
        if (original[i] - original[i + 1]).abs() >= TIE_EPSILON {
            continue;
        }
        let left = results[i].code.description.chars().count();
        let right = results[i + 1].code.description.chars().count();
        let winner = match left.cmp(&right) {
            std::cmp::Ordering::Greater => i,
            std::cmp::Ordering::Less => i + 1,
            std::cmp::Ordering::Equal => continue,
        };
        debug!(
            winner = %results[winner].code,
            left = original[i],
            right = original[i + 1],
            "Tie broken by description specificity"
        );
        bonus[winner] += TIE_BONUS;
    }

    let mut applied = false;
    for (result, extra) in results.iter_mut().zip(&bonus) {
        if *extra > 0.0 {
            result.confidence = clamp_unit(result.confidence + extra);
            result
                .reasons
                .push("tie broken in favour of more specific description".to_string());
            applied = true;
        }
    }

    if applied {
        sort_by_confidence(results);
    }
    applied
}

/// Stable sort by confidence descending.
pub fn sort_by_confidence(results: &mut [ClassificationResult]) {
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeType, IndustryCode};

    fn result(code: &str, description: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult::candidate(
            IndustryCode::new(CodeType::Mcc, code, description),
            confidence,
        )
    }

    #[test]
    fn test_longer_description_wins_tie() {
        let mut results = vec![
            result("5812", "Restaurants", 0.701),
            result("5814", "Fast Food Restaurants and Quick Service", 0.700),
        ];
        assert!(break_ties(&mut results));
        assert_eq!(results[0].code.code, "5814");
        assert!((results[0].confidence - 0.705).abs() < 1e-9);
        assert_eq!(results[1].confidence, 0.701);
    }

    #[test]
    fn test_clear_gap_untouched() {
        let mut results = vec![
            result("5812", "Restaurants", 0.80),
            result("5814", "Fast Food Restaurants", 0.70),
        ];
        assert!(!break_ties(&mut results));
        assert_eq!(results[0].code.code, "5812");
        assert_eq!(results[0].confidence, 0.80);
    }

    #[test]
    fn test_equal_descriptions_no_bonus() {
        let mut results = vec![result("1111", "Same", 0.5), result("2222", "Also", 0.5)];
        assert!(!break_ties(&mut results));
        assert_eq!(results[0].code.code, "1111");
    }

    #[test]
    fn test_bonus_clamped_to_one() {
        let mut results = vec![result("1", "A", 1.0), result("2", "Longer one", 0.999)];
        assert!(break_ties(&mut results));
        assert!(results.iter().all(|r| r.confidence == 1.0));
        // Equal after clamping, so the stable sort keeps the original order
        assert_eq!(results[0].code.code, "1");
    }

    #[test]
    fn test_single_result_noop() {
        let mut results = vec![result("1", "A", 0.5)];
        assert!(!break_ties(&mut results));
    }
}
