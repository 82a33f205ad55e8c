//! Weighted similarity scoring between two matchable addresses.

use crate::address::extract_components;
use std::collections::BTreeSet;

/// Sub-score weights for the combined address score. The street number and
/// name dominate address identity; city is a weak tiebreaker. The defaults
/// are tuned constants, kept as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub street_name: f64,
    pub street_number: f64,
    pub city: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            street_name: 0.60,
            street_number: 0.32,
            city: 0.08,
        }
    }
}

fn tokens(value: &str) -> BTreeSet<String> {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn join_nonempty(left: &str, right: &str) -> String {
    if left.is_empty() {
        right.to_string()
    } else if right.is_empty() {
        left.to_string()
    } else {
        format!("{left} {right}")
    }
}

fn lcs_length(a: &[u8], b: &[u8]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &byte_a in a {
        for (j, &byte_b) in b.iter().enumerate() {
            curr[j + 1] = if byte_a == byte_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn sequence_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let lcs = lcs_length(a.as_bytes(), b.as_bytes());
    (2.0 * lcs as f64) / (a.len() as f64 + b.len() as f64)
}

/// Token-set similarity between two strings, scored 0-100. Symmetric and
/// insensitive to word order and duplicate words: the unique tokens of both
/// sides are split into the shared intersection and the two remainders, and
/// the best pairwise sequence ratio among the recombined strings wins.
/// Either side tokenizing to nothing scores 0.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a
        .intersection(&tokens_b)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let rest_a = tokens_a
        .difference(&tokens_b)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let rest_b = tokens_b
        .difference(&tokens_a)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let combined_a = join_nonempty(&intersection, &rest_a);
    let combined_b = join_nonempty(&intersection, &rest_b);

    let best = sequence_ratio(&intersection, &combined_a)
        .max(sequence_ratio(&intersection, &combined_b))
        .max(sequence_ratio(&combined_a, &combined_b));
    (best * 100.0).round()
}

/// Combined score between two matchable addresses: the weighted sum of the
/// street-name, street-number and city token-set similarities. The weights
/// need not sum to 1, so the result is an unnormalized score, not a
/// probability.
pub fn weighted_score(source: &str, target: &str, weights: &Weights) -> f64 {
    let (source_number, source_name, source_city) = extract_components(source);
    let (target_number, target_name, target_city) = extract_components(target);

    weights.street_name * token_set_ratio(&source_name, &target_name)
        + weights.street_number * token_set_ratio(&source_number, &target_number)
        + weights.city * token_set_ratio(&source_city, &target_city)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_token_sets_saturate() {
        assert_eq!(token_set_ratio("Main Street", "main street"), 100.0);
        assert_eq!(token_set_ratio("Street Main", "Main Street"), 100.0);
        assert_eq!(token_set_ratio("Main Main Street", "Main Street"), 100.0);
    }

    #[test]
    fn empty_side_scores_zero() {
        assert_eq!(token_set_ratio("", ""), 0.0);
        assert_eq!(token_set_ratio("Main", ""), 0.0);
        assert_eq!(token_set_ratio("", "Main"), 0.0);
    }

    #[test]
    fn ratio_is_symmetric() {
        let pairs = [
            ("Main Street", "Main St"),
            ("12", "99"),
            ("Boston", "South Boston"),
        ];
        for (a, b) in pairs {
            assert_eq!(token_set_ratio(a, b), token_set_ratio(b, a));
        }
    }

    #[test]
    fn partial_overlap_scores_between() {
        let score = token_set_ratio("Main Street", "Main St");
        assert!(score > 0.0 && score < 100.0, "got {score}");
    }

    #[test]
    fn identical_addresses_hit_the_weighted_ceiling() {
        let weights = Weights::default();
        let score = weighted_score(
            "12 Main Street, Boston",
            "12 Main Street, Boston",
            &weights,
        );
        let ceiling =
            weights.street_name * 100.0 + weights.street_number * 100.0 + weights.city * 100.0;
        assert!((score - ceiling).abs() < 1e-9);
    }

    #[test]
    fn near_identical_addresses_clear_default_threshold() {
        let score = weighted_score(
            "12 Main Street, Boston",
            "12 Main St, Boston",
            &Weights::default(),
        );
        assert!(score >= 85.5, "got {score}");
    }

    #[test]
    fn scoring_is_deterministic() {
        let weights = Weights::default();
        let first = weighted_score("12 Main Street, Boston", "14 Oak Road, Salem", &weights);
        let second = weighted_score("12 Main Street, Boston", "14 Oak Road, Salem", &weights);
        assert_eq!(first, second);
    }

    #[test]
    fn street_name_weight_dominates() {
        let weights = Weights::default();
        let same_name = weighted_score("1 Elm Street, Boston", "2 Elm Street, Boston", &weights);
        let same_number = weighted_score("1 Elm Street, Boston", "1 Oak Road, Boston", &weights);
        assert!(same_name > same_number);
    }
}
