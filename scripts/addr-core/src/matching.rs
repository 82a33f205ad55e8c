//! Greedy bipartite matching of source addresses against target addresses.
//!
//! One full O(|source| x |target|) scan per source address, no indexing or
//! blocking. Fine for the few hundred rows these datasets hold, and noted as
//! a scalability limit, not a correctness one.

use crate::score::{weighted_score, Weights};
use anyhow::{anyhow, Result};
use std::collections::HashSet;

/// Default acceptance threshold for a match.
pub const DEFAULT_THRESHOLD: f64 = 85.5;

/// How target uniqueness is handled across source addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Keep the best target per source; several sources may share a target,
    /// and only accepted pairs are reported.
    First,
    /// A target claimed by an earlier accepted match is excluded for later
    /// sources. Every source produces a result row, accepted or not, so
    /// rejected pairs stay visible for audit.
    Unique,
}

impl MatchMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "first" => Ok(Self::First),
            "unique" => Ok(Self::Unique),
            other => Err(anyhow!("unknown match mode '{other}' (expected first|unique)")),
        }
    }
}

/// One source address paired with its closest target, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub source: String,
    pub target: Option<String>,
    pub score: f64,
}

impl MatchResult {
    /// Accepted means a candidate exists and its score clears the threshold.
    pub fn is_match(&self, threshold: f64) -> bool {
        self.target.is_some() && self.score >= threshold
    }
}

/// Scan all unclaimed targets and keep the highest-scoring one. Strict
/// comparison keeps the first target encountered on ties, and a scan where
/// every score is zero yields no candidate at all.
pub fn best_available(
    source: &str,
    targets: &[String],
    claimed: &HashSet<usize>,
    weights: &Weights,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    let mut highest = 0.0;
    for (index, target) in targets.iter().enumerate() {
        if claimed.contains(&index) {
            continue;
        }
        let score = weighted_score(source, target, weights);
        if score > highest {
            highest = score;
            best = Some((index, score));
        }
    }
    best
}

/// Match every source address against the target list in load order.
pub fn match_addresses(
    sources: &[String],
    targets: &[String],
    weights: &Weights,
    threshold: f64,
    mode: MatchMode,
) -> Vec<MatchResult> {
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut results = Vec::new();
    for source in sources {
        match mode {
            MatchMode::First => {
                let unclaimed = HashSet::new();
                if let Some((index, score)) = best_available(source, targets, &unclaimed, weights) {
                    if score >= threshold {
                        results.push(MatchResult {
                            source: source.clone(),
                            target: Some(targets[index].clone()),
                            score,
                        });
                    }
                }
            }
            MatchMode::Unique => match best_available(source, targets, &claimed, weights) {
                Some((index, score)) => {
                    if score >= threshold {
                        claimed.insert(index);
                    }
                    results.push(MatchResult {
                        source: source.clone(),
                        target: Some(targets[index].clone()),
                        score,
                    });
                }
                None => results.push(MatchResult {
                    source: source.clone(),
                    target: None,
                    score: 0.0,
                }),
            },
        }
    }
    results
}

/// Matched / unmatched counts with the matched percentage over all sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub percentage: f64,
}

pub fn summarize(results: &[MatchResult], source_count: usize, threshold: f64) -> MatchSummary {
    let matched = results.iter().filter(|r| r.is_match(threshold)).count();
    let unmatched = source_count.saturating_sub(matched);
    let percentage = if source_count == 0 {
        0.0
    } else {
        matched as f64 / source_count as f64 * 100.0
    };
    MatchSummary {
        matched,
        unmatched,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn picks_the_closest_target_over_threshold() {
        let sources = addresses(&["12 Main Street, Boston"]);
        let targets = addresses(&["12 Main St, Boston", "99 Other Ave, Boston"]);
        let results = match_addresses(
            &sources,
            &targets,
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::Unique,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target.as_deref(), Some("12 Main St, Boston"));
        assert!(results[0].is_match(DEFAULT_THRESHOLD), "score {}", results[0].score);
    }

    #[test]
    fn first_mode_omits_rejected_sources() {
        let sources = addresses(&["12 Main Street, Boston", "7 Nowhere Lane, Salem"]);
        let targets = addresses(&["12 Main Street, Boston"]);
        let results = match_addresses(
            &sources,
            &targets,
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::First,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "12 Main Street, Boston");
    }

    #[test]
    fn first_mode_allows_shared_targets() {
        let sources = addresses(&["12 Main Street, Boston", "12 Main St, Boston"]);
        let targets = addresses(&["12 Main Street, Boston"]);
        let results = match_addresses(
            &sources,
            &targets,
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::First,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].target, results[1].target);
    }

    #[test]
    fn unique_mode_gives_later_source_the_second_best() {
        let sources = addresses(&["12 Main Street, Boston", "12 Main Street, Boston"]);
        let targets = addresses(&["12 Main Street, Boston", "12 Main St, Boston"]);
        let results = match_addresses(
            &sources,
            &targets,
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::Unique,
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].target.as_deref(), Some("12 Main Street, Boston"));
        assert_eq!(results[1].target.as_deref(), Some("12 Main St, Boston"));
        assert_ne!(results[0].target, results[1].target);
    }

    #[test]
    fn unique_mode_keeps_rejected_rows_for_audit() {
        let sources = addresses(&["12 Main Street, Boston", "7 Nowhere Lane, Salem"]);
        let targets = addresses(&["12 Main Street, Boston"]);
        let results = match_addresses(
            &sources,
            &targets,
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::Unique,
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_match(DEFAULT_THRESHOLD));
        assert!(!results[1].is_match(DEFAULT_THRESHOLD));
        // The best candidate stays visible even though it was rejected.
        assert!(results[1].target.is_some());
    }

    #[test]
    fn no_targets_yields_an_empty_row() {
        let sources = addresses(&["12 Main Street, Boston"]);
        let results = match_addresses(
            &sources,
            &[],
            &Weights::default(),
            DEFAULT_THRESHOLD,
            MatchMode::Unique,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target, None);
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn ties_keep_the_first_target() {
        let targets = addresses(&["12 Main Street, Boston", "12 Main Street, Boston"]);
        let (index, _) = best_available(
            "12 Main Street, Boston",
            &targets,
            &HashSet::new(),
            &Weights::default(),
        )
        .unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn zero_threshold_accepts_identical_pairs_at_ceiling() {
        let weights = Weights::default();
        let sources = addresses(&["5 Oak Road, Salem"]);
        let targets = addresses(&["5 Oak Road, Salem"]);
        let results = match_addresses(&sources, &targets, &weights, 0.0, MatchMode::Unique);
        let ceiling =
            weights.street_name * 100.0 + weights.street_number * 100.0 + weights.city * 100.0;
        assert!(results[0].is_match(0.0));
        assert!((results[0].score - ceiling).abs() < 1e-9);
    }

    #[test]
    fn summary_counts_and_percentage() {
        let results = vec![
            MatchResult {
                source: "a".into(),
                target: Some("a".into()),
                score: 90.0,
            },
            MatchResult {
                source: "b".into(),
                target: Some("a".into()),
                score: 40.0,
            },
        ];
        let summary = summarize(&results, 2, DEFAULT_THRESHOLD);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 1);
        assert!((summary.percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(MatchMode::parse("first").unwrap(), MatchMode::First);
        assert_eq!(MatchMode::parse("unique").unwrap(), MatchMode::Unique);
        assert!(MatchMode::parse("greedy").is_err());
    }
}
