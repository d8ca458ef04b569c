//! Scoring of captured program output against a test's rules.

use crate::config::{MatchKind, ScoringRule};

/// Evaluate `output` against `rules` in the order supplied and return the
/// first matching rule's score, or 0 when no rule matches.
///
/// `Exact` is case-sensitive equality; `Contains` is case-insensitive
/// substring containment. Callers wanting best-match-wins semantics pass the
/// rules pre-sorted descending by score (see
/// [`TestCase::scoring_best_first`](crate::config::TestCase::scoring_best_first)).
///
/// Pure and total: never fails.
pub fn evaluate<'a>(output: &str, rules: impl IntoIterator<Item = &'a ScoringRule>) -> u32 {
    for rule in rules {
        let matched = match rule.kind {
            MatchKind::Exact => output == rule.output,
            MatchKind::Contains => output.to_lowercase().contains(&rule.output.to_lowercase()),
        };
        if matched {
            return rule.score;
        }
    }

    0
}
