// ABOUTME: Token-set fuzzy matcher (C3) - order-insensitive, duplicate-tolerant similarity with a length penalty
// ABOUTME: Built on strsim's normalized Levenshtein ratio, following the teacher pack's use of strsim for name matching

use crate::alias::alias_map;
use std::collections::BTreeSet;

/// A scored fuzzy candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    /// The original (un-normalized) catalog display name.
    pub candidate: String,
    /// Length-penalty-adjusted score in `[0, 1]`.
    pub adjusted_score: f64,
    /// Raw token-set similarity before the length penalty, in `[0, 1]`.
    pub raw_score: f64,
}

fn tokens(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// Token-set ratio: split both strings into sorted unique token sets, compare
/// the intersection against each side's full token string, and take the best
/// Levenshtein-ratio among the three combinations (§4.3).
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);

    let intersection: BTreeSet<&str> = ta.intersection(&tb).copied().collect();
    let only_a: BTreeSet<&str> = ta.difference(&tb).copied().collect();
    let only_b: BTreeSet<&str> = tb.difference(&ta).copied().collect();

    let join = |set: &BTreeSet<&str>| set.iter().copied().collect::<Vec<_>>().join(" ");

    let inter_str = join(&intersection);
    let combo_a = if inter_str.is_empty() {
        join(&only_a)
    } else {
        format!("{inter_str} {}", join(&only_a)).trim().to_owned()
    };
    let combo_b = if inter_str.is_empty() {
        join(&only_b)
    } else {
        format!("{inter_str} {}", join(&only_b)).trim().to_owned()
    };

    let r1 = strsim::normalized_levenshtein(&inter_str, &combo_a);
    let r2 = strsim::normalized_levenshtein(&inter_str, &combo_b);
    let r3 = strsim::normalized_levenshtein(&combo_a, &combo_b);
    let direct = strsim::normalized_levenshtein(a, b);

    [r1, r2, r3, direct].into_iter().fold(0.0_f64, f64::max)
}

/// Apply the length-penalty adjustment from §4.3: `adjusted = raw * (1 - 0.2 *
/// |len(candidate) - len(query)| / max(len))`.
#[must_use]
pub fn length_penalty_adjust(raw: f64, query: &str, candidate: &str) -> f64 {
    let len_q = query.len() as f64;
    let len_c = candidate.len() as f64;
    let denom = len_q.max(len_c).max(1.0);
    let penalty = (len_c - len_q).abs() / denom;
    raw * (1.0 - 0.2 * penalty)
}

/// Best fuzzy candidate among `choices` (original display names; normalization
/// happens internally) at or above `threshold`, per §4.3. Ties broken by
/// shorter display name.
#[must_use]
pub fn best_candidate<'a>(
    normalized_query: &str,
    choices: impl IntoIterator<Item = &'a str>,
    threshold: f64,
) -> Option<FuzzyCandidate> {
    // Alias short-circuit: if the query itself is a known alias whose target
    // appears among the choices, return it with full confidence.
    if let Some(&target) = alias_map().get(normalized_query) {
        for choice in choices.into_iter().collect::<Vec<_>>() {
            if choice.eq_ignore_ascii_case(target) {
                return Some(FuzzyCandidate {
                    candidate: choice.to_owned(),
                    adjusted_score: 1.0,
                    raw_score: 1.0,
                });
            }
        }
        return None;
    }

    best_candidate_no_alias(normalized_query, choices, threshold)
}

fn best_candidate_no_alias<'a>(
    normalized_query: &str,
    choices: impl IntoIterator<Item = &'a str>,
    threshold: f64,
) -> Option<FuzzyCandidate> {
    let mut best: Option<FuzzyCandidate> = None;
    for choice in choices {
        let raw = token_set_ratio(normalized_query, choice);
        if raw < threshold {
            continue;
        }
        let adjusted = length_penalty_adjust(raw, normalized_query, choice);
        let replace = match &best {
            None => true,
            Some(current) => {
                adjusted > current.adjusted_score
                    || ((adjusted - current.adjusted_score).abs() < f64::EPSILON
                        && choice.len() < current.candidate.len())
            }
        };
        if replace {
            best = Some(FuzzyCandidate {
                candidate: choice.to_owned(),
                adjusted_score: adjusted,
                raw_score: raw,
            });
        }
    }
    best
}

/// Top-N candidates at or above `cutoff`, sorted by descending adjusted score (§4.3).
#[must_use]
pub fn top_matches<'a>(
    normalized_query: &str,
    choices: impl IntoIterator<Item = &'a str>,
    limit: usize,
    cutoff: f64,
) -> Vec<FuzzyCandidate> {
    let mut scored: Vec<FuzzyCandidate> = choices
        .into_iter()
        .filter_map(|choice| {
            let raw = token_set_ratio(normalized_query, choice);
            if raw < cutoff {
                return None;
            }
            let adjusted = length_penalty_adjust(raw, normalized_query, choice);
            Some(FuzzyCandidate {
                candidate: choice.to_owned(),
                adjusted_score: adjusted,
                raw_score: raw,
            })
        })
        .collect();
    scored.sort_by(|a, b| {
        b.adjusted_score
            .partial_cmp(&a.adjusted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((token_set_ratio("push up", "push up") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn token_order_is_insensitive() {
        let a = token_set_ratio("dumbbell bench press", "bench press dumbbell");
        assert!(a > 0.99);
    }

    #[test]
    fn length_penalty_reduces_score_for_mismatched_lengths() {
        let raw = 0.8;
        let adjusted = length_penalty_adjust(raw, "row", "barbell bent over row");
        assert!(adjusted < raw);
    }

    #[test]
    fn best_candidate_prefers_shorter_on_tie() {
        let choices = ["barbell row", "row"];
        let result = best_candidate_no_alias("row", choices, 0.0).expect("a match");
        assert_eq!(result.candidate, "row");
    }
}
