// ABOUTME: Exercise name normalizer (C2) - collapses orthographic variation without losing identity
// ABOUTME: Deterministic, side-effect free; the pipeline order mirrors the corrected spec sequence

use regex::Regex;
use std::sync::OnceLock;

const EQUIPMENT_PREFIXES: &[&str] = &["db", "kb", "bb", "sb", "mb", "trx", "cable", "band"];

struct Patterns {
    set_label: Regex,
    weight_spec: Regex,
    rep_marker: Regex,
    side_marker: Regex,
    distance_trailing: Regex,
    distance_leading: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        set_label: Regex::new(r"^[a-z]\d+[;:\s]+").unwrap(),
        weight_spec: Regex::new(r"\(\s*[^)]*\d[^)]*\)").unwrap(),
        rep_marker: Regex::new(r"\s*x\s*\d+.*$").unwrap(),
        side_marker: Regex::new(r"\s+(each|per)\s+(side|arm|leg).*$").unwrap(),
        distance_trailing: Regex::new(r"\s*\d+(\.\d+)?\s*(m|km|mi)\s*$").unwrap(),
        distance_leading: Regex::new(r"^\d+(\.\d+)?\s*(m|km|mi)\s+").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
    })
}

/// Normalize a free-form exercise name per §4.2's seven-step pipeline.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let p = patterns();

    // 1. lowercase, trim, strip trailing '|'.
    let mut s = raw.to_lowercase();
    s = s.trim().trim_end_matches('|').trim().to_owned();

    // 2. strip leading set-label prefixes ("A1:", "B2;").
    s = p.set_label.replace(&s, "").into_owned();

    // 3. strip weight specs in parentheses ("(32/24kg)").
    s = p.weight_spec.replace_all(&s, " ").into_owned();

    // 4. strip a single leading equipment-prefix token.
    if let Some(first_space) = s.find(' ') {
        let (head, rest) = s.split_at(first_space);
        if EQUIPMENT_PREFIXES.contains(&head) {
            s = rest.trim_start().to_owned();
        }
    }

    // 5. strip trailing rep markers and each/per side|arm|leg.
    s = p.rep_marker.replace(&s, "").into_owned();
    s = p.side_marker.replace(&s, "").into_owned();

    // 6. strip leading and trailing distance tokens.
    s = p.distance_trailing.replace(&s, "").into_owned();
    s = p.distance_leading.replace(&s, "").into_owned();

    // 7. collapse whitespace.
    s = p.whitespace.replace_all(s.trim(), " ").into_owned();
    s.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_set_label_prefix() {
        assert_eq!(normalize_name("A1: KB Goblet Squat"), "goblet squat");
    }

    #[test]
    fn strips_rep_marker_and_side() {
        assert_eq!(normalize_name("Cable Face Pulls x12 each side"), "face pulls");
    }

    #[test]
    fn strips_weight_spec() {
        assert_eq!(normalize_name("Goblet Squat (32/24kg)"), "goblet squat");
    }

    #[test]
    fn strips_leading_and_trailing_distance() {
        assert_eq!(normalize_name("1km Run"), "run");
        assert_eq!(normalize_name("Row 500m"), "row");
    }

    #[test]
    fn strips_trailing_pipe() {
        assert_eq!(normalize_name("Push Up |"), "push up");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_name("  Push   Up  "), "push up");
    }
}
