// ABOUTME: Canonical classifier (C4 step 5) - an independent token-based classifier
// ABOUTME: Returns a title-cased display name built from a fixed canonical-token vocabulary

/// Canonical compound tokens, checked as an ordered (most-specific-first) list
/// of required-word-sets. Independent of the curated substring rules and the
/// fuzzy matcher, per §4.4 step 5 ("an independent classifier").
const CANONICAL_TOKENS: &[(&[&str], &str)] = &[
    (&["goblet", "squat"], "goblet_squat"),
    (&["front", "squat"], "front_squat"),
    (&["back", "squat"], "back_squat"),
    (&["split", "squat"], "split_squat"),
    (&["romanian", "deadlift"], "romanian_deadlift"),
    (&["sumo", "deadlift"], "sumo_deadlift"),
    (&["overhead", "press"], "overhead_press"),
    (&["bent", "row"], "bent_over_row"),
    (&["kettlebell", "swing"], "kettlebell_swing"),
    (&["wall", "ball"], "wall_ball"),
    (&["box", "jump"], "box_jump"),
    (&["jump", "rope"], "jump_rope"),
];

/// Classify `normalized` against the canonical-token vocabulary, returning a
/// title-cased display name when every word of some entry is present.
#[must_use]
pub fn classify_canonical(normalized: &str) -> Option<String> {
    let words: Vec<&str> = normalized.split_whitespace().collect();
    for (required, token) in CANONICAL_TOKENS {
        if required.iter().all(|w| words.contains(w)) {
            return Some(token_to_display(token));
        }
    }
    None
}

fn token_to_display(token: &str) -> String {
    token
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_goblet_squat_regardless_of_word_order() {
        assert_eq!(
            classify_canonical("squat goblet style"),
            Some("Goblet Squat".to_owned())
        );
    }

    #[test]
    fn returns_none_when_no_token_matches() {
        assert_eq!(classify_canonical("banana smoothie"), None);
    }
}
