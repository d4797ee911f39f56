// ABOUTME: Catalog Store (C1) - the shared-read Garmin exercise dictionary and its lookup rule
// ABOUTME: Loaded once from a dictionary file at process start; immutable for the rest of the process lifetime

use crate::fuzzy;
use crate::normalize::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wmec_core::category::{remap_category_id, CARDIO_CATEGORY_ID, RUN_CATEGORY_ID};
use wmec_core::{WmecError, WmecResult};

/// A single catalog exercise entry (§3: Catalog Entry).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// Canonical display name.
    pub display_name: String,
    /// Stable device category id (pre-remap; source data may use 0-43).
    pub category_id: u16,
    /// Category key (e.g. `"PUSH_UP"`), used by the YAML encoder's note format.
    pub category_key: String,
    /// Real FIT SDK exercise-name id, when known.
    pub fit_exercise_name_id: Option<u16>,
}

/// An ordered substring rule mapping a keyword to a category + display name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordRule {
    /// The substring to match against the normalized input.
    pub substring: String,
    /// The category this keyword implies.
    pub category_id: u16,
    /// The category key.
    pub category_key: String,
    /// The display name to emit when this rule fires.
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    exercises: HashMap<String, CatalogEntry>,
    keyword_rules: Vec<KeywordRule>,
    builtin_synonyms: Vec<KeywordRule>,
}

/// How a [`CatalogMatch`] was produced (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Exact normalized-name match in the exercises table.
    Exact,
    /// Exact match that was category-32 and got overridden by a builtin synonym.
    ExactWithCategoryOverride,
    /// A builtin cardio-compatibility keyword fired.
    BuiltinKeyword,
    /// A configured keyword rule fired.
    Keyword,
    /// Fuzzy matching against the exercises table fired.
    Fuzzy,
    /// No rule matched; fell back to the default category.
    Default,
}

/// The result of [`CatalogStore::lookup`] (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Device-safe category id (already remapped).
    pub category_id: u16,
    /// Category display name.
    pub category_name: String,
    /// The catalog exercise key, if an exact/fuzzy exercise match fired.
    pub exercise_key: Option<String>,
    /// The catalog display name, if known.
    pub display_name: Option<String>,
    /// Real FIT SDK exercise-name id, if known.
    pub fit_exercise_name_id: Option<u16>,
    /// How this result was produced.
    pub match_type: MatchType,
}

/// The shared-read exercise catalog (C1).
pub struct CatalogStore {
    exercises: HashMap<String, CatalogEntry>,
    keyword_rules: Vec<KeywordRule>,
    builtin_synonyms: Vec<KeywordRule>,
}

impl CatalogStore {
    /// Parse a catalog from its JSON dictionary representation.
    pub fn from_json(data: &str) -> WmecResult<Self> {
        let file: CatalogFile = serde_json::from_str(data)
            .map_err(|e| WmecError::invalid_input(format!("invalid catalog dictionary: {e}")))?;
        Ok(Self {
            exercises: file.exercises,
            keyword_rules: file.keyword_rules,
            builtin_synonyms: file.builtin_synonyms,
        })
    }

    /// Load the dictionary embedded at build time (the default shipped catalog).
    #[must_use]
    pub fn embedded_default() -> Self {
        const DEFAULT_DICTIONARY: &str = include_str!("dictionaries/exercises.json");
        Self::from_json(DEFAULT_DICTIONARY).expect("embedded catalog dictionary must be valid")
    }

    /// Number of exercises the catalog knows about.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the catalog has no exercises loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// All normalized exercise keys, for fuzzy matching callers.
    pub fn exercise_keys(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    fn category_name_for(&self, category_id: u16) -> String {
        wmec_core::category::Category::from_id(category_id)
            .map(wmec_core::category::Category::name)
            .unwrap_or("Core")
            .to_owned()
    }

    fn builtin_override(&self, normalized: &str) -> Option<&KeywordRule> {
        self.builtin_synonyms
            .iter()
            .find(|rule| normalized.contains(rule.substring.as_str()))
    }

    /// Resolve a raw exercise name to a catalog match, per §4.1's fixed lookup order.
    #[must_use]
    pub fn lookup(&self, raw_name: &str) -> CatalogMatch {
        let normalized = normalize_name(raw_name);

        // 1. Exact normalized match.
        if let Some(entry) = self.exercises.get(&normalized) {
            let remapped = remap_category_id(entry.category_id);

            // Category-32 exact matches get overridden by a builtin cardio
            // synonym when one applies, since Run (32) only works with a
            // forced running sport type (§4.1).
            if remapped == RUN_CATEGORY_ID {
                if let Some(rule) = self.builtin_override(&normalized) {
                    return CatalogMatch {
                        category_id: rule.category_id,
                        category_name: self.category_name_for(rule.category_id),
                        exercise_key: Some(normalized),
                        display_name: Some(entry.display_name.clone()),
                        fit_exercise_name_id: entry.fit_exercise_name_id,
                        match_type: MatchType::ExactWithCategoryOverride,
                    };
                }
            }

            return CatalogMatch {
                category_id: remapped,
                category_name: self.category_name_for(remapped),
                exercise_key: Some(normalized),
                display_name: Some(entry.display_name.clone()),
                fit_exercise_name_id: entry.fit_exercise_name_id,
                match_type: MatchType::Exact,
            };
        }

        // 2. Builtin keyword scan (cardio-compatibility overrides for generic terms).
        if let Some(rule) = self.builtin_override(&normalized) {
            return CatalogMatch {
                category_id: rule.category_id,
                category_name: self.category_name_for(rule.category_id),
                exercise_key: None,
                display_name: Some(rule.display_name.clone()),
                fit_exercise_name_id: None,
                match_type: MatchType::BuiltinKeyword,
            };
        }

        // 3. Configured keyword rule scan (ordered longest-/most-specific-first).
        if let Some(rule) = self
            .keyword_rules
            .iter()
            .find(|rule| normalized.contains(rule.substring.as_str()))
        {
            return CatalogMatch {
                category_id: rule.category_id,
                category_name: self.category_name_for(rule.category_id),
                exercise_key: None,
                display_name: Some(rule.display_name.clone()),
                fit_exercise_name_id: None,
                match_type: MatchType::Keyword,
            };
        }

        // 4. Fuzzy matching against the exercises table, threshold 0.60.
        if let Some(best) = fuzzy::best_candidate(&normalized, self.exercise_keys(), 0.60) {
            if let Some(entry) = self.exercises.get(&best.candidate) {
                let remapped = remap_category_id(entry.category_id);
                return CatalogMatch {
                    category_id: remapped,
                    category_name: self.category_name_for(remapped),
                    exercise_key: Some(best.candidate),
                    display_name: Some(entry.display_name.clone()),
                    fit_exercise_name_id: entry.fit_exercise_name_id,
                    match_type: MatchType::Fuzzy,
                };
            }
        }

        // 5. Default fallback: Core.
        CatalogMatch {
            category_id: wmec_core::category::DEFAULT_CATEGORY_ID,
            category_name: self.category_name_for(wmec_core::category::DEFAULT_CATEGORY_ID),
            exercise_key: None,
            display_name: None,
            fit_exercise_name_id: None,
            match_type: MatchType::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_loads() {
        let catalog = CatalogStore::embedded_default();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn exact_match_resolves_category() {
        let catalog = CatalogStore::embedded_default();
        let result = catalog.lookup("Push Up");
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.category_id, 22);
    }

    #[test]
    fn run_keyword_overrides_to_cardio() {
        let catalog = CatalogStore::embedded_default();
        let result = catalog.lookup("easy run");
        assert_eq!(result.category_id, CARDIO_CATEGORY_ID);
    }

    #[test]
    fn bulgarian_split_squat_prefers_lunge_over_squat() {
        let catalog = CatalogStore::embedded_default();
        let result = catalog.lookup("Bulgarian Split Squat");
        assert_eq!(result.category_id, 17);
    }

    #[test]
    fn unknown_name_falls_back_to_core() {
        let catalog = CatalogStore::embedded_default();
        let result = catalog.lookup("zzz totally unknown exercise zzz");
        assert_eq!(result.match_type, MatchType::Default);
        assert_eq!(result.category_id, wmec_core::category::DEFAULT_CATEGORY_ID);
    }
}
