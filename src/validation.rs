// ABOUTME: Validation Workflow (C12) - walks a Blocks workout and classifies each exercise's mapping
// ABOUTME: valid / needs_review / unmapped, with top-N suggestions and a can_proceed gate

use crate::models::Workout;
use serde::{Deserialize, Serialize};
use wmec_core::WmecResult;
use wmec_matching::catalog::CatalogStore;
use wmec_matching::fuzzy;
use wmec_matching::resolver::{MappingResolver, PopularityLookup, UserMappingLookup};

/// Default confidence threshold below which a mapping needs manual review (§4.12).
pub const DEFAULT_REVIEW_CONFIDENCE_THRESHOLD: f64 = 0.85;

const GENERIC_TERMS: &[&str] = &[
    "push", "pull", "carry", "squat", "row", "lunge", "plank", "curl", "press", "chop", "raise", "crunch", "jump",
];

fn is_generic_term(normalized_name: &str) -> bool {
    GENERIC_TERMS.contains(&normalized_name)
}

/// Classify a resolution's confidence/normalized-name pair into a [`ValidationStatus`] (§4.12).
///
/// Shared by the block-walking [`Validator`] and the single-name
/// `/exercises/match` route so both apply identical thresholds.
#[must_use]
pub fn classify(confidence: f64, normalized_name: &str, review_confidence_threshold: f64) -> ValidationStatus {
    if confidence <= 0.0 {
        ValidationStatus::Unmapped
    } else if confidence < review_confidence_threshold || is_generic_term(normalized_name) {
        ValidationStatus::NeedsReview
    } else {
        ValidationStatus::Valid
    }
}

/// How an exercise's mapping resolution was classified (§4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Confidence at or above threshold, and not a generic bare term.
    Valid,
    /// Below threshold, or a generic term that needs a human decision.
    NeedsReview,
    /// No match at all (fallback with zero confidence).
    Unmapped,
}

/// One exercise's location within the workout, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLocation {
    /// Index of the containing block.
    pub block_index: usize,
    /// The block's label, if any.
    pub block_label: Option<String>,
    /// Index of the exercise within its superset/block exercise list.
    pub exercise_index: usize,
}

/// A validated exercise entry (§4.12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedExercise {
    /// The raw exercise name as supplied.
    pub raw_name: String,
    /// Where this exercise sits in the workout.
    pub location: ExerciseLocation,
    /// The resolved catalog display name.
    pub resolved_display_name: String,
    /// Resolution confidence, `[0, 1]`.
    pub confidence: f64,
    /// Classification.
    pub status: ValidationStatus,
    /// Up to 5 similarly named catalog exercises, for manual correction.
    pub suggestions: Vec<String>,
}

/// A full validation report over a workout (§4.12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every exercise, in workout order.
    pub exercises: Vec<ValidatedExercise>,
    /// False if any exercise is `unmapped`; `auto_proceed` at the call site can override.
    pub can_proceed: bool,
}

/// Runs the validation workflow over a workout (C12).
pub struct Validator<'a> {
    resolver: &'a MappingResolver<'a>,
    catalog: &'a CatalogStore,
    review_confidence_threshold: f64,
}

impl<'a> Validator<'a> {
    /// Build a validator over a resolver/catalog pair and a review threshold.
    #[must_use]
    pub fn new(resolver: &'a MappingResolver<'a>, catalog: &'a CatalogStore, review_confidence_threshold: f64) -> Self {
        Self { resolver, catalog, review_confidence_threshold }
    }

    /// Validate every exercise in `workout`, in block/exercise order.
    ///
    /// # Errors
    ///
    /// Propagates any error from the mapping resolver's lookups.
    pub async fn validate(
        &self,
        workout: &Workout,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<ValidationReport> {
        let mut exercises = Vec::new();
        let mut can_proceed = true;

        for (block_index, block) in workout.blocks.iter().enumerate() {
            let mut exercise_index = 0;
            for superset in &block.supersets {
                for exercise in &superset.exercises {
                    let validated = self.validate_one(exercise.name.as_str(), block_index, block.label.clone(), exercise_index, user_mappings, popularity).await?;
                    if validated.status == ValidationStatus::Unmapped {
                        can_proceed = false;
                    }
                    exercises.push(validated);
                    exercise_index += 1;
                }
            }
            for exercise in &block.exercises {
                let validated = self.validate_one(exercise.name.as_str(), block_index, block.label.clone(), exercise_index, user_mappings, popularity).await?;
                if validated.status == ValidationStatus::Unmapped {
                    can_proceed = false;
                }
                exercises.push(validated);
                exercise_index += 1;
            }
        }

        Ok(ValidationReport { exercises, can_proceed })
    }

    async fn validate_one(
        &self,
        raw_name: &str,
        block_index: usize,
        block_label: Option<String>,
        exercise_index: usize,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<ValidatedExercise> {
        let resolution = self.resolver.resolve(raw_name, user_mappings, popularity).await?;
        let status = classify(resolution.confidence, &resolution.normalized_name, self.review_confidence_threshold);

        let suggestions = fuzzy::top_matches(&resolution.normalized_name, self.catalog.exercise_keys(), 5, 0.30)
            .into_iter()
            .map(|candidate| candidate.candidate)
            .collect();

        Ok(ValidatedExercise {
            raw_name: raw_name.to_owned(),
            location: ExerciseLocation { block_index, block_label, exercise_index },
            resolved_display_name: resolution.display_name,
            confidence: resolution.confidence,
            status,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Exercise, Workout};
    use wmec_core::domain::EndCondition;
    use wmec_matching::resolver::CuratedRule;

    struct NoUserMappings;
    #[async_trait::async_trait]
    impl UserMappingLookup for NoUserMappings {
        async fn get_user_mapping(&self, _normalized_name: &str) -> WmecResult<Option<String>> {
            Ok(None)
        }
    }

    struct NoPopularity;
    #[async_trait::async_trait]
    impl PopularityLookup for NoPopularity {
        async fn most_popular(&self, _normalized_name: &str) -> WmecResult<Option<(String, u32)>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn exact_catalog_match_is_valid() {
        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let validator = Validator::new(&resolver, &catalog, DEFAULT_REVIEW_CONFIDENCE_THRESHOLD);

        let exercise = Exercise::new("Push Up", EndCondition::Reps(10), 1).expect("valid");
        let block = Block { exercises: vec![exercise], ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");

        let report = validator.validate(&workout, &NoUserMappings, &NoPopularity).await.expect("validates");
        assert_eq!(report.exercises[0].status, ValidationStatus::Valid);
        assert!(report.can_proceed);
    }

    #[tokio::test]
    async fn unknown_name_is_unmapped_and_blocks_proceeding() {
        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let validator = Validator::new(&resolver, &catalog, DEFAULT_REVIEW_CONFIDENCE_THRESHOLD);

        let exercise = Exercise::new("zzz totally unknown zzz", EndCondition::Reps(10), 1).expect("valid");
        let block = Block { exercises: vec![exercise], ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");

        let report = validator.validate(&workout, &NoUserMappings, &NoPopularity).await.expect("validates");
        assert_eq!(report.exercises[0].status, ValidationStatus::Unmapped);
        assert!(!report.can_proceed);
    }

    #[test]
    fn bare_generic_term_is_flagged() {
        assert!(is_generic_term("squat"));
        assert!(!is_generic_term("goblet squat"));
    }
}
