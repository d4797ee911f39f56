// ABOUTME: Step Compiler (C8) - flattens the Blocks Model into an ordered, device-ready step list
// ABOUTME: The heart of the encoding path; resolves names via C4, remaps categories via C5

use crate::models::{Block, EndCondition, Exercise, RestType, Superset, Workout};
use wmec_core::domain::{DurationType, Intensity, MappingResolution, Provenance, Step};
use wmec_core::WmecResult;
use wmec_matching::catalog::CatalogStore;
use wmec_matching::normalize::normalize_name;
use wmec_matching::resolver::{MappingResolver, PopularityLookup, UserMappingLookup};

const DEFAULT_INTER_SET_REST_SEC: u32 = 30;

/// Compiles a [`Workout`] into a flattened [`Step`] list (C8, §4.8).
pub struct StepCompiler<'a> {
    resolver: &'a MappingResolver<'a>,
    catalog: &'a CatalogStore,
}

impl<'a> StepCompiler<'a> {
    /// Build a compiler over a resolver and the catalog it resolves against
    /// (needed separately to look up pre-mapped names that bypass C4).
    #[must_use]
    pub fn new(resolver: &'a MappingResolver<'a>, catalog: &'a CatalogStore) -> Self {
        Self { resolver, catalog }
    }

    /// Compile `workout` into its step list (§4.8). `use_lap_button` forces
    /// every exercise to `open`/0 duration regardless of its end-condition.
    ///
    /// # Errors
    ///
    /// Propagates any error from the mapping resolver's user-mapping or
    /// popularity lookups.
    pub async fn compile(
        &self,
        workout: &Workout,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
        use_lap_button: bool,
    ) -> WmecResult<Vec<Step>> {
        let mut steps = Vec::new();

        let first_block_has_warmup = workout.blocks.first().is_some_and(|b| b.warmup.is_some());
        if !first_block_has_warmup {
            steps.push(Step::exercise(
                "Warm Up",
                Intensity::Warmup,
                DurationType::Open,
                wmec_core::category::CARDIO_CATEGORY_ID,
                None,
            ));
        }

        let block_count = workout.blocks.len();
        for (block_index, block) in workout.blocks.iter().enumerate() {
            let is_last_block = block_index + 1 == block_count;
            self.compile_block(&mut steps, block, is_last_block, use_lap_button, user_mappings, popularity).await?;
        }

        Ok(steps)
    }

    async fn compile_block(
        &self,
        steps: &mut Vec<Step>,
        block: &Block,
        is_last_block: bool,
        use_lap_button: bool,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<()> {
        if let Some(warmup) = &block.warmup {
            let duration = warmup.duration_sec.map_or(DurationType::Open, |s| DurationType::TimeMs(s * 1000));
            steps.push(Step::exercise(
                warmup.activity.clone(),
                Intensity::Warmup,
                duration,
                wmec_core::category::CARDIO_CATEGORY_ID,
                None,
            ));
        }

        let rounds = block.rounds.unwrap_or(1).max(1);
        let body_start = steps.len();

        let superset_count = block.supersets.len();
        for (superset_index, superset) in block.supersets.iter().enumerate() {
            let is_last_superset_in_block = superset_index + 1 == superset_count;
            let nothing_follows = is_last_superset_in_block && block.exercises.is_empty() && is_last_block;
            self.compile_superset(steps, superset, block, nothing_follows, use_lap_button, user_mappings, popularity).await?;
            if !(is_last_superset_in_block && block.exercises.is_empty()) {
                push_rest(steps, superset.rest_between_sec, superset.rest_type);
            }
        }

        let exercise_count = block.exercises.len();
        for (exercise_index, exercise) in block.exercises.iter().enumerate() {
            let is_last_in_block = exercise_index + 1 == exercise_count;
            let suppress_trailing_rest = is_last_in_block && is_last_block;
            self.compile_exercise(steps, exercise, block, suppress_trailing_rest, use_lap_button, user_mappings, popularity).await?;
        }

        if rounds > 1 {
            steps.push(Step::repeat(body_start, rounds));
        }

        if let Some(rest) = block.rest_between_rounds_sec {
            if !is_last_block {
                steps.push(Step::rest(DurationType::TimeMs(rest * 1000)));
            }
        }

        Ok(())
    }

    async fn compile_superset(
        &self,
        steps: &mut Vec<Step>,
        superset: &Superset,
        block: &Block,
        suppress_trailing_rest: bool,
        use_lap_button: bool,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<()> {
        let count = superset.exercises.len();
        for (index, exercise) in superset.exercises.iter().enumerate() {
            let is_last = index + 1 == count;
            self.compile_exercise(steps, exercise, block, is_last && suppress_trailing_rest, use_lap_button, user_mappings, popularity).await?;
        }
        Ok(())
    }

    async fn compile_exercise(
        &self,
        steps: &mut Vec<Step>,
        exercise: &Exercise,
        block: &Block,
        suppress_trailing_rest: bool,
        use_lap_button: bool,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<()> {
        let resolution = self.resolve_exercise(exercise, user_mappings, popularity).await?;
        let category_id = resolution.category_id;
        let duration = duration_type_for(exercise, use_lap_button);
        let note_reps = note_reps_for(exercise);
        let inter_set_rest = exercise.rest_sec.or(block.rest_between_sec).unwrap_or(DEFAULT_INTER_SET_REST_SEC);

        if let Some(warmup_sets) = exercise.warmup_sets.filter(|n| *n >= 1) {
            let warmup_reps = exercise.warmup_reps.unwrap_or(0);
            let first_warmup_index = steps.len();
            steps.push(
                Step::exercise(resolution.display_name.clone(), Intensity::Warmup, DurationType::Reps(warmup_reps), category_id, resolution.fit_exercise_name_id)
                    .with_note(exercise.name.clone(), resolution.reason.clone(), Some(warmup_reps)),
            );
            if warmup_sets > 1 {
                steps.push(Step::rest(DurationType::TimeMs(inter_set_rest * 1000)));
                steps.push(Step::repeat(first_warmup_index, warmup_sets));
            }
            steps.push(Step::rest(DurationType::TimeMs(inter_set_rest * 1000)));
        }

        let working_index = steps.len();
        steps.push(
            Step::exercise(resolution.display_name.clone(), Intensity::Active, duration, category_id, resolution.fit_exercise_name_id)
                .with_note(exercise.name.clone(), resolution.reason.clone(), note_reps),
        );
        if exercise.sets > 1 {
            steps.push(Step::rest(DurationType::TimeMs(inter_set_rest * 1000)));
            steps.push(Step::repeat(working_index, exercise.sets));
        }

        if !suppress_trailing_rest {
            if let Some(rest_sec) = exercise.rest_sec {
                push_rest(steps, Some(rest_sec), exercise.rest_type);
            }
        }

        Ok(())
    }

    async fn resolve_exercise(
        &self,
        exercise: &Exercise,
        user_mappings: &dyn UserMappingLookup,
        popularity: &dyn PopularityLookup,
    ) -> WmecResult<MappingResolution> {
        if let Some(mapped) = &exercise.mapped_name {
            let catalog_match = self.catalog.lookup(mapped);
            return Ok(MappingResolution {
                original_name: exercise.name.clone(),
                normalized_name: normalize_name(&exercise.name),
                display_name: mapped.clone(),
                category_id: catalog_match.category_id,
                fit_exercise_name_id: catalog_match.fit_exercise_name_id,
                confidence: 1.0,
                provenance: Provenance::Curated,
                popularity_count: None,
                reason: "pre-mapped by caller".to_owned(),
            });
        }
        self.resolver.resolve(&exercise.name, user_mappings, popularity).await
    }
}

fn duration_type_for(exercise: &Exercise, use_lap_button: bool) -> DurationType {
    if use_lap_button {
        return DurationType::Open;
    }
    if let Some(meters) = exercise.distance_m {
        return DurationType::DistanceCm((meters * 100.0).round() as u32);
    }
    match exercise.end_condition {
        EndCondition::Distance(meters) => DurationType::DistanceCm((meters * 100.0).round() as u32),
        EndCondition::Duration(seconds) => DurationType::TimeMs(seconds * 1000),
        EndCondition::Reps(n) => DurationType::Reps(n),
        EndCondition::RepsRange(_, hi) => DurationType::Reps(hi),
        EndCondition::Open => DurationType::Open,
    }
}

fn note_reps_for(exercise: &Exercise) -> Option<u32> {
    match exercise.end_condition {
        EndCondition::Reps(n) => Some(n),
        EndCondition::RepsRange(_, hi) => Some(hi),
        _ => None,
    }
}

fn push_rest(steps: &mut Vec<Step>, rest_sec: Option<u32>, rest_type: Option<RestType>) {
    match rest_sec {
        Some(sec) if !matches!(rest_type, Some(RestType::Button)) => {
            steps.push(Step::rest(DurationType::TimeMs(sec * 1000)));
        }
        _ => steps.push(Step::rest(DurationType::Open)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Workout};
    use std::collections::HashMap;
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

    fn compile_sync(workout: &Workout) -> Vec<Step> {
        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let compiler = StepCompiler::new(&resolver, &catalog);
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
            .block_on(compiler.compile(workout, &NoUserMappings, &NoPopularity, false))
            .expect("compiles")
    }

    #[test]
    fn prepends_default_warmup_when_first_block_declares_none() {
        let exercise = Exercise::new("Squat", EndCondition::Reps(10), 1).expect("valid");
        let block = Block { exercises: vec![exercise], ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");
        let steps = compile_sync(&workout);
        assert!(matches!(steps[0].kind, wmec_core::domain::StepKind::Warmup));
    }

    #[test]
    fn multi_set_exercise_emits_inter_set_rest_and_repeat() {
        let mut exercise = Exercise::new("Squat", EndCondition::Reps(10), 3).expect("valid");
        exercise.rest_sec = Some(45);
        let block = Block { warmup: Some(crate::models::WarmupSpec { activity: "Row".to_owned(), duration_sec: Some(300) }), exercises: vec![exercise], ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");
        let steps = compile_sync(&workout);
        let repeat_step = steps.iter().find(|s| matches!(s.kind, wmec_core::domain::StepKind::Repeat)).expect("has repeat");
        assert_eq!(repeat_step.repeat_count, Some(3));
    }

    #[test]
    fn multi_round_block_wraps_body_in_a_repeat() {
        let exercise = Exercise::new("Wall Ball", EndCondition::Reps(15), 1).expect("valid");
        let block = Block { rounds: Some(4), exercises: vec![exercise], warmup: Some(crate::models::WarmupSpec { activity: "Row".to_owned(), duration_sec: None }), ..Default::default() };
        let workout = Workout::new("Amrap", vec![block]).expect("valid");
        let steps = compile_sync(&workout);
        let repeat_step = steps.last().expect("has a step");
        assert_eq!(repeat_step.repeat_count, Some(4));
    }

    #[test]
    fn rest_steps_never_carry_a_category_id() {
        let mut exercise = Exercise::new("Squat", EndCondition::Reps(10), 1).expect("valid");
        exercise.rest_sec = Some(60);
        let block = Block { exercises: vec![exercise], warmup: Some(crate::models::WarmupSpec { activity: "Row".to_owned(), duration_sec: None }), ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");
        let steps = compile_sync(&workout);
        for step in steps.iter().filter(|s| matches!(s.kind, wmec_core::domain::StepKind::Rest)) {
            assert!(step.category_id.is_none());
        }
    }

    #[test]
    fn pre_mapped_name_bypasses_resolution() {
        let _ = HashMap::<String, String>::new();
        let mut exercise = Exercise::new("some raw weird text", EndCondition::Reps(8), 1).expect("valid");
        exercise.mapped_name = Some("Barbell Back Squat".to_owned());
        let block = Block { exercises: vec![exercise], warmup: Some(crate::models::WarmupSpec { activity: "Row".to_owned(), duration_sec: None }), ..Default::default() };
        let workout = Workout::new("Test", vec![block]).expect("valid");
        let steps = compile_sync(&workout);
        let exercise_step = steps.iter().find(|s| matches!(s.kind, wmec_core::domain::StepKind::Exercise)).expect("has exercise");
        assert_eq!(exercise_step.display_name, "Barbell Back Squat");
    }
}
