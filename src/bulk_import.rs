// ABOUTME: Bulk Import Orchestrator (C13) - Detect/Map/Match/Preview/Execute over many workout sources
// ABOUTME: Detect fans out with bounded concurrency; Execute runs sequentially and checks for cancellation

use crate::compiler::StepCompiler;
use crate::config::BulkImportConfig;
use crate::database::repositories::{BulkImportJobRepository, SqliteBulkImportJobRepository, SqliteWorkoutRepository, WorkoutRepository};
use crate::models::{Block, EndCondition, Exercise, Workout};
use crate::validation::{ValidationReport, Validator};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use wmec_core::{WmecError, WmecResult};
use wmec_matching::catalog::CatalogStore;
use wmec_matching::resolver::{CuratedRule, MappingResolver, PopularityLookup, UserMappingLookup};

/// One raw row from a file source whose columns have not yet been mapped to
/// exercise fields (§4.13 step 2), keyed by column header.
pub type RawRow = HashMap<String, String>;

/// User-supplied column mapping for a file source (§3: Bulk Import Job
/// "column mappings"), naming which column holds each exercise field.
/// `name_column` is required; every other field is optional and, when
/// absent, leaves that exercise's corresponding value unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column holding the raw exercise name.
    pub name_column: String,
    /// Column holding a rep count.
    pub reps_column: Option<String>,
    /// Column holding a set count; defaults to 1 when absent or unparseable.
    pub sets_column: Option<String>,
    /// Column holding a duration in seconds.
    pub duration_column: Option<String>,
    /// Column holding a distance in meters.
    pub distance_column: Option<String>,
    /// Column holding a rest period in seconds.
    pub rest_column: Option<String>,
}

/// One detected import source: a file's already-parsed workout, raw file
/// rows still awaiting a column mapping, or a URL/image metadata stub not
/// yet resolved to a `Workout` (§4.13 step 1).
#[derive(Debug, Clone)]
pub enum DetectedSource {
    /// File bytes already parsed into a workout.
    ParsedWorkout(Workout),
    /// File rows in an unrecognized layout, awaiting a caller-supplied
    /// column mapping (§4.13 step 2).
    RawRows(Vec<RawRow>),
    /// A URL to fetch video/class metadata from.
    Url(String),
    /// Raw image bytes to run through the ingestion service.
    Image(Vec<u8>),
}

/// The outcome of detecting one input item (§3: Detected Item).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedItem {
    /// Index of this item within the batch.
    pub item_index: usize,
    /// Parsed or inferred title, if any.
    pub title: Option<String>,
    /// Number of exercises found, where known.
    pub exercise_count: usize,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    /// True when this item is raw file rows that still need a column
    /// mapping applied (the Map phase, §4.13 step 2) before it can be
    /// matched, previewed, or executed.
    pub needs_column_mapping: bool,
    /// Errors encountered fetching/parsing this item; detection proceeds regardless (§7).
    pub errors: Vec<String>,
}

/// Per-exercise-name matching outcome across a whole batch (§4.13 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameMatchResult {
    /// The distinct raw exercise name.
    pub raw_name: String,
    /// Resolved catalog display name.
    pub matched_name: String,
    /// Resolution confidence.
    pub confidence: f64,
    /// How many times this name occurs across the batch's selected items.
    pub occurrence_count: u32,
}

/// A previewed, validated workout ready for execution (§4.13 step 4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewWorkout {
    /// Index of the source item this preview covers.
    pub item_index: usize,
    /// The validation report for this item's workout.
    pub validation: ValidationReport,
    /// True when another selected item shares this item's title.
    pub is_duplicate: bool,
}

/// Aggregate counters for a completed or in-progress phase (§7).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhaseCounters {
    /// Items processed successfully.
    pub success_count: u32,
    /// Items that failed.
    pub error_count: u32,
}

/// Detect phase: fan out over `sources` with bounded concurrency (§4.13, §5).
///
/// URL sources use `concurrency.url_concurrency`; image sources use
/// `concurrency.image_concurrency`. A fetch failure is recorded on the item
/// rather than aborting the batch (`ExternalFetchFailed`, §7).
pub async fn detect(sources: Vec<DetectedSource>, concurrency: &BulkImportConfig, http_client: &reqwest::Client) -> Vec<DetectedItem> {
    let url_permits = Arc::new(Semaphore::new(concurrency.url_concurrency));
    let image_permits = Arc::new(Semaphore::new(concurrency.image_concurrency));

    let mut tasks = FuturesUnordered::new();
    for (item_index, source) in sources.into_iter().enumerate() {
        let url_permits = Arc::clone(&url_permits);
        let image_permits = Arc::clone(&image_permits);
        let http_client = http_client.clone();
        tasks.push(async move { detect_one(item_index, source, &url_permits, &image_permits, &http_client).await });
    }

    let mut items = Vec::new();
    while let Some(item) = tasks.next().await {
        items.push(item);
    }
    items.sort_by_key(|item: &DetectedItem| item.item_index);
    items
}

async fn detect_one(
    item_index: usize,
    source: DetectedSource,
    url_permits: &Arc<Semaphore>,
    image_permits: &Arc<Semaphore>,
    http_client: &reqwest::Client,
) -> DetectedItem {
    match source {
        DetectedSource::ParsedWorkout(workout) => DetectedItem {
            item_index,
            title: Some(workout.title.clone()),
            exercise_count: workout.exercises_in_emission_order().len(),
            confidence: 1.0,
            needs_column_mapping: false,
            errors: Vec::new(),
        },
        DetectedSource::RawRows(rows) => DetectedItem {
            item_index,
            title: None,
            exercise_count: rows.len(),
            confidence: 0.0,
            needs_column_mapping: true,
            errors: Vec::new(),
        },
        DetectedSource::Url(url) => {
            let Ok(_permit) = url_permits.acquire().await else {
                return DetectedItem { item_index, title: None, exercise_count: 0, confidence: 0.0, needs_column_mapping: false, errors: vec!["semaphore closed".to_owned()] };
            };
            match http_client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    DetectedItem { item_index, title: Some(url), exercise_count: 0, confidence: 0.5, needs_column_mapping: false, errors: Vec::new() }
                }
                Ok(response) => DetectedItem {
                    item_index,
                    title: None,
                    exercise_count: 0,
                    confidence: 0.0,
                    needs_column_mapping: false,
                    errors: vec![format!("upstream returned {}", response.status())],
                },
                Err(error) => DetectedItem { item_index, title: None, exercise_count: 0, confidence: 0.0, needs_column_mapping: false, errors: vec![error.to_string()] },
            }
        }
        DetectedSource::Image(bytes) => {
            let Ok(_permit) = image_permits.acquire().await else {
                return DetectedItem { item_index, title: None, exercise_count: 0, confidence: 0.0, needs_column_mapping: false, errors: vec!["semaphore closed".to_owned()] };
            };
            DetectedItem {
                item_index,
                title: None,
                exercise_count: 0,
                confidence: if bytes.is_empty() { 0.0 } else { 0.3 },
                needs_column_mapping: false,
                errors: Vec::new(),
            }
        }
    }
}

/// Map phase (files only): apply a caller-supplied [`ColumnMapping`] to raw
/// rows, producing a single-block `Workout` (§4.13 step 2).
///
/// Each row becomes one standalone exercise. A row missing `name_column` (or
/// holding only whitespace there) is skipped rather than failing the whole
/// batch; `InvalidInput` is only returned when the mapped rows, as a whole,
/// would compile to a workout with no exercises at all.
///
/// # Errors
///
/// Returns `InvalidInput` if `rows` produces zero exercises, or if
/// constructing the resulting [`Workout`]/[`Exercise`] values fails their
/// own invariants (empty title, zero sets).
pub fn map_columns(title: &str, rows: &[RawRow], mapping: &ColumnMapping) -> WmecResult<Workout> {
    let mut exercises = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(name) = row.get(&mapping.name_column).map(|s| s.trim()).filter(|s| !s.is_empty()) else {
            continue;
        };

        let end_condition = mapping
            .distance_column
            .as_ref()
            .and_then(|col| row.get(col))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(EndCondition::Distance)
            .or_else(|| {
                mapping
                    .duration_column
                    .as_ref()
                    .and_then(|col| row.get(col))
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .map(EndCondition::Duration)
            })
            .or_else(|| {
                mapping
                    .reps_column
                    .as_ref()
                    .and_then(|col| row.get(col))
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .map(EndCondition::Reps)
            })
            .unwrap_or(EndCondition::Open);

        let sets = mapping
            .sets_column
            .as_ref()
            .and_then(|col| row.get(col))
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1);

        let mut exercise = Exercise::new(name, end_condition, sets)?;
        exercise.rest_sec = mapping.rest_column.as_ref().and_then(|col| row.get(col)).and_then(|v| v.trim().parse::<u32>().ok());
        exercises.push(exercise);
    }

    if exercises.is_empty() {
        return Err(WmecError::invalid_input("column mapping produced no exercises from the supplied rows"));
    }

    let block = Block { exercises, ..Default::default() };
    Workout::new(title, vec![block])
}

/// Match phase: collect every distinct exercise name across `workouts` and
/// resolve each exactly once (§4.13 step 3).
///
/// # Errors
///
/// Propagates any error from the mapping resolver's lookups.
pub async fn match_names(
    workouts: &[Workout],
    catalog: &CatalogStore,
    curated_rules: &[CuratedRule],
    user_mappings: &dyn UserMappingLookup,
    popularity: &dyn PopularityLookup,
) -> WmecResult<Vec<NameMatchResult>> {
    let mut occurrence_counts: HashMap<String, u32> = HashMap::new();
    for workout in workouts {
        for exercise in workout.exercises_in_emission_order() {
            *occurrence_counts.entry(exercise.name.clone()).or_insert(0) += 1;
        }
    }

    let resolver = MappingResolver::new(catalog, curated_rules);
    let mut results = Vec::with_capacity(occurrence_counts.len());
    for (raw_name, occurrence_count) in occurrence_counts {
        let resolution = resolver.resolve(&raw_name, user_mappings, popularity).await?;
        results.push(NameMatchResult {
            raw_name,
            matched_name: resolution.display_name,
            confidence: resolution.confidence,
            occurrence_count,
        });
    }
    results.sort_by(|a, b| a.raw_name.cmp(&b.raw_name));
    Ok(results)
}

/// Preview phase: validate each workout and flag duplicate titles among selected items (§4.13 step 4).
///
/// # Errors
///
/// Propagates any error from the validation workflow.
pub async fn preview(
    workouts: &[Workout],
    resolver: &MappingResolver<'_>,
    catalog: &CatalogStore,
    review_confidence_threshold: f64,
    user_mappings: &dyn UserMappingLookup,
    popularity: &dyn PopularityLookup,
) -> WmecResult<Vec<PreviewWorkout>> {
    let validator = Validator::new(resolver, catalog, review_confidence_threshold);
    let mut seen_titles: HashMap<&str, usize> = HashMap::new();
    for workout in workouts {
        *seen_titles.entry(workout.title.as_str()).or_insert(0) += 1;
    }

    let mut previews = Vec::with_capacity(workouts.len());
    for (item_index, workout) in workouts.iter().enumerate() {
        let validation = validator.validate(workout, user_mappings, popularity).await?;
        let is_duplicate = seen_titles.get(workout.title.as_str()).copied().unwrap_or(0) > 1;
        previews.push(PreviewWorkout { item_index, validation, is_duplicate });
    }
    Ok(previews)
}

/// Execute phase: compile and persist each selected item sequentially,
/// checking for cancellation between items (§4.13 step 5, §5).
///
/// Progress is recorded after every item; an in-flight item always runs to
/// completion before the cancellation check is honored.
///
/// # Errors
///
/// Returns an error only if the job repository itself cannot be reached;
/// per-item compile/persist failures are folded into [`PhaseCounters`].
pub async fn execute(
    job_id: &str,
    profile_id: &str,
    device_form: &str,
    workouts: &[Workout],
    resolver: &MappingResolver<'_>,
    catalog: &CatalogStore,
    use_lap_button: bool,
    user_mappings: &dyn UserMappingLookup,
    popularity: &dyn PopularityLookup,
    job_repository: &SqliteBulkImportJobRepository,
    workout_repository: &SqliteWorkoutRepository,
) -> WmecResult<PhaseCounters> {
    let compiler = StepCompiler::new(resolver, catalog);
    let mut counters = PhaseCounters::default();
    let total = i64::try_from(workouts.len()).unwrap_or(i64::MAX);

    for (index, workout) in workouts.iter().enumerate() {
        if let Some(job) = job_repository.get(job_id).await? {
            if job.status == "cancelled" {
                break;
            }
        }

        let outcome = async {
            let steps = compiler.compile(workout, user_mappings, popularity, use_lap_button).await?;
            let payload = serde_json::to_string(&steps).map_err(WmecError::from)?;
            workout_repository.save(profile_id, &workout.title, device_form, &payload).await
        }
        .await;

        match outcome {
            Ok(()) => counters.success_count += 1,
            Err(_) => counters.error_count += 1,
        }

        job_repository.advance_progress(job_id, i64::try_from(index + 1).unwrap_or(i64::MAX), total).await?;
    }

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connect, migrate};

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

    fn sample_workout(title: &str, exercise_name: &str) -> Workout {
        let exercise = Exercise::new(exercise_name, EndCondition::Reps(10), 3).expect("valid exercise");
        let block = Block { exercises: vec![exercise], ..Default::default() };
        Workout::new(title, vec![block]).expect("valid workout")
    }

    #[tokio::test]
    async fn detect_reports_parsed_workouts_immediately_and_in_order() {
        let config = BulkImportConfig::default();
        let http_client = reqwest::Client::new();
        let sources = vec![
            DetectedSource::ParsedWorkout(sample_workout("A", "Push Up")),
            DetectedSource::ParsedWorkout(sample_workout("B", "Squat")),
        ];

        let items = detect(sources, &config, &http_client).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_index, 0);
        assert_eq!(items[0].title.as_deref(), Some("A"));
        assert_eq!(items[0].confidence, 1.0);
        assert_eq!(items[1].item_index, 1);
        assert_eq!(items[1].title.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn detect_flags_empty_image_bytes_as_zero_confidence() {
        let config = BulkImportConfig::default();
        let http_client = reqwest::Client::new();
        let sources = vec![DetectedSource::Image(Vec::new()), DetectedSource::Image(vec![1, 2, 3])];

        let items = detect(sources, &config, &http_client).await;

        assert_eq!(items[0].confidence, 0.0);
        assert!(items[1].confidence > 0.0);
    }

    #[tokio::test]
    async fn detect_flags_raw_rows_as_needing_column_mapping() {
        let config = BulkImportConfig::default();
        let http_client = reqwest::Client::new();
        let rows = vec![RawRow::from([("Move".to_owned(), "Push Up".to_owned())])];
        let sources = vec![DetectedSource::RawRows(rows)];

        let items = detect(sources, &config, &http_client).await;

        assert!(items[0].needs_column_mapping);
        assert_eq!(items[0].confidence, 0.0);
        assert_eq!(items[0].exercise_count, 1);
    }

    #[test]
    fn map_columns_builds_a_workout_from_raw_rows() {
        let mapping = ColumnMapping {
            name_column: "Move".to_owned(),
            reps_column: Some("Reps".to_owned()),
            sets_column: Some("Sets".to_owned()),
            duration_column: None,
            distance_column: None,
            rest_column: Some("Rest".to_owned()),
        };
        let rows = vec![
            RawRow::from([
                ("Move".to_owned(), "Push Up".to_owned()),
                ("Reps".to_owned(), "10".to_owned()),
                ("Sets".to_owned(), "3".to_owned()),
                ("Rest".to_owned(), "30".to_owned()),
            ]),
            RawRow::from([("Move".to_owned(), "  ".to_owned())]),
        ];

        let workout = map_columns("Imported", &rows, &mapping).expect("maps");

        assert_eq!(workout.blocks[0].exercises.len(), 1);
        let exercise = &workout.blocks[0].exercises[0];
        assert_eq!(exercise.name, "Push Up");
        assert!(matches!(exercise.end_condition, EndCondition::Reps(10)));
        assert_eq!(exercise.sets, 3);
        assert_eq!(exercise.rest_sec, Some(30));
    }

    #[test]
    fn map_columns_rejects_rows_that_yield_no_exercises() {
        let mapping = ColumnMapping {
            name_column: "Move".to_owned(),
            reps_column: None,
            sets_column: None,
            duration_column: None,
            distance_column: None,
            rest_column: None,
        };
        let rows = vec![RawRow::from([("Move".to_owned(), String::new())])];

        assert!(map_columns("Imported", &rows, &mapping).is_err());
    }

    #[tokio::test]
    async fn match_names_dedupes_repeated_exercise_names_and_counts_occurrences() {
        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let workouts = vec![sample_workout("A", "Push Up"), sample_workout("B", "Push Up"), sample_workout("C", "Squat")];

        let results = match_names(&workouts, &catalog, &rules, &NoUserMappings, &NoPopularity).await.expect("resolves");

        assert_eq!(results.len(), 2);
        let push_up = results.iter().find(|r| r.raw_name == "Push Up").expect("present");
        assert_eq!(push_up.occurrence_count, 2);
        let squat = results.iter().find(|r| r.raw_name == "Squat").expect("present");
        assert_eq!(squat.occurrence_count, 1);
    }

    #[tokio::test]
    async fn preview_flags_duplicate_titles_among_selected_items() {
        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let workouts = vec![sample_workout("Leg Day", "Squat"), sample_workout("Leg Day", "Lunge"), sample_workout("Arm Day", "Push Up")];

        let previews = preview(&workouts, &resolver, &catalog, 0.5, &NoUserMappings, &NoPopularity).await.expect("previews");

        assert!(previews[0].is_duplicate);
        assert!(previews[1].is_duplicate);
        assert!(!previews[2].is_duplicate);
    }

    #[tokio::test]
    async fn execute_persists_each_item_and_advances_progress_to_completion() {
        let pool = connect("sqlite::memory:").await.expect("connect");
        migrate(&pool).await.expect("migrate");
        let job_repo = SqliteBulkImportJobRepository::new(pool.clone());
        let workout_repo = SqliteWorkoutRepository::new(pool);
        job_repo.create("job-1", "profile-1").await.expect("create job");

        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let workouts = vec![sample_workout("Leg Day", "Squat"), sample_workout("Arm Day", "Push Up")];

        let counters = execute(
            "job-1",
            "profile-1",
            "fit",
            &workouts,
            &resolver,
            &catalog,
            false,
            &NoUserMappings,
            &NoPopularity,
            &job_repo,
            &workout_repo,
        )
        .await
        .expect("executes");

        assert_eq!(counters.success_count, 2);
        assert_eq!(counters.error_count, 0);

        let job = job_repo.get("job-1").await.expect("get job").expect("job present");
        assert_eq!(job.completed_items, 2);
        assert_eq!(job.total_items, 2);

        let saved = workout_repo.get("profile-1", "Leg Day", "fit").await.expect("get saved").expect("saved payload present");
        assert!(!saved.is_empty());
    }

    #[tokio::test]
    async fn execute_stops_early_when_job_is_cancelled() {
        let pool = connect("sqlite::memory:").await.expect("connect");
        migrate(&pool).await.expect("migrate");
        let job_repo = SqliteBulkImportJobRepository::new(pool.clone());
        let workout_repo = SqliteWorkoutRepository::new(pool);
        job_repo.create("job-2", "profile-1").await.expect("create job");
        job_repo.cancel("job-2").await.expect("cancel");

        let catalog = CatalogStore::embedded_default();
        let rules: [CuratedRule; 0] = [];
        let resolver = MappingResolver::new(&catalog, &rules);
        let workouts = vec![sample_workout("Leg Day", "Squat")];

        let counters = execute(
            "job-2",
            "profile-1",
            "fit",
            &workouts,
            &resolver,
            &catalog,
            false,
            &NoUserMappings,
            &NoPopularity,
            &job_repo,
            &workout_repo,
        )
        .await
        .expect("executes");

        assert_eq!(counters.success_count, 0);
        assert_eq!(counters.error_count, 0);
    }
}
