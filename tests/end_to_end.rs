// ABOUTME: End-to-end tests assembling models -> StepCompiler -> encoders, matching the literal
// ABOUTME: scenarios in the spec's testable-properties section (basic rep workout, lap-button mode)

use async_trait::async_trait;
use wmec_core::domain::{DurationType, EndCondition, Intensity, StepKind};
use wmec_core::WmecResult;
use wmec_encoders::{encode_fit, FitExportRequest};
use wmec_matching::catalog::CatalogStore;
use wmec_matching::resolver::{CuratedRule, MappingResolver, PopularityLookup, UserMappingLookup};
use wmec_server::compiler::StepCompiler;
use wmec_server::models::{Block, Exercise, Superset, Workout};

struct NoUserMappings;
#[async_trait]
impl UserMappingLookup for NoUserMappings {
    async fn get_user_mapping(&self, _normalized_name: &str) -> WmecResult<Option<String>> {
        Ok(None)
    }
}

struct NoPopularity;
#[async_trait]
impl PopularityLookup for NoPopularity {
    async fn most_popular(&self, _normalized_name: &str) -> WmecResult<Option<(String, u32)>> {
        Ok(None)
    }
}

fn push_day_workout() -> Workout {
    let mut push_ups = Exercise::new("Push Ups", EndCondition::Reps(10), 3).expect("valid exercise");
    push_ups.mapped_name = Some("Push Up".to_owned());
    let mut squats = Exercise::new("Squats", EndCondition::Reps(15), 3).expect("valid exercise");
    squats.mapped_name = Some("Air Squat".to_owned());

    let superset = Superset { exercises: vec![push_ups, squats], ..Default::default() };
    let block = Block { rest_between_sec: Some(30), supersets: vec![superset], ..Default::default() };
    Workout::new("Push Day", vec![block]).expect("valid workout")
}

/// Scenario 1: basic rep workout compiles to the documented step sequence and
/// the FIT envelope carries the `.FIT` tag at the documented byte offsets.
#[tokio::test]
async fn basic_rep_workout_compiles_and_encodes_to_fit() {
    let catalog = CatalogStore::embedded_default();
    let rules: [CuratedRule; 0] = [];
    let resolver = MappingResolver::new(&catalog, &rules);
    let compiler = StepCompiler::new(&resolver, &catalog);

    let workout = push_day_workout();
    let steps = compiler.compile(&workout, &NoUserMappings, &NoPopularity, false).await.expect("compiles");

    assert_eq!(steps.len(), 7);
    assert_eq!(steps[0].kind, StepKind::Warmup);
    assert_eq!(steps[0].duration, Some(DurationType::Open));

    assert_eq!(steps[1].kind, StepKind::Exercise);
    assert_eq!(steps[1].display_name, "Push Up");
    assert_eq!(steps[1].duration, Some(DurationType::Reps(10)));
    assert_eq!(steps[1].category_id, Some(22));

    assert_eq!(steps[2].kind, StepKind::Rest);
    assert_eq!(steps[2].duration, Some(DurationType::TimeMs(30_000)));
    assert_eq!(steps[2].category_id, None);

    assert_eq!(steps[3].kind, StepKind::Repeat);
    assert_eq!(steps[3].repeat_target, Some(1));
    assert_eq!(steps[3].repeat_count, Some(3));

    assert_eq!(steps[4].kind, StepKind::Exercise);
    assert_eq!(steps[4].display_name, "Air Squat");
    assert_eq!(steps[4].duration, Some(DurationType::Reps(15)));
    assert_eq!(steps[4].category_id, Some(28));

    assert_eq!(steps[5].kind, StepKind::Rest);
    assert_eq!(steps[5].duration, Some(DurationType::TimeMs(30_000)));

    assert_eq!(steps[6].kind, StepKind::Repeat);
    assert_eq!(steps[6].repeat_target, Some(4));
    assert_eq!(steps[6].repeat_count, Some(3));

    let request = FitExportRequest { title: workout.title.clone(), steps, force_sport_type: None };
    let bytes = encode_fit(&request).expect("encodes");
    assert_eq!(bytes[0], 14u8);
    assert_eq!(bytes[1], 0x10);
    assert_eq!(&bytes[8..12], b".FIT");
}

/// Scenario 3: lap-button mode forces every exercise/warmup step to
/// open-ended duration regardless of its end-condition, leaving repeat steps
/// (which never carry a duration) unaffected.
#[tokio::test]
async fn lap_button_mode_forces_open_duration_on_every_exercise_step() {
    let catalog = CatalogStore::embedded_default();
    let rules: [CuratedRule; 0] = [];
    let resolver = MappingResolver::new(&catalog, &rules);
    let compiler = StepCompiler::new(&resolver, &catalog);

    let workout = push_day_workout();
    let steps = compiler.compile(&workout, &NoUserMappings, &NoPopularity, true).await.expect("compiles");

    for step in &steps {
        match step.kind {
            StepKind::Exercise | StepKind::Warmup => {
                assert_eq!(step.duration, Some(DurationType::Open));
                assert_eq!(step.duration.expect("set").fit_code(), 5);
                assert_eq!(step.duration.expect("set").fit_value(), 0);
            }
            StepKind::Rest | StepKind::Repeat => {}
        }
    }
    assert!(steps.iter().any(|s| s.intensity == Intensity::Active));
}
