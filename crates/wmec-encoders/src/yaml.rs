// ABOUTME: YAML Encoder (C11) - Hyrox/Garmin YAML workout document
// ABOUTME: settings/workouts/schedulePlan document, per-exercise "<Display> [category: <CAT>]" keys

use chrono::{Duration, Utc};
use serde_yaml::{Mapping, Value};
use wmec_core::category::Category;
use wmec_core::domain::{DurationType, Step, StepKind};
use wmec_core::{WmecError, WmecResult};

/// A request to encode a compiled step list as Hyrox/Garmin YAML.
#[derive(Debug, Clone)]
pub struct YamlExportRequest {
    /// Workout title; also the source for the derived workout name.
    pub title: String,
    /// Compiled steps.
    pub steps: Vec<Step>,
}

/// Derive the short workout-name key from a title (§4.11). "Week 5 of 12"
/// style titles become `fullhyroxweekN`; anything else is lowercased and
/// stripped to alphanumerics.
fn workout_name_from_title(title: &str) -> String {
    let lower = title.to_lowercase();
    if let Some(idx) = lower.find("week") {
        let digits: String = lower[idx + 4..]
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if !digits.is_empty() {
            return format!("fullhyroxweek{digits}");
        }
    }
    let cleaned: String = lower.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.is_empty() {
        "workout".to_owned()
    } else {
        cleaned
    }
}

fn category_tag(category_id: Option<u16>) -> String {
    category_id.and_then(Category::from_id).map_or_else(
        || "UNKNOWN".to_owned(),
        |category| category.name().to_uppercase(),
    )
}

fn exercise_key(step: &Step) -> String {
    format!("{} [category: {}]", step.display_name, category_tag(step.category_id))
}

/// The value string for a working exercise step: a device target, and for
/// rep/lap-based exercises a pipe-separated note with the original name and
/// mapping reason (§4.11). Pure timed exercises carry no note, matching the
/// Strength Workout Guide convention the original port follows.
fn exercise_value(step: &Step) -> String {
    if let Some(DurationType::TimeMs(ms)) = step.duration {
        return format!("{}s", (ms / 1000).max(1));
    }

    let Some(original) = step.original_name.as_deref() else {
        return step.note_reps.map_or_else(|| "lap".to_owned(), |reps| format!("{reps} reps"));
    };
    let reason = step.mapping_reason.as_deref().unwrap_or("chosen automatically");
    match step.note_reps {
        Some(reps) => format!("lap | {original} x{reps} ({reason})"),
        None => format!("lap | {original} ({reason})"),
    }
}

fn rest_value(step: &Step) -> String {
    match step.duration {
        Some(DurationType::TimeMs(ms)) => format!("{}s", (ms / 1000).max(1)),
        _ => "lap".to_owned(),
    }
}

fn single_entry(key: impl Into<String>, value: impl Into<String>) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::String(key.into()), Value::String(value.into()));
    Value::Mapping(map)
}

fn encode_exercise_entry(step: &Step) -> Value {
    single_entry(exercise_key(step), exercise_value(step))
}

fn encode_body_step(step: &Step) -> Value {
    match step.kind {
        StepKind::Rest => single_entry("rest", rest_value(step)),
        _ => encode_exercise_entry(step),
    }
}

fn wrap_warmup(entry: Value) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::String("warmup".to_owned()), Value::Sequence(vec![entry]));
    Value::Mapping(map)
}

/// Encode a compiled step list as a Hyrox/Garmin YAML document (§4.11, §6).
///
/// Multi-round blocks were flattened into `Repeat` steps by the compiler
/// (C8); `repeat_target..step_index` is the body the repeat wraps, the same
/// convention the FIT encoder uses for its `workout_step_target_step` field.
pub fn encode_yaml(request: &YamlExportRequest) -> WmecResult<String> {
    if request.steps.is_empty() {
        return Err(WmecError::encoding("cannot encode a workout with zero steps"));
    }

    let workout_name = workout_name_from_title(&request.title);
    let mut workout_steps: Vec<Value> = Vec::new();

    if !request.steps.iter().any(|step| step.kind == StepKind::Warmup) {
        workout_steps.push(wrap_warmup(single_entry("cardio", "lap")));
    }

    let mut index = 0;
    while index < request.steps.len() {
        let step = &request.steps[index];
        match step.kind {
            StepKind::Warmup => workout_steps.push(wrap_warmup(encode_exercise_entry(step))),
            StepKind::Exercise => workout_steps.push(encode_exercise_entry(step)),
            StepKind::Rest => workout_steps.push(single_entry("rest", rest_value(step))),
            StepKind::Repeat => {
                let (Some(target), Some(count)) = (step.repeat_target, step.repeat_count) else {
                    return Err(WmecError::encoding("repeat step missing target or count"));
                };
                if target >= index {
                    return Err(WmecError::encoding("repeat target must precede the repeat step"));
                }
                let body: Vec<Value> = request.steps[target..index].iter().map(encode_body_step).collect();
                let mut repeat_map = Mapping::new();
                repeat_map.insert(Value::String(format!("repeat({count})")), Value::Sequence(body));
                workout_steps.push(Value::Mapping(repeat_map));
            }
        }
        index += 1;
    }

    let mut settings = Mapping::new();
    settings.insert(Value::String("deleteSameNameWorkout".to_owned()), Value::Bool(true));

    let mut workouts = Mapping::new();
    workouts.insert(Value::String(workout_name.clone()), Value::Sequence(workout_steps));

    let start_from = (Utc::now() + Duration::days(7)).format("%Y-%m-%d").to_string();
    let mut schedule_plan = Mapping::new();
    schedule_plan.insert(Value::String("start_from".to_owned()), Value::String(start_from));
    schedule_plan.insert(
        Value::String("workouts".to_owned()),
        Value::Sequence(vec![Value::String(workout_name)]),
    );

    let mut doc = Mapping::new();
    doc.insert(Value::String("settings".to_owned()), Value::Mapping(settings));
    doc.insert(Value::String("workouts".to_owned()), Value::Mapping(workouts));
    doc.insert(Value::String("schedulePlan".to_owned()), Value::Mapping(schedule_plan));

    serde_yaml::to_string(&Value::Mapping(doc))
        .map_err(|e| WmecError::encoding(format!("yaml serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmec_core::domain::Intensity;

    #[test]
    fn rejects_empty_step_list() {
        let request = YamlExportRequest { title: "Empty".to_owned(), steps: vec![] };
        assert!(encode_yaml(&request).is_err());
    }

    #[test]
    fn rep_based_exercise_defaults_target_to_lap_with_note() {
        let step = Step::exercise("Goblet Squat", Intensity::Active, DurationType::Reps(8), 17, None).with_note(
            "KB RDL Into Goblet Squat",
            "chosen as popular choice by 3 users",
            Some(8),
        );
        let request = YamlExportRequest { title: "Week 5 Of 12".to_owned(), steps: vec![step] };
        let yaml = encode_yaml(&request).expect("encodes");
        assert!(yaml.contains("lap | KB RDL Into Goblet Squat x8 (chosen as popular choice by 3 users)"));
        assert!(yaml.contains("Goblet Squat [category: LUNGE]"));
    }

    #[test]
    fn timed_exercise_carries_no_note() {
        let step = Step::exercise("Plank", Intensity::Active, DurationType::TimeMs(45_000), 19, None).with_note(
            "plank hold",
            "chosen as popular choice by 1 users",
            None,
        );
        let request = YamlExportRequest { title: "Core Day".to_owned(), steps: vec![step] };
        let yaml = encode_yaml(&request).expect("encodes");
        assert!(yaml.contains("Plank [category: PLANK]: 45s"));
        assert!(!yaml.contains("plank hold"));
    }

    #[test]
    fn week_title_derives_full_hyrox_week_name() {
        let steps = vec![Step::exercise("Run", Intensity::Active, DurationType::TimeMs(60_000), 2, None)];
        let request = YamlExportRequest { title: "Week 5 Of 12".to_owned(), steps };
        let yaml = encode_yaml(&request).expect("encodes");
        assert!(yaml.contains("fullhyroxweek5:"));
        assert!(yaml.contains("start_from"));
    }

    #[test]
    fn repeat_step_wraps_its_body_range() {
        let steps = vec![
            Step::exercise("Wall Ball", Intensity::Active, DurationType::Reps(15), 5, None),
            Step::rest(DurationType::TimeMs(30_000)),
            Step::repeat(0, 4),
        ];
        let request = YamlExportRequest { title: "Amrap".to_owned(), steps };
        let yaml = encode_yaml(&request).expect("encodes");
        assert!(yaml.contains("repeat(4):"));
        assert!(yaml.contains("rest: 30s"));
    }

    #[test]
    fn deletesamenameworkout_and_settings_are_present() {
        let steps = vec![Step::exercise("Run", Intensity::Active, DurationType::TimeMs(60_000), 2, None)];
        let request = YamlExportRequest { title: "Easy".to_owned(), steps };
        let yaml = encode_yaml(&request).expect("encodes");
        assert!(yaml.contains("deleteSameNameWorkout: true"));
        assert!(yaml.contains("schedulePlan:"));
    }
}
