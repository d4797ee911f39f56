// ABOUTME: WorkoutKit DTO Encoder (C14) - Apple Watch JSON interval shape
// ABOUTME: Folds the compiled step list into time/reps intervals, nesting repeat groups

use serde::Serialize;
use wmec_core::domain::{DurationType, Step, StepKind};
use wmec_core::{WmecError, WmecResult};

/// A single WorkoutKit interval (§4.14, §6).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkoutKitInterval {
    /// A time-bounded interval (timed exercise, rest, or distance/open with
    /// the duration heuristic applied).
    Time {
        /// Duration in whole seconds.
        seconds: u32,
        /// Optional intensity target scalar, omitted when absent.
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<f64>,
    },
    /// A rep-counted strength interval.
    Reps {
        /// Target rep count.
        reps: u32,
        /// Exercise display name.
        name: String,
        /// Optional load description, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        load: Option<String>,
        /// Optional rest after this interval, in seconds.
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(rename = "restSec")]
        rest_sec: Option<u32>,
    },
    /// A nested repeat group.
    Repeat {
        /// Total iteration count.
        reps: u32,
        /// The intervals each iteration runs.
        intervals: Vec<WorkoutKitInterval>,
    },
}

/// The full WorkoutKit document (§6).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkoutKitDocument {
    /// Apple `HKWorkoutActivityType`-style sport tag.
    pub sport: String,
    /// Sum of every leaf interval's duration, in seconds.
    pub total_duration_sec: u32,
    /// Top-level ordered intervals.
    pub intervals: Vec<WorkoutKitInterval>,
}

/// A request to encode a compiled step list as a WorkoutKit document.
#[derive(Debug, Clone)]
pub struct WorkoutKitExportRequest {
    /// Apple-side sport tag, e.g. "running", "functionalStrengthTraining".
    pub sport: String,
    /// Compiled steps.
    pub steps: Vec<Step>,
}

fn duration_seconds(step: &Step) -> u32 {
    match step.duration {
        Some(DurationType::TimeMs(ms)) => (ms / 1000).max(1),
        Some(DurationType::DistanceCm(cm)) => {
            let meters = f64::from(cm) / 100.0;
            (meters * 0.30).round().max(30.0) as u32
        }
        _ => 60,
    }
}

fn extract_power_target(name: &str) -> Option<f64> {
    let lower = name.to_lowercase();
    let idx = lower.find("% ftp").or_else(|| lower.find("%ftp"))?;
    let prefix = &lower[..idx];
    let digits: String = prefix.chars().rev().take_while(char::is_ascii_digit).collect::<Vec<_>>().into_iter().rev().collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().map(|v| (v / 100.0).clamp(0.10, 1.50))
}

fn leaf_interval(step: &Step) -> WorkoutKitInterval {
    match step.duration {
        Some(DurationType::Reps(reps)) => WorkoutKitInterval::Reps {
            reps,
            name: step.display_name.clone(),
            load: None,
            rest_sec: None,
        },
        _ => WorkoutKitInterval::Time {
            seconds: duration_seconds(step),
            target: extract_power_target(&step.display_name),
        },
    }
}

fn total_seconds(intervals: &[WorkoutKitInterval]) -> u32 {
    intervals
        .iter()
        .map(|interval| match interval {
            WorkoutKitInterval::Time { seconds, .. } => *seconds,
            WorkoutKitInterval::Reps { rest_sec, .. } => rest_sec.unwrap_or(0),
            WorkoutKitInterval::Repeat { reps, intervals } => reps * total_seconds(intervals),
        })
        .sum()
}

/// Encode a compiled step list as a WorkoutKit document (§4.14, §6).
pub fn encode_workoutkit(request: &WorkoutKitExportRequest) -> WmecResult<WorkoutKitDocument> {
    if request.steps.is_empty() {
        return Err(WmecError::encoding("cannot encode a workout with zero steps"));
    }

    let mut intervals = Vec::new();
    let mut index = 0;
    while index < request.steps.len() {
        let step = &request.steps[index];
        match step.kind {
            StepKind::Repeat => {
                let (Some(target), Some(count)) = (step.repeat_target, step.repeat_count) else {
                    return Err(WmecError::encoding("repeat step missing target or count"));
                };
                if target >= index {
                    return Err(WmecError::encoding("repeat target must precede the repeat step"));
                }
                let body: Vec<WorkoutKitInterval> = request.steps[target..index].iter().map(leaf_interval).collect();
                intervals.push(WorkoutKitInterval::Repeat { reps: count, intervals: body });
            }
            StepKind::Exercise | StepKind::Warmup | StepKind::Rest => {
                intervals.push(leaf_interval(step));
            }
        }
        index += 1;
    }

    Ok(WorkoutKitDocument {
        sport: request.sport.clone(),
        total_duration_sec: total_seconds(&intervals),
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmec_core::domain::Intensity;

    #[test]
    fn rejects_empty_step_list() {
        let request = WorkoutKitExportRequest { sport: "running".to_owned(), steps: vec![] };
        assert!(encode_workoutkit(&request).is_err());
    }

    #[test]
    fn reps_duration_type_becomes_reps_interval() {
        let steps = vec![Step::exercise("Goblet Squat", Intensity::Active, DurationType::Reps(12), 17, None)];
        let request = WorkoutKitExportRequest { sport: "functionalStrengthTraining".to_owned(), steps };
        let doc = encode_workoutkit(&request).expect("encodes");
        assert!(matches!(doc.intervals[0], WorkoutKitInterval::Reps { reps: 12, .. }));
    }

    #[test]
    fn repeat_step_nests_its_body_as_a_group() {
        let steps = vec![
            Step::exercise("Bike 70% FTP", Intensity::Active, DurationType::TimeMs(60_000), 2, None),
            Step::rest(DurationType::TimeMs(30_000)),
            Step::repeat(0, 4),
        ];
        let request = WorkoutKitExportRequest { sport: "cycling".to_owned(), steps };
        let doc = encode_workoutkit(&request).expect("encodes");
        let WorkoutKitInterval::Repeat { reps, intervals } = &doc.intervals[0] else {
            panic!("expected a repeat group");
        };
        assert_eq!(*reps, 4);
        assert_eq!(intervals.len(), 2);
    }

    #[test]
    fn power_target_is_extracted_from_display_name() {
        let steps = vec![Step::exercise("Bike Erg 70% FTP", Intensity::Active, DurationType::TimeMs(60_000), 2, None)];
        let request = WorkoutKitExportRequest { sport: "cycling".to_owned(), steps };
        let doc = encode_workoutkit(&request).expect("encodes");
        let WorkoutKitInterval::Time { target, .. } = &doc.intervals[0] else {
            panic!("expected a time interval");
        };
        assert_eq!(*target, Some(0.70));
    }

    #[test]
    fn total_duration_sums_leaf_seconds() {
        let steps = vec![
            Step::exercise("Run", Intensity::Active, DurationType::TimeMs(60_000), 2, None),
            Step::rest(DurationType::TimeMs(30_000)),
        ];
        let request = WorkoutKitExportRequest { sport: "running".to_owned(), steps };
        let doc = encode_workoutkit(&request).expect("encodes");
        assert_eq!(doc.total_duration_sec, 90);
    }
}
