// ABOUTME: The Blocks Workout model (C7) - titled workout, ordered blocks, exercises and supersets
// ABOUTME: A plain data contract; construction validates the invariants from §3 (sets>=1, single end-condition)

use serde::{Deserialize, Serialize};
use wmec_core::domain::EndCondition;
use wmec_core::{WmecError, WmecResult};

/// Whether a rest period is timed or advanced by the lap button (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestType {
    /// A fixed-duration rest.
    Timed,
    /// Lap-button-advanced rest with no fixed duration.
    Button,
}

/// A single exercise entry within a block or superset (§3).
///
/// Construction enforces `sets >= 1`; the end-condition itself is already an
/// explicit sum type ([`EndCondition`]) rather than the dynamically-typed
/// `reps` field the original source used, so "exactly one end-condition" is
/// structural rather than a runtime invariant to check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Raw, user-supplied exercise name.
    pub name: String,
    /// The primary end-condition.
    pub end_condition: EndCondition,
    /// Number of sets, always `>= 1`.
    pub sets: u32,
    /// Optional distance in meters, independent of `end_condition` (§4.8 step
    /// 3a takes priority over reps/duration when both are present).
    pub distance_m: Option<f64>,
    /// Optional rest after this exercise, in seconds.
    pub rest_sec: Option<u32>,
    /// Optional rest type; `None` defaults to timed when `rest_sec` is set.
    pub rest_type: Option<RestType>,
    /// Optional warm-up sets performed before the working sets.
    pub warmup_sets: Option<u32>,
    /// Optional rep count for each warm-up set.
    pub warmup_reps: Option<u32>,
    /// An already-resolved catalog display name, bypassing C4 when present.
    pub mapped_name: Option<String>,
    /// Free-text notes, carried through to YAML rendering verbatim if present.
    pub notes: Option<String>,
}

impl Exercise {
    /// Construct an exercise, validating `sets >= 1` (§3).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `sets == 0`.
    pub fn new(name: impl Into<String>, end_condition: EndCondition, sets: u32) -> WmecResult<Self> {
        if sets == 0 {
            return Err(WmecError::invalid_input("exercise sets must be >= 1"));
        }
        Ok(Self {
            name: name.into(),
            end_condition,
            sets,
            distance_m: None,
            rest_sec: None,
            rest_type: None,
            warmup_sets: None,
            warmup_reps: None,
            mapped_name: None,
            notes: None,
        })
    }
}

/// An ordered group of exercises sharing a rest policy, run back-to-back (§3).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Superset {
    /// Exercises run in order within this superset.
    pub exercises: Vec<Exercise>,
    /// Rest taken after this superset, unless it is the block's last.
    pub rest_between_sec: Option<u32>,
    /// Rest type for `rest_between_sec`.
    pub rest_type: Option<RestType>,
}

/// An optional warm-up spec attached to a block (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupSpec {
    /// Warm-up activity name, e.g. "Row" or "Jump Rope".
    pub activity: String,
    /// Warm-up duration in seconds; `None` means lap-button driven.
    pub duration_sec: Option<u32>,
}

/// A titled group of exercises and/or supersets, optionally repeated (§3).
///
/// Supersets are processed before standalone exercises within a block
/// (§4.7), matching the step compiler's emission order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Block {
    /// Optional human label, e.g. "A" or "Finisher".
    pub label: Option<String>,
    /// Number of rounds this block repeats, `>= 1`.
    pub rounds: Option<u32>,
    /// Rest between sets within this block, in seconds.
    pub rest_between_sec: Option<u32>,
    /// Rest between rounds of this block, in seconds.
    pub rest_between_rounds_sec: Option<u32>,
    /// Rest type applied to both `rest_between_sec` and `rest_between_rounds_sec`.
    pub rest_type: Option<RestType>,
    /// Optional warm-up emitted before this block's working sets.
    pub warmup: Option<WarmupSpec>,
    /// Standalone exercises in this block, run after any supersets.
    pub exercises: Vec<Exercise>,
    /// Supersets in this block, run before standalone exercises.
    pub supersets: Vec<Superset>,
}

/// The canonical workout: a title plus an ordered list of blocks (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    /// Workout title, used to derive encoder-specific names (FIT filename
    /// tag, ZWO `<name>`, YAML workout key).
    pub title: String,
    /// Ordered blocks.
    pub blocks: Vec<Block>,
}

impl Workout {
    /// Construct a workout. Validation of per-exercise invariants happens at
    /// `Exercise::new` time; this constructor only requires a non-empty title.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `title` is empty.
    pub fn new(title: impl Into<String>, blocks: Vec<Block>) -> WmecResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(WmecError::invalid_input("workout title must not be empty"));
        }
        Ok(Self { title, blocks })
    }

    /// Every exercise across every block, in step-compiler emission order
    /// (supersets, then standalone, per block) — used by C12/C13 to collect
    /// distinct names for matching.
    #[must_use]
    pub fn exercises_in_emission_order(&self) -> Vec<&Exercise> {
        self.blocks
            .iter()
            .flat_map(|block| {
                block
                    .supersets
                    .iter()
                    .flat_map(|superset| superset.exercises.iter())
                    .chain(block.exercises.iter())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_rejects_zero_sets() {
        let result = Exercise::new("Squat", EndCondition::Reps(10), 0);
        assert!(result.is_err());
    }

    #[test]
    fn workout_rejects_empty_title() {
        assert!(Workout::new("  ", vec![]).is_err());
    }

    #[test]
    fn emission_order_visits_supersets_before_standalone() {
        let superset_exercise = Exercise::new("Row", EndCondition::Distance(500.0), 1).expect("valid");
        let standalone_exercise = Exercise::new("Squat", EndCondition::Reps(10), 1).expect("valid");
        let block = Block {
            supersets: vec![Superset { exercises: vec![superset_exercise], ..Default::default() }],
            exercises: vec![standalone_exercise],
            ..Default::default()
        };
        let workout = Workout::new("Test", vec![block]).expect("valid");
        let names: Vec<&str> = workout.exercises_in_emission_order().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Row", "Squat"]);
    }
}
