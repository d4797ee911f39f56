// ABOUTME: Shared domain primitives for exercise end-conditions, mapping provenance, and compiled steps
// ABOUTME: These types form the boundary between name matching, the step compiler, and the device encoders

use serde::{Deserialize, Serialize};

/// The exercise's primary end-condition (§3, §9). Exactly one of these applies
/// to a given exercise; this is the explicit sum type the redesign notes call
/// for in place of the original's dynamically-typed `reps` field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EndCondition {
    /// A fixed rep count.
    Reps(u32),
    /// An inclusive rep range; callers take the lower bound for duration
    /// purposes and the upper bound where the spec calls for it (§4.8 step 4e).
    RepsRange(u32, u32),
    /// A fixed duration in seconds.
    Duration(u32),
    /// A fixed distance in meters.
    Distance(f64),
    /// No explicit end-condition (open / lap button).
    Open,
}

impl EndCondition {
    /// The lower-bound rep count, if this end-condition carries one.
    #[must_use]
    pub const fn reps_lower_bound(self) -> Option<u32> {
        match self {
            Self::Reps(n) => Some(n),
            Self::RepsRange(lo, _) => Some(lo),
            _ => None,
        }
    }

    /// The upper-bound rep count, used when the compiler prefers it (§4.8 step 4e).
    #[must_use]
    pub const fn reps_upper_bound(self) -> Option<u32> {
        match self {
            Self::Reps(n) => Some(n),
            Self::RepsRange(_, hi) => Some(hi),
            _ => None,
        }
    }
}

/// Where a mapping decision came from (§3, §4.4, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The caller's own saved mapping.
    User,
    /// The crowd-popularity table.
    Popular,
    /// A curated substring/alias rule.
    Curated,
    /// Catalog fuzzy matching.
    Fuzzy,
    /// An independent canonical-token classifier.
    Canonical,
    /// Title-cased normalized name with no real match.
    Fallback,
}

impl Provenance {
    /// A human-readable reason fragment for this provenance (§4.4), independent
    /// of any popularity count — callers append the count themselves when
    /// provenance is `Popular`.
    #[must_use]
    pub const fn reason_template(self) -> &'static str {
        match self {
            Self::User => "chosen from your saved preferences",
            Self::Popular => "chosen as popular choice",
            Self::Curated => "matched a known exercise name",
            Self::Fuzzy => "closest catalog match",
            Self::Canonical => "matched via canonical classification",
            Self::Fallback => "used name as-is (no match found)",
        }
    }
}

/// A resolved exercise-name mapping (§3: Mapping Resolution). Ephemeral — built
/// per lookup, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResolution {
    /// The exercise name exactly as supplied.
    pub original_name: String,
    /// The normalized form of `original_name`.
    pub normalized_name: String,
    /// The catalog display name this resolved to.
    pub display_name: String,
    /// The device-safe category id (post-remap).
    pub category_id: u16,
    /// An optional real FIT SDK exercise-name id.
    pub fit_exercise_name_id: Option<u16>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Where this resolution came from.
    pub provenance: Provenance,
    /// Popularity count, present only when `provenance == Popular`.
    pub popularity_count: Option<u32>,
    /// A human-readable explanation, e.g. "chosen as popular choice by 4 users".
    pub reason: String,
}

impl MappingResolution {
    /// Build the human-readable reason string for a resolution, folding in the
    /// popularity count when present (§4.4, §8 scenario 4).
    #[must_use]
    pub fn reason_for(provenance: Provenance, popularity_count: Option<u32>) -> String {
        match (provenance, popularity_count) {
            (Provenance::Popular, Some(count)) => {
                format!("chosen as popular choice by {count} users")
            }
            _ => provenance.reason_template().to_owned(),
        }
    }
}

/// What kind of executable unit a compiled [`Step`] represents (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A working exercise.
    Exercise,
    /// A rest interval.
    Rest,
    /// A back-reference that repeats an earlier run of steps.
    Repeat,
    /// A warm-up step (activity-only, usually lap-button driven).
    Warmup,
}

/// The intensity tag carried by a compiled step (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Active work.
    Active,
    /// Rest.
    Rest,
    /// Warm-up.
    Warmup,
}

/// The compiled step's duration semantics (§3). The associated value's unit
/// depends on the variant: milliseconds, centimeters, or a rep count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationType {
    /// Time-based, value in milliseconds.
    TimeMs(u32),
    /// Distance-based, value in centimeters.
    DistanceCm(u32),
    /// Rep-count-based.
    Reps(u32),
    /// No explicit duration (lap button / open).
    Open,
}

impl DurationType {
    /// The FIT `duration_type` enum value this maps to (§4.9, §8 invariant 7).
    #[must_use]
    pub const fn fit_code(self) -> u8 {
        match self {
            Self::TimeMs(_) => 0,
            Self::DistanceCm(_) => 1,
            Self::Reps(_) => 29,
            Self::Open => 5,
        }
    }

    /// The raw duration value FIT expects alongside `fit_code()`.
    #[must_use]
    pub const fn fit_value(self) -> u32 {
        match self {
            Self::TimeMs(v) | Self::DistanceCm(v) | Self::Reps(v) => v,
            Self::Open => 0,
        }
    }
}

/// The FIT `duration_type` enum value for a repeat step (`REPEAT_UNTIL_STEPS_CMPLT`).
pub const REPEAT_UNTIL_STEPS_CMPLT: u8 = 6;

/// A single compiled step in the flattened workout step list (§3: Step).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// What this step represents.
    pub kind: StepKind,
    /// Display name (ignored for rest/repeat steps at the encoder boundary,
    /// still carried for YAML note rendering).
    pub display_name: String,
    /// Intensity tag.
    pub intensity: Intensity,
    /// Duration semantics. `None` for repeat steps, which use
    /// `repeat_target`/`repeat_count` instead.
    pub duration: Option<DurationType>,
    /// Device-safe category id. Only set for `Exercise`/`Warmup` steps —
    /// rest steps must never carry one (§8 invariant 4).
    pub category_id: Option<u16>,
    /// Real FIT SDK exercise-name id, when the catalog has one.
    pub fit_exercise_name_id: Option<u16>,
    /// For `Repeat` steps: the index of the step this repeat loops back to.
    pub repeat_target: Option<usize>,
    /// For `Repeat` steps: total iteration count (not additional repeats).
    pub repeat_count: Option<u32>,
    /// The raw, pre-normalization exercise name as the caller supplied it.
    /// Carried through for human-readable note rendering (§4.11); `None` for
    /// rest/repeat steps and for exercise steps built without mapping context.
    pub original_name: Option<String>,
    /// The mapping resolution's human-readable reason (§4.4), e.g.
    /// "chosen as popular choice by 3 users". Carried alongside
    /// `original_name` for the same reason.
    pub mapping_reason: Option<String>,
    /// The exercise's rep count, when its end-condition is rep-based, used to
    /// render "x{n}" in YAML notes even though the device target is "lap".
    pub note_reps: Option<u32>,
}

impl Step {
    /// Construct a working/warm-up exercise step.
    #[must_use]
    pub fn exercise(
        display_name: impl Into<String>,
        intensity: Intensity,
        duration: DurationType,
        category_id: u16,
        fit_exercise_name_id: Option<u16>,
    ) -> Self {
        Self {
            kind: if matches!(intensity, Intensity::Warmup) {
                StepKind::Warmup
            } else {
                StepKind::Exercise
            },
            display_name: display_name.into(),
            intensity,
            duration: Some(duration),
            category_id: Some(category_id),
            fit_exercise_name_id,
            repeat_target: None,
            repeat_count: None,
            original_name: None,
            mapping_reason: None,
            note_reps: None,
        }
    }

    /// Construct a rest step. Rest steps never carry a category id (§8 invariant 4).
    #[must_use]
    pub fn rest(duration: DurationType) -> Self {
        Self {
            kind: StepKind::Rest,
            display_name: "Rest".to_owned(),
            intensity: Intensity::Rest,
            duration: Some(duration),
            category_id: None,
            fit_exercise_name_id: None,
            repeat_target: None,
            repeat_count: None,
            original_name: None,
            mapping_reason: None,
            note_reps: None,
        }
    }

    /// Construct a repeat step. `target` must be strictly earlier than this
    /// step's own index in the list (§3, §8 invariant 1); `count` is the total
    /// number of iterations, not additional repeats, and must be `>= 2`.
    #[must_use]
    pub fn repeat(target: usize, count: u32) -> Self {
        Self {
            kind: StepKind::Repeat,
            display_name: "Repeat".to_owned(),
            intensity: Intensity::Active,
            duration: None,
            category_id: None,
            fit_exercise_name_id: None,
            repeat_target: Some(target),
            repeat_count: Some(count),
            original_name: None,
            mapping_reason: None,
            note_reps: None,
        }
    }

    /// Attach original-name/reason/rep-count note context (§4.11). Builder
    /// style so callers that don't need YAML notes (FIT, ZWO) can ignore it.
    #[must_use]
    pub fn with_note(
        mut self,
        original_name: impl Into<String>,
        reason: impl Into<String>,
        reps: Option<u32>,
    ) -> Self {
        self.original_name = Some(original_name.into());
        self.mapping_reason = Some(reason.into());
        self.note_reps = reps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popular_reason_includes_count() {
        let reason = MappingResolution::reason_for(Provenance::Popular, Some(4));
        assert_eq!(reason, "chosen as popular choice by 4 users");
    }

    #[test]
    fn rest_step_never_carries_category() {
        let step = Step::rest(DurationType::TimeMs(30_000));
        assert!(step.category_id.is_none());
        assert!(step.fit_exercise_name_id.is_none());
    }

    #[test]
    fn duration_type_fit_codes_match_spec() {
        assert_eq!(DurationType::Open.fit_code(), 5);
        assert_eq!(DurationType::TimeMs(0).fit_code(), 0);
        assert_eq!(DurationType::Reps(0).fit_code(), 29);
        assert_eq!(REPEAT_UNTIL_STEPS_CMPLT, 6);
    }
}
