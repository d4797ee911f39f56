// ABOUTME: Garmin exercise category table and device-compatibility remap
// ABOUTME: Categories 0-32 are device-safe; 33-43 are extended and remapped before encoding

use serde::{Deserialize, Serialize};
use std::fmt;

/// The highest category id current target devices accept (§4.5).
pub const MAX_VALID_CATEGORY_ID: u16 = 32;

/// Default fallback category for anything the resolver can't place (§4.1: Core).
pub const DEFAULT_CATEGORY_ID: u16 = 5;

/// Safe generic fallback for unknown extended categories (§4.5: Total Body).
pub const TOTAL_BODY_CATEGORY_ID: u16 = 29;

/// Cardio category id, used for the Run-category override (§4.1, §4.6).
pub const CARDIO_CATEGORY_ID: u16 = 2;

/// Run category id. Only safe to emit when sport type is forced to `running` (§4.1, §6).
pub const RUN_CATEGORY_ID: u16 = 32;

/// Row category id, treated as a cardio-machine category for sport inference (original_source).
pub const ROW_CATEGORY_ID: u16 = 23;

/// The standard Garmin FIT SDK exercise categories (ids 0-32). Stable, device-recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Category {
    /// 0
    BenchPress,
    /// 1
    CalfRaise,
    /// 2
    Cardio,
    /// 3
    Carry,
    /// 4
    Chop,
    /// 5
    Core,
    /// 6
    Crunch,
    /// 7
    Curl,
    /// 8
    Deadlift,
    /// 9
    Flye,
    /// 10
    HipRaise,
    /// 11
    HipStability,
    /// 12
    HipSwing,
    /// 13
    Hyperextension,
    /// 14
    LateralRaise,
    /// 15
    LegCurl,
    /// 16
    LegRaise,
    /// 17
    Lunge,
    /// 18
    OlympicLift,
    /// 19
    Plank,
    /// 20
    Plyo,
    /// 21
    PullUp,
    /// 22
    PushUp,
    /// 23
    Row,
    /// 24
    ShoulderPress,
    /// 25
    ShoulderStability,
    /// 26
    Shrug,
    /// 27
    SitUp,
    /// 28
    Squat,
    /// 29
    TotalBody,
    /// 30
    TricepsExtension,
    /// 31
    WarmUp,
    /// 32
    Run,
}

impl Category {
    /// The stable integer id devices recognize for this category.
    #[must_use]
    pub const fn id(self) -> u16 {
        match self {
            Self::BenchPress => 0,
            Self::CalfRaise => 1,
            Self::Cardio => 2,
            Self::Carry => 3,
            Self::Chop => 4,
            Self::Core => 5,
            Self::Crunch => 6,
            Self::Curl => 7,
            Self::Deadlift => 8,
            Self::Flye => 9,
            Self::HipRaise => 10,
            Self::HipStability => 11,
            Self::HipSwing => 12,
            Self::Hyperextension => 13,
            Self::LateralRaise => 14,
            Self::LegCurl => 15,
            Self::LegRaise => 16,
            Self::Lunge => 17,
            Self::OlympicLift => 18,
            Self::Plank => 19,
            Self::Plyo => 20,
            Self::PullUp => 21,
            Self::PushUp => 22,
            Self::Row => 23,
            Self::ShoulderPress => 24,
            Self::ShoulderStability => 25,
            Self::Shrug => 26,
            Self::SitUp => 27,
            Self::Squat => 28,
            Self::TotalBody => 29,
            Self::TricepsExtension => 30,
            Self::WarmUp => 31,
            Self::Run => 32,
        }
    }

    /// Human-readable display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BenchPress => "Bench Press",
            Self::CalfRaise => "Calf Raise",
            Self::Cardio => "Cardio",
            Self::Carry => "Carry",
            Self::Chop => "Chop",
            Self::Core => "Core",
            Self::Crunch => "Crunch",
            Self::Curl => "Curl",
            Self::Deadlift => "Deadlift",
            Self::Flye => "Flye",
            Self::HipRaise => "Hip Raise",
            Self::HipStability => "Hip Stability",
            Self::HipSwing => "Hip Swing",
            Self::Hyperextension => "Hyperextension",
            Self::LateralRaise => "Lateral Raise",
            Self::LegCurl => "Leg Curl",
            Self::LegRaise => "Leg Raise",
            Self::Lunge => "Lunge",
            Self::OlympicLift => "Olympic Lift",
            Self::Plank => "Plank",
            Self::Plyo => "Plyo",
            Self::PullUp => "Pull Up",
            Self::PushUp => "Push Up",
            Self::Row => "Row",
            Self::ShoulderPress => "Shoulder Press",
            Self::ShoulderStability => "Shoulder Stability",
            Self::Shrug => "Shrug",
            Self::SitUp => "Sit Up",
            Self::Squat => "Squat",
            Self::TotalBody => "Total Body",
            Self::TricepsExtension => "Triceps Extension",
            Self::WarmUp => "Warm Up",
            Self::Run => "Run",
        }
    }

    /// Look up a category by its device id, if it is one of the 33 defined categories.
    #[must_use]
    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(Self::BenchPress),
            1 => Some(Self::CalfRaise),
            2 => Some(Self::Cardio),
            3 => Some(Self::Carry),
            4 => Some(Self::Chop),
            5 => Some(Self::Core),
            6 => Some(Self::Crunch),
            7 => Some(Self::Curl),
            8 => Some(Self::Deadlift),
            9 => Some(Self::Flye),
            10 => Some(Self::HipRaise),
            11 => Some(Self::HipStability),
            12 => Some(Self::HipSwing),
            13 => Some(Self::Hyperextension),
            14 => Some(Self::LateralRaise),
            15 => Some(Self::LegCurl),
            16 => Some(Self::LegRaise),
            17 => Some(Self::Lunge),
            18 => Some(Self::OlympicLift),
            19 => Some(Self::Plank),
            20 => Some(Self::Plyo),
            21 => Some(Self::PullUp),
            22 => Some(Self::PushUp),
            23 => Some(Self::Row),
            24 => Some(Self::ShoulderPress),
            25 => Some(Self::ShoulderStability),
            26 => Some(Self::Shrug),
            27 => Some(Self::SitUp),
            28 => Some(Self::Squat),
            29 => Some(Self::TotalBody),
            30 => Some(Self::TricepsExtension),
            31 => Some(Self::WarmUp),
            32 => Some(Self::Run),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remap an upstream category id to a device-safe id (0-32), per §4.5.
///
/// Ids 0-32 pass through unchanged. Ids 33-43 are known "extended" categories
/// from upstream data (e.g. erg machines) and fold to a semantically close
/// valid category; anything else above 32 folds to Total Body (29).
#[must_use]
pub fn remap_category_id(id: u16) -> u16 {
    if id <= MAX_VALID_CATEGORY_ID {
        return id;
    }
    match id {
        33..=37 => CARDIO_CATEGORY_ID,
        // Indoor Rower: Row (23) doesn't work for erg machines, use Cardio.
        38 => CARDIO_CATEGORY_ID,
        39..=43 => TOTAL_BODY_CATEGORY_ID,
        _ => TOTAL_BODY_CATEGORY_ID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_for_valid_ids() {
        for id in 0..=32 {
            assert_eq!(remap_category_id(id), id);
        }
    }

    #[test]
    fn indoor_rower_folds_to_cardio() {
        assert_eq!(remap_category_id(38), CARDIO_CATEGORY_ID);
    }

    #[test]
    fn unknown_extended_folds_to_total_body() {
        assert_eq!(remap_category_id(39), TOTAL_BODY_CATEGORY_ID);
        assert_eq!(remap_category_id(100), TOTAL_BODY_CATEGORY_ID);
    }

    #[test]
    fn category_ids_round_trip() {
        for id in 0..=32u16 {
            let cat = Category::from_id(id).expect("defined category");
            assert_eq!(cat.id(), id);
        }
    }
}
