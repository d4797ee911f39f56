// ABOUTME: FIT sport / sub-sport enums and the category-driven sport inference rule
// ABOUTME: Sport is inferred from the set of exercise categories used in a compiled step list

use crate::category::{CARDIO_CATEGORY_ID, ROW_CATEGORY_ID, RUN_CATEGORY_ID};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// FIT `sport` enum values WMEC emits (§6). `fitness_equipment` (4) is
/// deliberately absent: it is known to be rejected by current watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sport {
    /// FIT sport id 1.
    Running,
    /// FIT sport id 10.
    Training,
}

impl Sport {
    /// The FIT sport enum value.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Running => 1,
            Self::Training => 10,
        }
    }
}

/// FIT `sub_sport` enum values WMEC emits (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubSport {
    /// FIT sub_sport id 0.
    Generic,
    /// FIT sub_sport id 20.
    StrengthTraining,
    /// FIT sub_sport id 26.
    CardioTraining,
}

impl SubSport {
    /// The FIT sub_sport enum value.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::StrengthTraining => 20,
            Self::CardioTraining => 26,
        }
    }
}

/// A caller-forced sport override, bypassing inference entirely (§4.6, §6).
///
/// `lowercase` so `?sport_type=strength|cardio|running` round-trips the same
/// way `ZwoSport`'s `?sport=run|bike` query parameter does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedSportType {
    /// Pure strength: (training, strength_training).
    Strength,
    /// Cardio: (training, cardio_training).
    Cardio,
    /// Pure running: (running, generic).
    Running,
}

/// Infer `(sport, sub_sport)` from the set of device category ids used in a
/// compiled step list, per §4.6. Callers may force a sport type instead.
#[must_use]
pub fn infer_sport(category_ids: &HashSet<u16>) -> (Sport, SubSport) {
    let has_running = category_ids.contains(&RUN_CATEGORY_ID);
    let has_cardio_machine =
        category_ids.contains(&CARDIO_CATEGORY_ID) || category_ids.contains(&ROW_CATEGORY_ID);
    let has_strength = category_ids
        .iter()
        .any(|id| *id != RUN_CATEGORY_ID && *id != CARDIO_CATEGORY_ID && *id != ROW_CATEGORY_ID);

    if has_running && !has_strength && !has_cardio_machine {
        return (Sport::Running, SubSport::Generic);
    }
    if has_running || has_cardio_machine {
        return (Sport::Training, SubSport::CardioTraining);
    }
    (Sport::Training, SubSport::StrengthTraining)
}

/// Resolve a forced sport type (or fall back to inference) to `(sport, sub_sport)`.
#[must_use]
pub fn resolve_sport(
    forced: Option<ForcedSportType>,
    category_ids: &HashSet<u16>,
) -> (Sport, SubSport) {
    match forced {
        Some(ForcedSportType::Strength) => (Sport::Training, SubSport::StrengthTraining),
        Some(ForcedSportType::Cardio) => (Sport::Training, SubSport::CardioTraining),
        Some(ForcedSportType::Running) => (Sport::Running, SubSport::Generic),
        None => infer_sport(category_ids),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_running_infers_running_generic() {
        let cats: HashSet<u16> = [RUN_CATEGORY_ID].into_iter().collect();
        let (sport, sub) = infer_sport(&cats);
        assert_eq!(sport.id(), 1);
        assert_eq!(sub.id(), 0);
    }

    #[test]
    fn mixed_running_and_strength_infers_cardio_training() {
        let cats: HashSet<u16> = [RUN_CATEGORY_ID, 22].into_iter().collect();
        let (sport, sub) = infer_sport(&cats);
        assert_eq!(sport.id(), 10);
        assert_eq!(sub.id(), 26);
    }

    #[test]
    fn pure_strength_infers_strength_training() {
        let cats: HashSet<u16> = [0, 22, 28].into_iter().collect();
        let (sport, sub) = infer_sport(&cats);
        assert_eq!(sport.id(), 10);
        assert_eq!(sub.id(), 20);
    }

    #[test]
    fn cardio_category_alone_infers_cardio_training() {
        let cats: HashSet<u16> = [CARDIO_CATEGORY_ID].into_iter().collect();
        let (sport, sub) = infer_sport(&cats);
        assert_eq!(sport.id(), 10);
        assert_eq!(sub.id(), 26);
    }
}
