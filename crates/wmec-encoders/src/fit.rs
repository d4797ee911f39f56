// ABOUTME: FIT Encoder (C9) - binary Garmin workout file writer
// ABOUTME: Byte-exact envelope and field numbering per the corrected layout (target_type=0, repeat fields 2/4, total repeat count)

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use wmec_core::domain::{Step, StepKind};
use wmec_core::sport::{resolve_sport, ForcedSportType};
use wmec_core::{WmecError, WmecResult};

/// FIT epoch offset: seconds between the Unix epoch and 1989-12-31T00:00:00Z.
const FIT_EPOCH_OFFSET: u64 = 631_065_600;

const GLOBAL_FILE_ID: u16 = 0;
const GLOBAL_FILE_CREATOR: u16 = 49;
const GLOBAL_WORKOUT: u16 = 26;
const GLOBAL_WORKOUT_STEP: u16 = 27;
const GLOBAL_EXERCISE_TITLE: u16 = 264;

const TARGET_TYPE_OPEN: u8 = 0;
const INTENSITY_ACTIVE: u8 = 0;
const INTENSITY_REST: u8 = 1;
const INTENSITY_WARMUP: u8 = 2;
const REPEAT_UNTIL_STEPS_CMPLT: u8 = wmec_core::domain::REPEAT_UNTIL_STEPS_CMPLT;

const BASE_TYPE_ENUM: u8 = 0x00;
const BASE_TYPE_UINT8: u8 = 0x02;
const BASE_TYPE_STRING: u8 = 0x07;
const BASE_TYPE_UINT16: u8 = 0x84;
const BASE_TYPE_UINT32: u8 = 0x86;
const BASE_TYPE_UINT32Z: u8 = 0x8C;

/// A request to encode a compiled step list as a FIT binary workout.
#[derive(Debug, Clone)]
pub struct FitExportRequest {
    /// Workout title; truncated to 31 bytes + NUL on write.
    pub title: String,
    /// The compiled step list.
    pub steps: Vec<Step>,
    /// Optional forced sport, bypassing inference.
    pub force_sport_type: Option<ForcedSportType>,
}

fn crc16(data: &[u8]) -> u16 {
    const TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];
    let mut crc: u16 = 0;
    for &byte in data {
        let mut tmp = TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc ^= tmp ^ TABLE[(byte & 0xF) as usize];
        tmp = TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc ^= tmp ^ TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

/// Category ids that drive sport inference (§4.6): working exercise steps
/// only. The injected default warm-up always carries
/// `CARDIO_CATEGORY_ID`, and warm-up steps declared on a block do too, so
/// including either would push every warmup-less strength workout into
/// `cardio_training` instead of `strength_training`.
fn sport_inference_categories(steps: &[Step]) -> std::collections::HashSet<u16> {
    steps.iter().filter(|s| s.kind == StepKind::Exercise).filter_map(|s| s.category_id).collect()
}

fn write_fixed_string(buf: &mut Vec<u8>, s: &str, len: usize) {
    let bytes = s.as_bytes();
    let take = bytes.len().min(len - 1);
    buf.extend_from_slice(&bytes[..take]);
    buf.resize(buf.len() + (len - take), 0);
}

fn field_def(buf: &mut Vec<u8>, field_num: u8, size: u8, base_type: u8) {
    buf.extend_from_slice(&[field_num, size, base_type]);
}

fn definition_message(buf: &mut Vec<u8>, local_type: u8, global_num: u16, fields: &[(u8, u8, u8)]) {
    buf.push(0x40 | local_type);
    buf.push(0); // reserved
    buf.push(0); // architecture: little-endian
    buf.extend_from_slice(&global_num.to_le_bytes());
    buf.push(fields.len() as u8);
    for &(field_num, size, base_type) in fields {
        field_def(buf, field_num, size, base_type);
    }
}

struct ExerciseIdAssigner {
    assigned: HashMap<(u16, String), u16>,
    next_per_category: HashMap<u16, u16>,
}

impl ExerciseIdAssigner {
    fn new() -> Self {
        Self {
            assigned: HashMap::new(),
            next_per_category: HashMap::new(),
        }
    }

    fn id_for(&mut self, category_id: u16, display_name: &str, known_id: Option<u16>) -> u16 {
        let key = (category_id, display_name.to_owned());
        if let Some(&id) = self.assigned.get(&key) {
            return id;
        }
        let id = known_id.unwrap_or_else(|| {
            let next = self.next_per_category.entry(category_id).or_insert(0);
            let assigned = *next;
            *next += 1;
            assigned
        });
        self.assigned.insert(key, id);
        id
    }
}

/// Encode a compiled step list as a FIT binary workout (§4.9).
pub fn encode_fit(request: &FitExportRequest) -> WmecResult<Vec<u8>> {
    if request.steps.is_empty() {
        return Err(WmecError::encoding("cannot encode a workout with zero steps"));
    }

    let category_ids = sport_inference_categories(&request.steps);
    let (sport, sub_sport) = resolve_sport(request.force_sport_type, &category_ids);

    let mut assigner = ExerciseIdAssigner::new();
    for step in &request.steps {
        if matches!(step.kind, StepKind::Exercise | StepKind::Warmup) {
            assigner.id_for(
                step.category_id.unwrap_or(wmec_core::category::DEFAULT_CATEGORY_ID),
                &step.display_name,
                step.fit_exercise_name_id,
            );
        }
    }

    let mut data = Vec::new();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let fit_timestamp = now.saturating_sub(FIT_EPOCH_OFFSET) as u32;

    // file_id (local 0, global 0).
    definition_message(
        &mut data,
        0,
        GLOBAL_FILE_ID,
        &[
            (0, 1, BASE_TYPE_ENUM),
            (1, 2, BASE_TYPE_UINT16),
            (2, 2, BASE_TYPE_UINT16),
            (3, 4, BASE_TYPE_UINT32Z),
            (4, 4, BASE_TYPE_UINT32),
        ],
    );
    data.push(0x00);
    data.push(5); // type: workout
    data.extend_from_slice(&1u16.to_le_bytes()); // manufacturer
    data.extend_from_slice(&65534u16.to_le_bytes()); // product
    data.extend_from_slice(&fit_timestamp.to_le_bytes()); // serial_number (u32z)
    data.extend_from_slice(&fit_timestamp.to_le_bytes()); // time_created

    // file_creator (local 1, global 49).
    definition_message(
        &mut data,
        1,
        GLOBAL_FILE_CREATOR,
        &[(0, 2, BASE_TYPE_UINT16), (1, 1, BASE_TYPE_UINT8)],
    );
    data.push(0x01);
    data.extend_from_slice(&0u16.to_le_bytes());
    data.push(0);

    // workout (local 2, global 26).
    definition_message(
        &mut data,
        2,
        GLOBAL_WORKOUT,
        &[
            (4, 1, BASE_TYPE_ENUM),
            (5, 4, BASE_TYPE_UINT32Z),
            (6, 2, BASE_TYPE_UINT16),
            (8, 32, BASE_TYPE_STRING),
            (11, 1, BASE_TYPE_ENUM),
        ],
    );
    data.push(0x02);
    data.push(sport.id());
    data.extend_from_slice(&32u32.to_le_bytes());
    data.extend_from_slice(&(request.steps.len() as u16).to_le_bytes());
    let title: String = request.title.chars().take(31).collect();
    write_fixed_string(&mut data, &title, 32);
    data.push(sub_sport.id());

    // workout_step exercise (local 3, global 27).
    definition_message(
        &mut data,
        3,
        GLOBAL_WORKOUT_STEP,
        &[
            (254, 2, BASE_TYPE_UINT16),
            (2, 4, BASE_TYPE_UINT32),
            (1, 1, BASE_TYPE_ENUM),
            (3, 1, BASE_TYPE_ENUM),
            (7, 1, BASE_TYPE_ENUM),
            (10, 2, BASE_TYPE_UINT16),
            (11, 2, BASE_TYPE_UINT16),
        ],
    );

    // workout_step rest (local 4, global 27) - no exercise_category/exercise_name.
    definition_message(
        &mut data,
        4,
        GLOBAL_WORKOUT_STEP,
        &[
            (254, 2, BASE_TYPE_UINT16),
            (2, 4, BASE_TYPE_UINT32),
            (1, 1, BASE_TYPE_ENUM),
            (3, 1, BASE_TYPE_ENUM),
            (7, 1, BASE_TYPE_ENUM),
        ],
    );

    // workout_step repeat (local 5, global 27). Field 2 is the target step
    // index, field 4 is the total repeat count - not field 3/field 4 as one
    // prior revision mistakenly emitted.
    definition_message(
        &mut data,
        5,
        GLOBAL_WORKOUT_STEP,
        &[
            (254, 2, BASE_TYPE_UINT16),
            (2, 4, BASE_TYPE_UINT32),
            (4, 4, BASE_TYPE_UINT32),
            (1, 1, BASE_TYPE_ENUM),
        ],
    );

    // exercise_title (local 6, global 264).
    definition_message(
        &mut data,
        6,
        GLOBAL_EXERCISE_TITLE,
        &[
            (254, 2, BASE_TYPE_UINT16),
            (0, 2, BASE_TYPE_UINT16),
            (1, 2, BASE_TYPE_UINT16),
            (2, 32, BASE_TYPE_STRING),
        ],
    );

    for (index, step) in request.steps.iter().enumerate() {
        match step.kind {
            StepKind::Repeat => {
                let target = step.repeat_target.ok_or_else(|| {
                    WmecError::encoding("repeat step missing target index")
                })?;
                let count = step.repeat_count.ok_or_else(|| {
                    WmecError::encoding("repeat step missing repeat count")
                })?;
                data.push(0x05);
                data.extend_from_slice(&(index as u16).to_le_bytes());
                data.extend_from_slice(&(target as u32).to_le_bytes());
                data.extend_from_slice(&count.to_le_bytes());
                data.push(REPEAT_UNTIL_STEPS_CMPLT);
            }
            StepKind::Rest => {
                let duration = step
                    .duration
                    .ok_or_else(|| WmecError::encoding("rest step missing duration"))?;
                data.push(0x04);
                data.extend_from_slice(&(index as u16).to_le_bytes());
                data.extend_from_slice(&duration.fit_value().to_le_bytes());
                data.push(duration.fit_code());
                data.push(TARGET_TYPE_OPEN);
                data.push(INTENSITY_REST);
            }
            StepKind::Exercise | StepKind::Warmup => {
                let duration = step
                    .duration
                    .ok_or_else(|| WmecError::encoding("exercise step missing duration"))?;
                let category_id = step
                    .category_id
                    .ok_or_else(|| WmecError::encoding("exercise step missing category"))?;
                let exercise_id = assigner.id_for(category_id, &step.display_name, step.fit_exercise_name_id);
                let intensity = if matches!(step.kind, StepKind::Warmup) {
                    INTENSITY_WARMUP
                } else {
                    INTENSITY_ACTIVE
                };
                data.push(0x03);
                data.extend_from_slice(&(index as u16).to_le_bytes());
                data.extend_from_slice(&duration.fit_value().to_le_bytes());
                data.push(duration.fit_code());
                data.push(TARGET_TYPE_OPEN);
                data.push(intensity);
                data.extend_from_slice(&category_id.to_le_bytes());
                data.extend_from_slice(&exercise_id.to_le_bytes());
            }
        }
    }

    for (index, step) in request.steps.iter().enumerate() {
        if matches!(step.kind, StepKind::Exercise | StepKind::Warmup) {
            let category_id = step.category_id.unwrap_or(wmec_core::category::DEFAULT_CATEGORY_ID);
            let exercise_id = assigner.id_for(category_id, &step.display_name, step.fit_exercise_name_id);
            data.push(0x06);
            data.extend_from_slice(&(index as u16).to_le_bytes());
            data.extend_from_slice(&category_id.to_le_bytes());
            data.extend_from_slice(&exercise_id.to_le_bytes());
            write_fixed_string(&mut data, &step.display_name, 32);
        }
    }

    let data_crc = crc16(&data);

    let mut header = Vec::with_capacity(14);
    header.push(14u8); // header size
    header.push(0x10); // protocol version
    header.extend_from_slice(&0x527D_u16.to_le_bytes()); // profile version
    header.extend_from_slice(&(data.len() as u32).to_le_bytes());
    header.extend_from_slice(b".FIT");
    let header_crc = crc16(&header);
    header.extend_from_slice(&header_crc.to_le_bytes());

    let mut file = header;
    file.extend_from_slice(&data);
    file.extend_from_slice(&data_crc.to_le_bytes());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmec_core::domain::{DurationType, Intensity};

    #[test]
    fn rejects_empty_step_list() {
        let request = FitExportRequest {
            title: "Empty".to_owned(),
            steps: vec![],
            force_sport_type: None,
        };
        assert!(encode_fit(&request).is_err());
    }

    #[test]
    fn envelope_has_dot_fit_tag_and_matches_length() {
        let steps = vec![Step::exercise("Push Up", Intensity::Active, DurationType::Reps(10), 22, None)];
        let request = FitExportRequest {
            title: "Test".to_owned(),
            steps,
            force_sport_type: Some(ForcedSportType::Strength),
        };
        let bytes = encode_fit(&request).expect("encodes");
        assert_eq!(&bytes[0], &14u8);
        assert_eq!(&bytes[8..12], b".FIT");
        let data_len = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), 14 + data_len + 2);
    }

    #[test]
    fn sport_inference_ignores_the_default_warmup_step() {
        let steps = vec![
            Step::exercise("Warm Up", Intensity::Warmup, DurationType::Open, wmec_core::category::CARDIO_CATEGORY_ID, None),
            Step::exercise("Push Up", Intensity::Active, DurationType::Reps(10), 22, None),
            Step::exercise("Air Squat", Intensity::Active, DurationType::Reps(10), 28, None),
        ];
        let categories = sport_inference_categories(&steps);
        assert!(!categories.contains(&wmec_core::category::CARDIO_CATEGORY_ID));
        assert_eq!(categories, [22, 28].into_iter().collect());
    }

    #[test]
    fn strength_workout_with_default_warmup_infers_strength_training() {
        let steps = vec![
            Step::exercise("Warm Up", Intensity::Warmup, DurationType::Open, wmec_core::category::CARDIO_CATEGORY_ID, None),
            Step::exercise("Push Up", Intensity::Active, DurationType::Reps(10), 22, None),
            Step::exercise("Air Squat", Intensity::Active, DurationType::Reps(10), 28, None),
        ];
        let categories = sport_inference_categories(&steps);
        let (sport, sub_sport) = resolve_sport(None, &categories);
        assert_eq!(sport.id(), 10);
        assert_eq!(sub_sport.id(), 20);
    }

    #[test]
    fn rest_step_never_emits_category_field() {
        // A rest step's data record is 5 fields (message_index, duration_value,
        // duration_type, target_type, intensity) - 13 bytes - never 7 fields.
        let steps = vec![
            Step::exercise("Push Up", Intensity::Active, DurationType::Reps(10), 22, None),
            Step::rest(DurationType::TimeMs(30_000)),
        ];
        let request = FitExportRequest {
            title: "Test".to_owned(),
            steps,
            force_sport_type: Some(ForcedSportType::Strength),
        };
        let bytes = encode_fit(&request).expect("encodes");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn repeat_count_is_total_iterations_not_additional() {
        let steps = vec![
            Step::exercise("Squat", Intensity::Active, DurationType::Reps(10), 28, None),
            Step::repeat(0, 3),
        ];
        assert_eq!(steps[1].repeat_count, Some(3));
    }
}
