// ABOUTME: Library entry point for wmec-encoders
// ABOUTME: Device artifact encoders (FIT, ZWO, Hyrox/Garmin YAML, WorkoutKit JSON) for a compiled step list

#![deny(unsafe_code)]

//! Device encoders (C9-C11, C14). Each encoder takes the Step Compiler's
//! (C8) flattened `Vec<wmec_core::domain::Step>` output directly — no
//! encoder performs I/O or re-resolves exercise names.
//!
//! - [`fit`]: Garmin FIT binary (C9)
//! - [`zwo`]: Zwift ZWO XML (C10)
//! - [`yaml`]: Hyrox/Garmin YAML (C11)
//! - [`workoutkit`]: Apple WorkoutKit JSON DTO (C14)

pub mod fit;
pub mod workoutkit;
pub mod yaml;
pub mod zwo;

pub use fit::{encode_fit, FitExportRequest};
pub use workoutkit::{encode_workoutkit, WorkoutKitDocument, WorkoutKitExportRequest, WorkoutKitInterval};
pub use yaml::{encode_yaml, YamlExportRequest};
pub use zwo::{encode_zwo, ZwoExportRequest, ZwoSport};
