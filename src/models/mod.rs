// ABOUTME: Canonical workout data model (C7) - Blocks Workout/Block/Superset/Exercise
// ABOUTME: A plain data contract plus constructors validating the invariants of §3

mod blocks;

pub use blocks::{Block, Exercise, RestType, Superset, WarmupSpec, Workout};
pub use wmec_core::domain::EndCondition;
