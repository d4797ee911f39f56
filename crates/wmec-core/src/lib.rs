// ABOUTME: Library entry point for wmec-core
// ABOUTME: Shared error types, category constants, and domain primitives used by every WMEC crate

#![deny(unsafe_code)]

//! Core types shared across the Workout Mapping & Export Core:
//!
//! - [`error`]: the unified `WmecError` / `ErrorCode` pair
//! - [`category`]: the Garmin exercise category table and ID-compatibility remap
//! - [`sport`]: FIT sport / sub-sport enums and the inference rule
//! - [`domain`]: shared domain primitives (end-conditions, provenance, confidence)

pub mod category;
pub mod domain;
pub mod error;
pub mod sport;

pub use error::{ErrorCode, WmecError, WmecResult};
