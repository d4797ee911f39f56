// ABOUTME: Centralized error handling for the Workout Mapping & Export Core
// ABOUTME: Defines error codes and the WmecError type used across matching, encoding, and HTTP

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout WMEC.
///
/// Mirrors §7 of the specification: each error kind the core can produce maps
/// to exactly one of these codes, which in turn maps to an HTTP status at the
/// transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing required field, empty step list, unsupported source type.
    InvalidInput,
    /// Resolver produced fallback with confidence below the floor.
    UnknownExercise,
    /// Upstream category id was out of the device-safe range (remapped, not fatal).
    CategoryOutOfRange,
    /// A bulk-import detect-phase fetch to an external collaborator failed.
    ExternalFetchFailed,
    /// A persistence operation failed.
    PersistenceFailed,
    /// The job is in a terminal state and cannot be mutated further.
    CancelledJob,
    /// An encoder was asked to emit an artifact it cannot produce (e.g. zero steps).
    Encoding,
    /// Resource was not found.
    NotFound,
    /// Internal error with no more specific classification.
    Internal,
}

impl ErrorCode {
    /// The HTTP status code this error code maps to.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput | Self::Encoding => 400,
            Self::NotFound => 404,
            Self::CancelledJob => 409,
            Self::ExternalFetchFailed => 502,
            Self::UnknownExercise | Self::CategoryOutOfRange => 200,
            Self::PersistenceFailed | Self::Internal => 500,
        }
    }

    /// A short machine-stable name, used for serialization and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::UnknownExercise => "unknown_exercise",
            Self::CategoryOutOfRange => "category_out_of_range",
            Self::ExternalFetchFailed => "external_fetch_failed",
            Self::PersistenceFailed => "persistence_failed",
            Self::CancelledJob => "cancelled_job",
            Self::Encoding => "encoding_error",
            Self::NotFound => "not_found",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "invalid_input" => Ok(Self::InvalidInput),
            "unknown_exercise" => Ok(Self::UnknownExercise),
            "category_out_of_range" => Ok(Self::CategoryOutOfRange),
            "external_fetch_failed" => Ok(Self::ExternalFetchFailed),
            "persistence_failed" => Ok(Self::PersistenceFailed),
            "cancelled_job" => Ok(Self::CancelledJob),
            "encoding_error" => Ok(Self::Encoding),
            "not_found" => Ok(Self::NotFound),
            _ => Ok(Self::Internal),
        }
    }
}

/// The unified error type returned by every WMEC component.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct WmecError {
    /// Stable error classification.
    pub code: ErrorCode,
    /// Human-readable detail.
    pub message: String,
}

impl WmecError {
    /// Build an error with an explicit code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `InvalidInput` convenience constructor.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// `NotFound` convenience constructor.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// `PersistenceFailed` convenience constructor.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceFailed, message)
    }

    /// `ExternalFetchFailed` convenience constructor.
    pub fn external_fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalFetchFailed, message)
    }

    /// `Encoding` convenience constructor.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Encoding, message)
    }

    /// `Internal` convenience constructor.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl From<serde_json::Error> for WmecError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::InvalidInput, format!("JSON error: {error}"))
    }
}

/// Convenience alias used throughout the core.
pub type WmecResult<T> = Result<T, WmecError>;
