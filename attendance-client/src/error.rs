//! Error types for attendance-client
//!
//! "Student not in dataset" is reported separately from transport and parse
//! failures so callers can render them differently.

use crate::codec::CodecError;
use thiserror::Error;

/// One failed provider attempt, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    /// `<repo>/<file>` that was requested
    pub path: String,
    /// Status code or transport failure description
    pub reason: String,
}

/// Pipeline error type
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// Encoded payload could not be decoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Cache entry does not exist
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    /// Dataset loaded but has no record for this student
    #[error("Student ID {student_id} not found in this module's attendance records")]
    StudentNotFound { student_id: String },

    /// Cached file exists but is not a record array
    #[error("Corrupt cache entry {id}: {reason}")]
    CorruptData { id: String, reason: String },

    /// Every remote provider failed at transport level
    #[error("Attendance data not found in any repository. Tried paths: {}", format_attempts(.attempts))]
    SourceExhausted { attempts: Vec<FailedAttempt> },

    /// A provider answered successfully but the body is not a dataset
    #[error("Malformed payload from {source_path}: {reason}")]
    MalformedPayload { source_path: String, reason: String },

    /// Required caller input missing or blank
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Caller cancelled the fetch
    #[error("Request cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// attendance-common error
    #[error("Common error: {0}")]
    Common(#[from] attendance_common::Error),
}

impl AttendanceError {
    /// True for outcomes that mean "nothing there" rather than "something broke"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AttendanceError::NotFound(_) | AttendanceError::StudentNotFound { .. }
        )
    }

    /// Paths attempted before giving up, if this is a source exhaustion
    pub fn attempted_paths(&self) -> Vec<&str> {
        match self {
            AttendanceError::SourceExhausted { attempts } => {
                attempts.iter().map(|a| a.path.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn format_attempts(attempts: &[FailedAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.path, a.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for pipeline operations
pub type AttendanceResult<T> = Result<T, AttendanceError>;
