//! attendance-client library interface
//!
//! Acquisition and derivation pipeline for per-student attendance records:
//! local cache validation, ordered remote-source fallback, and extraction of
//! subject/session statistics from a flat record of named columns.

pub mod codec;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod services;

pub use crate::error::{AttendanceError, AttendanceResult};
pub use crate::models::{
    AttendanceStats, DatasetKey, DatasetRecord, SessionEntry, StatusKind, StudentReport,
    SubjectBreakdown,
};
pub use crate::services::acquisition::AcquisitionPipeline;
