//! Data models for attendance datasets and derived statistics

pub mod dataset;
pub mod stats;

pub use dataset::{columns, DatasetKey, DatasetRecord, KnownFields, ParsedRecord};
pub use stats::{
    AttendanceStats, SessionEntry, StatusKind, StudentReport, SubjectBreakdown,
};
