//! Student lookup and statistics derivation
//!
//! Pure functions over an already-fetched dataset. Subject columns are
//! discovered from column names:
//!
//! - `Required <subject> (Total)` / `Attended <subject> (Total)`
//! - `<subject> S<n> (Req)` / `<subject> S<n> (Att)` for sessions 1..=12

use crate::models::dataset::scalar_to_number;
use crate::models::{
    AttendanceStats, DatasetRecord, SessionEntry, StatusKind, StudentReport, SubjectBreakdown,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Highest session number checked per subject
pub const MAX_SESSIONS: u8 = 12;

static SUBJECT_TOTAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Required\s+([a-z]+)\s+\(Total\)").expect("subject pattern is valid")
});

/// Find a student's record by trimmed string comparison of `Student ID`
pub fn find_student<'a>(records: &'a [DatasetRecord], student_id: &str) -> Option<&'a DatasetRecord> {
    let wanted = student_id.trim();
    records
        .iter()
        .find(|record| record.student_id().is_some_and(|id| id.trim() == wanted))
}

/// Headline statistics with defaults for missing or non-numeric columns
pub fn derive_stats(record: &DatasetRecord) -> AttendanceStats {
    let known = record.parse().known;

    let percentage = known
        .percentage
        .map(|p| {
            let trimmed = p.trim();
            trimmed.strip_suffix('%').unwrap_or(trimmed).trim().to_string()
        })
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "0".to_string());

    let status = known
        .status
        .as_deref()
        .map(StatusKind::from_label)
        .unwrap_or_default();

    AttendanceStats {
        total_required: known.total_required,
        total_attended: known.total_attended,
        percentage,
        status,
        status_label: known.status.unwrap_or_else(|| StatusKind::Unknown.to_string()),
        status_color: status.color(),
        sessions_needed: known.sessions_needed,
    }
}

/// Per-subject breakdowns, ordered by subject token.
///
/// Subjects missing either total column are skipped.
pub fn extract_subjects(record: &DatasetRecord) -> Vec<SubjectBreakdown> {
    let parsed = record.parse();
    let residual = &parsed.residual;

    subject_tokens(residual.keys().copied())
        .into_iter()
        .filter_map(|token| {
            let required = lookup(residual, &format!("Required {} (Total)", token))?;
            let attended = lookup(residual, &format!("Attended {} (Total)", token))?;

            let required = scalar_to_number(required);
            let attended = scalar_to_number(attended);
            let percentage = if required > 0.0 {
                attended / required * 100.0
            } else {
                0.0
            };

            Some(SubjectBreakdown {
                name: display_name(&token),
                required,
                attended,
                percentage: round_one_decimal(percentage),
                sessions: sessions_for(residual, &token),
            })
        })
        .collect()
}

/// Complete presentation payload for one student, if present
pub fn build_report(records: &[DatasetRecord], student_id: &str) -> Option<StudentReport> {
    let record = find_student(records, student_id)?;
    let known = record.parse().known;

    Some(StudentReport {
        student_id: known.student_id.unwrap_or_else(|| student_id.trim().to_string()),
        name: known.name,
        group: known.group,
        stats: derive_stats(record),
        subjects: extract_subjects(record),
    })
}

/// Lower-cased subject tokens named by `Required <token> (Total)` columns.
///
/// Keeps the loose pre-filter of the source data: any column containing
/// both `Required` and `Total)` is a candidate.
fn subject_tokens<'a>(columns: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    columns
        .filter(|column| column.contains("Required") && column.contains("Total)"))
        .filter_map(|column| SUBJECT_TOTAL_PATTERN.captures(column))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
        .collect()
}

fn sessions_for(residual: &BTreeMap<&str, &Value>, token: &str) -> Vec<SessionEntry> {
    (1..=MAX_SESSIONS)
        .filter_map(|number| {
            let required = lookup(residual, &format!("{} S{} (Req)", token, number))?;
            let attended = lookup(residual, &format!("{} S{} (Att)", token, number))?;
            Some(SessionEntry {
                number,
                required: scalar_to_number(required),
                attended: scalar_to_number(attended),
            })
        })
        .collect()
}

/// Column names are built from the lower-cased token and matched exactly.
/// A subject spelled `Required Bio (Total)` is therefore skipped.
fn lookup<'a>(residual: &BTreeMap<&str, &'a Value>, column: &str) -> Option<&'a Value> {
    residual.get(column).copied()
}

fn display_name(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
