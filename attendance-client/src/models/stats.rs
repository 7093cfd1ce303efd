//! Derived attendance statistics
//!
//! Everything here is computed from one record and never persisted.

use serde::Serialize;
use std::fmt;

/// Attendance status reported in the `Status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StatusKind {
    Pass,
    Fail,
    HighRisk,
    ModerateRisk,
    LowRisk,
    NoRisk,
    #[default]
    Unknown,
}

/// Neutral color used for unknown statuses
pub const DEFAULT_STATUS_COLOR: &str = "#757575";

impl StatusKind {
    /// Parse the dataset's status label; unrecognized labels are `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Pass" => StatusKind::Pass,
            "Fail" => StatusKind::Fail,
            "High Risk" => StatusKind::HighRisk,
            "Moderate Risk" => StatusKind::ModerateRisk,
            "Low Risk" => StatusKind::LowRisk,
            "No Risk" => StatusKind::NoRisk,
            _ => StatusKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Pass => "Pass",
            StatusKind::Fail => "Fail",
            StatusKind::HighRisk => "High Risk",
            StatusKind::ModerateRisk => "Moderate Risk",
            StatusKind::LowRisk => "Low Risk",
            StatusKind::NoRisk => "No Risk",
            StatusKind::Unknown => "Unknown",
        }
    }

    /// Display color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            StatusKind::Pass => "#4CAF50",
            StatusKind::Fail => "#F44336",
            StatusKind::HighRisk => "#FF5722",
            StatusKind::ModerateRisk => "#FF9800",
            StatusKind::LowRisk => "#FFC107",
            StatusKind::NoRisk => "#2196F3",
            StatusKind::Unknown => DEFAULT_STATUS_COLOR,
        }
    }

    /// Icon name for the status badge
    pub fn icon(&self) -> &'static str {
        match self {
            StatusKind::Pass => "check-circle",
            StatusKind::Fail => "close-circle",
            StatusKind::HighRisk => "alert-circle",
            StatusKind::ModerateRisk => "alert",
            StatusKind::LowRisk => "information",
            StatusKind::NoRisk => "shield-check",
            StatusKind::Unknown => "help-circle",
        }
    }

    /// Human message for this status
    pub fn message(&self, sessions_needed: f64) -> String {
        let sessions = format!(
            "{} more session{}",
            format_number(sessions_needed),
            if sessions_needed > 1.0 { "s" } else { "" }
        );

        match self {
            StatusKind::Pass => "You have met the attendance requirements!".to_string(),
            StatusKind::Fail => "Below required minimum of 75%. Contact your advisor.".to_string(),
            StatusKind::HighRisk | StatusKind::ModerateRisk => {
                format!("Need {} to reach 75%", sessions)
            }
            StatusKind::LowRisk => format!("Just {} needed", sessions),
            StatusKind::NoRisk => "On track to meet requirements".to_string(),
            StatusKind::Unknown => "Status unavailable".to_string(),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Headline statistics for one student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub total_required: f64,
    pub total_attended: f64,
    /// Percentage as reported by the dataset, `%` stripped
    pub percentage: String,
    pub status: StatusKind,
    /// Raw status text, `Unknown` when missing
    pub status_label: String,
    pub status_color: &'static str,
    pub sessions_needed: f64,
}

impl AttendanceStats {
    pub fn status_message(&self) -> String {
        self.status.message(self.sessions_needed)
    }

    /// Percentage as a number, 0 when the dataset value does not parse
    pub fn percentage_value(&self) -> f64 {
        self.percentage.trim().parse().unwrap_or(0.0)
    }
}

/// One numbered session within a subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionEntry {
    pub number: u8,
    pub required: f64,
    pub attended: f64,
}

/// Per-subject totals and sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectBreakdown {
    /// Display name (first letter upper-cased)
    pub name: String,
    pub required: f64,
    pub attended: f64,
    /// Rounded to one decimal place
    pub percentage: f64,
    pub sessions: Vec<SessionEntry>,
}

/// Full presentation payload for one student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub student_id: String,
    pub name: Option<String>,
    pub group: Option<String>,
    pub stats: AttendanceStats,
    pub subjects: Vec<SubjectBreakdown>,
}

/// Format a count without a trailing `.0` for whole numbers
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
