//! Dataset identity and record types

use crate::error::{AttendanceError, AttendanceResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Fixed column names
pub mod columns {
    pub const STUDENT_ID: &str = "Student ID";
    pub const NAME: &str = "Name";
    pub const GROUP: &str = "Group";
    pub const TOTAL_REQUIRED: &str = "Total Required";
    pub const TOTAL_ATTENDED: &str = "Total Attended";
    pub const PERCENTAGE: &str = "Percentage";
    pub const STATUS: &str = "Status";
    pub const SESSIONS_NEEDED: &str = "Sessions Needed";

    pub const ALL: [&str; 8] = [
        STUDENT_ID,
        NAME,
        GROUP,
        TOTAL_REQUIRED,
        TOTAL_ATTENDED,
        PERCENTAGE,
        STATUS,
        SESSIONS_NEEDED,
    ];
}

/// Identifies one attendance dataset: an (academic year, module) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey {
    academic_year: String,
    module_id: String,
}

impl DatasetKey {
    /// Build a key from caller input.
    ///
    /// Both parts are trimmed and must be non-blank. The year may not contain
    /// `_` so that `Y{year}_{module}` splits unambiguously, and neither part
    /// may contain a path separator.
    pub fn new(academic_year: &str, module_id: &str) -> AttendanceResult<Self> {
        let academic_year = academic_year.trim();
        let module_id = module_id.trim();

        if academic_year.is_empty() {
            return Err(AttendanceError::Validation(
                "academic year is required".to_string(),
            ));
        }
        if module_id.is_empty() {
            return Err(AttendanceError::Validation(
                "module id is required".to_string(),
            ));
        }
        if academic_year.contains('_') {
            return Err(AttendanceError::Validation(format!(
                "academic year '{}' may not contain '_'",
                academic_year
            )));
        }
        if [academic_year, module_id]
            .iter()
            .any(|part| part.contains('/') || part.contains('\\'))
        {
            return Err(AttendanceError::Validation(
                "academic year and module id may not contain path separators".to_string(),
            ));
        }

        Ok(Self {
            academic_year: academic_year.to_string(),
            module_id: module_id.to_string(),
        })
    }

    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Dataset file name, shared by the cache and the remote path:
    /// `Y{year}_{moduleId}_attendance.json`
    pub fn file_name(&self) -> String {
        format!("Y{}_{}_attendance.json", self.academic_year, self.module_id)
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Y{}/{}", self.academic_year, self.module_id)
    }
}

/// One student's row: column name to scalar value.
///
/// Serializes as a plain JSON object so cache files hold the dataset
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetRecord(Map<String, Value>);

/// Typed view of the fixed columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownFields {
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub group: Option<String>,
    pub total_required: f64,
    pub total_attended: f64,
    pub percentage: Option<String>,
    pub status: Option<String>,
    pub sessions_needed: f64,
}

/// A record split into its fixed columns and every other column
#[derive(Debug, Clone)]
pub struct ParsedRecord<'a> {
    pub known: KnownFields,
    /// Columns outside the fixed set, keyed by column name
    pub residual: BTreeMap<&'a str, &'a Value>,
}

impl DatasetRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Student ID` as a string, numbers included
    pub fn student_id(&self) -> Option<String> {
        self.get(columns::STUDENT_ID).and_then(scalar_to_string)
    }

    /// Split into typed known fields plus the residual column map
    pub fn parse(&self) -> ParsedRecord<'_> {
        let text = |column: &str| {
            self.get(column)
                .and_then(scalar_to_string)
                .filter(|s| !s.is_empty())
        };
        let number = |column: &str| self.get(column).map(scalar_to_number).unwrap_or(0.0);

        let known = KnownFields {
            student_id: self.student_id(),
            name: text(columns::NAME),
            group: text(columns::GROUP),
            total_required: number(columns::TOTAL_REQUIRED),
            total_attended: number(columns::TOTAL_ATTENDED),
            percentage: text(columns::PERCENTAGE),
            status: text(columns::STATUS),
            sessions_needed: number(columns::SESSIONS_NEEDED),
        };

        let residual = self
            .0
            .iter()
            .filter(|(k, _)| !columns::ALL.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        ParsedRecord { known, residual }
    }
}

impl From<Map<String, Value>> for DatasetRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// String form of a scalar; `None` for null and nested values
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric form of a scalar; blank, null and non-numeric values are 0
pub fn scalar_to_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}
