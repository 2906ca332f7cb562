use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Open category map. Values stay raw JSON so legacy rows with strings, nulls, or
/// zeroes survive decoding and are filtered at scoring time instead.
pub type Ratings = BTreeMap<String, Value>;

/// Opaque review identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReviewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Roster entry identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultyId(pub String);

impl FacultyId {
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FacultyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacultyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stored student evaluation of one faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, alias = "_id")]
    pub id: ReviewId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, alias = "admissionNo")]
    pub student_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_semester: Option<String>,
    #[serde(alias = "teacherName")]
    pub faculty_name: String,
    #[serde(alias = "teacherDepartment")]
    pub faculty_department: String,
    #[serde(default, alias = "teacherSubject")]
    pub faculty_subject: String,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub overall_evaluation: Option<f64>,
    #[serde(default)]
    pub suggestions: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn faculty_key(&self) -> FacultyKey {
        FacultyKey::new(&self.faculty_name, &self.faculty_department)
    }
}

/// Inbound payload for intake and full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, alias = "admissionNo")]
    pub student_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_semester: Option<String>,
    #[serde(alias = "teacherName")]
    pub faculty_name: String,
    #[serde(alias = "teacherDepartment")]
    pub faculty_department: String,
    #[serde(default, alias = "teacherSubject")]
    pub faculty_subject: String,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub suggestions: String,
    #[serde(
        default,
        deserialize_with = "lenient_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_evaluation: Option<f64>,
}

/// Authoritative roster entry for a faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyMember {
    #[serde(default, alias = "_id")]
    pub id: FacultyId,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl FacultyMember {
    pub fn key(&self) -> FacultyKey {
        FacultyKey::new(&self.name, &self.department)
    }
}

/// Faculty identity reconstructed from free text: lower-cased and trimmed name and
/// department. There is no stable faculty id behind reviews, so two spellings that
/// differ beyond case or surrounding whitespace are different faculty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacultyKey {
    name: String,
    department: String,
}

impl FacultyKey {
    pub fn new(name: &str, department: &str) -> Self {
        Self {
            name: normalize(name),
            department: normalize(department),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn department(&self) -> &str {
        &self.department
    }
}

pub(crate) fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Accepts numbers and numeric strings; everything else decodes as absent.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(decimal_from_value))
}

pub(crate) fn decimal_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite()),
        _ => None,
    }
}
