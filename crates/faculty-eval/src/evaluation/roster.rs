use super::domain::{FacultyId, FacultyMember};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read faculty roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid faculty roster CSV: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default, alias = "Id", alias = "_id")]
    id: String,
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Department")]
    department: String,
    #[serde(default, alias = "Subject")]
    subject: String,
    #[serde(
        default,
        alias = "Email",
        deserialize_with = "empty_string_as_none"
    )]
    email: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Loads a faculty roster from a `[id,]name,department,subject[,email]` CSV export.
/// Rows without an id get one when they are registered.
pub struct FacultyRosterImporter;

impl FacultyRosterImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<FacultyMember>, RosterImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows with a blank name are skipped; fields are trimmed but otherwise verbatim.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<FacultyMember>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut members = Vec::new();
        for row in csv_reader.deserialize::<RosterRow>() {
            let row = row?;
            if row.name.is_empty() {
                continue;
            }
            members.push(FacultyMember {
                id: FacultyId(row.id),
                name: row.name,
                department: row.department,
                subject: row.subject,
                email: row.email,
            });
        }

        Ok(members)
    }
}
