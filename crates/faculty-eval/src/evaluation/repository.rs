use super::domain::{FacultyId, FacultyMember, Review, ReviewId};

/// Storage abstraction for reviews. Writes are always full records; nothing here
/// patches a single field.
pub trait ReviewRepository: Send + Sync {
    fn insert(&self, review: Review) -> Result<Review, RepositoryError>;
    /// Replaces the stored record with the same id, failing with `NotFound` if absent.
    fn replace(&self, review: Review) -> Result<Review, RepositoryError>;
    fn delete(&self, id: &ReviewId) -> Result<Review, RepositoryError>;
    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError>;
    fn list(&self) -> Result<Vec<Review>, RepositoryError>;
}

/// Source of the authoritative faculty list.
///
/// Entries are unique by id and by normalised name and department; a write that would
/// break either fails with `Conflict`.
pub trait FacultyRoster: Send + Sync {
    fn list(&self) -> Result<Vec<FacultyMember>, RepositoryError>;
    fn register(&self, member: FacultyMember) -> Result<FacultyMember, RepositoryError>;
    /// Replaces the entry with `member.id`, failing with `NotFound` if absent.
    fn update(&self, member: FacultyMember) -> Result<FacultyMember, RepositoryError>;
    fn remove(&self, id: &FacultyId) -> Result<FacultyMember, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Failures worth another attempt within the same operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
