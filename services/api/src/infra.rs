use faculty_eval::error::AppError;
use faculty_eval::evaluation::{
    FacultyId, FacultyMember, FacultyRoster, FacultyRosterImporter, RepositoryError, Review, ReviewId,
    ReviewRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Review store kept in insertion order so listings and reconciliation passes are stable.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    records: Arc<Mutex<Vec<Review>>>,
}

impl ReviewRepository for InMemoryReviewRepository {
    fn insert(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == review.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(review.clone());
        Ok(review)
    }

    fn replace(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == review.id) {
            Some(slot) => {
                *slot = review.clone();
                Ok(review)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: &ReviewId) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let position = guard
            .iter()
            .position(|review| &review.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(position))
    }

    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|review| &review.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFacultyRoster {
    members: Arc<Mutex<Vec<FacultyMember>>>,
}

impl FacultyRoster for InMemoryFacultyRoster {
    fn list(&self) -> Result<Vec<FacultyMember>, RepositoryError> {
        let guard = self.members.lock().expect("roster mutex poisoned");
        Ok(guard.clone())
    }

    fn register(&self, member: FacultyMember) -> Result<FacultyMember, RepositoryError> {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.id == member.id || existing.key() == member.key())
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(member.clone());
        Ok(member)
    }

    fn update(&self, member: FacultyMember) -> Result<FacultyMember, RepositoryError> {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        let position = guard
            .iter()
            .position(|existing| existing.id == member.id)
            .ok_or(RepositoryError::NotFound)?;
        if guard
            .iter()
            .any(|existing| existing.id != member.id && existing.key() == member.key())
        {
            return Err(RepositoryError::Conflict);
        }
        guard[position] = member.clone();
        Ok(member)
    }

    fn remove(&self, id: &FacultyId) -> Result<FacultyMember, RepositoryError> {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        let position = guard
            .iter()
            .position(|member| &member.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(position))
    }
}

/// Reads a JSON array of stored reviews, e.g. a legacy collection export.
pub(crate) fn load_reviews(path: impl AsRef<Path>) -> Result<Vec<Review>, AppError> {
    let file = File::open(path)?;
    let reviews = serde_json::from_reader(BufReader::new(file))?;
    Ok(reviews)
}

pub(crate) fn load_roster(path: Option<&Path>) -> Result<Vec<FacultyMember>, AppError> {
    match path {
        Some(path) => Ok(FacultyRosterImporter::from_path(path)?),
        None => Ok(Vec::new()),
    }
}
