use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::config::ReconcileConfig;
use crate::evaluation::domain::{FacultyId, FacultyMember, Ratings, Review, ReviewId, ReviewSubmission};
use crate::evaluation::repository::{FacultyRoster, RepositoryError, ReviewRepository};
use crate::evaluation::service::ReviewService;

pub(super) fn ratings(entries: &[(&str, Value)]) -> Ratings {
    entries
        .iter()
        .map(|(category, value)| (category.to_string(), value.clone()))
        .collect()
}

pub(super) fn scores(values: &[i64]) -> Ratings {
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| (format!("category{idx:02}"), json!(value)))
        .collect()
}

pub(super) fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn review(
    id: &str,
    faculty: (&str, &str),
    ratings: Ratings,
    overall: Option<f64>,
) -> Review {
    Review {
        id: ReviewId::from(id),
        student_name: Some("Asha".to_string()),
        student_identifier: format!("ADM-{id}"),
        branch_semester: Some("CSE-5".to_string()),
        faculty_name: faculty.0.to_string(),
        faculty_department: faculty.1.to_string(),
        faculty_subject: "Data Structures".to_string(),
        ratings,
        overall_evaluation: overall,
        suggestions: String::new(),
        created_at: timestamp(2025, 9, 1),
    }
}

pub(super) fn member(name: &str, department: &str) -> FacultyMember {
    FacultyMember {
        id: FacultyId::default(),
        name: name.to_string(),
        department: department.to_string(),
        subject: "Data Structures".to_string(),
        email: None,
    }
}

pub(super) fn submission(faculty: (&str, &str), ratings: Ratings) -> ReviewSubmission {
    ReviewSubmission {
        student_name: Some("Asha".to_string()),
        student_identifier: "ADM-2021-044".to_string(),
        branch_semester: Some("CSE-5".to_string()),
        faculty_name: faculty.0.to_string(),
        faculty_department: faculty.1.to_string(),
        faculty_subject: "Data Structures".to_string(),
        ratings,
        suggestions: "More worked examples".to_string(),
        overall_evaluation: None,
    }
}

/// In-memory store that keeps insertion order and can be told to reject writes.
#[derive(Default)]
pub(super) struct Repository {
    records: Mutex<Vec<Review>>,
    failing_replacements: Mutex<BTreeMap<ReviewId, u8>>,
    always_failing: Mutex<HashSet<ReviewId>>,
    replace_calls: Mutex<Vec<ReviewId>>,
}

impl Repository {
    pub(super) fn with_reviews(reviews: Vec<Review>) -> Self {
        let repository = Self::default();
        *repository.records.lock().expect("records mutex poisoned") = reviews;
        repository
    }

    /// The next `failures` replacements of `id` fail with `Unavailable`.
    pub(super) fn fail_replacements(&self, id: &str, failures: u8) {
        self.failing_replacements
            .lock()
            .expect("failure mutex poisoned")
            .insert(ReviewId::from(id), failures);
    }

    pub(super) fn always_fail(&self, id: &str) {
        self.always_failing
            .lock()
            .expect("failure mutex poisoned")
            .insert(ReviewId::from(id));
    }

    pub(super) fn replace_calls(&self) -> Vec<ReviewId> {
        self.replace_calls
            .lock()
            .expect("calls mutex poisoned")
            .clone()
    }

    pub(super) fn stored(&self, id: &str) -> Option<Review> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .iter()
            .find(|review| review.id.0 == id)
            .cloned()
    }

    pub(super) fn remove_silently(&self, id: &str) {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .retain(|review| review.id.0 != id);
    }
}

impl ReviewRepository for Repository {
    fn insert(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        if guard.iter().any(|existing| existing.id == review.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(review.clone());
        Ok(review)
    }

    fn replace(&self, review: Review) -> Result<Review, RepositoryError> {
        self.replace_calls
            .lock()
            .expect("calls mutex poisoned")
            .push(review.id.clone());

        if self
            .always_failing
            .lock()
            .expect("failure mutex poisoned")
            .contains(&review.id)
        {
            return Err(RepositoryError::Unavailable("write rejected".to_string()));
        }

        {
            let mut failures = self
                .failing_replacements
                .lock()
                .expect("failure mutex poisoned");
            if let Some(remaining) = failures.get_mut(&review.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RepositoryError::Unavailable("write timed out".to_string()));
                }
            }
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == review.id) {
            Some(slot) => {
                *slot = review.clone();
                Ok(review)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: &ReviewId) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        let position = guard
            .iter()
            .position(|review| &review.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(guard.remove(position))
    }

    fn fetch(&self, id: &ReviewId) -> Result<Option<Review>, RepositoryError> {
        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.iter().find(|review| &review.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        Ok(self.records.lock().expect("records mutex poisoned").clone())
    }
}

#[derive(Default)]
pub(super) struct Roster {
    members: Mutex<Vec<FacultyMember>>,
}

impl Roster {
    pub(super) fn with_members(members: Vec<FacultyMember>) -> Self {
        Self {
            members: Mutex::new(members),
        }
    }
}

impl FacultyRoster for Roster {
    fn list(&self) -> Result<Vec<FacultyMember>, RepositoryError> {
        Ok(self.members.lock().expect("roster mutex poisoned").clone())
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

pub(super) fn build_service(
    reviews: Vec<Review>,
    roster: Vec<FacultyMember>,
) -> (ReviewService<Repository, Roster>, Arc<Repository>) {
    let repository = Arc::new(Repository::with_reviews(reviews));
    let roster = Arc::new(Roster::with_members(roster));
    let service = ReviewService::new(repository.clone(), roster, ReconcileConfig::default());
    (service, repository)
}
