use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregate::views::{
    DashboardAnalytics, DiscrepancyReport, FacultyRatingSummary, FacultyReport,
};
use super::aggregate::{
    dashboard_analytics, discrepancy_for, faculty_report, find_discrepancies,
    group_by_reviewed_faculty, leaderboard, summarize_by_faculty, AnalyticsQuery,
    ReconcileOutcome, ReconcileReport,
};
use super::domain::{
    normalize, FacultyId, FacultyKey, FacultyMember, Review, ReviewId, ReviewSubmission,
};
use super::repository::{FacultyRoster, RepositoryError, ReviewRepository};
use super::scoring::compute_overall_evaluation;
use crate::config::ReconcileConfig;

/// Issues `<prefix>-NNNNNN` ids. Ids of the same shape loaded from elsewhere move the
/// counter past them, so an issued id never collides with a stored one.
struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    fn issue(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", self.prefix)
    }

    fn observe(&self, id: &str) {
        let number = id
            .trim()
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|digits| digits.parse::<u64>().ok());
        if let Some(number) = number {
            self.next
                .fetch_max(number.saturating_add(1), Ordering::Relaxed);
        }
    }
}

/// Filter body accepted by the review listing query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilter {
    #[serde(alias = "teacherName")]
    pub faculty_name: String,
    #[serde(alias = "teacherDepartment")]
    pub faculty_department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_semester: Option<String>,
}

/// Service composing the review store, the faculty roster, and the aggregation core.
pub struct ReviewService<R, F> {
    reviews: Arc<R>,
    roster: Arc<F>,
    reconcile: ReconcileConfig,
    reconcile_guard: Mutex<()>,
    review_ids: IdSequence,
    faculty_ids: IdSequence,
}

impl<R, F> ReviewService<R, F>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    pub fn new(reviews: Arc<R>, roster: Arc<F>, reconcile: ReconcileConfig) -> Self {
        Self {
            reviews,
            roster,
            reconcile,
            reconcile_guard: Mutex::new(()),
            review_ids: IdSequence::new("rev"),
            faculty_ids: IdSequence::new("fac"),
        }
    }

    /// Score and persist a new submission.
    pub fn submit(&self, submission: ReviewSubmission) -> Result<Review, ReviewServiceError> {
        validate(&submission)?;
        let id = ReviewId(self.review_ids.issue());
        let review = score_submission(id, submission, Utc::now());
        let stored = self.reviews.insert(review)?;
        debug!(review_id = %stored.id, overall = ?stored.overall_evaluation, "review submitted");
        Ok(stored)
    }

    /// Replace every field of an existing review, rescoring it like a new submission.
    /// The id and creation timestamp are kept.
    pub fn update(
        &self,
        id: &ReviewId,
        submission: ReviewSubmission,
    ) -> Result<Review, ReviewServiceError> {
        validate(&submission)?;
        let existing = self
            .reviews
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let review = score_submission(existing.id, submission, existing.created_at);
        let stored = self.reviews.replace(review)?;
        info!(review_id = %stored.id, "review replaced");
        Ok(stored)
    }

    pub fn delete(&self, id: &ReviewId) -> Result<Review, ReviewServiceError> {
        let removed = self.reviews.delete(id)?;
        info!(review_id = %removed.id, "review deleted");
        Ok(removed)
    }

    pub fn get(&self, id: &ReviewId) -> Result<Review, ReviewServiceError> {
        let review = self.reviews.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(review)
    }

    pub fn list(&self) -> Result<Vec<Review>, ReviewServiceError> {
        Ok(self.reviews.list()?)
    }

    /// Load already-scored records verbatim, e.g. a legacy export. Stored scores are
    /// not recomputed; blank ids get fresh ones.
    pub fn import(&self, reviews: Vec<Review>) -> Result<usize, ReviewServiceError> {
        let mut imported = 0;
        for mut review in reviews {
            if review.id.is_blank() {
                review.id = ReviewId(self.review_ids.issue());
            } else {
                self.review_ids.observe(&review.id.0);
            }
            self.reviews.insert(review)?;
            imported += 1;
        }
        info!(imported, "reviews imported");
        Ok(imported)
    }

    pub fn filter(&self, filter: &ReviewFilter) -> Result<Vec<Review>, ReviewServiceError> {
        let key = FacultyKey::new(&filter.faculty_name, &filter.faculty_department);
        let branch = filter
            .branch_semester
            .as_deref()
            .map(str::trim)
            .filter(|branch| !branch.is_empty());

        Ok(self
            .reviews
            .list()?
            .into_iter()
            .filter(|review| review.faculty_key() == key)
            .filter(|review| match branch {
                Some(branch) => review.branch_semester.as_deref().map(str::trim) == Some(branch),
                None => true,
            })
            .collect())
    }

    pub fn faculty_report(
        &self,
        name: &str,
        department: &str,
    ) -> Result<FacultyReport, ReviewServiceError> {
        let reviews = self.reviews.list()?;
        Ok(faculty_report(&reviews, name, department))
    }

    /// Leaderboard grouped by the faculty text found on the reviews themselves.
    pub fn faculty_ratings(&self) -> Result<Vec<FacultyRatingSummary>, ReviewServiceError> {
        let reviews = self.reviews.list()?;
        Ok(leaderboard(group_by_reviewed_faculty(&reviews)))
    }

    /// Summaries for every roster entry, in roster order.
    pub fn roster_ratings(&self) -> Result<Vec<FacultyRatingSummary>, ReviewServiceError> {
        let reviews = self.reviews.list()?;
        let roster = self.roster.list()?;
        Ok(summarize_by_faculty(&reviews, &roster))
    }

    pub fn roster(&self) -> Result<Vec<FacultyMember>, ReviewServiceError> {
        Ok(self.roster.list()?)
    }

    /// Faculty whose department matches after trimming and case folding.
    pub fn faculty_in_department(
        &self,
        department: &str,
    ) -> Result<Vec<FacultyMember>, ReviewServiceError> {
        let department = normalize(department);
        Ok(self
            .roster
            .list()?
            .into_iter()
            .filter(|member| normalize(&member.department) == department)
            .collect())
    }

    pub fn register_faculty(
        &self,
        mut member: FacultyMember,
    ) -> Result<FacultyMember, ReviewServiceError> {
        validate_member(&member)?;
        if member.id.is_blank() {
            member.id = FacultyId(self.faculty_ids.issue());
        } else {
            self.faculty_ids.observe(&member.id.0);
        }
        let registered = self.roster.register(member)?;
        debug!(faculty_id = %registered.id, "faculty registered");
        Ok(registered)
    }

    /// Registers every member of a loaded roster. Entries that are incomplete or
    /// duplicate an earlier one are logged and skipped.
    pub fn import_roster(&self, members: Vec<FacultyMember>) -> Result<usize, ReviewServiceError> {
        let mut registered = 0;
        for member in members {
            let name = member.name.clone();
            match self.register_faculty(member) {
                Ok(_) => registered += 1,
                Err(
                    err @ (ReviewServiceError::Invalid(_)
                    | ReviewServiceError::Repository(RepositoryError::Conflict)),
                ) => warn!(faculty = %name, error = %err, "skipping roster entry"),
                Err(err) => return Err(err),
            }
        }
        info!(registered, "faculty roster imported");
        Ok(registered)
    }

    /// Replaces a roster entry in full. Renaming an entry re-matches reviews filed under
    /// the new spelling.
    pub fn update_faculty(
        &self,
        id: &FacultyId,
        mut member: FacultyMember,
    ) -> Result<FacultyMember, ReviewServiceError> {
        validate_member(&member)?;
        member.id = id.clone();
        let updated = self.roster.update(member)?;
        info!(faculty_id = %updated.id, "faculty updated");
        Ok(updated)
    }

    pub fn remove_faculty(&self, id: &FacultyId) -> Result<FacultyMember, ReviewServiceError> {
        let removed = self.roster.remove(id)?;
        info!(faculty_id = %removed.id, "faculty removed");
        Ok(removed)
    }

    pub fn discrepancies(&self) -> Result<Vec<DiscrepancyReport>, ReviewServiceError> {
        let reviews = self.reviews.list()?;
        Ok(find_discrepancies(&reviews))
    }

    pub fn analytics(
        &self,
        query: &AnalyticsQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardAnalytics, ReviewServiceError> {
        let reviews = self.reviews.list()?;
        let roster = self.roster.list()?;
        Ok(dashboard_analytics(&reviews, &roster, query, now))
    }

    /// Overwrite every drifted stored score with its recomputed value.
    ///
    /// Records are written one at a time with no rollback. A transient store failure
    /// is retried up to the configured attempt budget, then logged and skipped; a
    /// record deleted mid-pass is skipped. Only one pass may run at a time.
    pub fn reconcile(&self) -> Result<ReconcileReport, ReviewServiceError> {
        let _pass = match self.reconcile_guard.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(ReviewServiceError::ReconcileInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let reviews = self.reviews.list()?;
        let total_reviews = reviews.len();
        let mut outcomes = Vec::new();

        for review in reviews {
            let Some(discrepancy) = discrepancy_for(&review) else {
                continue;
            };
            outcomes.push(self.write_reconciled(review, discrepancy.calculated));
        }

        let report = ReconcileReport::from_outcomes(total_reviews, outcomes);
        info!(
            total_reviews = report.total_reviews,
            updated = report.updated_count,
            failed = report.failed_count,
            "rating reconciliation finished"
        );
        Ok(report)
    }

    fn write_reconciled(&self, mut review: Review, calculated: f64) -> ReconcileOutcome {
        let previous = review.overall_evaluation;
        review.overall_evaluation = Some(calculated);
        let max_attempts = self.reconcile.max_attempts.max(1);
        let mut attempts = 0_u8;

        loop {
            attempts += 1;
            match self.reviews.replace(review.clone()) {
                Ok(_) => {
                    return ReconcileOutcome::Updated {
                        review_id: review.id,
                        previous,
                        calculated,
                        attempts,
                    }
                }
                Err(RepositoryError::NotFound) => {
                    warn!(review_id = %review.id, "review disappeared before reconciliation write");
                    return ReconcileOutcome::Vanished {
                        review_id: review.id,
                    };
                }
                Err(err) if err.is_transient() && attempts < max_attempts => {
                    warn!(review_id = %review.id, attempts, error = %err, "retrying reconciliation write");
                }
                Err(err) => {
                    warn!(review_id = %review.id, attempts, error = %err, "skipping review after failed reconciliation write");
                    return ReconcileOutcome::Failed {
                        review_id: review.id,
                        error: err.to_string(),
                        attempts,
                    };
                }
            }
        }
    }
}

fn validate_member(member: &FacultyMember) -> Result<(), ReviewServiceError> {
    if member.name.trim().is_empty() || member.department.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "faculty name and department are required".to_string(),
        ));
    }
    Ok(())
}

fn validate(submission: &ReviewSubmission) -> Result<(), ReviewServiceError> {
    if submission.faculty_name.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "faculty name is required".to_string(),
        ));
    }
    if submission.faculty_department.trim().is_empty() {
        return Err(ReviewServiceError::Invalid(
            "faculty department is required".to_string(),
        ));
    }
    Ok(())
}

/// Builds the stored record for a submission. The overall score is the only derived
/// field; everything else is kept verbatim.
pub fn score_submission(
    id: ReviewId,
    submission: ReviewSubmission,
    created_at: DateTime<Utc>,
) -> Review {
    let ReviewSubmission {
        student_name,
        student_identifier,
        branch_semester,
        faculty_name,
        faculty_department,
        faculty_subject,
        ratings,
        suggestions,
        overall_evaluation,
    } = submission;

    let overall_evaluation = compute_overall_evaluation(&ratings, overall_evaluation);

    Review {
        id,
        student_name,
        student_identifier,
        branch_semester,
        faculty_name,
        faculty_department,
        faculty_subject,
        ratings,
        overall_evaluation,
        suggestions,
        created_at,
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("invalid review: {0}")]
    Invalid(String),
    #[error("a rating reconciliation is already running")]
    ReconcileInProgress,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
