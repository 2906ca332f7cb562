//! Review intake, rating aggregation, and evaluation-score reconciliation.
//!
//! Scoring and aggregation are pure functions over already fetched collections; the
//! service wires them to a review store and a faculty roster, and the router exposes
//! the service over HTTP.

pub mod aggregate;
pub mod domain;
pub mod export;
pub mod repository;
pub mod roster;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregate::views::{
    DashboardAnalytics, DiscrepancyReport, FacultyRatingSummary, FacultyReport, PerformanceBand,
};
pub use aggregate::{
    find_discrepancies, group_by_reviewed_faculty, leaderboard, reconcile_all,
    summarize_by_faculty, AnalyticsQuery, ReconcileCounts, ReconcileOutcome, ReconcileReport,
    TimeRange,
};
pub use domain::{FacultyId, FacultyKey, FacultyMember, Ratings, Review, ReviewId, ReviewSubmission};
pub use repository::{FacultyRoster, RepositoryError, ReviewRepository};
pub use roster::{FacultyRosterImporter, RosterImportError};
pub use router::review_router;
pub use scoring::{compute_overall_evaluation, recompute_from_categories};
pub use service::{ReviewFilter, ReviewService, ReviewServiceError};
