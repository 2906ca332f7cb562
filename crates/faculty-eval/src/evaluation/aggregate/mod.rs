mod analytics;
mod discrepancy;
mod summary;
pub mod views;

pub use analytics::{dashboard_analytics, AnalyticsQuery, TimeRange};
pub use discrepancy::{
    discrepancy_for, find_discrepancies, reconcile_all, ReconcileCounts, ReconcileOutcome,
    ReconcileReport,
};
pub use summary::{
    category_averages, faculty_report, group_by_reviewed_faculty, leaderboard,
    summarize_by_faculty,
};
