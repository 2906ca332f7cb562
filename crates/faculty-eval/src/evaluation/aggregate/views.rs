use super::super::domain::{FacultyId, Review, ReviewId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceBand {
    pub fn from_rating(rating: f64) -> Self {
        if rating >= 4.0 {
            Self::Excellent
        } else if rating >= 3.0 {
            Self::Good
        } else if rating >= 2.0 {
            Self::Average
        } else {
            Self::NeedsImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyRatingSummary {
    /// Roster id; absent for summaries grouped from review text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<FacultyId>,
    pub faculty_name: String,
    pub faculty_department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_subject: Option<String>,
    pub review_count: usize,
    pub average_rating: f64,
    pub performance: PerformanceBand,
    pub has_reviews: bool,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancyReport {
    pub review_id: ReviewId,
    pub stored: Option<f64>,
    pub calculated: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyReport {
    pub faculty_name: String,
    pub faculty_department: String,
    pub review_count: usize,
    pub average_rating: f64,
    pub top_rating: f64,
    pub performance: PerformanceBand,
    pub category_averages: BTreeMap<String, f64>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_reviews: usize,
    pub average_rating: f64,
    pub unique_students: usize,
    pub active_faculty: usize,
    pub total_faculty: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    pub review_count: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdown {
    pub name: String,
    pub review_count: usize,
    pub average_rating: f64,
    pub faculty_count: usize,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub review_id: ReviewId,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsWindow {
    pub time_range: &'static str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub summary: AnalyticsSummary,
    pub window: AnalyticsWindow,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub departments: Vec<DepartmentBreakdown>,
    pub faculty: Vec<FacultyRatingSummary>,
    pub rating_distribution: BTreeMap<u8, usize>,
    pub recent_activity: Vec<ActivityEntry>,
}
