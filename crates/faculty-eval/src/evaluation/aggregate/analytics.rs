use super::super::domain::{normalize, FacultyMember, Review};
use super::super::scoring::{effective_overall, mean, round_to};
use super::summary::{group_by_reviewed_faculty, leaderboard};
use super::views::{
    ActivityEntry, AnalyticsSummary, AnalyticsWindow, DashboardAnalytics, DepartmentBreakdown,
    MonthlyTrend,
};
use chrono::{DateTime, Duration, Months, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};

const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeRange {
    /// Unknown values fall back to a one-month window.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Self::Week,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self {
            Self::Week => now.checked_sub_signed(Duration::days(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::Quarter => now.checked_sub_months(Months::new(3)),
            Self::Year => now.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Query string accepted by the analytics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub time_range: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl AnalyticsQuery {
    pub fn time_range(&self) -> TimeRange {
        self.time_range
            .as_deref()
            .map(TimeRange::parse)
            .unwrap_or_default()
    }

    /// Normalised department filter; `all` and blank mean no filter.
    pub fn department_filter(&self) -> Option<String> {
        self.department
            .as_deref()
            .map(normalize)
            .filter(|department| !department.is_empty() && department != "all")
    }
}

pub fn dashboard_analytics(
    reviews: &[Review],
    roster: &[FacultyMember],
    query: &AnalyticsQuery,
    now: DateTime<Utc>,
) -> DashboardAnalytics {
    let time_range = query.time_range();
    let start = time_range.window_start(now);
    let department = query.department_filter();
    let in_department =
        |value: &str| department.as_deref().map_or(true, |dept| normalize(value) == dept);

    let windowed: Vec<Review> = reviews
        .iter()
        .filter(|review| review.created_at >= start && review.created_at <= now)
        .filter(|review| in_department(&review.faculty_department))
        .cloned()
        .collect();

    let effective: Vec<f64> = windowed.iter().map(effective_overall).collect();

    let summary = AnalyticsSummary {
        total_reviews: windowed.len(),
        average_rating: round_to(mean(effective.iter().copied()), 2),
        unique_students: windowed
            .iter()
            .map(|review| review.student_identifier.as_str())
            .collect::<HashSet<_>>()
            .len(),
        active_faculty: windowed
            .iter()
            .map(Review::faculty_key)
            .collect::<HashSet<_>>()
            .len(),
        total_faculty: roster
            .iter()
            .filter(|member| in_department(&member.department))
            .count(),
    };

    DashboardAnalytics {
        summary,
        window: AnalyticsWindow {
            time_range: time_range.label(),
            start,
            end: now,
        },
        monthly_trends: monthly_trends(&windowed, &effective),
        departments: department_breakdown(&windowed, &effective),
        faculty: leaderboard(group_by_reviewed_faculty(&windowed)),
        rating_distribution: rating_distribution(&effective),
        recent_activity: recent_activity(&windowed),
    }
}

fn monthly_trends(reviews: &[Review], effective: &[f64]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (review, value) in reviews.iter().zip(effective) {
        buckets
            .entry(review.created_at.format("%Y-%m").to_string())
            .or_default()
            .push(*value);
    }

    buckets
        .into_iter()
        .map(|(month, values)| MonthlyTrend {
            month,
            review_count: values.len(),
            average_rating: round_to(mean(values), 2),
        })
        .collect()
}

#[derive(Default)]
struct DepartmentTally<'a> {
    values: Vec<f64>,
    faculty: HashSet<String>,
    students: HashSet<&'a str>,
}

fn department_breakdown(reviews: &[Review], effective: &[f64]) -> Vec<DepartmentBreakdown> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, DepartmentTally<'_>> = HashMap::new();

    for (review, value) in reviews.iter().zip(effective) {
        let name = review.faculty_department.as_str();
        let tally = tallies.entry(name).or_insert_with(|| {
            order.push(name);
            DepartmentTally::default()
        });
        tally.values.push(*value);
        tally.faculty.insert(normalize(&review.faculty_name));
        tally.students.insert(review.student_identifier.as_str());
    }

    order
        .into_iter()
        .filter_map(|name| {
            let tally = tallies.remove(name)?;
            Some(DepartmentBreakdown {
                name: name.to_string(),
                review_count: tally.values.len(),
                average_rating: round_to(mean(tally.values), 2),
                faculty_count: tally.faculty.len(),
                student_count: tally.students.len(),
            })
        })
        .collect()
}

fn rating_distribution(effective: &[f64]) -> BTreeMap<u8, usize> {
    let mut distribution: BTreeMap<u8, usize> = (1..=5).map(|bucket| (bucket, 0)).collect();
    for value in effective.iter().filter(|value| **value > 0.0) {
        let bucket = value.floor().clamp(1.0, 5.0) as u8;
        *distribution.entry(bucket).or_default() += 1;
    }
    distribution
}

fn recent_activity(reviews: &[Review]) -> Vec<ActivityEntry> {
    let mut newest: Vec<&Review> = reviews.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    newest
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|review| {
            let student = review
                .student_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or("Student");
            ActivityEntry {
                review_id: review.id.clone(),
                description: format!("{student} reviewed {}", review.faculty_name),
                timestamp: review.created_at,
                rating: effective_overall(review),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unknown_time_range_defaults_to_month() {
        assert_eq!(TimeRange::parse("fortnight"), TimeRange::Month);
        assert_eq!(TimeRange::parse(" Quarter "), TimeRange::Quarter);
    }

    #[test]
    fn month_window_uses_calendar_months() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let start = TimeRange::Month.window_start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());
    }

    #[test]
    fn distribution_clamps_and_skips_unscored() {
        let distribution = rating_distribution(&[0.0, 0.5, 4.9, 5.0, 6.2]);
        assert_eq!(distribution.get(&1), Some(&1));
        assert_eq!(distribution.get(&4), Some(&1));
        assert_eq!(distribution.get(&5), Some(&2));
        assert_eq!(distribution.values().sum::<usize>(), 4);
    }

    #[test]
    fn department_filter_treats_all_as_unfiltered() {
        let query = AnalyticsQuery {
            time_range: None,
            department: Some(" ALL ".to_string()),
        };
        assert_eq!(query.department_filter(), None);
        assert_eq!(query.time_range(), TimeRange::Month);
    }
}
