use super::super::domain::{FacultyId, FacultyKey, FacultyMember, Review};
use super::super::scoring::{effective_overall, mean, round_to, valid_score};
use super::views::{FacultyRatingSummary, FacultyReport, PerformanceBand};
use std::collections::{BTreeMap, HashMap};

/// Roster-driven summaries, one per roster entry in roster order.
///
/// Reviews are matched on the normalised name and department only. A review whose
/// text drifted from the roster spelling (beyond case and padding) silently
/// contributes to no summary.
pub fn summarize_by_faculty(
    reviews: &[Review],
    roster: &[FacultyMember],
) -> Vec<FacultyRatingSummary> {
    let mut by_key: HashMap<FacultyKey, Vec<&Review>> = HashMap::new();
    for review in reviews {
        by_key.entry(review.faculty_key()).or_default().push(review);
    }

    roster
        .iter()
        .map(|member| {
            let matched = by_key
                .get(&member.key())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let subject = (!member.subject.trim().is_empty()).then(|| member.subject.clone());
            let id = (!member.id.is_blank()).then(|| member.id.clone());
            build_summary(
                id,
                member.name.clone(),
                member.department.clone(),
                subject,
                matched,
            )
        })
        .collect()
}

/// Summaries keyed by the verbatim `(faculty_name, faculty_department)` pair of each
/// review, in first-seen order. Used when no roster is available.
pub fn group_by_reviewed_faculty(reviews: &[Review]) -> Vec<FacultyRatingSummary> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut groups: HashMap<(&str, &str), Vec<&Review>> = HashMap::new();

    for review in reviews {
        let key = (
            review.faculty_name.as_str(),
            review.faculty_department.as_str(),
        );
        let group = groups.entry(key).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        group.push(review);
    }

    order
        .into_iter()
        .map(|key| {
            let matched = groups.get(&key).map(Vec::as_slice).unwrap_or_default();
            let subject = matched
                .iter()
                .map(|review| review.faculty_subject.trim())
                .find(|subject| !subject.is_empty())
                .map(str::to_string);
            build_summary(None, key.0.to_string(), key.1.to_string(), subject, matched)
        })
        .collect()
}

/// Orders summaries by average rating, best first. The sort is stable, so equal
/// averages keep their incoming order.
pub fn leaderboard(mut summaries: Vec<FacultyRatingSummary>) -> Vec<FacultyRatingSummary> {
    summaries.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    summaries
}

/// Detail view for a single faculty member matched by normalised name and department.
pub fn faculty_report(reviews: &[Review], name: &str, department: &str) -> FacultyReport {
    let key = FacultyKey::new(name, department);
    let matched: Vec<&Review> = reviews
        .iter()
        .filter(|review| review.faculty_key() == key)
        .collect();

    let effective: Vec<f64> = matched.iter().map(|review| effective_overall(review)).collect();
    let average_rating = mean(effective.iter().copied());
    let top_rating = effective.iter().copied().fold(0.0_f64, f64::max);

    FacultyReport {
        faculty_name: name.trim().to_string(),
        faculty_department: department.trim().to_string(),
        review_count: matched.len(),
        average_rating,
        top_rating,
        performance: PerformanceBand::from_rating(average_rating),
        category_averages: category_averages(matched.iter().copied()),
        reviews: matched.into_iter().cloned().collect(),
    }
}

/// Per-category mean of valid entries across reviews, rounded to two decimals.
/// Categories only ever rated with invalid values are omitted.
pub fn category_averages<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for review in reviews {
        for (category, value) in &review.ratings {
            if let Some(score) = valid_score(value) {
                let entry = totals.entry(category.as_str()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|(category, (sum, count))| (category.to_string(), round_to(sum / count as f64, 2)))
        .collect()
}

fn build_summary(
    faculty_id: Option<FacultyId>,
    faculty_name: String,
    faculty_department: String,
    faculty_subject: Option<String>,
    matched: &[&Review],
) -> FacultyRatingSummary {
    let average_rating = mean(matched.iter().map(|review| effective_overall(review)));

    FacultyRatingSummary {
        faculty_id,
        faculty_name,
        faculty_department,
        faculty_subject,
        review_count: matched.len(),
        average_rating,
        performance: PerformanceBand::from_rating(average_rating),
        has_reviews: !matched.is_empty(),
        reviews: matched.iter().map(|review| (*review).clone()).collect(),
    }
}
