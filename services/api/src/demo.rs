use crate::infra::{load_reviews, load_roster, InMemoryFacultyRoster, InMemoryReviewRepository};
use chrono::{Duration, Utc};
use clap::Args;
use faculty_eval::config::ReconcileConfig;
use faculty_eval::error::AppError;
use faculty_eval::evaluation::export::export_summaries_csv;
use faculty_eval::evaluation::{
    find_discrepancies, group_by_reviewed_faculty, leaderboard, reconcile_all,
    summarize_by_faculty, AnalyticsQuery, FacultyId, FacultyMember, FacultyRatingSummary, Ratings,
    ReconcileOutcome, Review, ReviewId, ReviewService, ReviewSubmission,
};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

const CATEGORIES: [&str; 12] = [
    "conceptExplanation",
    "subjectKnowledge",
    "contentOrganization",
    "classTiming",
    "learningEnvironment",
    "studentParticipation",
    "feedbackQuality",
    "resourceUtilization",
    "innovation",
    "accessibility",
    "supportiveness",
    "professionalism",
];

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// JSON array of stored reviews
    #[arg(long)]
    pub(crate) reviews: PathBuf,
    /// Faculty roster CSV. Without it, faculty are grouped by the names on the reviews.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Write the summaries to this CSV file as well
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DiscrepancyArgs {
    /// JSON array of stored reviews
    #[arg(long)]
    pub(crate) reviews: PathBuf,
    /// Write the reconciled collection to this JSON file
    #[arg(long)]
    pub(crate) write: Option<PathBuf>,
}

pub(crate) fn run_ratings_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        reviews,
        roster,
        export,
    } = args;

    let reviews = load_reviews(reviews)?;
    let summaries = match roster {
        Some(path) => summarize_by_faculty(&reviews, &load_roster(Some(path.as_path()))?),
        None => leaderboard(group_by_reviewed_faculty(&reviews)),
    };

    println!("Faculty rating summary ({} reviews)", reviews.len());
    render_summaries(&summaries);

    if let Some(path) = export {
        let file = File::create(&path)?;
        export_summaries_csv(&summaries, BufWriter::new(file))?;
        println!("\nExported {} rows to {}", summaries.len(), path.display());
    }

    Ok(())
}

pub(crate) fn run_discrepancy_report(args: DiscrepancyArgs) -> Result<(), AppError> {
    let DiscrepancyArgs { reviews, write } = args;
    let mut reviews = load_reviews(reviews)?;

    let discrepancies = find_discrepancies(&reviews);
    if discrepancies.is_empty() {
        println!("No stored scores drift from their ratings");
    } else {
        println!("Stored scores drifting from their ratings");
        for report in &discrepancies {
            println!(
                "- {}: stored {} | calculated {:.1}",
                report.review_id,
                format_stored(report.stored),
                report.calculated
            );
        }
    }

    if let Some(path) = write {
        let counts = reconcile_all(&mut reviews);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &reviews)?;
        println!(
            "\nReconciled {} of {} review(s) into {}",
            counts.updated_count,
            counts.total_reviews,
            path.display()
        );
    }

    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    println!("Faculty evaluation demo");

    let service = ReviewService::new(
        Arc::new(InMemoryReviewRepository::default()),
        Arc::new(InMemoryFacultyRoster::default()),
        ReconcileConfig::default(),
    );

    for member in demo_roster() {
        service.register_faculty(member)?;
    }

    let submissions = [
        ("Ananya", "Dr. Priya Sharma", "Computer Science", [5_i64, 5, 4, 5, 4, 5, 5, 4, 4, 5, 5, 5]),
        ("Karthik", "dr. priya sharma", "computer science ", [4, 4, 4, 3, 4, 4, 5, 4, 3, 4, 4, 4]),
        ("Meera", "Dr. Arjun Nair", "Mechanical", [3, 3, 2, 3, 3, 2, 3, 3, 2, 3, 3, 3]),
        ("Rahul", "Dr. Arjun Nair", "Mechanical", [4, 3, 3, 4, 3, 3, 4, 3, 3, 3, 4, 4]),
    ];
    println!("\nIntake");
    for (student, faculty, department, scores) in submissions {
        let review = service.submit(demo_submission(student, faculty, department, &scores))?;
        println!(
            "- {} reviewed {} -> overall {}",
            student,
            review.faculty_name.trim(),
            format_stored(review.overall_evaluation)
        );
    }

    let imported = service.import(legacy_reviews())?;
    println!("- Imported {imported} legacy review(s) scored against a fixed denominator");

    println!("\nRoster summary");
    render_summaries(&service.roster_ratings()?);

    let discrepancies = service.discrepancies()?;
    println!("\nDrifted stored scores: {}", discrepancies.len());
    for report in &discrepancies {
        println!(
            "- {}: stored {} | calculated {:.1}",
            report.review_id,
            format_stored(report.stored),
            report.calculated
        );
    }

    let first = service.reconcile()?;
    println!(
        "\nReconciliation pass: {} of {} review(s) updated, {} failed",
        first.updated_count, first.total_reviews, first.failed_count
    );
    for outcome in &first.outcomes {
        if let ReconcileOutcome::Updated {
            review_id,
            previous,
            calculated,
            ..
        } = outcome
        {
            println!(
                "  - {}: {} -> {:.1}",
                review_id,
                format_stored(*previous),
                calculated
            );
        }
    }
    let second = service.reconcile()?;
    println!(
        "Second pass: {} review(s) updated (already consistent)",
        second.updated_count
    );

    let report = service.faculty_report("Dr. Priya Sharma", "Computer Science")?;
    println!(
        "\nFaculty report: {} ({}) | {} review(s) | average {:.2} | top {:.1} | {}",
        report.faculty_name,
        report.faculty_department,
        report.review_count,
        report.average_rating,
        report.top_rating,
        report.performance.label()
    );
    for (category, average) in &report.category_averages {
        println!("  - {category}: {average:.2}");
    }

    let analytics = service.analytics(&AnalyticsQuery::default(), Utc::now())?;
    println!(
        "\nDashboard ({}): {} review(s) from {} student(s) across {} of {} faculty, average {:.2}",
        analytics.window.time_range,
        analytics.summary.total_reviews,
        analytics.summary.unique_students,
        analytics.summary.active_faculty,
        analytics.summary.total_faculty,
        analytics.summary.average_rating
    );
    for department in &analytics.departments {
        println!(
            "  - {}: {} review(s), average {:.2}",
            department.name, department.review_count, department.average_rating
        );
    }

    Ok(())
}

fn render_summaries(summaries: &[FacultyRatingSummary]) {
    if summaries.is_empty() {
        println!("- no faculty to report");
        return;
    }
    for summary in summaries {
        println!(
            "- {} ({}): {} review(s), average {:.2} [{}]",
            summary.faculty_name,
            summary.faculty_department,
            summary.review_count,
            summary.average_rating,
            summary.performance.label()
        );
    }
}

fn format_stored(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.1}"))
        .unwrap_or_else(|| "none".to_string())
}

fn category_ratings(scores: &[i64]) -> Ratings {
    CATEGORIES
        .iter()
        .zip(scores)
        .map(|(category, score)| (category.to_string(), json!(score)))
        .collect()
}

fn demo_roster() -> Vec<FacultyMember> {
    [
        ("Dr. Priya Sharma", "Computer Science", "Data Structures"),
        ("Dr. Arjun Nair", "Mechanical", "Thermodynamics"),
        ("Dr. Leela Iyer", "Mathematics", "Linear Algebra"),
    ]
    .into_iter()
    .map(|(name, department, subject)| FacultyMember {
        id: FacultyId::default(),
        name: name.to_string(),
        department: department.to_string(),
        subject: subject.to_string(),
        email: None,
    })
    .collect()
}

fn demo_submission(
    student: &str,
    faculty: &str,
    department: &str,
    scores: &[i64],
) -> ReviewSubmission {
    ReviewSubmission {
        student_name: Some(student.to_string()),
        student_identifier: format!("ADM-{}", student.to_lowercase()),
        branch_semester: Some("B.Tech-5".to_string()),
        faculty_name: faculty.to_string(),
        faculty_department: department.to_string(),
        faculty_subject: String::new(),
        ratings: category_ratings(scores),
        suggestions: String::new(),
        overall_evaluation: None,
    }
}

fn legacy_reviews() -> Vec<Review> {
    let created_at = Utc::now() - Duration::days(3);
    [("legacy-0001", &[5_i64, 4, 5, 4, 5][..]), ("legacy-0002", &[4, 4, 4][..])]
        .into_iter()
        .map(|(id, scores)| {
            let fixed_denominator = scores.iter().sum::<i64>() as f64 / CATEGORIES.len() as f64;
            Review {
                id: ReviewId::from(id),
                student_name: Some("Imported".to_string()),
                student_identifier: format!("ADM-{id}"),
                branch_semester: None,
                faculty_name: "Dr. Leela Iyer".to_string(),
                faculty_department: "Mathematics".to_string(),
                faculty_subject: "Linear Algebra".to_string(),
                ratings: category_ratings(scores),
                overall_evaluation: Some((fixed_denominator * 10.0).round() / 10.0),
                suggestions: String::new(),
                created_at,
            }
        })
        .collect()
}
