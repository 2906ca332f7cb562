use super::aggregate::views::FacultyRatingSummary;
use super::scoring::round_to;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    faculty_name: &'a str,
    faculty_department: &'a str,
    faculty_subject: &'a str,
    review_count: usize,
    average_rating: f64,
    performance: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV export: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes one CSV row per summary. Averages are rounded to two decimals for display.
pub fn export_summaries_csv<W: Write>(
    summaries: &[FacultyRatingSummary],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(SummaryRow {
            faculty_name: &summary.faculty_name,
            faculty_department: &summary.faculty_department,
            faculty_subject: summary.faculty_subject.as_deref().unwrap_or(""),
            review_count: summary.review_count,
            average_rating: round_to(summary.average_rating, 2),
            performance: summary.performance.label(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
