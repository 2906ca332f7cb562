//! Overall-score arithmetic shared by intake, aggregation, and reconciliation.

use serde_json::Value;

use super::domain::{Ratings, Review};

/// Stored and recomputed scores within this distance are considered in agreement.
pub const DISCREPANCY_TOLERANCE: f64 = 0.1;

// Absorbs binary noise so that a difference of exactly one tenth (3.1 - 3.0 is
// 0.10000000000000009 as f64) stays inside the tolerance.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Scores that participate in averaging: finite JSON numbers strictly above zero.
pub fn valid_scores(ratings: &Ratings) -> impl Iterator<Item = f64> + '_ {
    ratings.values().filter_map(valid_score)
}

pub(crate) fn valid_score(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|score| score.is_finite() && *score > 0.0)
}

/// Mean of the valid entries rounded half-up to one decimal, or `None` when no
/// entry qualifies.
pub fn recompute_from_ratings(ratings: &Ratings) -> Option<f64> {
    let (sum, count) = valid_scores(ratings).fold((0.0_f64, 0_u32), |(sum, count), score| {
        (sum + score, count + 1)
    });
    if count == 0 {
        return None;
    }
    // Scale before dividing so integer sums land exactly on the half (61 / 20 -> 30.5).
    Some(((sum * 10.0) / f64::from(count)).round() / 10.0)
}

/// Recomputed overall score for a stored review.
pub fn recompute_from_categories(review: &Review) -> Option<f64> {
    recompute_from_ratings(&review.ratings)
}

/// Score persisted at intake: the recomputed mean when the ratings carry any valid
/// entry, otherwise whatever the caller supplied.
pub fn compute_overall_evaluation(ratings: &Ratings, supplied_overall: Option<f64>) -> Option<f64> {
    recompute_from_ratings(ratings).or(supplied_overall)
}

/// Value a review contributes to any average: recomputed, else stored, else zero.
pub fn effective_overall(review: &Review) -> f64 {
    recompute_from_categories(review)
        .or(review.overall_evaluation)
        .unwrap_or(0.0)
}

/// True when a stored score must be overwritten by the recomputed one.
pub fn exceeds_tolerance(stored: Option<f64>, calculated: f64) -> bool {
    match stored {
        Some(stored) => (calculated - stored).abs() > DISCREPANCY_TOLERANCE + TOLERANCE_EPSILON,
        None => true,
    }
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
