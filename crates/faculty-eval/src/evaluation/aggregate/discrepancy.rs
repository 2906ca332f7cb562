use super::super::domain::{Review, ReviewId};
use super::super::scoring::{exceeds_tolerance, recompute_from_categories};
use super::views::DiscrepancyReport;
use serde::Serialize;

/// Reviews whose stored overall score disagrees with their own ratings beyond
/// tolerance. Reviews without any valid rating have no opinion and are never listed.
pub fn find_discrepancies(reviews: &[Review]) -> Vec<DiscrepancyReport> {
    reviews.iter().filter_map(discrepancy_for).collect()
}

pub fn discrepancy_for(review: &Review) -> Option<DiscrepancyReport> {
    let calculated = recompute_from_categories(review)?;
    exceeds_tolerance(review.overall_evaluation, calculated).then(|| DiscrepancyReport {
        review_id: review.id.clone(),
        stored: review.overall_evaluation,
        calculated,
    })
}

/// Counts returned by a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileCounts {
    pub total_reviews: usize,
    pub updated_count: usize,
}

/// Overwrites drifted scores in an already materialised collection.
pub fn reconcile_all(reviews: &mut [Review]) -> ReconcileCounts {
    let mut updated_count = 0;
    for review in reviews.iter_mut() {
        if let Some(report) = discrepancy_for(review) {
            review.overall_evaluation = Some(report.calculated);
            updated_count += 1;
        }
    }

    ReconcileCounts {
        total_reviews: reviews.len(),
        updated_count,
    }
}

/// Per-record result of a store-backed reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    #[serde(rename_all = "camelCase")]
    Updated {
        review_id: ReviewId,
        previous: Option<f64>,
        calculated: f64,
        attempts: u8,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        review_id: ReviewId,
        error: String,
        attempts: u8,
    },
    /// Deleted between the fetch and the write.
    #[serde(rename_all = "camelCase")]
    Vanished { review_id: ReviewId },
}

impl ReconcileOutcome {
    pub fn review_id(&self) -> &ReviewId {
        match self {
            Self::Updated { review_id, .. }
            | Self::Failed { review_id, .. }
            | Self::Vanished { review_id } => review_id,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Full report of a store-backed reconciliation. Only records that needed a write
/// appear in `outcomes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub total_reviews: usize,
    pub updated_count: usize,
    pub failed_count: usize,
    pub outcomes: Vec<ReconcileOutcome>,
}

impl ReconcileReport {
    pub fn from_outcomes(total_reviews: usize, outcomes: Vec<ReconcileOutcome>) -> Self {
        let updated_count = outcomes.iter().filter(|outcome| outcome.is_updated()).count();
        let failed_count = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ReconcileOutcome::Failed { .. }))
            .count();
        Self {
            total_reviews,
            updated_count,
            failed_count,
            outcomes,
        }
    }

    pub fn counts(&self) -> ReconcileCounts {
        ReconcileCounts {
            total_reviews: self.total_reviews,
            updated_count: self.updated_count,
        }
    }
}
