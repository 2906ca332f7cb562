use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use super::aggregate::views::{
    DashboardAnalytics, DiscrepancyReport, FacultyRatingSummary, FacultyReport,
};
use super::aggregate::AnalyticsQuery;
use super::domain::{FacultyId, FacultyMember, Review, ReviewId, ReviewSubmission};
use super::export::export_summaries_csv;
use super::repository::{FacultyRoster, ReviewRepository};
use super::service::{ReviewFilter, ReviewService};
use crate::error::AppError;

type SharedService<R, F> = State<Arc<ReviewService<R, F>>>;
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type ApiResult<T> = Result<Json<T>, AppError>;

/// Router builder exposing the review, faculty, and analytics endpoints.
pub fn review_router<R, F>(service: Arc<ReviewService<R, F>>) -> Router
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Router::new()
        .route(
            "/api/review",
            post(submit_handler::<R, F>).get(list_handler::<R, F>),
        )
        .route("/api/review/filter", post(filter_handler::<R, F>))
        .route(
            "/api/review/faculty-ratings",
            get(faculty_ratings_handler::<R, F>),
        )
        .route(
            "/api/review/faculty-ratings/export",
            get(faculty_ratings_export_handler::<R, F>),
        )
        .route(
            "/api/review/discrepancies",
            get(discrepancies_handler::<R, F>),
        )
        .route(
            "/api/review/validate-ratings",
            post(reconcile_handler::<R, F>),
        )
        .route(
            "/api/review/faculty/:name/:department",
            get(faculty_report_handler::<R, F>),
        )
        .route(
            "/api/review/:review_id",
            get(get_handler::<R, F>)
                .put(update_handler::<R, F>)
                .delete(delete_handler::<R, F>),
        )
        .route(
            "/api/faculty",
            get(roster_handler::<R, F>).post(register_faculty_handler::<R, F>),
        )
        .route(
            "/api/faculty/with-ratings",
            get(roster_ratings_handler::<R, F>),
        )
        .route(
            "/api/faculty/department/:department",
            get(department_roster_handler::<R, F>),
        )
        .route(
            "/api/faculty/:faculty_id",
            put(update_faculty_handler::<R, F>).delete(remove_faculty_handler::<R, F>),
        )
        .route("/api/admin/analytics", get(analytics_handler::<R, F>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R, F>(
    State(service): SharedService<R, F>,
    payload: JsonBody<ReviewSubmission>,
) -> Result<(StatusCode, Json<Review>), AppError>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let Json(submission) = payload?;
    let review = service.submit(submission)?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub(crate) async fn list_handler<R, F>(State(service): SharedService<R, F>) -> ApiResult<Vec<Review>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.list()?))
}

pub(crate) async fn get_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(review_id): Path<String>,
) -> ApiResult<Review>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.get(&ReviewId(review_id))?))
}

pub(crate) async fn update_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(review_id): Path<String>,
    payload: JsonBody<ReviewSubmission>,
) -> ApiResult<Review>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let Json(submission) = payload?;
    Ok(Json(service.update(&ReviewId(review_id), submission)?))
}

pub(crate) async fn delete_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(review_id): Path<String>,
) -> ApiResult<Value>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let removed = service.delete(&ReviewId(review_id))?;
    Ok(Json(json!({ "message": "review deleted", "id": removed.id })))
}

pub(crate) async fn filter_handler<R, F>(
    State(service): SharedService<R, F>,
    payload: JsonBody<ReviewFilter>,
) -> ApiResult<Vec<Review>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let Json(filter) = payload?;
    Ok(Json(service.filter(&filter)?))
}

pub(crate) async fn faculty_report_handler<R, F>(
    State(service): SharedService<R, F>,
    Path((name, department)): Path<(String, String)>,
) -> ApiResult<FacultyReport>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.faculty_report(&name, &department)?))
}

pub(crate) async fn faculty_ratings_handler<R, F>(
    State(service): SharedService<R, F>,
) -> ApiResult<Vec<FacultyRatingSummary>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.faculty_ratings()?))
}

pub(crate) async fn faculty_ratings_export_handler<R, F>(
    State(service): SharedService<R, F>,
) -> Result<Response, AppError>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let summaries = service.faculty_ratings()?;
    let mut buffer = Vec::new();
    export_summaries_csv(&summaries, &mut buffer)?;
    Ok(([(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref())], buffer).into_response())
}

pub(crate) async fn discrepancies_handler<R, F>(
    State(service): SharedService<R, F>,
) -> ApiResult<Vec<DiscrepancyReport>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.discrepancies()?))
}

pub(crate) async fn reconcile_handler<R, F>(State(service): SharedService<R, F>) -> ApiResult<Value>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let report = service.reconcile()?;
    Ok(Json(json!({
        "message": format!("Validation complete. Updated {} review(s).", report.updated_count),
        "totalReviews": report.total_reviews,
        "updatedCount": report.updated_count,
        "failedCount": report.failed_count,
        "outcomes": report.outcomes,
    })))
}

pub(crate) async fn roster_handler<R, F>(
    State(service): SharedService<R, F>,
) -> ApiResult<Vec<FacultyMember>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.roster()?))
}

pub(crate) async fn department_roster_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(department): Path<String>,
) -> ApiResult<Vec<FacultyMember>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.faculty_in_department(&department)?))
}

pub(crate) async fn register_faculty_handler<R, F>(
    State(service): SharedService<R, F>,
    payload: JsonBody<FacultyMember>,
) -> Result<(StatusCode, Json<FacultyMember>), AppError>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let Json(member) = payload?;
    let registered = service.register_faculty(member)?;
    Ok((StatusCode::CREATED, Json(registered)))
}

pub(crate) async fn update_faculty_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(faculty_id): Path<String>,
    payload: JsonBody<FacultyMember>,
) -> ApiResult<FacultyMember>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let Json(member) = payload?;
    Ok(Json(service.update_faculty(&FacultyId(faculty_id), member)?))
}

pub(crate) async fn remove_faculty_handler<R, F>(
    State(service): SharedService<R, F>,
    Path(faculty_id): Path<String>,
) -> ApiResult<Value>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    let removed = service.remove_faculty(&FacultyId(faculty_id))?;
    Ok(Json(json!({ "message": "faculty deleted", "id": removed.id })))
}

pub(crate) async fn roster_ratings_handler<R, F>(
    State(service): SharedService<R, F>,
) -> ApiResult<Vec<FacultyRatingSummary>>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.roster_ratings()?))
}

pub(crate) async fn analytics_handler<R, F>(
    State(service): SharedService<R, F>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<DashboardAnalytics>
where
    R: ReviewRepository + 'static,
    F: FacultyRoster + 'static,
{
    Ok(Json(service.analytics(&query, Utc::now())?))
}
