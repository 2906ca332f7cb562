use crate::cli::ServeArgs;
use crate::infra::{load_reviews, load_roster, AppState, InMemoryFacultyRoster, InMemoryReviewRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use faculty_eval::config::AppConfig;
use faculty_eval::error::AppError;
use faculty_eval::evaluation::ReviewService;
use faculty_eval::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(ReviewService::new(
        Arc::new(InMemoryReviewRepository::default()),
        Arc::new(InMemoryFacultyRoster::default()),
        config.reconcile,
    ));

    let roster_size = service.import_roster(load_roster(args.roster.as_deref())?)?;

    let imported = match args.reviews.as_deref() {
        Some(path) => service.import(load_reviews(path)?)?,
        None => 0,
    };
    info!(imported, roster_size, "review store hydrated");

    let app = with_service_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, max_attempts = config.reconcile.max_attempts, "faculty evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
