use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::IntoResponse;
use error_stack::{Report, ResultExt};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::time::Instant;
use tracker_core::defect::DefectStatus;

const REQUESTS_TOTAL_METRIC_NAME: &str = "http_requests_total";
const REQUEST_DURATION_METRIC_NAME: &str = "http_requests_duration_seconds";
const REQUEST_SIZE_METRIC_NAME: &str = "http_request_size";

const DEFECTS_CREATED_METRIC_NAME: &str = "num_defects_created";
const DEFECT_STATUS_CHANGES_METRIC_NAME: &str = "num_defect_status_changes";
const REVIEWS_CREATED_METRIC_NAME: &str = "num_reviews_created";
const REVIEW_LIKES_METRIC_NAME: &str = "num_review_likes";
const REVIEW_UNLIKES_METRIC_NAME: &str = "num_review_unlikes";
const ACHIEVEMENTS_CREATED_METRIC_NAME: &str = "num_achievements_created";
const ACHIEVEMENTS_DELETED_METRIC_NAME: &str = "num_achievements_deleted";

#[derive(Debug, thiserror::Error)]
#[error("failed to install the prometheus recorder")]
pub struct MetricsSetupError;

/// Installs the process wide recorder. Can only succeed once per process.
pub fn setup_recorder() -> Result<PrometheusHandle, Report<MetricsSetupError>> {
    const EXPONENTIAL_SECONDS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

    const REQ_RES_BUCKETS: &[f64] = &[128.0, 256.0, 512.0, 1024.0, 2048.0, 4096.0, 8192.0, 16384.0];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_METRIC_NAME.to_string()),
            EXPONENTIAL_SECONDS,
        )
        .change_context(MetricsSetupError)?
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_SIZE_METRIC_NAME.to_string()),
            REQ_RES_BUCKETS,
        )
        .change_context(MetricsSetupError)?
        .install_recorder()
        .change_context(MetricsSetupError)
}

pub async fn track_http(req: Request, next: Next) -> impl IntoResponse {
    // the route template, so that every defect id does not become its own label
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };

    if path.ends_with("metrics") {
        return next.run(req).await;
    }

    let method = req.method().clone();

    let req_size = req
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok());

    if let Some(req_size) = req_size {
        metrics::histogram!(REQUEST_SIZE_METRIC_NAME).record(req_size as f64);
    }

    let start = Instant::now();
    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!(REQUESTS_TOTAL_METRIC_NAME, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION_METRIC_NAME, &labels).record(latency);

    response
}

#[inline]
pub fn increment_defects_created() {
    metrics::counter!(DEFECTS_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_defect_status_changes(status: DefectStatus) {
    metrics::counter!(DEFECT_STATUS_CHANGES_METRIC_NAME, "status" => status.as_str()).increment(1);
}

#[inline]
pub fn increment_reviews_created() {
    metrics::counter!(REVIEWS_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_review_likes() {
    metrics::counter!(REVIEW_LIKES_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_review_unlikes() {
    metrics::counter!(REVIEW_UNLIKES_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_achievements_created() {
    metrics::counter!(ACHIEVEMENTS_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_achievements_deleted() {
    metrics::counter!(ACHIEVEMENTS_DELETED_METRIC_NAME).increment(1);
}
