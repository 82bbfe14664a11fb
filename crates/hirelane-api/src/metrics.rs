//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "hirelane_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hirelane_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hirelane_http_requests_in_flight";

    // Domain metrics
    pub const SIGNUPS_TOTAL: &str = "hirelane_signups_total";
    pub const JOBS_POSTED_TOTAL: &str = "hirelane_jobs_posted_total";
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "hirelane_applications_submitted_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "hirelane_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a new account.
pub fn record_signup(role: &str) {
    let labels = [("role", role.to_string())];
    counter!(names::SIGNUPS_TOTAL, &labels).increment(1);
}

/// Record a job posting.
pub fn record_job_posted() {
    counter!(names::JOBS_POSTED_TOTAL).increment(1);
}

/// Record a submitted application.
pub fn record_application_submitted() {
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    // Replace UUIDs with a placeholder
    let path =
        regex_lite::Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .unwrap()
            .replace_all(path, ":id");
    // Application doc ids are "{job_id}_{applicant_id}" pairs of hex strings
    let path = regex_lite::Regex::new(r"/applications/[0-9a-f]{16,}_[0-9a-f]{16,}")
        .unwrap()
        .replace_all(&path, "/applications/:id");
    // Normalize job ids (hex document ids after /jobs/ or /applications/)
    let path = regex_lite::Regex::new(r"/(jobs|applications|job)/[0-9a-f]{16,}")
        .unwrap()
        .replace_all(&path, "/$1/:id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/jobs/550e8400-e29b-41d4-a716-446655440000"),
            "/jobs/:id"
        );
        assert_eq!(
            sanitize_path("/jobs/0123456789abcdef0123456789abcdef/toggle-job-status"),
            "/jobs/:id/toggle-job-status"
        );
        assert_eq!(
            sanitize_path(
                "/applications/0123456789abcdef0123456789abcdef_fedcba9876543210fedcba9876543210/status"
            ),
            "/applications/:id/status"
        );
        assert_eq!(
            sanitize_path("/applications/job/0123456789abcdef0123456789abcdef"),
            "/applications/job/:id"
        );
        assert_eq!(sanitize_path("/jobs/my-jobs"), "/jobs/my-jobs");
    }
}
