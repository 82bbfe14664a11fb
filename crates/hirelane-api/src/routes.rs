//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::applications::{
    applications_for_job, apply, my_applications, update_status,
};
use crate::handlers::auth::{me, signin, signup};
use crate::handlers::jobs::{
    create_job, delete_job, get_job, my_jobs, search_jobs, toggle_job_status, update_job,
};
use crate::handlers::profile::{update_profile, upload_image};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Credential endpoints get their own, tighter rate limiter to slow
    // down password guessing.
    let auth_rate_limiter =
        std::sync::Arc::new(RateLimiterCache::new(state.config.auth_rate_limit_rps));

    let auth_routes = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .layer(middleware::from_fn_with_state(
            auth_rate_limiter,
            rate_limit_middleware,
        ))
        .route("/auth/me", get(me));

    let job_routes = Router::new()
        .route("/jobs", get(search_jobs))
        .route("/jobs", post(create_job))
        // Registered before /jobs/:id so the literal segment wins.
        .route("/jobs/my-jobs", get(my_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id", put(update_job))
        .route("/jobs/:id", delete(delete_job))
        .route("/jobs/:id/toggle-job-status", put(toggle_job_status));

    let application_routes = Router::new()
        .route("/applications/my-applications", get(my_applications))
        .route("/applications/job/:job_id", get(applications_for_job))
        .route("/applications/:job_id", post(apply))
        .route("/applications/:id/status", put(update_status));

    let profile_routes = Router::new()
        .route("/user/update-profile", put(update_profile))
        .route("/user/upload-image", post(upload_image));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(auth_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(profile_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
