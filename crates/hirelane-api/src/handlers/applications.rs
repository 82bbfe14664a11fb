//! Application ledger handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use hirelane_models::{Application, ApplicationStatus};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::metrics;
use crate::services::ApplicationEntry;
use crate::state::AppState;

/// Status update payload. An unknown status name fails deserialization and
/// surfaces as a 400 before the handler runs.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

/// Apply to a job.
pub async fn apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let application = state.ledger.apply(&job_id, &user).await?;
    metrics::record_application_submitted();
    Ok((StatusCode::CREATED, Json(application)))
}

/// The caller's own applications, newest first.
pub async fn my_applications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<ApplicationEntry>>> {
    let applications = state.ledger.my_applications(&user).await?;
    Ok(Json(applications))
}

/// Applications received for one of the caller's postings.
pub async fn applications_for_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<ApplicationEntry>>> {
    let applications = state.ledger.applications_for_job(&job_id, &user).await?;
    Ok(Json(applications))
}

/// Move an application to a new review status.
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Application>> {
    let application = state
        .ledger
        .update_status(&application_id, &user, payload.status)
        .await?;
    Ok(Json(application))
}
