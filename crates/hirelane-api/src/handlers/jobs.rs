//! Job catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use hirelane_models::{Job, JobFilters, JobPatch, JobType};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::{AnnotatedJob, JobWithCount, NewJob};
use crate::state::AppState;

/// Query parameters for the search endpoint. All optional; absent filters
/// match everything.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub keyword: Option<String>,
    #[serde(rename = "minSalary")]
    pub min_salary: Option<i64>,
    #[serde(rename = "maxSalary")]
    pub max_salary: Option<i64>,
    /// Optional viewer id used to annotate results with the viewer's
    /// application status.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl SearchParams {
    fn into_filters(self) -> (JobFilters, Option<String>) {
        let filters = JobFilters {
            location: self.location,
            category: self.category,
            job_type: self.job_type,
            keyword: self.keyword,
            min_salary: self.min_salary,
            max_salary: self.max_salary,
        };
        (filters, self.user_id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// List open jobs matching the given filters.
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<AnnotatedJob>>> {
    let (filters, viewer) = params.into_filters();
    let jobs = state.catalog.search(&filters, viewer.as_deref()).await?;
    Ok(Json(jobs))
}

/// Fetch a single job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(params): Query<ViewerParams>,
) -> ApiResult<Json<AnnotatedJob>> {
    let job = state
        .catalog
        .get_job(&job_id, params.user_id.as_deref())
        .await?;
    Ok(Json(job))
}

/// Post a new job.
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<NewJob>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let job = state.catalog.post_job(&user, payload).await?;
    metrics::record_job_posted();
    Ok((StatusCode::CREATED, Json(job)))
}

/// List the caller's postings with per-job application counts.
pub async fn my_jobs(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<JobWithCount>>> {
    let jobs = state.catalog.my_jobs(&user).await?;
    Ok(Json(jobs))
}

/// Edit an owned posting.
pub async fn update_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> ApiResult<Json<Job>> {
    let job = state.catalog.update_job(&job_id, &user, patch).await?;
    Ok(Json(job))
}

/// Delete an owned posting and its applications.
pub async fn delete_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.catalog.delete_job(&job_id, &user).await?;
    Ok(Json(
        serde_json::json!({ "message": "Job deleted successfully" }),
    ))
}

/// Flip an owned posting between open and closed.
pub async fn toggle_job_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state.catalog.toggle_closed(&job_id, &user).await?;
    Ok(Json(job))
}
