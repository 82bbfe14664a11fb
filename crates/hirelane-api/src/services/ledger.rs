//! Application ledger: applying to jobs and the review status workflow.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use hirelane_firestore::{ApplicationRepository, FirestoreError, JobRepository, UserRepository};
use hirelane_models::{
    application_doc_id, Application, ApplicationStatus, Job, JobType, Role, User,
};

use crate::error::{ApiError, ApiResult};

/// Parent-job summary embedded in application listings.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub company_name: String,
}

/// Applicant summary embedded in the employer's per-job listing.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
}

impl From<&User> for ApplicantSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone().unwrap_or_default(),
        }
    }
}

/// An application joined with the summaries its listing needs. The joins
/// are orphan tolerant: a deleted job or account leaves the summary absent
/// rather than failing the whole listing.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationEntry {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantSummary>,
}

/// Application ledger service.
#[derive(Clone)]
pub struct LedgerService {
    applications: ApplicationRepository,
    jobs: JobRepository,
    users: UserRepository,
}

impl LedgerService {
    pub fn new(
        applications: ApplicationRepository,
        jobs: JobRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            applications,
            jobs,
            users,
        }
    }

    /// Apply to a job.
    ///
    /// Only applicants may apply, the job must exist and be open, and the
    /// (job, applicant) pair must be new. Duplicates are caught by the
    /// store-level id collision, never a check-then-insert.
    pub async fn apply(&self, job_id: &str, caller: &User) -> ApiResult<Application> {
        if caller.role != Role::Applicant {
            return Err(ApiError::forbidden("Only applicants can apply to jobs"));
        }

        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        if job.is_closed {
            return Err(ApiError::conflict("This job is no longer accepting applications"));
        }

        let now = Utc::now();
        let application = Application {
            id: application_doc_id(&job.id, &caller.id),
            job_id: job.id.clone(),
            applicant_id: caller.id.clone(),
            company_id: job.company_id.clone(),
            status: ApplicationStatus::default(),
            created_at: now,
            updated_at: now,
        };

        self.applications
            .create(&application)
            .await
            .map_err(|e| match e {
                FirestoreError::AlreadyExists(_) => {
                    ApiError::conflict("You have already applied to this job")
                }
                other => other.into(),
            })?;

        Ok(application)
    }

    /// The caller's applications, newest first, each with its parent-job
    /// summary.
    pub async fn my_applications(&self, caller: &User) -> ApiResult<Vec<ApplicationEntry>> {
        let applications = self.applications.for_applicant(&caller.id).await?;
        let job_summaries = self.job_summaries(&applications).await?;

        Ok(applications
            .into_iter()
            .map(|application| {
                let job = job_summaries.get(&application.job_id).cloned();
                ApplicationEntry {
                    application,
                    job,
                    applicant: None,
                }
            })
            .collect())
    }

    /// Applications received for a job the caller owns, each with applicant
    /// and job summaries.
    pub async fn applications_for_job(
        &self,
        job_id: &str,
        caller: &User,
    ) -> ApiResult<Vec<ApplicationEntry>> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        if job.company_id != caller.id {
            return Err(ApiError::forbidden("You do not own this job"));
        }

        let applications = self.applications.for_job(job_id).await?;

        let applicant_ids: Vec<String> = applications
            .iter()
            .map(|a| a.applicant_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let applicants: HashMap<String, ApplicantSummary> = self
            .users
            .get_many(&applicant_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), ApplicantSummary::from(u)))
            .collect();

        let job_summary = self.summarize_job(&job).await?;

        Ok(applications
            .into_iter()
            .map(|application| {
                let applicant = applicants.get(&application.applicant_id).cloned();
                ApplicationEntry {
                    application,
                    job: Some(job_summary.clone()),
                    applicant,
                }
            })
            .collect())
    }

    /// Move an application to a new status. Only the employer owning the
    /// parent job may do this; any of the four statuses may follow any
    /// other.
    pub async fn update_status(
        &self,
        application_id: &str,
        caller: &User,
        status: ApplicationStatus,
    ) -> ApiResult<Application> {
        let mut application = self
            .applications
            .get(application_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Application not found"))?;

        // company_id is denormalized from the job at apply time and job
        // ownership never changes, so this is the ownership check.
        if application.company_id != caller.id {
            return Err(ApiError::forbidden(
                "You do not own the job this application belongs to",
            ));
        }

        self.applications.set_status(application_id, status).await?;
        application.status = status;
        application.updated_at = Utc::now();

        info!(application_id = %application_id, status = %status, "Updated application status");
        Ok(application)
    }

    async fn job_summaries(
        &self,
        applications: &[Application],
    ) -> ApiResult<HashMap<String, JobSummary>> {
        let job_ids: Vec<String> = applications
            .iter()
            .map(|a| a.job_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let jobs = self.jobs.get_many(&job_ids).await?;

        let company_ids: Vec<String> = jobs
            .iter()
            .map(|j| j.company_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let company_names: HashMap<String, String> = self
            .users
            .get_many(&company_ids)
            .await?
            .into_iter()
            .map(|u| {
                let name = u.company_name.unwrap_or(u.name);
                (u.id, name)
            })
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let company_name = company_names
                    .get(&job.company_id)
                    .cloned()
                    .unwrap_or_default();
                (
                    job.id.clone(),
                    JobSummary {
                        id: job.id,
                        title: job.title,
                        location: job.location,
                        job_type: job.job_type,
                        company_name,
                    },
                )
            })
            .collect())
    }

    async fn summarize_job(&self, job: &Job) -> ApiResult<JobSummary> {
        let company_name = self
            .users
            .get(&job.company_id)
            .await?
            .map(|u| u.company_name.unwrap_or(u.name))
            .unwrap_or_default();

        Ok(JobSummary {
            id: job.id.clone(),
            title: job.title.clone(),
            location: job.location.clone(),
            job_type: job.job_type,
            company_name,
        })
    }
}
