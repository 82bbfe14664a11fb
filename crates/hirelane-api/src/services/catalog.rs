//! Job catalog: search, filtering, annotation and ownership mutations.
//!
//! The store query narrows by the equality predicates it can express
//! (`is_closed`, `category`, `type`); location, keyword and salary-window
//! predicates are pure functions evaluated here. Annotation and company
//! summaries come from batched lookups, never one query per job.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use hirelane_firestore::{ApplicationRepository, JobRepository, UserRepository};
use hirelane_models::{application_doc_id, ApplicationStatus, Job, JobFilters, JobPatch, JobType, Role, User};

use crate::error::{ApiError, ApiResult};

/// Payload for creating a posting. The owner in any payload is ignored; the
/// authenticated caller always owns the result.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "requirements is required"))]
    pub requirements: String,
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
}

/// Employer summary embedded in search results.
#[derive(Debug, Clone, Serialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub company_logo: String,
}

impl From<&User> for CompanySummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            company_name: user.company_name.clone().unwrap_or_default(),
            company_logo: user.company_logo.clone().unwrap_or_default(),
        }
    }
}

/// A posting with viewer-specific annotation and its company summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedJob {
    #[serde(flatten)]
    pub job: Job,
    /// The viewer's application status for this job, when a viewer was
    /// supplied and has applied.
    pub application_status: Option<ApplicationStatus>,
    /// Absent when the owning account no longer exists.
    pub company: Option<CompanySummary>,
}

/// A posting with its received-application count, for the employer dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct JobWithCount {
    #[serde(flatten)]
    pub job: Job,
    pub application_count: usize,
}

/// Job catalog service.
#[derive(Clone)]
pub struct CatalogService {
    jobs: JobRepository,
    applications: ApplicationRepository,
    users: UserRepository,
}

impl CatalogService {
    pub fn new(
        jobs: JobRepository,
        applications: ApplicationRepository,
        users: UserRepository,
    ) -> Self {
        Self {
            jobs,
            applications,
            users,
        }
    }

    /// Search open postings.
    pub async fn search(
        &self,
        filters: &JobFilters,
        viewer: Option<&str>,
    ) -> ApiResult<Vec<AnnotatedJob>> {
        let jobs = self
            .jobs
            .search_open(filters.category.as_deref(), filters.job_type)
            .await?;

        let jobs: Vec<Job> = jobs
            .into_iter()
            .filter(|job| matches_filters(job, filters))
            .collect();

        self.annotate(jobs, viewer).await
    }

    /// Fetch one posting. Closed postings remain individually viewable.
    pub async fn get_job(&self, job_id: &str, viewer: Option<&str>) -> ApiResult<AnnotatedJob> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        let mut annotated = self.annotate(vec![job], viewer).await?;
        Ok(annotated.remove(0))
    }

    /// Create a posting owned by the caller.
    pub async fn post_job(&self, caller: &User, payload: NewJob) -> ApiResult<Job> {
        if caller.role != Role::Employer {
            return Err(ApiError::forbidden("Only employers can post jobs"));
        }

        let now = Utc::now();
        let job = Job {
            id: Job::new_id(),
            title: payload.title,
            description: payload.description,
            requirements: payload.requirements,
            location: payload.location,
            category: payload.category,
            job_type: payload.job_type,
            company_id: caller.id.clone(),
            salary_min: payload.salary_min,
            salary_max: payload.salary_max,
            is_closed: false,
            created_at: now,
            updated_at: now,
        };

        self.jobs.create(&job).await?;
        Ok(job)
    }

    /// Shallow-merge a patch into a posting the caller owns.
    pub async fn update_job(&self, job_id: &str, caller: &User, patch: JobPatch) -> ApiResult<Job> {
        let mut job = self.owned_job(job_id, caller).await?;
        patch.apply(&mut job);
        self.jobs.save(&job).await?;
        Ok(job)
    }

    /// Delete a posting the caller owns, cascading to its applications.
    pub async fn delete_job(&self, job_id: &str, caller: &User) -> ApiResult<()> {
        let job = self.owned_job(job_id, caller).await?;

        let removed = self.applications.delete_for_job(&job.id).await?;
        self.jobs.delete(&job.id).await?;
        info!(job_id = %job.id, applications_removed = removed, "Deleted job posting");
        Ok(())
    }

    /// Flip the closed flag on a posting the caller owns.
    pub async fn toggle_closed(&self, job_id: &str, caller: &User) -> ApiResult<Job> {
        let mut job = self.owned_job(job_id, caller).await?;
        job.is_closed = !job.is_closed;
        job.updated_at = Utc::now();
        self.jobs.save(&job).await?;
        Ok(job)
    }

    /// The caller's own postings with application counts, from one grouped
    /// query over the employer's applications.
    pub async fn my_jobs(&self, caller: &User) -> ApiResult<Vec<JobWithCount>> {
        if caller.role != Role::Employer {
            return Err(ApiError::forbidden("Only employers have job listings"));
        }

        let jobs = self.jobs.by_company(&caller.id).await?;
        let applications = self.applications.for_company(&caller.id).await?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for application in &applications {
            *counts.entry(application.job_id.as_str()).or_default() += 1;
        }

        Ok(jobs
            .into_iter()
            .map(|job| {
                let application_count = counts.get(job.id.as_str()).copied().unwrap_or(0);
                JobWithCount {
                    job,
                    application_count,
                }
            })
            .collect())
    }

    /// Fetch a posting and require the caller to own it.
    async fn owned_job(&self, job_id: &str, caller: &User) -> ApiResult<Job> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found"))?;

        if job.company_id != caller.id {
            return Err(ApiError::forbidden("You do not own this job"));
        }
        Ok(job)
    }

    /// Attach viewer application status and company summaries, with one
    /// batched lookup for each.
    async fn annotate(&self, jobs: Vec<Job>, viewer: Option<&str>) -> ApiResult<Vec<AnnotatedJob>> {
        let statuses: HashMap<String, ApplicationStatus> = match viewer {
            Some(viewer) if jobs.len() > 1 => self
                .applications
                .for_applicant(viewer)
                .await?
                .into_iter()
                .map(|a| (a.job_id, a.status))
                .collect(),
            Some(viewer) => match jobs.first() {
                Some(job) => self
                    .applications
                    .get(&application_doc_id(&job.id, viewer))
                    .await?
                    .into_iter()
                    .map(|a| (a.job_id, a.status))
                    .collect(),
                None => HashMap::new(),
            },
            None => HashMap::new(),
        };

        let company_ids: Vec<String> = jobs
            .iter()
            .map(|j| j.company_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let companies: HashMap<String, CompanySummary> = self
            .users
            .get_many(&company_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), CompanySummary::from(u)))
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let application_status = statuses.get(&job.id).copied();
                let company = companies.get(&job.company_id).cloned();
                AnnotatedJob {
                    job,
                    application_status,
                    company,
                }
            })
            .collect())
    }
}

// =============================================================================
// Filter predicates
// =============================================================================

/// Evaluate the predicates the store query could not express.
fn matches_filters(job: &Job, filters: &JobFilters) -> bool {
    if let Some(location) = &filters.location {
        if !matches_location(job, location) {
            return false;
        }
    }
    if let Some(keyword) = &filters.keyword {
        if !matches_keyword(job, keyword) {
            return false;
        }
    }
    salary_window_overlaps(job, filters.min_salary, filters.max_salary)
}

/// Case-insensitive substring match against the location field.
fn matches_location(job: &Job, needle: &str) -> bool {
    job.location
        .as_deref()
        .map(|l| l.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

/// Case-insensitive substring match against title OR description.
fn matches_keyword(job: &Job, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    job.title.to_lowercase().contains(&needle) || job.description.to_lowercase().contains(&needle)
}

/// The requested salary window must overlap the job's stated range. A bound
/// the job does not state cannot satisfy the corresponding filter.
fn salary_window_overlaps(job: &Job, min_salary: Option<i64>, max_salary: Option<i64>) -> bool {
    if let Some(min) = min_salary {
        match job.salary_max {
            Some(salary_max) if salary_max >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = max_salary {
        match job.salary_min {
            Some(salary_min) if salary_min <= max => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, description: &str, location: Option<&str>, range: (Option<i64>, Option<i64>)) -> Job {
        Job {
            id: Job::new_id(),
            title: title.to_string(),
            description: description.to_string(),
            requirements: "none".to_string(),
            location: location.map(str::to_string),
            category: None,
            job_type: JobType::Remote,
            company_id: "u1".to_string(),
            salary_min: range.0,
            salary_max: range.1,
            is_closed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_location_match_is_case_insensitive_substring() {
        let j = job("a", "b", Some("Berlin, Germany"), (None, None));
        assert!(matches_location(&j, "berlin"));
        assert!(matches_location(&j, "GERMANY"));
        assert!(!matches_location(&j, "Munich"));

        let no_location = job("a", "b", None, (None, None));
        assert!(!matches_location(&no_location, "berlin"));
    }

    #[test]
    fn test_keyword_matches_title_or_description() {
        let j = job("Backend Engineer", "You will write Rust services", None, (None, None));
        assert!(matches_keyword(&j, "backend"));
        assert!(matches_keyword(&j, "rust"));
        assert!(!matches_keyword(&j, "frontend"));
    }

    #[test]
    fn test_salary_window_overlap() {
        let low = job("a", "b", None, (Some(1000), Some(2000)));
        let high = job("a", "b", None, (Some(3000), Some(4000)));

        // min_salary=2500 keeps only the job whose range reaches 2500.
        assert!(!salary_window_overlaps(&low, Some(2500), None));
        assert!(salary_window_overlaps(&high, Some(2500), None));

        // max_salary=2500 keeps only the job starting below 2500.
        assert!(salary_window_overlaps(&low, None, Some(2500)));
        assert!(!salary_window_overlaps(&high, None, Some(2500)));

        // Window [1500, 3500] overlaps both.
        assert!(salary_window_overlaps(&low, Some(1500), Some(3500)));
        assert!(salary_window_overlaps(&high, Some(1500), Some(3500)));
    }

    #[test]
    fn test_unstated_salary_fails_salary_filters() {
        let unstated = job("a", "b", None, (None, None));
        assert!(!salary_window_overlaps(&unstated, Some(1000), None));
        assert!(!salary_window_overlaps(&unstated, None, Some(1000)));
        assert!(salary_window_overlaps(&unstated, None, None));
    }

    #[test]
    fn test_combined_filters_use_and_semantics() {
        let j = job("Backend Engineer", "Rust", Some("Berlin"), (Some(1000), Some(2000)));
        let filters = JobFilters {
            location: Some("berlin".into()),
            keyword: Some("rust".into()),
            min_salary: Some(1500),
            ..JobFilters::default()
        };
        assert!(matches_filters(&j, &filters));

        let filters_wrong_city = JobFilters {
            location: Some("munich".into()),
            ..filters
        };
        assert!(!matches_filters(&j, &filters_wrong_city));
    }
}
