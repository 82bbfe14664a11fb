//! Job postings, job types and search filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UnknownVariant;

/// The advertised working arrangement of a posting.
///
/// The wire strings are shared with the frontend; they are the only accepted
/// values at every boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Remote,
    #[serde(rename = "On-Site")]
    OnSite,
    Hybrid,
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    /// Get string representation of the job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Remote => "Remote",
            JobType::OnSite => "On-Site",
            JobType::Hybrid => "Hybrid",
            JobType::FullTime => "Full-Time",
            JobType::PartTime => "Part-Time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Remote" => Ok(JobType::Remote),
            "On-Site" => Ok(JobType::OnSite),
            "Hybrid" => Ok(JobType::Hybrid),
            "Full-Time" => Ok(JobType::FullTime),
            "Part-Time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            "Internship" => Ok(JobType::Internship),
            other => Err(UnknownVariant::new("job type", other)),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A job posting owned by exactly one employer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    /// Owning employer account; authorization checks compare against this.
    pub company_id: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Generate a fresh posting id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Partial update of a posting. Omitted fields retain their prior value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub is_closed: Option<bool>,
}

impl JobPatch {
    /// Shallow-merge this patch into an existing posting.
    pub fn apply(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.clone();
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(requirements) = &self.requirements {
            job.requirements = requirements.clone();
        }
        if let Some(location) = &self.location {
            job.location = Some(location.clone());
        }
        if let Some(category) = &self.category {
            job.category = Some(category.clone());
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(salary_min) = self.salary_min {
            job.salary_min = Some(salary_min);
        }
        if let Some(salary_max) = self.salary_max {
            job.salary_max = Some(salary_max);
        }
        if let Some(is_closed) = self.is_closed {
            job.is_closed = is_closed;
        }
        job.updated_at = Utc::now();
    }
}

/// Search filters for the public job listing.
///
/// All filters are optional and combine with AND semantics, except the
/// keyword which matches title OR description.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    /// Case-insensitive substring match on the location field.
    pub location: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact job type match.
    pub job_type: Option<JobType>,
    /// Case-insensitive substring match on title or description.
    pub keyword: Option<String>,
    /// Jobs whose salary_max is at least this value.
    pub min_salary: Option<i64>,
    /// Jobs whose salary_min is at most this value.
    pub max_salary: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_job() -> Job {
        Job {
            id: "j1".into(),
            title: "Backend Engineer".into(),
            description: "Build services".into(),
            requirements: "Rust".into(),
            location: Some("Berlin".into()),
            category: Some("Engineering".into()),
            job_type: JobType::Remote,
            company_id: "u1".into(),
            salary_min: Some(50_000),
            salary_max: Some(70_000),
            is_closed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_job_type_wire_strings() {
        assert_eq!(serde_json::to_string(&JobType::OnSite).unwrap(), "\"On-Site\"");
        assert_eq!(serde_json::to_string(&JobType::FullTime).unwrap(), "\"Full-Time\"");
        assert_eq!(JobType::from_str("Part-Time").unwrap(), JobType::PartTime);
        assert!(JobType::from_str("part-time").is_err());
    }

    #[test]
    fn test_job_serializes_type_field() {
        let json = serde_json::to_value(sample_job()).unwrap();
        assert_eq!(json["type"], "Remote");
        assert!(json.get("job_type").is_none());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut job = sample_job();
        let patch: JobPatch =
            serde_json::from_str(r#"{"title": "Senior Backend Engineer", "is_closed": true}"#)
                .unwrap();
        patch.apply(&mut job);

        assert_eq!(job.title, "Senior Backend Engineer");
        assert!(job.is_closed);
        // Omitted fields retain prior values.
        assert_eq!(job.location.as_deref(), Some("Berlin"));
        assert_eq!(job.salary_min, Some(50_000));
    }

    #[test]
    fn test_patch_rejects_unknown_job_type() {
        let result: Result<JobPatch, _> = serde_json::from_str(r#"{"type": "Freelance"}"#);
        assert!(result.is_err());
    }
}
