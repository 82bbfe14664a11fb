//! Applications and their status workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UnknownVariant;

/// Review status of an application. Set to `Applied` at creation and only
/// ever changed by the employer owning the parent job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Reviewing,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewing => "Reviewing",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(ApplicationStatus::Applied),
            "Reviewing" => Ok(ApplicationStatus::Reviewing),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(UnknownVariant::new("application status", other)),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The relation between one applicant and one job.
///
/// The document id is [`application_doc_id`], which makes the
/// (job, applicant) pair unique at the storage layer: a second apply for the
/// same pair collides on the id and fails, even under concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    /// Employer owning the parent job, denormalized at apply time. Lets the
    /// employer's application counts come from one query instead of one per
    /// job. Safe to denormalize because job ownership never changes.
    pub company_id: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Deterministic document id for the (job, applicant) pair.
pub fn application_doc_id(job_id: &str, applicant_id: &str) -> String {
    format!("{}_{}", job_id, applicant_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_default_is_applied() {
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Applied);
    }

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(serde_json::to_string(&ApplicationStatus::Reviewing).unwrap(), "\"Reviewing\"");
        assert_eq!(ApplicationStatus::from_str("Rejected").unwrap(), ApplicationStatus::Rejected);
        // Casing is part of the contract; lowercase must be rejected.
        assert!(ApplicationStatus::from_str("accepted").is_err());
        assert!(serde_json::from_str::<ApplicationStatus>("\"Hired\"").is_err());
    }

    #[test]
    fn test_doc_id_is_deterministic_per_pair() {
        assert_eq!(application_doc_id("j1", "u1"), "j1_u1");
        assert_eq!(application_doc_id("j1", "u1"), application_doc_id("j1", "u1"));
        assert_ne!(application_doc_id("j1", "u2"), application_doc_id("j1", "u1"));
    }
}
