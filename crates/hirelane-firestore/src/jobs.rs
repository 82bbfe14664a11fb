//! Typed repository for job postings.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use metrics::counter;
use tracing::info;

use hirelane_models::{Job, JobType};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::QueryBuilder;
use crate::types::{Document, ToFirestoreValue, Value};

pub const JOBS_COLLECTION: &str = "jobs";

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a new posting.
    pub async fn create(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .create_document(JOBS_COLLECTION, &job.id, job_to_fields(job))
            .await?;
        counter!("hirelane_jobs_created_total").increment(1);
        info!(job_id = %job.id, company_id = %job.company_id, "Created job posting");
        Ok(())
    }

    /// Get a posting by id.
    pub async fn get(&self, job_id: &str) -> FirestoreResult<Option<Job>> {
        match self.client.get_document(JOBS_COLLECTION, job_id).await? {
            Some(doc) => Ok(Some(document_to_job(&doc)?)),
            None => Ok(None),
        }
    }

    /// Persist a posting after an edit. All fields are rewritten.
    pub async fn save(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .update_document(JOBS_COLLECTION, &job.id, job_to_fields(job), None)
            .await?;
        Ok(())
    }

    /// Delete a posting.
    pub async fn delete(&self, job_id: &str) -> FirestoreResult<()> {
        self.client.delete_document(JOBS_COLLECTION, job_id).await
    }

    /// Open postings, newest first, narrowed by the equality filters the
    /// store can evaluate. Substring and salary-window predicates are the
    /// caller's job.
    pub async fn search_open(
        &self,
        category: Option<&str>,
        job_type: Option<JobType>,
    ) -> FirestoreResult<Vec<Job>> {
        let mut builder = QueryBuilder::collection(JOBS_COLLECTION)
            .filter_eq("is_closed", false.to_firestore_value());

        if let Some(category) = category {
            builder = builder.filter_eq("category", category.to_firestore_value());
        }
        if let Some(job_type) = job_type {
            builder = builder.filter_eq("type", job_type.as_str().to_firestore_value());
        }

        let docs = self
            .client
            .run_query(builder.order_by_desc("created_at").build())
            .await?;
        docs.iter().map(document_to_job).collect()
    }

    /// All postings owned by an employer, newest first, open or closed.
    pub async fn by_company(&self, company_id: &str) -> FirestoreResult<Vec<Job>> {
        let query = QueryBuilder::collection(JOBS_COLLECTION)
            .filter_eq("company_id", company_id.to_firestore_value())
            .order_by_desc("created_at")
            .build();

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_job).collect()
    }

    /// Batch load postings by id, skipping any that no longer exist.
    pub async fn get_many(&self, job_ids: &[String]) -> FirestoreResult<Vec<Job>> {
        let names: Vec<String> = job_ids
            .iter()
            .map(|id| self.client.full_document_name(JOBS_COLLECTION, id))
            .collect();

        let docs = self.client.batch_get_documents(names).await?;
        docs.iter().map(document_to_job).collect()
    }
}

fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("description".to_string(), job.description.to_firestore_value());
    fields.insert(
        "requirements".to_string(),
        job.requirements.to_firestore_value(),
    );
    fields.insert("location".to_string(), job.location.to_firestore_value());
    fields.insert("category".to_string(), job.category.to_firestore_value());
    fields.insert("type".to_string(), job.job_type.as_str().to_firestore_value());
    fields.insert("company_id".to_string(), job.company_id.to_firestore_value());
    fields.insert("salary_min".to_string(), job.salary_min.to_firestore_value());
    fields.insert("salary_max".to_string(), job.salary_max.to_firestore_value());
    fields.insert("is_closed".to_string(), job.is_closed.to_firestore_value());
    fields.insert("created_at".to_string(), job.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_firestore_value());
    fields
}

fn document_to_job(doc: &Document) -> FirestoreResult<Job> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_response("job document without a name"))?
        .to_string();

    let type_str = doc.require_str("type")?;
    let job_type = JobType::from_str(&type_str)
        .map_err(|e| FirestoreError::invalid_response(e.to_string()))?;

    Ok(Job {
        id,
        title: doc.require_str("title")?,
        description: doc.require_str("description")?,
        requirements: doc.require_str("requirements")?,
        location: doc.get_str("location"),
        category: doc.get_str("category"),
        job_type,
        company_id: doc.require_str("company_id")?,
        salary_min: doc.get_i64("salary_min"),
        salary_max: doc.get_i64("salary_max"),
        is_closed: doc.get_bool("is_closed").unwrap_or(false),
        created_at: doc.get_time("created_at").unwrap_or_else(Utc::now),
        updated_at: doc.get_time("updated_at").unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_fields_round_trip() {
        let job = Job {
            id: "j1".to_string(),
            title: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            requirements: "Rust".to_string(),
            location: Some("Berlin".to_string()),
            category: Some("Engineering".to_string()),
            job_type: JobType::OnSite,
            company_id: "u1".to_string(),
            salary_min: Some(50_000),
            salary_max: None,
            is_closed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut doc = Document::new(job_to_fields(&job));
        doc.name = Some("projects/p/databases/(default)/documents/jobs/j1".to_string());

        let parsed = document_to_job(&doc).unwrap();
        assert_eq!(parsed.id, "j1");
        assert_eq!(parsed.job_type, JobType::OnSite);
        assert_eq!(parsed.salary_min, Some(50_000));
        assert_eq!(parsed.salary_max, None);
        assert!(!parsed.is_closed);
    }

    #[test]
    fn test_missing_required_text_field_is_rejected() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "x".to_firestore_value());
        fields.insert("description".to_string(), "x".to_firestore_value());
        // requirements deliberately absent
        fields.insert("type".to_string(), "Remote".to_firestore_value());
        fields.insert("company_id".to_string(), "u1".to_firestore_value());
        let mut doc = Document::new(fields);
        doc.name = Some("projects/p/databases/(default)/documents/jobs/j1".to_string());

        assert!(document_to_job(&doc).is_err());
    }

    #[test]
    fn test_unknown_stored_type_is_rejected() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), "x".to_firestore_value());
        fields.insert("description".to_string(), "x".to_firestore_value());
        fields.insert("type".to_string(), "Freelance".to_firestore_value());
        fields.insert("company_id".to_string(), "u1".to_firestore_value());
        let mut doc = Document::new(fields);
        doc.name = Some("projects/p/databases/(default)/documents/jobs/j1".to_string());

        assert!(document_to_job(&doc).is_err());
    }
}
