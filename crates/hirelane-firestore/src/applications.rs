//! Typed repository for applications.
//!
//! Application documents are keyed by the deterministic
//! `{job_id}_{applicant_id}` pair id, so a second apply for the same pair
//! fails at the store with [`FirestoreError::AlreadyExists`] regardless of
//! timing.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use metrics::counter;
use tracing::info;

use hirelane_models::{Application, ApplicationStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::QueryBuilder;
use crate::types::{Document, ToFirestoreValue, Value, Write};

pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Record a new application.
    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        self.client
            .create_document(
                APPLICATIONS_COLLECTION,
                &application.id,
                application_to_fields(application),
            )
            .await?;
        counter!("hirelane_applications_created_total").increment(1);
        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            "Recorded application"
        );
        Ok(())
    }

    /// Get an application by id.
    pub async fn get(&self, application_id: &str) -> FirestoreResult<Option<Application>> {
        match self
            .client
            .get_document(APPLICATIONS_COLLECTION, application_id)
            .await?
        {
            Some(doc) => Ok(Some(document_to_application(&doc)?)),
            None => Ok(None),
        }
    }

    /// Applications submitted by one applicant, newest first.
    pub async fn for_applicant(&self, applicant_id: &str) -> FirestoreResult<Vec<Application>> {
        self.query_eq("applicant_id", applicant_id).await
    }

    /// Applications received for one job, newest first.
    pub async fn for_job(&self, job_id: &str) -> FirestoreResult<Vec<Application>> {
        self.query_eq("job_id", job_id).await
    }

    /// Applications across all of an employer's jobs, newest first. One
    /// query thanks to the denormalized `company_id` field.
    pub async fn for_company(&self, company_id: &str) -> FirestoreResult<Vec<Application>> {
        self.query_eq("company_id", company_id).await
    }

    /// Move an application to a new review status.
    pub async fn set_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), status.as_str().to_firestore_value());
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.client
            .update_document(
                APPLICATIONS_COLLECTION,
                application_id,
                fields,
                Some(vec!["status".to_string(), "updated_at".to_string()]),
            )
            .await?;
        Ok(())
    }

    /// Delete every application attached to a job. Used when the posting
    /// itself is deleted.
    pub async fn delete_for_job(&self, job_id: &str) -> FirestoreResult<usize> {
        let applications = self.for_job(job_id).await?;
        let count = applications.len();

        let writes: Vec<Write> = applications
            .iter()
            .map(|a| {
                Write::delete(
                    self.client
                        .full_document_name(APPLICATIONS_COLLECTION, &a.id),
                )
            })
            .collect();

        self.client.batch_write(writes).await?;
        if count > 0 {
            info!(job_id = %job_id, count, "Deleted applications for removed job");
        }
        Ok(count)
    }

    async fn query_eq(&self, field: &str, value: &str) -> FirestoreResult<Vec<Application>> {
        let query = QueryBuilder::collection(APPLICATIONS_COLLECTION)
            .filter_eq(field, value.to_firestore_value())
            .order_by_desc("created_at")
            .build();

        let docs = self.client.run_query(query).await?;
        docs.iter().map(document_to_application).collect()
    }
}

fn application_to_fields(application: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("job_id".to_string(), application.job_id.to_firestore_value());
    fields.insert(
        "applicant_id".to_string(),
        application.applicant_id.to_firestore_value(),
    );
    fields.insert(
        "company_id".to_string(),
        application.company_id.to_firestore_value(),
    );
    fields.insert(
        "status".to_string(),
        application.status.as_str().to_firestore_value(),
    );
    fields.insert(
        "created_at".to_string(),
        application.created_at.to_firestore_value(),
    );
    fields.insert(
        "updated_at".to_string(),
        application.updated_at.to_firestore_value(),
    );
    fields
}

fn document_to_application(doc: &Document) -> FirestoreResult<Application> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_response("application document without a name"))?
        .to_string();

    let status_str = doc.require_str("status")?;
    let status = ApplicationStatus::from_str(&status_str)
        .map_err(|e| FirestoreError::invalid_response(e.to_string()))?;

    Ok(Application {
        id,
        job_id: doc.require_str("job_id")?,
        applicant_id: doc.require_str("applicant_id")?,
        company_id: doc.require_str("company_id")?,
        status,
        created_at: doc.get_time("created_at").unwrap_or_else(Utc::now),
        updated_at: doc.get_time("updated_at").unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirelane_models::application_doc_id;

    #[test]
    fn test_application_fields_round_trip() {
        let application = Application {
            id: application_doc_id("j1", "u2"),
            job_id: "j1".to_string(),
            applicant_id: "u2".to_string(),
            company_id: "u1".to_string(),
            status: ApplicationStatus::Reviewing,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut doc = Document::new(application_to_fields(&application));
        doc.name = Some(format!(
            "projects/p/databases/(default)/documents/applications/{}",
            application.id
        ));

        let parsed = document_to_application(&doc).unwrap();
        assert_eq!(parsed.id, "j1_u2");
        assert_eq!(parsed.status, ApplicationStatus::Reviewing);
        assert_eq!(parsed.company_id, "u1");
    }

    #[test]
    fn test_unknown_stored_status_is_rejected() {
        let mut fields = HashMap::new();
        fields.insert("job_id".to_string(), "j1".to_firestore_value());
        fields.insert("applicant_id".to_string(), "u2".to_firestore_value());
        fields.insert("company_id".to_string(), "u1".to_firestore_value());
        fields.insert("status".to_string(), "Hired".to_firestore_value());
        let mut doc = Document::new(fields);
        doc.name = Some("projects/p/databases/(default)/documents/applications/j1_u2".to_string());

        assert!(document_to_application(&doc).is_err());
    }
}
