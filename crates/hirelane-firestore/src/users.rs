//! Typed repository for user accounts.
//!
//! Email uniqueness is enforced at the storage layer: each account owns an
//! index document in `user_emails` keyed by the lowercased address, created
//! before the account document itself. Two concurrent registrations for the
//! same address race on that id and exactly one wins.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use hirelane_models::{Role, User};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, ToFirestoreValue, Value};

pub const USERS_COLLECTION: &str = "users";
pub const USER_EMAILS_COLLECTION: &str = "user_emails";

/// Repository for user documents.
#[derive(Clone)]
pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a new account.
    ///
    /// Claims the email index first; if the address is taken this fails
    /// with [`FirestoreError::AlreadyExists`] before any account document
    /// is written.
    pub async fn create(&self, user: &User) -> FirestoreResult<()> {
        let email_key = email_index_key(&user.email);

        let mut index_fields = HashMap::new();
        index_fields.insert("user_id".to_string(), user.id.to_firestore_value());
        self.client
            .create_document(USER_EMAILS_COLLECTION, &email_key, index_fields)
            .await?;

        match self
            .client
            .create_document(USERS_COLLECTION, &user.id, user_to_fields(user))
            .await
        {
            Ok(_) => {
                counter!("hirelane_users_created_total", "role" => user.role.as_str()).increment(1);
                info!(user_id = %user.id, role = %user.role, "Created user account");
                Ok(())
            }
            Err(e) => {
                // Release the claimed address so a retry can succeed.
                if let Err(cleanup) = self
                    .client
                    .delete_document(USER_EMAILS_COLLECTION, &email_key)
                    .await
                {
                    warn!(
                        email_key = %email_key,
                        "Failed to release email index after account create failure: {}",
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> FirestoreResult<Option<User>> {
        match self.client.get_document(USERS_COLLECTION, user_id).await? {
            Some(doc) => Ok(Some(document_to_user(&doc)?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email address, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> FirestoreResult<Option<User>> {
        let index = self
            .client
            .get_document(USER_EMAILS_COLLECTION, &email_index_key(email))
            .await?;

        let user_id = match index.as_ref().and_then(|d| d.get_str("user_id")) {
            Some(id) => id,
            None => return Ok(None),
        };

        self.get(&user_id).await
    }

    /// Persist profile fields after an update.
    pub async fn save_profile(&self, user: &User) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), user.name.to_firestore_value());
        fields.insert("image".to_string(), user.image.to_firestore_value());
        fields.insert(
            "company_name".to_string(),
            user.company_name.to_firestore_value(),
        );
        fields.insert(
            "company_description".to_string(),
            user.company_description.to_firestore_value(),
        );
        fields.insert(
            "company_logo".to_string(),
            user.company_logo.to_firestore_value(),
        );
        fields.insert("updated_at".to_string(), user.updated_at.to_firestore_value());

        self.client
            .update_document(
                USERS_COLLECTION,
                &user.id,
                fields,
                Some(vec![
                    "name".to_string(),
                    "image".to_string(),
                    "company_name".to_string(),
                    "company_description".to_string(),
                    "company_logo".to_string(),
                    "updated_at".to_string(),
                ]),
            )
            .await?;
        Ok(())
    }

    /// Batch load users by id, skipping any that no longer exist.
    pub async fn get_many(&self, user_ids: &[String]) -> FirestoreResult<Vec<User>> {
        let names: Vec<String> = user_ids
            .iter()
            .map(|id| self.client.full_document_name(USERS_COLLECTION, id))
            .collect();

        let docs = self.client.batch_get_documents(names).await?;
        docs.iter().map(document_to_user).collect()
    }
}

/// Lowercased email used as the index document id.
fn email_index_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_to_fields(user: &User) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), user.name.to_firestore_value());
    fields.insert("email".to_string(), user.email.to_firestore_value());
    fields.insert(
        "password_hash".to_string(),
        user.password_hash.to_firestore_value(),
    );
    fields.insert("role".to_string(), user.role.as_str().to_firestore_value());
    fields.insert("image".to_string(), user.image.to_firestore_value());
    fields.insert(
        "company_name".to_string(),
        user.company_name.to_firestore_value(),
    );
    fields.insert(
        "company_description".to_string(),
        user.company_description.to_firestore_value(),
    );
    fields.insert(
        "company_logo".to_string(),
        user.company_logo.to_firestore_value(),
    );
    fields.insert("created_at".to_string(), user.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), user.updated_at.to_firestore_value());
    fields
}

fn document_to_user(doc: &Document) -> FirestoreResult<User> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_response("user document without a name"))?
        .to_string();

    let role_str = doc.require_str("role")?;
    let role = Role::from_str(&role_str)
        .map_err(|e| FirestoreError::invalid_response(e.to_string()))?;

    Ok(User {
        id,
        name: doc.require_str("name")?,
        email: doc.require_str("email")?,
        password_hash: doc.require_str("password_hash")?,
        role,
        image: doc.get_str("image"),
        company_name: doc.get_str("company_name"),
        company_description: doc.get_str("company_description"),
        company_logo: doc.get_str("company_logo"),
        created_at: doc.get_time("created_at").unwrap_or_else(Utc::now),
        updated_at: doc.get_time("updated_at").unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_index_key_normalizes() {
        assert_eq!(email_index_key("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(
            email_index_key("alice@example.com"),
            email_index_key("ALICE@EXAMPLE.COM")
        );
    }

    #[test]
    fn test_user_fields_round_trip() {
        let user = User {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Employer,
            image: None,
            company_name: Some("Acme".to_string()),
            company_description: None,
            company_logo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut doc = Document::new(user_to_fields(&user));
        doc.name = Some("projects/p/databases/(default)/documents/users/u1".to_string());

        let parsed = document_to_user(&doc).unwrap();
        assert_eq!(parsed.id, "u1");
        assert_eq!(parsed.role, Role::Employer);
        assert_eq!(parsed.company_name.as_deref(), Some("Acme"));
        assert_eq!(parsed.image, None);
    }

    #[test]
    fn test_document_without_role_is_rejected() {
        let mut doc = Document::new(HashMap::new());
        doc.name = Some("projects/p/databases/(default)/documents/users/u1".to_string());
        assert!(document_to_user(&doc).is_err());
    }
}
