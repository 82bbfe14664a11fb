//! Tests for Firestore client functionality against a mock HTTP server.

use std::collections::HashMap;
use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{FirestoreClient, FirestoreConfig};
use crate::error::FirestoreError;
use crate::retry::RetryConfig;
use crate::types::ToFirestoreValue;

const DOCUMENTS_PATH: &str = "/v1/projects/test-project/databases/(default)/documents";

fn test_config(server_uri: &str) -> FirestoreConfig {
    FirestoreConfig {
        project_id: "test-project".to_string(),
        database_id: "(default)".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 100,
        },
        emulator_host: Some(server_uri.to_string()),
    }
}

async fn test_client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::new(test_config(&server.uri()))
        .await
        .expect("client construction should not fail in static-token mode")
}

fn doc_json(doc_path: &str, fields: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "name": format!("projects/test-project/databases/(default)/documents/{}", doc_path),
        "fields": fields,
        "createTime": "2026-01-01T00:00:00Z",
        "updateTime": "2026-01-01T00:00:00Z"
    })
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_get_document_found() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/j1", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
            "jobs/j1",
            serde_json::json!({ "title": { "stringValue": "Backend Engineer" } }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client.get_document("jobs", "j1").await.unwrap().unwrap();
    assert_eq!(doc.doc_id(), Some("j1"));
    assert_eq!(doc.get_str("title").as_deref(), Some("Backend Engineer"));
}

#[tokio::test]
async fn test_get_document_missing_is_none() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/gone", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.get_document("jobs", "gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_document_sends_explicit_id() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}/users", DOCUMENTS_PATH)))
        .and(query_param("documentId", "u1"))
        .and(body_partial_json(serde_json::json!({
            "fields": { "name": { "stringValue": "Alice" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
            "users/u1",
            serde_json::json!({ "name": { "stringValue": "Alice" } }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("name".to_string(), "Alice".to_firestore_value());
    let doc = client.create_document("users", "u1", fields).await.unwrap();
    assert_eq!(doc.doc_id(), Some("u1"));
}

#[tokio::test]
async fn test_create_duplicate_id_is_already_exists() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "error": { "code": 409, "status": "ALREADY_EXISTS" }
        })))
        .mount(&server)
        .await;

    let result = client
        .create_document("applications", "j1_u2", HashMap::new())
        .await;
    assert!(matches!(result, Err(FirestoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_concurrent_create_same_id_yields_one_winner() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    // First request to land wins; the second collides on the document id.
    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCUMENTS_PATH)))
        .and(query_param("documentId", "j1_u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
            "applications/j1_u2",
            serde_json::json!({}),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCUMENTS_PATH)))
        .and(query_param("documentId", "j1_u2"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let (a, b) = tokio::join!(
        client.create_document("applications", "j1_u2", HashMap::new()),
        client.create_document("applications", "j1_u2", HashMap::new()),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let conflict = if a.is_err() { a } else { b };
    assert!(matches!(conflict, Err(FirestoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_update_document_with_mask() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/applications/j1_u2", DOCUMENTS_PATH)))
        .and(query_param("updateMask.fieldPaths", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
            "applications/j1_u2",
            serde_json::json!({ "status": { "stringValue": "Reviewing" } }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = HashMap::new();
    fields.insert("status".to_string(), "Reviewing".to_firestore_value());
    let doc = client
        .update_document(
            "applications",
            "j1_u2",
            fields,
            Some(vec!["status".to_string()]),
        )
        .await
        .unwrap();
    assert_eq!(doc.get_str("status").as_deref(), Some("Reviewing"));
}

#[tokio::test]
async fn test_delete_missing_document_is_idempotent() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/jobs/gone", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.delete_document("jobs", "gone").await.is_ok());
}

// =============================================================================
// Queries and Batch Operations
// =============================================================================

#[tokio::test]
async fn test_run_query_skips_progress_markers() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "readTime": "2026-01-01T00:00:00Z" },
            { "document": doc_json("jobs/j1", serde_json::json!({ "title": { "stringValue": "A" } })) },
            { "document": doc_json("jobs/j2", serde_json::json!({ "title": { "stringValue": "B" } })) }
        ])))
        .mount(&server)
        .await;

    let query = crate::query::QueryBuilder::collection("jobs")
        .filter_eq("is_closed", false.to_firestore_value())
        .build();
    let docs = client.run_query(query).await.unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].doc_id(), Some("j1"));
}

#[tokio::test]
async fn test_batch_get_omits_missing_documents() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}:batchGet", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "found": doc_json("users/u1", serde_json::json!({ "name": { "stringValue": "Alice" } })) },
            { "missing": "projects/test-project/databases/(default)/documents/users/u2" }
        ])))
        .mount(&server)
        .await;

    let docs = client
        .batch_get_documents(vec![
            client.full_document_name("users", "u1"),
            client.full_document_name("users", "u2"),
        ])
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].doc_id(), Some("u1"));
}

#[tokio::test]
async fn test_batch_get_rejects_oversized_request() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    let names: Vec<String> = (0..101)
        .map(|i| client.full_document_name("users", &format!("u{}", i)))
        .collect();
    assert!(client.batch_get_documents(names).await.is_err());
}

#[tokio::test]
async fn test_batch_write_surfaces_partial_failure() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}:batchWrite", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "writeResults": [{}, {}],
            "status": [{ "code": 0 }, { "code": 13, "message": "INTERNAL" }]
        })))
        .mount(&server)
        .await;

    let writes = vec![
        crate::types::Write::delete(client.full_document_name("applications", "a1")),
        crate::types::Write::delete(client.full_document_name("applications", "a2")),
    ];
    assert!(client.batch_write(writes).await.is_err());
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn test_with_retry_recovers_from_transient_503() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/j1", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/j1", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
            "jobs/j1",
            serde_json::json!({ "title": { "stringValue": "A" } }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let doc = client
        .with_retry("get_job", || client.get_document("jobs", "j1"))
        .await
        .unwrap();
    assert!(doc.is_some());
}

#[tokio::test]
async fn test_with_retry_does_not_retry_conflict() {
    let server = MockServer::start().await;
    let client = test_client(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCUMENTS_PATH)))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .with_retry("apply", || {
            client.create_document("applications", "j1_u2", HashMap::new())
        })
        .await;
    assert!(matches!(result, Err(FirestoreError::AlreadyExists(_))));
}
