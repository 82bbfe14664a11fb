//! Firestore REST API client and typed repositories.
//!
//! This crate provides:
//! - Typed repositories for users, jobs and applications
//! - Service account authentication via gcp_auth, or static-token mode
//!   against the emulator
//! - Storage-level uniqueness through deterministic document ids
//! - Merge updates, batch gets/writes and retry logic

pub mod applications;
pub mod client;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod query;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod users;

#[cfg(test)]
mod client_tests;

pub use applications::ApplicationRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use jobs::JobRepository;
pub use query::QueryBuilder;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
pub use users::UserRepository;
