//! Shared data models for the Hirelane backend.
//!
//! This crate provides Serde-serializable types for:
//! - User accounts and roles
//! - Job postings, job types and search filters
//! - Applications and their status workflow
//!
//! The enumerated constants (`Role`, `JobType`, `ApplicationStatus`) live
//! here once and are validated at every boundary; neither the store layer
//! nor the API layer carries its own copy.

pub mod application;
pub mod job;
pub mod user;

// Re-export common types
pub use application::{application_doc_id, Application, ApplicationStatus};
pub use job::{Job, JobFilters, JobPatch, JobType};
pub use user::{PublicUser, Role, UnknownVariant, User};
