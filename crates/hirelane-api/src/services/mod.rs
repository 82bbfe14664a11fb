//! Business logic services.
//!
//! Handlers stay thin; role checks, ownership checks, filtering and
//! annotation all live here, with the storage handles injected at
//! construction.

pub mod catalog;
pub mod directory;
pub mod ledger;

pub use catalog::{AnnotatedJob, CatalogService, CompanySummary, JobWithCount, NewJob};
pub use directory::{DirectoryService, ProfilePatch};
pub use ledger::{ApplicantSummary, ApplicationEntry, JobSummary, LedgerService};
