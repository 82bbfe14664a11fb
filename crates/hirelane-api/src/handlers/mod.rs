//! HTTP handlers.

pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod profile;

pub use health::{health, ready};
