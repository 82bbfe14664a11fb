//! Object storage for uploaded images.
//!
//! Wraps Cloudflare R2 via the S3 API. Profile pictures and company logos
//! are uploaded here and served from the bucket's public base URL.

pub mod client;
pub mod error;
pub mod images;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use images::{image_key, ImageFormat};
