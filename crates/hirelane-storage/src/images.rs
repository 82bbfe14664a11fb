//! Image upload validation and key generation.
//!
//! Only jpg, jpeg and png are accepted for profile images and company logos.
//! Keys are `images/{timestamp}-{uuid}.{ext}` so uploads never collide and
//! sort roughly by age.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Determine the format from a filename extension.
    pub fn from_filename(filename: &str) -> StorageResult<Self> {
        let ext = filename
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(StorageError::UnsupportedImageType(filename.to_string())),
        }
    }

    /// Canonical extension for stored keys.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// MIME type sent to storage.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// A fresh, collision-free storage key for an image.
pub fn image_key(format: ImageFormat) -> String {
    format!(
        "images/{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        format.extension()
    )
}
