//! Profile and image upload handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use hirelane_models::PublicUser;
use hirelane_storage::{image_key, ImageFormat};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::ProfilePatch;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<PublicUser>> {
    let user = state.directory.update_profile(user, patch).await?;
    Ok(Json(PublicUser::from(&user)))
}

/// Upload a profile image and store its public URL on the account.
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        .ok_or_else(|| ApiError::bad_request("Missing image file"))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::bad_request("Missing image filename"))?;

    let format = ImageFormat::from_filename(&filename)
        .map_err(|_| ApiError::bad_request("Only JPEG and PNG images are supported"))?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let key = image_key(format);
    state
        .storage
        .upload_bytes(bytes.to_vec(), &key, format.content_type())
        .await?;
    let url = state.storage.public_url(&key);

    state.directory.set_image(user, url.clone()).await?;
    info!(key = %key, "Uploaded profile image");

    Ok(Json(UploadResponse { url }))
}
