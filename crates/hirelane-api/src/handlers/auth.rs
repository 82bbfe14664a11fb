//! Signup, signin and the current-account endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use hirelane_models::{PublicUser, Role, User};

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the account it belongs to.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Create an account and sign the caller in.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let now = Utc::now();
    let user = User {
        id: User::new_id(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password_hash: hash_password(&payload.password)?,
        role: payload.role,
        image: None,
        company_name: None,
        company_description: None,
        company_logo: None,
        created_at: now,
        updated_at: now,
    };

    state.directory.register(&user).await?;
    metrics::record_signup(user.role.as_str());
    info!(user_id = %user.id, role = %user.role.as_str(), "Account created");

    let token = issue_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// Exchange credentials for a token.
///
/// A missing account and a wrong password produce the same answer, so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .directory
        .find_by_email(payload.email.trim())
        .await?
        .filter(|user| verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let token = issue_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}

/// The account behind the presented token.
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}
