//! User directory service.

use serde::Deserialize;
use tracing::info;

use hirelane_firestore::{FirestoreError, UserRepository};
use hirelane_models::{Role, User};

use crate::error::{ApiError, ApiResult};

/// Profile update payload. Empty or omitted fields keep their prior value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_logo: Option<String>,
}

/// Account lookup and profile management.
#[derive(Clone)]
pub struct DirectoryService {
    users: UserRepository,
}

impl DirectoryService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Store a freshly built account. A taken email address surfaces as a
    /// conflict.
    pub async fn register(&self, user: &User) -> ApiResult<()> {
        self.users.create(user).await.map_err(|e| match e {
            FirestoreError::AlreadyExists(_) => {
                ApiError::conflict("An account with this email already exists")
            }
            other => other.into(),
        })
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<Option<User>> {
        Ok(self.users.get(user_id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.users.find_by_email(email).await?)
    }

    /// Apply a profile patch to the caller's own account.
    ///
    /// Name and image apply for everyone; company fields apply only when the
    /// caller is an employer and are silently ignored otherwise. Empty
    /// strings keep the prior value. Email is never touched.
    pub async fn update_profile(&self, mut user: User, patch: ProfilePatch) -> ApiResult<User> {
        user.name = keep_prior_if_blank(patch.name, user.name);
        user.image = merge_optional(patch.image, user.image);

        if user.role == Role::Employer {
            user.company_name = merge_optional(patch.company_name, user.company_name);
            user.company_description =
                merge_optional(patch.company_description, user.company_description);
            user.company_logo = merge_optional(patch.company_logo, user.company_logo);
        }

        user.updated_at = chrono::Utc::now();
        self.users.save_profile(&user).await?;
        info!(user_id = %user.id, "Updated profile");
        Ok(user)
    }

    /// Persist an uploaded image URL on the caller's account.
    pub async fn set_image(&self, mut user: User, url: String) -> ApiResult<User> {
        user.image = Some(url);
        user.updated_at = chrono::Utc::now();
        self.users.save_profile(&user).await?;
        Ok(user)
    }
}

fn keep_prior_if_blank(candidate: Option<String>, prior: String) -> String {
    match candidate {
        Some(s) if !s.trim().is_empty() => s,
        _ => prior,
    }
}

fn merge_optional(candidate: Option<String>, prior: Option<String>) -> Option<String> {
    match candidate {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => prior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_keep_prior() {
        assert_eq!(
            keep_prior_if_blank(Some("  ".into()), "Alice".into()),
            "Alice"
        );
        assert_eq!(keep_prior_if_blank(None, "Alice".into()), "Alice");
        assert_eq!(keep_prior_if_blank(Some("Bob".into()), "Alice".into()), "Bob");
    }

    #[test]
    fn test_merge_optional_keeps_prior_on_blank() {
        assert_eq!(
            merge_optional(Some(String::new()), Some("old.png".into())),
            Some("old.png".into())
        );
        assert_eq!(
            merge_optional(Some("new.png".into()), Some("old.png".into())),
            Some("new.png".into())
        );
        assert_eq!(merge_optional(None, None), None);
    }
}
