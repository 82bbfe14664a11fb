//! User accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Immutable after signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Employer,
}

impl Role {
    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Employer => "employer",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicant" => Ok(Role::Applicant),
            "employer" => Ok(Role::Employer),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored value that does not match any enumerated variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {field} value: {value}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Account record as stored in the user directory.
///
/// The company fields are only meaningful when `role` is `Employer`; they are
/// never written for applicants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Globally unique, lowercased at signup. Never mutated afterwards.
    pub email: String,
    /// Argon2id digest. Never serialized into API responses.
    pub password_hash: String,
    pub role: Role,
    pub image: Option<String>,
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub company_logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Generate a fresh account id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// The externally visible projection of a [`User`].
///
/// Optional fields are flattened to empty strings, matching what clients
/// already expect from the profile endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: String,
    pub company_name: String,
    pub company_description: String,
    pub company_logo: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            image: user.image.clone().unwrap_or_default(),
            company_name: user.company_name.clone().unwrap_or_default(),
            company_description: user.company_description.clone().unwrap_or_default(),
            company_logo: user.company_logo.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("employer").unwrap(), Role::Employer);
        assert_eq!(Role::Applicant.as_str(), "applicant");
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn test_role_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Employer).unwrap(), "\"employer\"");
        let role: Role = serde_json::from_str("\"applicant\"").unwrap();
        assert_eq!(role, Role::Applicant);
    }

    #[test]
    fn test_public_user_flattens_missing_company_fields() {
        let user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$...".into(),
            role: Role::Applicant,
            image: None,
            company_name: None,
            company_description: None,
            company_logo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        assert_eq!(public.image, "");
        assert_eq!(public.company_name, "");

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
