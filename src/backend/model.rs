//! Request and response bodies exchanged with the REST backend.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::{Role, Session};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

/// Login form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if self.email.trim().is_empty() {
            err.add("email", "is required");
        }
        if self.password.expose_secret().is_empty() {
            err.add("password", "is required");
        }
        err.into_result()
    }
}

/// Registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

impl Registration {
    /// Client-side checks run before any request is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if self.name.trim().is_empty() {
            err.add("name", "is required");
        }
        if self.email.trim().is_empty() {
            err.add("email", "is required");
        } else if !EMAIL_RE.is_match(self.email.trim()) {
            err.add("email", "is not a valid e-mail address");
        }
        let password = self.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LEN {
            err.add(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        if password != self.confirm_password.expose_secret() {
            err.add("confirm_password", "does not match the password");
        }
        err.into_result()
    }
}

/// User returned by the login and registration endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthenticatedUser {
    pub fn into_session(self) -> Session {
        Session {
            user_id: self.id,
            role: self.role,
            display_name: self.name,
            token: self.token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionAd {
    pub id: String,
    pub species: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a new adoption ad, built from the wizard's accumulated fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdoption {
    pub species: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostPet {
    pub id: String,
    pub name: String,
    pub species: String,
    pub last_seen_location: String,
    pub contact: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLostPet {
    pub name: String,
    pub species: String,
    pub last_seen_location: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub title: String,
    pub body: String,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if self.title.trim().is_empty() {
            err.add("title", "is required");
        }
        if self.body.trim().is_empty() {
            err.add("body", "is required");
        }
        err.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationOrg {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Back-office counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub users: u64,
    pub adoptions: u64,
    pub lost_pets: u64,
    pub questions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reference to a stored upload, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedPhoto {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            name: "Dana".into(),
            email: email.into(),
            phone: None,
            password: SecretString::from(password.to_string()),
            confirm_password: SecretString::from(confirm.to_string()),
        }
    }

    #[test]
    fn valid_registration() {
        assert!(registration("dana@example.org", "hunter22", "hunter22")
            .validate()
            .is_ok());
    }

    #[test]
    fn registration_field_errors() {
        let err = registration("not-an-email", "abc", "abd")
            .validate()
            .unwrap_err();
        assert!(err.get("email").is_some());
        assert_eq!(err.get("password"), Some("must be at least 6 characters"));
        assert!(err.get("confirm_password").is_some());
        assert!(err.get("name").is_none());
    }

    #[test]
    fn credentials_require_both_fields() {
        let err = Credentials::new(" ", "").validate().unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert!(Credentials::new("a@b.c", "pw").validate().is_ok());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "s3cret-value");
        assert!(!format!("{creds:?}").contains("s3cret-value"));
    }

    #[test]
    fn authenticated_user_becomes_session() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"id":"7","name":"Kim","role":"admin","token":"abc"}"#)
                .unwrap();
        let session = user.into_session();
        assert_eq!(session.user_id, "7");
        assert!(session.is_admin());
        assert_eq!(session.token.as_deref(), Some("abc"));
    }

    #[test]
    fn ad_tolerates_missing_optional_fields() {
        let ad: AdoptionAd =
            serde_json::from_str(r#"{"id":"1","species":"cat","name":"Tom"}"#).unwrap();
        assert!(ad.photo_url.is_none());
        assert!(ad.created_at.is_none());
    }
}
