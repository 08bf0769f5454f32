//! Session data — who is logged in and with which role.

use serde::{Deserialize, Serialize};

/// User role, the only input to admin gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Regular,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Regular => "regular",
            Self::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

/// A logged-in user.
///
/// Persisted as JSON in the key-value store under [`super::SESSION_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub role: Role,
    pub display_name: String,
    /// Bearer token handed out by the backend on login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            display_name: display_name.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_serde() {
        for role in [Role::Regular, Role::Admin] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn session_json_shape() {
        let session = Session::new("u1", Role::Admin, "Ada").with_token("t0k");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["role"], "admin");
        assert_eq!(json["display_name"], "Ada");
        assert_eq!(json["token"], "t0k");
    }

    #[test]
    fn missing_role_defaults_to_regular() {
        let session: Session =
            serde_json::from_str(r#"{"user_id":"u2","display_name":"Bo"}"#).unwrap();
        assert_eq!(session.role, Role::Regular);
        assert!(!session.is_admin());
        assert!(session.token.is_none());
    }
}
