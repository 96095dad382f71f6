//! Identity, profile and account request models.

use serde::{Deserialize, Serialize};

/// The authenticated principal performing an action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
}

impl Identity {
    /// Name shown on rosters: the display name, else the email local part.
    pub fn roster_name(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => local_part(&self.email).to_string(),
        }
    }
}

/// The part of an email address before the `@`.
pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Profile record, one-to-one with an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub updated_at: String,
}

/// Request body for saving the caller's profile. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for signing up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request body for signing in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A freshly issued session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub expires_at: String,
    pub identity: Identity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str, display_name: Option<&str>) -> Identity {
        Identity {
            uid: "uid-1".to_string(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            player_name: None,
        }
    }

    #[test]
    fn test_roster_name_prefers_display_name() {
        assert_eq!(identity("a@x.com", Some("Ace")).roster_name(), "Ace");
    }

    #[test]
    fn test_roster_name_falls_back_to_local_part() {
        assert_eq!(identity("a@x.com", None).roster_name(), "a");
        assert_eq!(identity("a@x.com", Some("   ")).roster_name(), "a");
    }

    #[test]
    fn test_local_part_without_at() {
        assert_eq!(local_part("plain"), "plain");
    }
}
