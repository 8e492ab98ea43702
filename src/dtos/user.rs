// src/dtos/user.rs
use serde::{Deserialize, Serialize};

/// Typed user preferences with enumerated recognized keys; unknown keys
/// are rejected at deserialization instead of being stored opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: String,
    pub warranty_alerts: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "pt-BR".to_string(),
            warranty_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub role: String,
    pub preferences: Option<UserPreferences>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub preferences: UserPreferences,
    pub created_at: String,
}

impl From<crate::models::user::User> for UserResponse {
    fn from(user: crate::models::user::User) -> Self {
        // rows written before the typed structure existed fall back to the
        // defaults instead of failing the read
        let preferences =
            serde_json::from_str(&user.preferences).unwrap_or_default();
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            preferences,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_default_when_empty() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.theme, Theme::System);
        assert!(prefs.warranty_alerts);
    }

    #[test]
    fn preferences_reject_unknown_keys() {
        let result = serde_json::from_str::<UserPreferences>(r#"{"font_size": 14}"#);
        assert!(result.is_err());
    }

    #[test]
    fn preferences_round_trip() {
        let prefs = UserPreferences {
            theme: Theme::Dark,
            language: "en-US".to_string(),
            warranty_alerts: false,
        };
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(serde_json::from_str::<UserPreferences>(&json).unwrap(), prefs);
    }
}
