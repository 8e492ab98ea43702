use chrono::{DateTime, Utc};
use sqlx::FromRow;

// preferences is a JSONB column selected as TEXT; the typed structure
// lives in dtos::user::UserPreferences
#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub preferences: String,
    pub created_at: DateTime<Utc>,
}
