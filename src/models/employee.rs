use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub whatsapp: String,
    pub age: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
