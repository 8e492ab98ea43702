use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub memory: Option<String>,
    pub color: Option<String>,
    pub default_price: f64,
    pub created_at: DateTime<Utc>,
}
