// src/dtos/product.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub code: String,
    pub memory: Option<String>,
    pub color: Option<String>,
    pub default_price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub memory: Option<String>,
    pub color: Option<String>,
    pub default_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub memory: Option<String>,
    pub color: Option<String>,
    pub default_price: f64,
    pub created_at: String,
}

impl From<crate::models::product::Product> for ProductResponse {
    fn from(product: crate::models::product::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            code: product.code,
            memory: product.memory,
            color: product.color,
            default_price: product.default_price,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}
