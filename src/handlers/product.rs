// src/handlers/product.rs
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;

use crate::dtos::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::error::AppError;
use crate::handlers::map_unique_violation;
use crate::models::product::Product;
use crate::state::AppState;
use crate::validation::require_non_empty;

const PRODUCT_COLUMNS: &str =
    "id, name, code, memory, color, default_price::FLOAT8 AS default_price, created_at";

// GET /products?q= - List products, optionally filtered by name or code
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let q = params.get("q").cloned();

    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE $1::TEXT IS NULL
            OR name ILIKE '%' || $1 || '%'
            OR code ILIKE '%' || $1 || '%'
         ORDER BY name"
    ))
    .bind(q)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

// GET /products/{id}
#[instrument(skip(state), fields(id))]
pub async fn get_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /products
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    require_non_empty("Product name", &payload.name)?;
    require_non_empty("Product code", &payload.code)?;
    if payload.default_price < 0.0 {
        return Err(AppError::validation("Default price cannot be negative"));
    }

    let product = sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (name, code, memory, color, default_price)
         VALUES ($1, $2, $3, $4, $5::FLOAT8)
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.code)
    .bind(&payload.memory)
    .bind(&payload.color)
    .bind(payload.default_price)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A product with this code already exists"))?;

    Ok(Json(ProductResponse::from(product)))
}

// PUT /products/{id}
#[instrument(skip(state, payload), fields(id))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_non_empty("Product name", name)?;
    }
    if let Some(code) = &payload.code {
        require_non_empty("Product code", code)?;
    }
    if let Some(price) = payload.default_price {
        if price < 0.0 {
            return Err(AppError::validation("Default price cannot be negative"));
        }
    }

    let product = sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET
         name = COALESCE($1, name),
         code = COALESCE($2, code),
         memory = COALESCE($3, memory),
         color = COALESCE($4, color),
         default_price = COALESCE($5::FLOAT8, default_price)
         WHERE id = $6
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(payload.name)
    .bind(payload.code)
    .bind(payload.memory)
    .bind(payload.color)
    .bind(payload.default_price)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A product with this code already exists"))?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// DELETE /products/{id} - hard delete; historical receipt lines keep the id
#[instrument(skip(state), fields(id))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(()))
}
