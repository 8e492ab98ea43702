// src/handlers/customer.rs
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;

use crate::dtos::customer::{CreateCustomerRequest, CustomerResponse, UpdateCustomerRequest};
use crate::error::AppError;
use crate::handlers::map_unique_violation;
use crate::models::customer::Customer;
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_cpf, validate_email};

const CUSTOMER_COLUMNS: &str = "id, full_name, email, phone, cpf, created_at, updated_at";

// GET /customers?q= - List customers, optionally filtered
#[instrument(skip(state))]
pub async fn get_customers(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let q = params.get("q").cloned();

    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers
         WHERE $1::TEXT IS NULL
            OR full_name ILIKE '%' || $1 || '%'
            OR email ILIKE '%' || $1 || '%'
            OR phone ILIKE '%' || $1 || '%'
            OR cpf ILIKE '%' || $1 || '%'
         ORDER BY full_name"
    ))
    .bind(q)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

// GET /customers/{id}
#[instrument(skip(state), fields(id))]
pub async fn get_customer(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Customer not found"))?;

    Ok(Json(CustomerResponse::from(customer)))
}

// POST /customers
#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    validate_customer_fields(&payload.full_name, payload.email.as_deref(), payload.cpf.as_deref())?;

    // Duplicate email check before the write so the caller gets a targeted
    // message; the unique index still backs this up under races
    if let Some(email) = &payload.email {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&state.db_pool)
        .await?;

        if exists {
            return Err(AppError::conflict("A customer with this email already exists"));
        }
    }

    let customer = sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (full_name, email, phone, cpf)
         VALUES ($1, $2, $3, $4)
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(&payload.full_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.cpf)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A customer with this email already exists"))?;

    Ok(Json(CustomerResponse::from(customer)))
}

// PUT /customers/{id}
#[instrument(skip(state, payload), fields(id))]
pub async fn update_customer(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    if let Some(full_name) = &payload.full_name {
        require_non_empty("Customer name", full_name)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(cpf) = &payload.cpf {
        validate_cpf(cpf)?;
    }

    let customer = sqlx::query_as::<_, Customer>(&format!(
        "UPDATE customers SET
         full_name = COALESCE($1, full_name),
         email = COALESCE($2, email),
         phone = COALESCE($3, phone),
         cpf = COALESCE($4, cpf),
         updated_at = NOW()
         WHERE id = $5
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(payload.full_name)
    .bind(payload.email)
    .bind(payload.phone)
    .bind(payload.cpf)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A customer with this email already exists"))?
    .ok_or_else(|| AppError::not_found("Customer not found"))?;

    Ok(Json(CustomerResponse::from(customer)))
}

// DELETE /customers/{id} - rejected while the customer owns receipts
#[instrument(skip(state), fields(id))]
pub async fn delete_customer(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let receipt_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE customer_id = $1")
            .bind(id)
            .fetch_one(&state.db_pool)
            .await?;

    if receipt_count > 0 {
        return Err(AppError::has_receipts(
            "Cannot delete this customer: there are receipts associated with them",
        ));
    }

    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Customer not found"));
    }

    Ok(Json(()))
}

fn validate_customer_fields(
    full_name: &str,
    email: Option<&str>,
    cpf: Option<&str>,
) -> Result<(), AppError> {
    require_non_empty("Customer name", full_name)?;
    if let Some(email) = email {
        validate_email(email)?;
    }
    if let Some(cpf) = cpf {
        validate_cpf(cpf)?;
    }
    Ok(())
}
