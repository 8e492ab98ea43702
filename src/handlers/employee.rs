// src/handlers/employee.rs
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::instrument;

use crate::dtos::employee::{CreateEmployeeRequest, EmployeeResponse, UpdateEmployeeRequest};
use crate::error::AppError;
use crate::models::employee::Employee;
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_role};

const EMPLOYEE_COLUMNS: &str = "id, full_name, whatsapp, age, role, created_at";

// GET /employees?q=
#[instrument(skip(state))]
pub async fn get_employees(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<EmployeeResponse>>, AppError> {
    let q = params.get("q").cloned();

    let employees = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees
         WHERE $1::TEXT IS NULL
            OR full_name ILIKE '%' || $1 || '%'
            OR whatsapp ILIKE '%' || $1 || '%'
         ORDER BY full_name"
    ))
    .bind(q)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(employees.into_iter().map(EmployeeResponse::from).collect()))
}

// GET /employees/{id}
#[instrument(skip(state), fields(id))]
pub async fn get_employee(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<EmployeeResponse>, AppError> {
    let employee = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(Json(EmployeeResponse::from(employee)))
}

// POST /employees
#[instrument(skip(state, payload))]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    require_non_empty("Employee name", &payload.full_name)?;
    require_non_empty("Employee contact number", &payload.whatsapp)?;
    validate_role(&payload.role)?;
    if payload.age <= 0 {
        return Err(AppError::validation("Employee age must be greater than 0"));
    }

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "INSERT INTO employees (full_name, whatsapp, age, role)
         VALUES ($1, $2, $3, $4)
         RETURNING {EMPLOYEE_COLUMNS}"
    ))
    .bind(&payload.full_name)
    .bind(&payload.whatsapp)
    .bind(payload.age)
    .bind(&payload.role)
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(EmployeeResponse::from(employee)))
}

// PUT /employees/{id}
#[instrument(skip(state, payload), fields(id))]
pub async fn update_employee(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    if let Some(full_name) = &payload.full_name {
        require_non_empty("Employee name", full_name)?;
    }
    if let Some(role) = &payload.role {
        validate_role(role)?;
    }
    if let Some(age) = payload.age {
        if age <= 0 {
            return Err(AppError::validation("Employee age must be greater than 0"));
        }
    }

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET
         full_name = COALESCE($1, full_name),
         whatsapp = COALESCE($2, whatsapp),
         age = COALESCE($3, age),
         role = COALESCE($4, role)
         WHERE id = $5
         RETURNING {EMPLOYEE_COLUMNS}"
    ))
    .bind(payload.full_name)
    .bind(payload.whatsapp)
    .bind(payload.age)
    .bind(payload.role)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Employee not found"))?;

    Ok(Json(EmployeeResponse::from(employee)))
}

// DELETE /employees/{id}
#[instrument(skip(state), fields(id))]
pub async fn delete_employee(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Employee not found"));
    }

    Ok(Json(()))
}
