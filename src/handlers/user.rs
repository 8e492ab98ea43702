// src/handlers/user.rs
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use crate::dtos::user::{CreateUserRequest, UpdateUserRequest, UserPreferences, UserResponse};
use crate::error::AppError;
use crate::handlers::map_unique_violation;
use crate::models::user::User;
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_email, validate_role};

// preferences is JSONB; read and written through text casts
const USER_COLUMNS: &str = "id, email, name, role, preferences::TEXT AS preferences, created_at";

// GET /users
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY name"
    ))
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// GET /users/{id}
#[instrument(skip(state), fields(id))]
pub async fn get_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// POST /users
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    require_non_empty("User name", &payload.name)?;
    validate_email(&payload.email)?;
    validate_role(&payload.role)?;

    let preferences = payload.preferences.unwrap_or_default();
    let preferences_json = serde_json::to_string(&preferences)
        .map_err(|e| AppError::validation(format!("Invalid preferences: {e}")))?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, name, role, preferences)
         VALUES ($1, $2, $3, $4::JSONB)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&payload.email)
    .bind(&payload.name)
    .bind(&payload.role)
    .bind(&preferences_json)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A user with this email already exists"))?;

    Ok(Json(UserResponse::from(user)))
}

// PUT /users/{id}
#[instrument(skip(state, payload), fields(id))]
pub async fn update_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(name) = &payload.name {
        require_non_empty("User name", name)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(role) = &payload.role {
        validate_role(role)?;
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
         email = COALESCE($1, email),
         name = COALESCE($2, name),
         role = COALESCE($3, role)
         WHERE id = $4
         RETURNING {USER_COLUMNS}"
    ))
    .bind(payload.email)
    .bind(payload.name)
    .bind(payload.role)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "A user with this email already exists"))?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// PUT /users/{id}/preferences - replaces the whole typed structure
#[instrument(skip(state, payload), fields(id))]
pub async fn update_user_preferences(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UserPreferences>,
) -> Result<Json<UserResponse>, AppError> {
    let preferences_json = serde_json::to_string(&payload)
        .map_err(|e| AppError::validation(format!("Invalid preferences: {e}")))?;

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET preferences = $1::JSONB WHERE id = $2
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&preferences_json)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(user)))
}

// DELETE /users/{id}
#[instrument(skip(state), fields(id))]
pub async fn delete_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(()))
}
