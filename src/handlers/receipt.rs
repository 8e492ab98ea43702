// src/handlers/receipt.rs
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::dtos::receipt::{
    CreateReceiptRequest, ExpiringWarrantyResponse, ReceiptItemRequest, ReceiptItemResponse,
    ReceiptListItem, ReceiptResponse, UpdateItemPriceRequest, UpdateReceiptRequest,
};
use crate::error::AppError;
use crate::models::receipt::{
    ExpiringWarrantyRow, Receipt, ReceiptHeaderRow, ReceiptItemDetailRow, ReceiptListRow,
};
use crate::pricing::USED_CONDITION;
use crate::state::AppState;
use crate::validation::{validate_imei, validate_item_condition, validate_payment_method};

const RECEIPT_COLUMNS: &str = "id, customer_id, employee_id, created_by, \
     total_amount::FLOAT8 AS total_amount, payment_method, installments, \
     installment_value::FLOAT8 AS installment_value, warranty_duration_months, \
     warranty_expires_at, created_at";

// ==================== Create ====================

// POST /receipts - receipt and items are written in one transaction; the
// total is computed server-side from the items
#[instrument(skip(state, payload))]
pub async fn create_receipt(
    State(state): State<AppState>,
    Json(payload): Json<CreateReceiptRequest>,
) -> Result<(StatusCode, Json<ReceiptResponse>), AppError> {
    validate_receipt_terms(
        &payload.payment_method,
        payload.installments,
        payload.warranty_duration_months,
    )?;
    if payload.items.is_empty() {
        return Err(AppError::validation("Receipt must contain at least one item"));
    }
    validate_items(&payload.items)?;

    let mut tx = state.db_pool.begin().await?;

    let customer_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(payload.customer_id)
            .fetch_one(&mut *tx)
            .await?;
    if !customer_exists {
        return Err(AppError::not_found("Customer not found"));
    }

    let employee_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(payload.employee_id)
            .fetch_one(&mut *tx)
            .await?;
    if !employee_exists {
        return Err(AppError::not_found("Employee not found"));
    }

    let creator_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(payload.created_by)
            .fetch_one(&mut *tx)
            .await?;
    if !creator_exists {
        return Err(AppError::not_found("Creating user not found"));
    }

    for item in &payload.items {
        let product_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(item.product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !product_exists {
            return Err(AppError::not_found(format!(
                "Product {} not found",
                item.product_id
            )));
        }
    }

    // Invariant: total = sum of price x quantity over the items
    let total_amount: f64 = payload
        .items
        .iter()
        .map(|i| i.price * i.quantity as f64)
        .sum();
    let installment_value = total_amount / payload.installments as f64;

    let receipt_id: i64 = sqlx::query_scalar(
        "INSERT INTO receipts (customer_id, employee_id, created_by, total_amount,
                               payment_method, installments, installment_value,
                               warranty_duration_months, warranty_expires_at)
         VALUES ($1, $2, $3, $4::FLOAT8, $5, $6, $7::FLOAT8, $8, $9)
         RETURNING id",
    )
    .bind(payload.customer_id)
    .bind(payload.employee_id)
    .bind(payload.created_by)
    .bind(total_amount)
    .bind(&payload.payment_method)
    .bind(payload.installments)
    .bind(installment_value)
    .bind(payload.warranty_duration_months)
    .bind(payload.warranty_expires_at)
    .fetch_one(&mut *tx)
    .await?;

    for item in &payload.items {
        sqlx::query(
            "INSERT INTO receipt_items (receipt_id, product_id, quantity, price, imei, condition, manual_cost)
             VALUES ($1, $2, $3, $4::FLOAT8, $5, $6, $7::FLOAT8)",
        )
        .bind(receipt_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.imei)
        .bind(&item.condition)
        .bind(item.manual_cost)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(receipt_id, total_amount, "Receipt created");

    let receipt = fetch_receipt_by_id(&state.db_pool, receipt_id).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

// ==================== Read ====================

// GET /receipts/{id}
#[instrument(skip(state), fields(id))]
pub async fn get_receipt(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ReceiptResponse>, AppError> {
    fetch_receipt_by_id(&state.db_pool, id).await.map(Json)
}

// GET /receipts?q= - filtered by customer name or payment method
#[instrument(skip(state))]
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ReceiptListItem>>, AppError> {
    let q = params.get("q").cloned();

    let rows = sqlx::query_as::<_, ReceiptListRow>(
        "SELECT r.id, c.full_name AS customer_name, e.full_name AS employee_name,
                r.total_amount::FLOAT8 AS total_amount, r.payment_method, r.installments,
                r.installment_value::FLOAT8 AS installment_value,
                r.warranty_duration_months, r.created_at,
                COUNT(ri.id) AS total_items
         FROM receipts r
         JOIN customers c ON r.customer_id = c.id
         JOIN employees e ON r.employee_id = e.id
         LEFT JOIN receipt_items ri ON ri.receipt_id = r.id
         WHERE $1::TEXT IS NULL
            OR c.full_name ILIKE '%' || $1 || '%'
            OR r.payment_method ILIKE '%' || $1 || '%'
         GROUP BY r.id, c.full_name, e.full_name
         ORDER BY r.created_at DESC, r.id DESC",
    )
    .bind(q)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(rows.into_iter().map(ReceiptListItem::from).collect()))
}

// GET /receipts/expiring-warranties?days=30
#[instrument(skip(state))]
pub async fn expiring_warranties(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ExpiringWarrantyResponse>>, AppError> {
    let days = params
        .get("days")
        .map(|d| d.parse::<i32>())
        .transpose()
        .map_err(|_| AppError::validation("days must be a number"))?
        .unwrap_or(30);
    if days < 0 {
        return Err(AppError::validation("days must not be negative"));
    }

    let rows = sqlx::query_as::<_, ExpiringWarrantyRow>(
        "SELECT r.id AS receipt_id, c.id AS customer_id, c.full_name AS customer_name,
                c.phone AS customer_phone, r.warranty_expires_at
         FROM receipts r
         JOIN customers c ON r.customer_id = c.id
         WHERE r.warranty_expires_at IS NOT NULL
           AND r.warranty_expires_at >= CURRENT_DATE
           AND r.warranty_expires_at <= CURRENT_DATE + $1::INT
         ORDER BY r.warranty_expires_at",
    )
    .bind(days)
    .fetch_all(&state.db_pool)
    .await?;

    let today = Utc::now().date_naive();
    Ok(Json(
        rows.into_iter()
            .map(|row| ExpiringWarrantyResponse::from_row(row, today))
            .collect(),
    ))
}

// ==================== Update ====================

// PUT /receipts/{id} - header fields only; items are immutable except price
#[instrument(skip(state, payload), fields(id))]
pub async fn update_receipt(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateReceiptRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    let current = sqlx::query_as::<_, Receipt>(&format!(
        "SELECT {RECEIPT_COLUMNS} FROM receipts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Receipt not found"))?;

    let customer_id = payload.customer_id.unwrap_or(current.customer_id);
    let employee_id = payload.employee_id.unwrap_or(current.employee_id);
    let payment_method = payload.payment_method.unwrap_or(current.payment_method);
    let installments = payload.installments.unwrap_or(current.installments);
    let warranty_duration_months = payload
        .warranty_duration_months
        .or(current.warranty_duration_months);
    let warranty_expires_at = payload.warranty_expires_at.or(current.warranty_expires_at);

    validate_receipt_terms(&payment_method, installments, warranty_duration_months)?;
    // installment value tracks the stored total
    let installment_value = current.total_amount / installments as f64;

    sqlx::query(
        "UPDATE receipts SET
         customer_id = $1, employee_id = $2, payment_method = $3,
         installments = $4, installment_value = $5::FLOAT8,
         warranty_duration_months = $6, warranty_expires_at = $7
         WHERE id = $8",
    )
    .bind(customer_id)
    .bind(employee_id)
    .bind(&payment_method)
    .bind(installments)
    .bind(installment_value)
    .bind(warranty_duration_months)
    .bind(warranty_expires_at)
    .bind(id)
    .execute(&state.db_pool)
    .await?;

    fetch_receipt_by_id(&state.db_pool, id).await.map(Json)
}

// PUT /receipt-items/{id}/price - recomputes the owning receipt's totals so
// the total/items invariant holds
#[instrument(skip(state, payload), fields(id))]
pub async fn update_item_price(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateItemPriceRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    if payload.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }

    let mut tx = state.db_pool.begin().await?;

    let receipt_id: i64 = sqlx::query_scalar(
        "UPDATE receipt_items SET price = $1::FLOAT8 WHERE id = $2 RETURNING receipt_id",
    )
    .bind(payload.price)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Receipt item not found"))?;

    sqlx::query(
        "UPDATE receipts r
         SET total_amount = t.total, installment_value = t.total / r.installments
         FROM (SELECT COALESCE(SUM(price * quantity), 0) AS total
               FROM receipt_items WHERE receipt_id = $1) t
         WHERE r.id = $1",
    )
    .bind(receipt_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    fetch_receipt_by_id(&state.db_pool, receipt_id).await.map(Json)
}

// ==================== Delete ====================

// DELETE /receipts/{id} - items cascade with the receipt
#[instrument(skip(state), fields(id))]
pub async fn delete_receipt(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM receipts WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Receipt not found"));
    }

    Ok(Json(()))
}

// ==================== Helpers ====================

pub async fn fetch_receipt_header(db_pool: &PgPool, id: i64) -> Result<ReceiptHeaderRow, AppError> {
    sqlx::query_as::<_, ReceiptHeaderRow>(
        "SELECT r.id, r.customer_id, c.full_name AS customer_name, c.cpf AS customer_cpf,
                r.employee_id, e.full_name AS employee_name, r.created_by,
                r.total_amount::FLOAT8 AS total_amount, r.payment_method, r.installments,
                r.installment_value::FLOAT8 AS installment_value,
                r.warranty_duration_months, r.warranty_expires_at, r.created_at
         FROM receipts r
         JOIN customers c ON r.customer_id = c.id
         JOIN employees e ON r.employee_id = e.id
         WHERE r.id = $1",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Receipt not found"))
}

pub async fn fetch_receipt_by_id(db_pool: &PgPool, id: i64) -> Result<ReceiptResponse, AppError> {
    let header = fetch_receipt_header(db_pool, id).await?;
    let items = fetch_receipt_items(db_pool, id).await?;

    Ok(ReceiptResponse {
        id: header.id,
        customer_id: header.customer_id,
        customer_name: header.customer_name,
        employee_id: header.employee_id,
        employee_name: header.employee_name,
        created_by: header.created_by,
        total_amount: header.total_amount,
        payment_method: header.payment_method,
        installments: header.installments,
        installment_value: header.installment_value,
        warranty_duration_months: header.warranty_duration_months,
        warranty_expires_at: header.warranty_expires_at,
        created_at: header.created_at.to_rfc3339(),
        items: items.into_iter().map(ReceiptItemResponse::from).collect(),
    })
}

pub async fn fetch_receipt_items(
    db_pool: &PgPool,
    receipt_id: i64,
) -> Result<Vec<ReceiptItemDetailRow>, AppError> {
    let items = sqlx::query_as::<_, ReceiptItemDetailRow>(
        "SELECT ri.id, ri.product_id, ri.quantity,
                ri.price::FLOAT8 AS price, ri.imei, ri.condition,
                ri.manual_cost::FLOAT8 AS manual_cost,
                p.name AS product_name, p.code AS product_code
         FROM receipt_items ri
         LEFT JOIN products p ON ri.product_id = p.id
         WHERE ri.receipt_id = $1
         ORDER BY ri.id",
    )
    .bind(receipt_id)
    .fetch_all(db_pool)
    .await?;

    Ok(items)
}

fn validate_receipt_terms(
    payment_method: &str,
    installments: i32,
    warranty_duration_months: Option<i32>,
) -> Result<(), AppError> {
    validate_payment_method(payment_method)?;
    if installments < 1 {
        return Err(AppError::validation("Installments must be at least 1"));
    }
    if let Some(months) = warranty_duration_months {
        if months < 0 {
            return Err(AppError::validation(
                "Warranty duration cannot be negative",
            ));
        }
    }
    Ok(())
}

fn validate_items(items: &[ReceiptItemRequest]) -> Result<(), AppError> {
    for item in items {
        if item.quantity <= 0 {
            return Err(AppError::validation("Item quantity must be greater than 0"));
        }
        if item.price < 0.0 {
            return Err(AppError::validation("Item price cannot be negative"));
        }
        validate_item_condition(&item.condition)?;

        // Used items carry their own cost; new items price off the catalog
        if item.condition == USED_CONDITION {
            match item.manual_cost {
                None => {
                    return Err(AppError::validation(
                        "A used item must carry a manual cost",
                    ))
                }
                Some(cost) if cost < 0.0 => {
                    return Err(AppError::validation("Manual cost cannot be negative"))
                }
                Some(_) => {}
            }
        } else if item.manual_cost.is_some() {
            return Err(AppError::validation(
                "A new item must not carry a manual cost",
            ));
        }

        if let Some(imei) = &item.imei {
            validate_imei(imei)?;
        }
    }
    Ok(())
}
