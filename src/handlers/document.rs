// src/handlers/document.rs
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::format::payment_method_label;
use crate::handlers::receipt::{fetch_receipt_header, fetch_receipt_items};
use crate::pdf::{self, DocumentItem, ReceiptDocumentData};
use crate::report::REMOVED_PRODUCT_NAME;
use crate::state::AppState;

// GET /receipts/{id}/document - composes the printable receipt PDF with the
// warranty terms appended and streams it as a download
#[instrument(skip(state), fields(id))]
pub async fn receipt_document(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = fetch_receipt_header(&state.db_pool, id).await?;
    let items = fetch_receipt_items(&state.db_pool, id).await?;

    let receipt_number = next_receipt_number(&state.db_pool).await?;

    // The warranty terms are mandatory: failing to load them aborts the
    // whole composition. The logo is a cosmetic extra and only warns.
    let warranty_terms = tokio::fs::read(&state.config.warranty_terms_path)
        .await
        .map_err(|e| {
            AppError::document(format!(
                "Failed to load warranty terms document '{}': {e}",
                state.config.warranty_terms_path.display()
            ))
        })?;

    let logo = match &state.config.logo_path {
        Some(path) => match tokio::fs::read(path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(?e, path = %path.display(), "Failed to load company logo, using text-only layout");
                None
            }
        },
        None => None,
    };

    let issued_on = receipt.created_at.date_naive();
    let data = ReceiptDocumentData {
        receipt_number,
        customer_name: receipt.customer_name.clone(),
        customer_cpf: receipt.customer_cpf,
        employee_name: receipt.employee_name,
        issued_on,
        payment_method_label: payment_method_label(&receipt.payment_method),
        installments: receipt.installments,
        installment_value: receipt.installment_value,
        total_amount: receipt.total_amount,
        warranty_duration_months: receipt.warranty_duration_months,
        warranty_expires_at: receipt.warranty_expires_at,
        items: items
            .into_iter()
            .map(|row| DocumentItem {
                name: row
                    .product_name
                    .unwrap_or_else(|| REMOVED_PRODUCT_NAME.to_string()),
                imei: row.imei,
                quantity: row.quantity,
                price: row.price,
            })
            .collect(),
    };

    let bytes = pdf::compose_receipt_document(
        &data,
        &state.config.company,
        logo.as_deref(),
        &warranty_terms,
    )?;
    let filename = pdf::document_file_name(&receipt.customer_name, issued_on);
    info!(receipt_id = id, receipt_number, filename = %filename, "Receipt document composed");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, bytes))
}

// Single authoritative sequence, atomically read-and-incremented; the row
// is seeded by the migrations.
async fn next_receipt_number(db_pool: &PgPool) -> Result<i64, AppError> {
    sqlx::query_scalar(
        "UPDATE counters SET value = value + 1 WHERE name = 'receipt_document' RETURNING value",
    )
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::document("Receipt counter row is missing"))
}
