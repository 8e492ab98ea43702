// src/handlers/report.rs
use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveTime;
use tracing::{error, info, instrument, warn};

use crate::dtos::report::{ReportQuery, ReportResponse};
use crate::error::AppError;
use crate::excel;
use crate::models::product::Product;
use crate::models::receipt::{Receipt, ReceiptItem};
use crate::report::{self, GeneratedReport};
use crate::state::AppState;

// GET /reports?start_date=...&end_date=... - aggregated sales report for an
// inclusive range of UTC calendar days
#[instrument(skip(state))]
pub async fn generate_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    let generated = run_report(&state, &query).await?;
    Ok(Json(generated.report))
}

// GET /reports/export - same aggregation as a two-sheet workbook download
#[instrument(skip(state))]
pub async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let generated = run_report(&state, &query).await?;

    let bytes = excel::report_workbook(&generated.report)
        .map_err(|e| AppError::report(format!("Failed to build report workbook: {e}")))?;

    let filename = format!(
        "report-{}-{}.xlsx",
        query.start_date.format("%d-%m-%Y"),
        query.end_date.format("%d-%m-%Y")
    );
    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, bytes))
}

// Fetches the range and the catalog, then aggregates. Any fetch failure is
// fatal to the whole report; nothing partial is returned.
async fn run_report(state: &AppState, query: &ReportQuery) -> Result<GeneratedReport, AppError> {
    if query.start_date > query.end_date {
        return Err(AppError::validation(format!(
            "start_date ({}) must be before or equal to end_date ({})",
            query.start_date, query.end_date
        )));
    }

    let window_start = query.start_date.and_time(NaiveTime::MIN).and_utc();
    let window_end = query
        .end_date
        .succ_opt()
        .ok_or_else(|| AppError::validation("end_date is out of range"))?
        .and_time(NaiveTime::MIN)
        .and_utc();

    info!(start = %query.start_date, end = %query.end_date, "Generating sales report");

    let receipts = sqlx::query_as::<_, Receipt>(
        "SELECT id, customer_id, employee_id, created_by,
                total_amount::FLOAT8 AS total_amount, payment_method, installments,
                installment_value::FLOAT8 AS installment_value,
                warranty_duration_months, warranty_expires_at, created_at
         FROM receipts
         WHERE created_at >= $1 AND created_at < $2
         ORDER BY created_at",
    )
    .bind(window_start)
    .bind(window_end)
    .fetch_all(&state.db_pool)
    .await
    .map_err(|e| {
        error!(?e, "Failed to fetch receipts for report");
        AppError::report("Report generation failed: could not fetch receipts")
    })?;

    let items = sqlx::query_as::<_, ReceiptItem>(
        "SELECT ri.id, ri.receipt_id, ri.product_id, ri.quantity,
                ri.price::FLOAT8 AS price, ri.imei, ri.condition,
                ri.manual_cost::FLOAT8 AS manual_cost
         FROM receipt_items ri
         JOIN receipts r ON ri.receipt_id = r.id
         WHERE r.created_at >= $1 AND r.created_at < $2
         ORDER BY ri.id",
    )
    .bind(window_start)
    .bind(window_end)
    .fetch_all(&state.db_pool)
    .await
    .map_err(|e| {
        error!(?e, "Failed to fetch receipt items for report");
        AppError::report("Report generation failed: could not fetch receipt items")
    })?;

    let catalog = sqlx::query_as::<_, Product>(
        "SELECT id, name, code, memory, color,
                default_price::FLOAT8 AS default_price, created_at
         FROM products",
    )
    .fetch_all(&state.db_pool)
    .await
    .map_err(|e| {
        error!(?e, "Failed to fetch product catalog for report");
        AppError::report("Report generation failed: could not fetch products")
    })?;

    let mut items_by_receipt: HashMap<i64, Vec<ReceiptItem>> = HashMap::new();
    for item in items {
        items_by_receipt.entry(item.receipt_id).or_default().push(item);
    }
    let receipts_with_items: Vec<(Receipt, Vec<ReceiptItem>)> = receipts
        .into_iter()
        .map(|receipt| {
            let items = items_by_receipt.remove(&receipt.id).unwrap_or_default();
            (receipt, items)
        })
        .collect();
    let products: HashMap<i64, Product> = catalog.into_iter().map(|p| (p.id, p)).collect();

    let generated = report::build_report(
        query.start_date,
        query.end_date,
        &receipts_with_items,
        &products,
    );

    if !generated.orphaned_product_ids.is_empty() {
        // removed products are costed at zero, which understates total cost
        warn!(
            product_ids = ?generated.orphaned_product_ids,
            "Report range references products that no longer exist"
        );
    }
    if receipts_with_items.is_empty() {
        warn!(start = %query.start_date, end = %query.end_date, "Empty sales report generated");
    } else {
        info!(
            receipts = receipts_with_items.len(),
            total_amount = generated.report.total_amount,
            "Sales report generated"
        );
    }

    Ok(generated)
}
