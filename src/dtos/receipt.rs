// src/dtos/receipt.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::receipt::{ExpiringWarrantyRow, ReceiptItemDetailRow, ReceiptListRow};
use crate::report::REMOVED_PRODUCT_NAME;

#[derive(Debug, Deserialize)]
pub struct CreateReceiptRequest {
    pub customer_id: i64,
    pub employee_id: i64,
    pub created_by: i64,
    pub payment_method: String,
    #[serde(default = "default_installments")]
    pub installments: i32,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
    pub items: Vec<ReceiptItemRequest>,
}

fn default_installments() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ReceiptItemRequest {
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub imei: Option<String>,
    #[serde(default = "default_condition")]
    pub condition: String,
    pub manual_cost: Option<f64>,
}

fn default_condition() -> String {
    "new".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateReceiptRequest {
    pub customer_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub payment_method: Option<String>,
    pub installments: Option<i32>,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemPriceRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub created_by: i64,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub installment_value: f64,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
    pub created_at: String,
    pub items: Vec<ReceiptItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_code: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub line_total: f64,
    pub imei: Option<String>,
    pub condition: String,
    pub manual_cost: Option<f64>,
}

impl From<ReceiptItemDetailRow> for ReceiptItemResponse {
    fn from(row: ReceiptItemDetailRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row
                .product_name
                .unwrap_or_else(|| REMOVED_PRODUCT_NAME.to_string()),
            product_code: row.product_code,
            quantity: row.quantity,
            price: row.price,
            line_total: row.price * row.quantity as f64,
            imei: row.imei,
            condition: row.condition,
            manual_cost: row.manual_cost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptListItem {
    pub id: i64,
    pub customer_name: String,
    pub employee_name: String,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub installment_value: f64,
    pub warranty_duration_months: Option<i32>,
    pub created_at: String,
    pub total_items: i64,
}

impl From<ReceiptListRow> for ReceiptListItem {
    fn from(row: ReceiptListRow) -> Self {
        Self {
            id: row.id,
            customer_name: row.customer_name,
            employee_name: row.employee_name,
            total_amount: row.total_amount,
            payment_method: row.payment_method,
            installments: row.installments,
            installment_value: row.installment_value,
            warranty_duration_months: row.warranty_duration_months,
            created_at: row.created_at.to_rfc3339(),
            total_items: row.total_items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpiringWarrantyResponse {
    pub receipt_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub warranty_expires_at: NaiveDate,
    pub days_remaining: i64,
}

impl ExpiringWarrantyResponse {
    pub fn from_row(row: ExpiringWarrantyRow, today: NaiveDate) -> Self {
        Self {
            receipt_id: row.receipt_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            warranty_expires_at: row.warranty_expires_at,
            days_remaining: (row.warranty_expires_at - today).num_days(),
        }
    }
}
