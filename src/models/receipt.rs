use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub customer_id: i64,
    pub employee_id: i64,
    pub created_by: i64,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub installment_value: f64,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ReceiptItem {
    pub id: i64,
    pub receipt_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub imei: Option<String>,
    pub condition: String,
    pub manual_cost: Option<f64>,
}

/// Receipt item joined with its product; product columns are null when
/// the product was hard-deleted.
#[derive(Debug, FromRow)]
pub struct ReceiptItemDetailRow {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub imei: Option<String>,
    pub condition: String,
    pub manual_cost: Option<f64>,
    pub product_name: Option<String>,
    pub product_code: Option<String>,
}

/// Receipt header joined with customer and employee names.
#[derive(Debug, FromRow)]
pub struct ReceiptHeaderRow {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_cpf: Option<String>,
    pub employee_id: i64,
    pub employee_name: String,
    pub created_by: i64,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub installment_value: f64,
    pub warranty_duration_months: Option<i32>,
    pub warranty_expires_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ReceiptListRow {
    pub id: i64,
    pub customer_name: String,
    pub employee_name: String,
    pub total_amount: f64,
    pub payment_method: String,
    pub installments: i32,
    pub installment_value: f64,
    pub warranty_duration_months: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub total_items: i64,
}

#[derive(Debug, FromRow)]
pub struct ExpiringWarrantyRow {
    pub receipt_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub warranty_expires_at: NaiveDate,
}
