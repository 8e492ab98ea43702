// src/dtos/report.rs
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TopProductEntry {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub period: String,
    pub total_receipts: i64,
    pub total_amount: f64,
    pub payment_method_totals: BTreeMap<String, f64>,
    pub top_products: Vec<TopProductEntry>,
    pub average_warranty_months: f64,
    pub total_cost: f64,
    pub total_profit: f64,
}
