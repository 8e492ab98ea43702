// src/excel.rs
//! Two-sheet report workbook: "Summary" (period, totals, payment-method
//! breakdown) and "Products" (top sellers by quantity).

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::dtos::report::ReportResponse;
use crate::format::format_currency;

pub fn report_workbook(report: &ReportResponse) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    summary.set_column_width(0, 32)?;
    summary.set_column_width(1, 22)?;

    summary.write_string_with_format(0, 0, "Sales Report", &bold)?;
    summary.write_string(1, 0, "Period:")?;
    summary.write_string(1, 1, report.period.as_str())?;

    summary.write_string(3, 0, "Total receipts:")?;
    summary.write_number(3, 1, report.total_receipts as f64)?;
    summary.write_string(4, 0, "Total amount:")?;
    summary.write_string(4, 1, format_currency(report.total_amount))?;
    summary.write_string(5, 0, "Average warranty (months):")?;
    summary.write_string(5, 1, format!("{:.1}", report.average_warranty_months))?;
    summary.write_string(6, 0, "Total cost:")?;
    summary.write_string(6, 1, format_currency(report.total_cost))?;
    summary.write_string(7, 0, "Total profit:")?;
    summary.write_string(7, 1, format_currency(report.total_profit))?;

    summary.write_string_with_format(9, 0, "Sales by payment method", &bold)?;
    summary.write_string_with_format(10, 0, "Payment method", &bold)?;
    summary.write_string_with_format(10, 1, "Total amount", &bold)?;
    let mut row = 11;
    for (method, total) in &report.payment_method_totals {
        summary.write_string(row, 0, method.as_str())?;
        summary.write_string(row, 1, format_currency(*total))?;
        row += 1;
    }

    let products = workbook.add_worksheet();
    products.set_name("Products")?;
    products.set_column_width(0, 40)?;
    products.set_column_width(1, 12)?;
    products.set_column_width(2, 22)?;

    products.write_string_with_format(0, 0, "Top 10 best-selling products", &bold)?;
    products.write_string_with_format(1, 0, "Product", &bold)?;
    products.write_string_with_format(1, 1, "Quantity", &bold)?;
    products.write_string_with_format(1, 2, "Total amount", &bold)?;
    for (i, entry) in report.top_products.iter().enumerate() {
        let row = 2 + i as u32;
        products.write_string(row, 0, entry.name.as_str())?;
        products.write_number(row, 1, entry.quantity as f64)?;
        products.write_string(row, 2, format_currency(entry.total))?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::dtos::report::TopProductEntry;

    fn sample_report() -> ReportResponse {
        ReportResponse {
            period: "01/01/2024 - 31/01/2024".to_string(),
            total_receipts: 3,
            total_amount: 350.0,
            payment_method_totals: BTreeMap::from([
                ("Cash".to_string(), 300.0),
                ("PIX".to_string(), 50.0),
            ]),
            top_products: vec![TopProductEntry {
                product_id: 1,
                name: "Handset".to_string(),
                quantity: 4,
                total: 350.0,
            }],
            average_warranty_months: 6.0,
            total_cost: 190.0,
            total_profit: 160.0,
        }
    }

    #[test]
    fn workbook_builds() {
        let bytes = report_workbook(&sample_report()).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn empty_report_builds() {
        let report = ReportResponse {
            period: "01/01/2024 - 31/01/2024".to_string(),
            total_receipts: 0,
            total_amount: 0.0,
            payment_method_totals: BTreeMap::new(),
            top_products: Vec::new(),
            average_warranty_months: 0.0,
            total_cost: 0.0,
            total_profit: 0.0,
        };
        assert!(!report_workbook(&report).unwrap().is_empty());
    }
}
