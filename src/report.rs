// src/report.rs
//! Sales report aggregation.
//!
//! Operates on receipts (with their items) already fetched for the period
//! plus the current product catalog; a single pass accumulates totals,
//! per-payment-method sums, per-product quantities, warranty averages and
//! cost/profit. Pure so the properties can be tested without a database.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::dtos::report::{ReportResponse, TopProductEntry};
use crate::format::{payment_method_label, period_label};
use crate::models::product::Product;
use crate::models::receipt::{Receipt, ReceiptItem};
use crate::pricing;

pub const TOP_PRODUCTS_LIMIT: usize = 10;
pub const REMOVED_PRODUCT_NAME: &str = "Removed product";

pub struct GeneratedReport {
    pub report: ReportResponse,
    /// Product ids referenced by items in range that no longer exist in the
    /// catalog; their lines were costed at zero.
    pub orphaned_product_ids: Vec<i64>,
}

pub fn build_report(
    start: NaiveDate,
    end: NaiveDate,
    receipts: &[(Receipt, Vec<ReceiptItem>)],
    products: &HashMap<i64, Product>,
) -> GeneratedReport {
    let mut total_amount = 0.0;
    let mut payment_method_totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut product_stats: HashMap<i64, (i64, f64)> = HashMap::new();
    let mut total_warranty_months: i64 = 0;
    let mut total_cost = 0.0;
    let mut total_profit = 0.0;
    let mut orphaned: Vec<i64> = Vec::new();

    for (receipt, items) in receipts {
        let sale_value: f64 = items.iter().map(pricing::item_sale).sum();
        total_amount += sale_value;

        *payment_method_totals
            .entry(payment_method_label(&receipt.payment_method))
            .or_insert(0.0) += sale_value;

        total_warranty_months += receipt.warranty_duration_months.unwrap_or(0) as i64;

        for item in items {
            let stats = product_stats.entry(item.product_id).or_insert((0, 0.0));
            stats.0 += item.quantity as i64;
            stats.1 += pricing::item_sale(item);

            if !products.contains_key(&item.product_id) && !orphaned.contains(&item.product_id) {
                orphaned.push(item.product_id);
            }

            // Profit accumulated per item, not derived from the aggregates
            total_cost += pricing::item_cost(item, products);
            total_profit += pricing::item_profit(item, products);
        }
    }

    let mut top_products: Vec<TopProductEntry> = product_stats
        .into_iter()
        .map(|(product_id, (quantity, total))| TopProductEntry {
            product_id,
            name: products
                .get(&product_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| REMOVED_PRODUCT_NAME.to_string()),
            quantity,
            total,
        })
        .collect();
    top_products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    let average_warranty_months = if receipts.is_empty() {
        0.0
    } else {
        total_warranty_months as f64 / receipts.len() as f64
    };

    orphaned.sort_unstable();

    GeneratedReport {
        report: ReportResponse {
            period: period_label(start, end),
            total_receipts: receipts.len() as i64,
            total_amount,
            payment_method_totals,
            top_products,
            average_warranty_months,
            total_cost,
            total_profit,
        },
        orphaned_product_ids: orphaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    fn product(id: i64, name: &str, default_price: f64) -> Product {
        Product {
            id,
            name: name.to_string(),
            code: format!("P{:03}", id),
            memory: None,
            color: None,
            default_price,
            created_at: Utc::now(),
        }
    }

    fn receipt(id: i64, payment_method: &str, warranty_months: Option<i32>) -> Receipt {
        Receipt {
            id,
            customer_id: 1,
            employee_id: 1,
            created_by: 1,
            total_amount: 0.0,
            payment_method: payment_method.to_string(),
            installments: 1,
            installment_value: 0.0,
            warranty_duration_months: warranty_months,
            warranty_expires_at: None,
            created_at: Utc::now(),
        }
    }

    fn item(product_id: i64, quantity: i32, price: f64) -> ReceiptItem {
        ReceiptItem {
            id: 0,
            receipt_id: 0,
            product_id,
            quantity,
            price,
            imei: None,
            condition: "new".to_string(),
            manual_cost: None,
        }
    }

    fn used_item(product_id: i64, quantity: i32, price: f64, manual_cost: f64) -> ReceiptItem {
        ReceiptItem {
            condition: "used".to_string(),
            manual_cost: Some(manual_cost),
            ..item(product_id, quantity, price)
        }
    }

    #[test]
    fn empty_range_produces_zeroed_report() {
        let (start, end) = range();
        let generated = build_report(start, end, &[], &HashMap::new());
        let report = generated.report;

        assert_eq!(report.period, "01/01/2024 - 31/01/2024");
        assert_eq!(report.total_receipts, 0);
        assert_eq!(report.total_amount, 0.0);
        assert_eq!(report.average_warranty_months, 0.0);
        assert!(report.payment_method_totals.is_empty());
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn payment_method_totals_accumulate_per_receipt() {
        let (start, end) = range();
        let products = HashMap::from([(1, product(1, "Handset", 50.0))]);
        let receipts = vec![
            (receipt(1, "cash", None), vec![item(1, 1, 100.0)]),
            (receipt(2, "cash", None), vec![item(1, 2, 100.0)]),
            (receipt(3, "pix", None), vec![item(1, 1, 50.0)]),
        ];

        let report = build_report(start, end, &receipts, &products).report;

        assert_eq!(report.total_amount, 350.0);
        assert_eq!(report.payment_method_totals.get("Cash"), Some(&300.0));
        assert_eq!(report.payment_method_totals.get("PIX"), Some(&50.0));
    }

    #[test]
    fn total_amount_is_sum_of_item_lines() {
        let (start, end) = range();
        let products = HashMap::from([(1, product(1, "A", 10.0)), (2, product(2, "B", 20.0))]);
        let receipts = vec![(
            receipt(1, "cash", None),
            vec![item(1, 3, 25.0), item(2, 2, 40.0)],
        )];

        let report = build_report(start, end, &receipts, &products).report;

        assert_eq!(report.total_amount, 3.0 * 25.0 + 2.0 * 40.0);
    }

    #[test]
    fn average_warranty_treats_null_as_zero() {
        let (start, end) = range();
        let receipts = vec![
            (receipt(1, "cash", Some(12)), vec![]),
            (receipt(2, "cash", None), vec![]),
            (receipt(3, "cash", Some(6)), vec![]),
        ];

        let report = build_report(start, end, &receipts, &HashMap::new()).report;

        assert_eq!(report.average_warranty_months, 6.0);
    }

    #[test]
    fn top_products_sorted_and_truncated() {
        let (start, end) = range();
        let mut products = HashMap::new();
        let mut items = Vec::new();
        for id in 1..=12 {
            products.insert(id, product(id, &format!("Product {}", id), 1.0));
            // product N sells N units
            items.push(item(id, id as i32, 10.0));
        }
        let receipts = vec![(receipt(1, "cash", None), items)];

        let report = build_report(start, end, &receipts, &products).report;

        assert_eq!(report.top_products.len(), TOP_PRODUCTS_LIMIT);
        assert_eq!(report.top_products[0].quantity, 12);
        assert_eq!(report.top_products[0].name, "Product 12");
        for pair in report.top_products.windows(2) {
            assert!(pair[0].quantity >= pair[1].quantity);
        }
        // products 1 and 2 fell off the top 10
        assert!(report.top_products.iter().all(|p| p.product_id > 2));
    }

    #[test]
    fn top_products_shorter_than_limit_when_few_distinct() {
        let (start, end) = range();
        let products = HashMap::from([(1, product(1, "A", 1.0)), (2, product(2, "B", 1.0))]);
        let receipts = vec![(
            receipt(1, "cash", None),
            vec![item(1, 1, 10.0), item(2, 5, 10.0), item(1, 2, 10.0)],
        )];

        let report = build_report(start, end, &receipts, &products).report;

        assert_eq!(report.top_products.len(), 2);
        assert_eq!(report.top_products[0].product_id, 2);
        assert_eq!(report.top_products[1].quantity, 3);
    }

    #[test]
    fn removed_product_gets_placeholder_and_zero_cost() {
        let (start, end) = range();
        let receipts = vec![(receipt(1, "cash", None), vec![item(99, 2, 120.0)])];

        let generated = build_report(start, end, &receipts, &HashMap::new());

        assert_eq!(generated.orphaned_product_ids, vec![99]);
        assert_eq!(generated.report.top_products[0].name, REMOVED_PRODUCT_NAME);
        assert_eq!(generated.report.total_cost, 0.0);
        assert_eq!(generated.report.total_profit, 240.0);
    }

    #[test]
    fn cost_and_profit_accumulate_per_item() {
        let (start, end) = range();
        let products = HashMap::from([(1, product(1, "A", 100.0)), (2, product(2, "B", 30.0))]);
        let receipts = vec![(
            receipt(1, "cash", None),
            vec![
                // used: manual cost 80 x 2 = 160, sale 300, profit 140
                used_item(1, 2, 150.0, 80.0),
                // new: default price 30 x 1 = 30, sale 50, profit 20
                item(2, 1, 50.0),
            ],
        )];

        let report = build_report(start, end, &receipts, &products).report;

        assert_eq!(report.total_cost, 190.0);
        assert_eq!(report.total_profit, 160.0);
        assert_eq!(report.total_amount, 350.0);
    }
}
