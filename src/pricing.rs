// src/pricing.rs
//! Cost and profit resolution for receipt line items.
//!
//! Used-condition items carry a manually entered cost; new-condition items
//! cost the product's default price at calculation time. A missing product
//! resolves to zero cost (the report layer logs the occurrence).

use std::collections::HashMap;

use crate::models::product::Product;
use crate::models::receipt::ReceiptItem;

pub const USED_CONDITION: &str = "used";

/// Sale value of a line: price x quantity.
pub fn item_sale(item: &ReceiptItem) -> f64 {
    item.price * item.quantity as f64
}

/// Cost basis of a line. Never fails: unknown products cost zero.
pub fn item_cost(item: &ReceiptItem, products: &HashMap<i64, Product>) -> f64 {
    let quantity = item.quantity as f64;

    if item.condition == USED_CONDITION {
        if let Some(manual_cost) = item.manual_cost {
            return manual_cost * quantity;
        }
    }

    products
        .get(&item.product_id)
        .map(|product| product.default_price * quantity)
        .unwrap_or(0.0)
}

pub fn item_profit(item: &ReceiptItem, products: &HashMap<i64, Product>) -> f64 {
    item_sale(item) - item_cost(item, products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, default_price: f64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            code: format!("P{:03}", id),
            memory: None,
            color: None,
            default_price,
            created_at: Utc::now(),
        }
    }

    fn item(product_id: i64, quantity: i32, price: f64, condition: &str, manual_cost: Option<f64>) -> ReceiptItem {
        ReceiptItem {
            id: 1,
            receipt_id: 1,
            product_id,
            quantity,
            price,
            imei: None,
            condition: condition.to_string(),
            manual_cost,
        }
    }

    #[test]
    fn used_item_uses_manual_cost() {
        let products = HashMap::from([(1, product(1, 500.0))]);
        let used = item(1, 2, 150.0, "used", Some(80.0));

        assert_eq!(item_cost(&used, &products), 160.0);
        assert_eq!(item_profit(&used, &products), 140.0);
    }

    #[test]
    fn new_item_uses_product_default_price() {
        let products = HashMap::from([(1, product(1, 90.0))]);
        let new = item(1, 3, 120.0, "new", None);

        assert_eq!(item_cost(&new, &products), 270.0);
        assert_eq!(item_profit(&new, &products), 360.0 - 270.0);
    }

    #[test]
    fn used_item_without_manual_cost_falls_back_to_product() {
        let products = HashMap::from([(1, product(1, 90.0))]);
        let used = item(1, 2, 120.0, "used", None);

        assert_eq!(item_cost(&used, &products), 180.0);
    }

    #[test]
    fn missing_product_costs_zero() {
        let products = HashMap::new();
        let new = item(42, 2, 120.0, "new", None);

        assert_eq!(item_cost(&new, &products), 0.0);
        assert_eq!(item_profit(&new, &products), 240.0);
    }
}
