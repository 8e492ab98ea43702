use axum::{
    routing::{get, put},
    Router,
};
use crate::handlers::document::receipt_document;
use crate::handlers::receipt::{
    create_receipt, delete_receipt, expiring_warranties, get_receipt, list_receipts,
    update_item_price, update_receipt,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/receipts", get(list_receipts).post(create_receipt))
        .route("/receipts/expiring-warranties", get(expiring_warranties))
        .route("/receipts/{id}", get(get_receipt).put(update_receipt).delete(delete_receipt))
        .route("/receipts/{id}/document", get(receipt_document))
        .route("/receipt-items/{id}/price", put(update_item_price))
}
