pub mod customers;
pub mod employees;
pub mod products;
pub mod receipts;
pub mod reports;
pub mod users;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(customers::routes())
        .merge(products::routes())
        .merge(employees::routes())
        .merge(users::routes())
        .merge(receipts::routes())
        .merge(reports::routes())
}
