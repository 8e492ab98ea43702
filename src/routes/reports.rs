use axum::{
    routing::get,
    Router,
};
use crate::handlers::report::{generate_report, export_report};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(generate_report))
        .route("/reports/export", get(export_report))
}
