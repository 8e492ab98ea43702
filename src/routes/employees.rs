use axum::{
    routing::get,
    Router,
};
use crate::handlers::employee::{
    get_employees, get_employee, create_employee, update_employee, delete_employee
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(get_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).put(update_employee).delete(delete_employee))
}
