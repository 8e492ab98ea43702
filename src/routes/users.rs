use axum::{
    routing::{get, put},
    Router,
};
use crate::handlers::user::{
    get_users, get_user, create_user, update_user, update_user_preferences, delete_user
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/preferences", put(update_user_preferences))
}
