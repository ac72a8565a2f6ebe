use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/users", post(handlers::register_form))
        .route("/tasks/:user_id/:row_id/toggle", post(handlers::toggle_form))
        .route("/api/catalog", get(handlers::get_catalog))
        .route("/api/users", get(handlers::list_users).post(handlers::register_user))
        .route("/api/users/:user_id/today", get(handlers::get_today))
        .route("/api/users/:user_id/rows/:row_id", post(handlers::set_row))
        .route("/api/users/:user_id/weekly", get(handlers::get_weekly))
        .route("/api/team", get(handlers::get_team))
        .with_state(state)
}
