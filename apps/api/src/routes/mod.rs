pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/career-assessment",
            post(handlers::handle_career_assessment),
        )
        .route("/reveal-answer", post(handlers::handle_reveal_answer))
        .fallback(not_found)
        .with_state(state)
}
