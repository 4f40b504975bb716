pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::delivery::handlers as delivery;
use crate::outreach::handlers as outreach;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Outreach generation
        .route("/llm/generate-email", post(outreach::handle_generate_email))
        .route(
            "/llm/regenerate-email",
            post(outreach::handle_regenerate_email),
        )
        // Delivery
        .route("/email/send", post(delivery::handle_send_email))
        .with_state(state)
}
