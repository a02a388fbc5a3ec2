use axum::{routing::get, Router};

mod health;
mod session;

pub use health::health;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/start-session", get(session::routes::start_session))
}

async fn root() -> &'static str {
    "session-flag-gateway: evaluates session features with last-known-good fallback"
}
