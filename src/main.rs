mod client;
mod config;
mod error;
mod evaluation;
mod flags;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::client::HttpEvaluator;
use crate::evaluation::clock::{Clock, SystemClock};
use crate::evaluation::lkg::LkgStore;
use crate::evaluation::EvaluationStrategy;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("session_flag_gateway=info,tower_http=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = config::Config::from_env().inspect_err(|e| {
        error!(error = %e, "invalid configuration, refusing to start");
    })?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(LkgStore::new(clock.clone()));
    let evaluator = Arc::new(HttpEvaluator::new(
        config.feature_flag_api_url.clone(),
        config.api_key.clone(),
    ));
    let strategy = Arc::new(EvaluationStrategy::new(
        evaluator,
        store.clone(),
        clock.clone(),
        config.lkg_max_age,
        config.request_timeout,
    ));

    let state = state::AppState {
        strategy,
        store,
        clock,
    };

    let app = routes::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    info!(
        addr = %config.addr(),
        feature_flag_api_url = %config.feature_flag_api_url,
        lkg_max_age_ms = config.lkg_max_age.num_milliseconds(),
        "session-flag-gateway listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
