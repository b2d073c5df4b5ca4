use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use websocket_api::actions::broadcast_queue_sizes;
use websocket_api::routes;
use websocket_api::state::AppState;

/// How often the staleness sweep runs over the matchmaking queues.
const QUEUE_CLEANUP_INTERVAL_SECONDS: u64 = 60;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_state = AppState::new_in_memory();
    spawn_queue_cleanup(app_state.clone());

    // ToDo: Tighten this up
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::websocket::websocket_handler))
        .route(
            "/players/:player_id/active-session",
            get(routes::session::active_session),
        )
        .layer(cors)
        .with_state(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drops queue entries past the staleness horizon and pushes
/// fresh sizes for the buckets that changed.
fn spawn_queue_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(QUEUE_CLEANUP_INTERVAL_SECONDS));
        loop {
            interval.tick().await;
            match state.matchmaking_service.cleanup_stale().await {
                Ok(affected) => {
                    if !affected.is_empty() {
                        broadcast_queue_sizes(&state, &affected).await;
                    }
                }
                Err(e) => error!("Queue cleanup failed: {}", e),
            }
        }
    });
}
