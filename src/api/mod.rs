//! REST API for the target registry
//!
//! Translates HTTP requests into registry and prober calls and serializes
//! results and errors back to clients.
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - One [`Registry`](crate::registry::Registry) and one
//!   [`Prober`](crate::prober::Prober) shared by all handlers
//! - Optional bearer-token authentication
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/servers` - List targets
//! - `POST /api/v1/servers` - Create a target
//! - `GET /api/v1/servers/{id}` - Get a target
//! - `PUT /api/v1/servers/{id}` - Partially update a target
//! - `DELETE /api/v1/servers/{id}` - Delete a target
//! - `GET /api/v1/servers/{id}/ping` - Liveness probe
//! - `GET /api/v1/servers/{id}/metrics` - Metrics snapshot

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{HealthResponse, LivenessResponse, ServersResponse};

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;

/// Build the router with all routes and layers
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route(
            "/api/v1/servers",
            get(routes::servers::list_servers).post(routes::servers::create_server),
        )
        .route(
            "/api/v1/servers/:id",
            get(routes::servers::get_server)
                .put(routes::servers::update_server)
                .delete(routes::servers::delete_server),
        )
        .route(
            "/api/v1/servers/:id/ping",
            get(routes::servers::ping_server),
        )
        .route(
            "/api/v1/servers/:id/metrics",
            get(routes::servers::get_server_metrics),
        )
        .with_state(state);

    if let Some(token) = config.auth_token.clone() {
        app = app.layer(axum::middleware::from_fn_with_state(
            token,
            middleware::auth::auth_middleware,
        ));
    }

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
