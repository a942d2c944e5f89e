//! REST API server module
//!
//! Exposes the job board over HTTP: paged listing, summaries, reruns,
//! component export commands and the WebSocket progress stream.

use crate::{Config, JobBoard, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /job/query/page` - Paged job list, each row enriched with its dataset
/// - `GET /job/query/status` - Unfinished jobs with their display status
/// - `GET /job/query/:job_id/:role/:party_id` - Job summary
/// - `POST /job/rerun` - Rerun a job from a component
/// - `POST /job/component/command` - Flow CLI command exporting a component's output
///
/// ## Progress
/// - `GET /websocket/progress/:job_id/:role/:party_id` - WebSocket progress stream
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(board: Arc<JobBoard>, config: Arc<Config>) -> Router {
    let state = AppState::new(board, config.clone());

    let router = Router::new()
        // Jobs
        .route("/job/query/page", post(routes::query_jobs_page))
        .route("/job/query/status", get(routes::job_status))
        .route(
            "/job/query/:job_id/:role/:party_id",
            get(routes::job_summary),
        )
        .route("/job/rerun", post(routes::rerun_job))
        .route("/job/component/command", post(routes::component_command))
        // Progress
        .route(
            "/websocket/progress/:job_id/:role/:party_id",
            get(routes::progress_socket),
        )
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops.
///
/// # Example
///
/// ```no_run
/// use job_board::{JobBoard, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let board = Arc::new(JobBoard::new((*config).clone()).await?);
///
/// job_board::api::start_api_server(board, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(board: Arc<JobBoard>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(board, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, app).await
}

/// Serve `app` on an already bound listener
///
/// Useful when the caller binds port 0 and needs the chosen address first.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    let address = listener.local_addr().map_err(crate::error::Error::Io)?;
    tracing::info!(address = %address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
