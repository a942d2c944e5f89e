//! Job board server example
//!
//! Runs the REST API and the WebSocket progress stream against a flow
//! service.
//!
//! Usage:
//!
//! ```text
//! cargo run --example board_server -- [config.json]
//! ```
//!
//! Without an argument the defaults are used (flow service at
//! http://127.0.0.1:9380/v1, API on 127.0.0.1:8080). Set `RUST_LOG` to tune
//! logging, e.g. `RUST_LOG=job_board=debug,tower_http=info`.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:8080/swagger-ui
//! - List jobs via POST http://localhost:8080/job/query/page
//! - Watch a job via ws://localhost:8080/websocket/progress/<job_id>/<role>/<party_id>

use job_board::{Config, JobBoard, run_with_shutdown};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_board=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<Config>(&raw)?
        }
        None => Config::default(),
    };

    let address = config.server.api.bind_address;
    let board = JobBoard::new(config).await?;
    let server = board.spawn_api_server();

    println!("Job board listening on http://{address}");
    println!("Swagger UI: http://{address}/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  # First page of jobs");
    println!("  curl -X POST http://{address}/job/query/page \\");
    println!("    -H 'Content-Type: application/json' -d '{{\"page_num\": 1}}'");
    println!();
    println!("  # Rerun a job from a component");
    println!("  curl -X POST http://{address}/job/rerun \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"job_id\": \"202401010001\", \"component_name\": \"hetero_lr_0\"}}'");
    println!();
    println!("Press Ctrl+C to stop");

    run_with_shutdown(board).await?;
    server.abort();
    Ok(())
}
