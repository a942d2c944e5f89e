//! Common test utilities for job-board integration tests

#[allow(dead_code)]
pub mod fixtures;

pub use fixtures::*;

use job_board::{Config, Database, JobBoard, RetryConfig, RetryTier};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wiremock::MockServer;

/// A board served over HTTP on a free local port
pub struct TestServer {
    /// Address the API listens on
    pub addr: SocketAddr,
    /// Second handle on the board's database for seeding and updating rows
    pub db: Database,
    /// Fake flow service
    pub flow: MockServer,
    board: Arc<JobBoard>,
    handle: JoinHandle<job_board::Result<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    /// Start a board against a fresh database and a fake flow service
    pub async fn start() -> Self {
        let flow = MockServer::start().await;
        mount_flow_service(&flow).await;

        let temp_dir = tempfile::tempdir().unwrap();
        let database_path = temp_dir.path().join("board.db");

        let mut config = Config::default();
        config.flow.base_url = format!("{}/v1", flow.uri());
        config.persistence.database_path = database_path.clone();
        config.stream.poll_interval = Duration::from_millis(20);
        config.retry = RetryConfig {
            tiers: vec![RetryTier::new(2, Duration::from_millis(5))],
            jitter: false,
        };

        let board = Arc::new(JobBoard::new(config).await.unwrap());
        let db = Database::new(&database_path).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = job_board::api::create_router(board.clone(), board.get_config());
        let handle = tokio::spawn(job_board::api::serve(listener, app));

        Self {
            addr,
            db,
            flow,
            board,
            handle,
            _temp_dir: temp_dir,
        }
    }

    /// WebSocket URL of the progress stream for one party's job
    pub fn progress_url(&self, job_id: &str, role: &str, party_id: &str) -> String {
        format!(
            "ws://{}/websocket/progress/{}/{}/{}",
            self.addr, job_id, role, party_id
        )
    }

    /// Stop serving and shut the board down
    pub async fn stop(self) {
        self.handle.abort();
        self.board.shutdown().await.unwrap();
        self.db.close().await;
    }
}
