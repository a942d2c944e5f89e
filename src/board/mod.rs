//! Job board facade split into focused submodules.
//!
//! The `JobBoard` struct and its methods are organized by domain:
//! - [`paging`] - Paged job listing with per-row dataset enrichment, status overview
//! - [`rerun`] - Rerun requests and component export commands
//! - [`lifecycle`] - Summaries, session creation and shutdown

mod lifecycle;
mod paging;
mod rerun;


use crate::config::Config;
use crate::db::{Database, JobStore};
use crate::error::Result;
use crate::executor::WorkerPool;
use crate::flow_client::FlowClient;
use crate::providers::{
    DependencyProvider, FlowDependencyProvider, JobSummaryProvider, SummaryProvider,
};
use std::sync::Arc;

/// Main board instance (cloneable - all fields are Arc-wrapped or cheap handles)
#[derive(Clone)]
pub struct JobBoard {
    /// Job rows
    pub(crate) store: Arc<dyn JobStore>,
    /// Concrete database when the board opened one itself; closed on shutdown
    pub(crate) database: Option<Arc<Database>>,
    /// Flow service client
    pub(crate) flow: FlowClient,
    /// Shared worker pool for every remote call
    pub(crate) pool: WorkerPool,
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Dependency graph source for streaming sessions
    pub(crate) dependencies: Arc<dyn DependencyProvider>,
    /// Summary source for streaming sessions and the summary endpoint
    pub(crate) summaries: Arc<dyn SummaryProvider>,
}

impl JobBoard {
    /// Create a new JobBoard instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Opens/creates the SQLite database and runs migrations
    /// - Builds the flow service client and the shipped providers
    /// - Sizes the shared worker pool
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let database = Arc::new(Database::new(&config.persistence.database_path).await?);
        let flow = FlowClient::new(&config.flow)?;
        let store: Arc<dyn JobStore> = database.clone();

        let dependencies = Arc::new(FlowDependencyProvider::new(flow.clone()));
        let summaries = Arc::new(JobSummaryProvider::new(store.clone(), flow.clone()));

        tracing::info!(
            flow = flow.base_url(),
            pool_size = config.executor.pool_size,
            database = %config.persistence.database_path.display(),
            "Job board initialized"
        );

        let mut board = Self::with_parts(config, store, flow, dependencies, summaries)?;
        board.database = Some(database);
        Ok(board)
    }

    /// Assemble a board from existing collaborators
    ///
    /// Use this to plug in another storage backend or other providers.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn JobStore>,
        flow: FlowClient,
        dependencies: Arc<dyn DependencyProvider>,
        summaries: Arc<dyn SummaryProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            database: None,
            flow,
            pool: WorkerPool::new(config.executor.pool_size),
            config: Arc::new(config),
            dependencies,
            summaries,
        })
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Shared worker pool
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Flow service client
    pub fn flow(&self) -> &FlowClient {
        &self.flow
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on the configured bind address (default: 127.0.0.1:8080).
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let board = Arc::new(self.clone());
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(board, config).await })
    }
}
