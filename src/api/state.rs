//! Application state for the API server

use crate::{Config, JobBoard};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The board serving every request
    pub board: Arc<JobBoard>,

    /// Configuration (read only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(board: Arc<JobBoard>, config: Arc<Config>) -> Self {
        Self { board, config }
    }
}
