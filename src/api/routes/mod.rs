//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Paged listing, summaries, reruns, component commands
//! - [`progress`] - WebSocket progress stream
//! - [`system`] - Health and OpenAPI

mod jobs;
mod progress;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use jobs::*;
pub use progress::*;
pub use system::*;
