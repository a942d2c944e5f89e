//! Database layer for job-board
//!
//! Handles SQLite persistence for the job table read by the board.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`jobs`] - Job lookup, filtered paging, and the writer side used by
//!   the scheduler that owns the table

use crate::Result;
use crate::types::{JobFilters, JobKey, JobStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, sqlite::SqlitePool};
use utoipa::ToSchema;

mod jobs;
mod migrations;

/// Read access to job rows
///
/// The board and the streaming sessions only depend on this trait, so any
/// storage backend (or an in-memory fake in tests) can stand in for
/// [`Database`].
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Look up one party's view of a job
    async fn find_job(&self, key: &JobKey) -> Result<Option<Job>>;

    /// Fetch a page of jobs, newest first (ties broken by job id)
    async fn query_paged_jobs(
        &self,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>>;

    /// Count jobs matching the filters
    async fn count_jobs(&self, filters: &JobFilters) -> Result<i64>;

    /// Every job that has not reached a terminal status, newest first
    async fn query_job_status(&self) -> Result<Vec<Job>>;
}

/// New job to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewJob {
    /// Job identity
    pub key: JobKey,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Comma-separated party ids of the other participants
    pub partner: String,
    /// Party id of the initiator
    pub initiator_party_id: String,
    /// Initial status
    pub status: JobStatus,
    /// Job DSL (pipeline definition)
    pub dsl: Option<String>,
    /// Runtime configuration
    pub runtime_conf: Option<String>,
    /// Creation time (epoch milliseconds)
    pub create_time: i64,
}

/// Job record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier
    pub job_id: String,
    /// Role of this party
    pub role: String,
    /// Party identifier
    pub party_id: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Comma-separated party ids of the other participants
    pub partner: String,
    /// Party id of the initiator
    pub initiator_party_id: String,
    /// Status as stored (see [`JobStatus`])
    pub status: String,
    /// Progress in percent
    pub progress: i32,
    /// Creation time (epoch milliseconds)
    pub create_time: i64,
    /// Start time (epoch milliseconds), absent until the job starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// End time (epoch milliseconds), set when the job reaches a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Job DSL; removed before a job leaves the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsl: Option<String>,
    /// Runtime configuration; removed before a job leaves the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_conf: Option<String>,
}

impl Job {
    /// Identity of this row
    pub fn key(&self) -> JobKey {
        JobKey::new(&self.job_id, &self.role, &self.party_id)
    }

    /// Stored status
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }

    /// Copy for transmission: payload fields dropped, status shown for display
    pub fn outward(&self) -> Job {
        Job {
            status: self.status().display().persisted().to_string(),
            dsl: None,
            runtime_conf: None,
            ..self.clone()
        }
    }

    /// Elapsed run time in milliseconds: (end ?? now) - start, or 0 before the job starts
    pub fn duration_ms(&self, now_ms: i64) -> i64 {
        match self.start_time {
            Some(start) => (self.end_time.unwrap_or(now_ms) - start).max(0),
            None => 0,
        }
    }
}

/// Database handle for job-board
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
