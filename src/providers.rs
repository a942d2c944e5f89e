//! Read-model providers consumed by streaming sessions
//!
//! A provider answers with a [`ProviderResponse`] whose `code` is 0 on
//! success. Transport-level failures are returned as `Err`; a provider that
//! understood the request but could not serve it returns a non-zero code.

use crate::db::JobStore;
use crate::error::Result;
use crate::flow_client::FlowClient;
use crate::types::{JobKey, ProviderResponse};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Response code for a job that has no row in storage
pub const CODE_JOB_NOT_FOUND: i32 = 1;

/// Source of a job's component dependency graph
#[async_trait]
pub trait DependencyProvider: Send + Sync {
    /// Dependency graph of one party's job
    async fn dependencies(&self, key: &JobKey) -> Result<ProviderResponse>;
}

/// Source of a job's summary (the stored row plus its dataset view)
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Summary of one party's job
    async fn summary(&self, key: &JobKey) -> Result<ProviderResponse>;
}

/// Dependency graph served by the flow service's DAG endpoint
///
/// The `retcode`/`retmsg` envelope is removed; `data` holds the graph itself.
#[derive(Clone, Debug)]
pub struct FlowDependencyProvider {
    flow: FlowClient,
}

impl FlowDependencyProvider {
    /// Create a provider backed by `flow`
    pub fn new(flow: FlowClient) -> Self {
        Self { flow }
    }
}

#[async_trait]
impl DependencyProvider for FlowDependencyProvider {
    async fn dependencies(&self, key: &JobKey) -> Result<ProviderResponse> {
        let graph = self.flow.dag_dependencies(key).await?;
        Ok(ProviderResponse::ok(graph))
    }
}

/// Summary assembled from storage and the flow service's dataset view
///
/// `data` is `{ "job": <job without payload fields>, "dataset": <view> }`.
pub struct JobSummaryProvider {
    store: Arc<dyn JobStore>,
    flow: FlowClient,
}

impl JobSummaryProvider {
    /// Create a provider reading rows from `store` and datasets from `flow`
    pub fn new(store: Arc<dyn JobStore>, flow: FlowClient) -> Self {
        Self { store, flow }
    }
}

#[async_trait]
impl SummaryProvider for JobSummaryProvider {
    async fn summary(&self, key: &JobKey) -> Result<ProviderResponse> {
        let Some(job) = self.store.find_job(key).await? else {
            return Ok(ProviderResponse::error(
                CODE_JOB_NOT_FOUND,
                format!("job {} not found", key),
            ));
        };

        let dataset = self.flow.job_dataview(key).await?;
        Ok(ProviderResponse::ok(json!({
            "job": job.outward(),
            "dataset": dataset,
        })))
    }
}
