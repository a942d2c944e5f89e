//! Paged job listing with per-row dataset enrichment, and the status overview.

use crate::db::Job;
use crate::error::Result;
use crate::executor::TaskHandle;
use crate::types::{EnrichedJob, EnrichmentResult, PagedJobQuery, Page};
use crate::validation;
use futures::future::join_all;
use serde_json::Value;

use super::JobBoard;

impl JobBoard {
    /// List one page of jobs, each enriched with its dataset view
    ///
    /// Filters are validated before storage is touched; an invalid filter
    /// fails the whole request. Every row then gets its own retrying lookup
    /// on the worker pool. The rows come back in storage order whatever order
    /// the lookups finish in, and a lookup that fails on every attempt marks
    /// its row as [`EnrichmentResult::Failed`] instead of failing the page.
    pub async fn query_jobs_page(&self, query: &PagedJobQuery) -> Result<Page<EnrichedJob>> {
        let filters = validation::filters(query)?;

        let paging = &self.config.paging;
        let page_size = query
            .page_size
            .unwrap_or(paging.default_page_size)
            .clamp(1, paging.max_page_size);
        let page_num = query.page_num.unwrap_or(1).max(1);

        let total_record = self.store.count_jobs(&filters).await?;
        let total_page = (total_record + page_size - 1) / page_size;
        let offset = (page_num - 1).saturating_mul(page_size);

        let rows = self
            .store
            .query_paged_jobs(&filters, offset, page_size)
            .await?;

        let pending: Vec<(Job, TaskHandle<Value>)> = rows
            .into_iter()
            .map(|row| {
                let handle = self.spawn_dataview(&row);
                (row.outward(), handle)
            })
            .collect();

        let list = join_all(pending.into_iter().map(|(job, handle)| async move {
            let dataset = match handle.join().await {
                Ok(data) => EnrichmentResult::Ready(data),
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.job_id,
                        role = %job.role,
                        party_id = %job.party_id,
                        error = %e,
                        "Dataset lookup failed, returning row without it"
                    );
                    EnrichmentResult::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            EnrichedJob { job, dataset }
        }))
        .await;

        Ok(Page {
            total_record,
            total_page,
            page_num,
            page_size,
            list,
        })
    }

    /// Status overview: every unfinished job, newest first
    ///
    /// Rows leave without their payload fields and with the display status.
    pub async fn query_job_status(&self) -> Result<Vec<Job>> {
        let jobs = self.store.query_job_status().await?;
        tracing::debug!(count = jobs.len(), "Queried unfinished jobs");
        Ok(jobs.iter().map(Job::outward).collect())
    }

    fn spawn_dataview(&self, row: &Job) -> TaskHandle<Value> {
        let flow = self.flow.clone();
        let key = row.key();
        self.pool
            .spawn_with_retry(self.config.retry.clone(), move || {
                let flow = flow.clone();
                let key = key.clone();
                async move { flow.job_dataview(&key).await }
            })
    }
}
