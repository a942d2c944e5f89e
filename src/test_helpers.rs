//! In-memory stand-ins for storage, providers and transports used across unit tests.

use crate::db::{Job, JobStore};
use crate::error::{Error, Result};
use crate::providers::{DependencyProvider, SummaryProvider};
use crate::stream::Transport;
use crate::types::{JobFilters, JobKey, ProviderResponse};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Job row with sensible defaults for `status` and `create_time`
pub(crate) fn job(job_id: &str, status: &str, create_time: i64) -> Job {
    Job {
        job_id: job_id.to_string(),
        role: "guest".to_string(),
        party_id: "9999".to_string(),
        name: format!("{job_id} name"),
        description: "hetero lr".to_string(),
        partner: "10000".to_string(),
        initiator_party_id: "9999".to_string(),
        status: status.to_string(),
        progress: 50,
        create_time,
        start_time: Some(1_000),
        end_time: None,
        dsl: Some(r#"{"components": {}}"#.to_string()),
        runtime_conf: Some(r#"{"initiator": {}}"#.to_string()),
    }
}

/// Graph shaped like the flow service's DAG dependency answer
pub(crate) fn dependency_graph() -> Value {
    json!({
        "component_list": [{"component_name": "reader_0", "status": "success"}],
        "component_module": {"reader_0": "Reader"},
        "component_need_run": {"reader_0": true},
        "dependencies": {"hetero_lr_0": [{"component_name": "reader_0", "type": "data"}]}
    })
}

/// Summary shaped like [`crate::providers::JobSummaryProvider`] output
pub(crate) fn summary() -> Value {
    json!({
        "job": {"job_id": "j1", "status": "running"},
        "dataset": {"guest": {"9999": "breast_hetero_guest"}}
    })
}

/// Job store backed by a vector
///
/// `find_job` answers from the script first: each call consumes one entry
/// until a single entry is left, which then repeats.
#[derive(Default)]
pub(crate) struct MemoryStore {
    jobs: Mutex<Vec<Job>>,
    find_script: Mutex<VecDeque<Option<Job>>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Default::default()
        }
    }

    pub(crate) fn scripted(answers: Vec<Option<Job>>) -> Self {
        Self {
            find_script: Mutex::new(answers.into()),
            ..Default::default()
        }
    }

    /// Total number of store calls of any kind
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matching(&self, filters: &JobFilters) -> Vec<Job> {
        let contains = |field: &str, filter: &Option<String>| {
            filter.as_deref().is_none_or(|f| field.contains(f))
        };
        let mut rows: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| {
                contains(&j.job_id, &filters.job_id)
                    && contains(&j.party_id, &filters.party_id)
                    && contains(&j.partner, &filters.partner)
                    && contains(&j.description, &filters.description)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.create_time
                .cmp(&a.create_time)
                .then_with(|| a.job_id.cmp(&b.job_id))
        });
        rows
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn find_job(&self, key: &JobKey) -> Result<Option<Job>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut script = self.find_script.lock().unwrap();
            if script.len() > 1 {
                return Ok(script.pop_front().flatten());
            }
            if let Some(last) = script.front() {
                return Ok(last.clone());
            }
        }
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.key() == *key)
            .cloned())
    }

    async fn query_paged_jobs(
        &self,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .matching(filters)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_jobs(&self, filters: &JobFilters) -> Result<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matching(filters).len() as i64)
    }

    async fn query_job_status(&self) -> Result<Vec<Job>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .matching(&JobFilters::default())
            .into_iter()
            .filter(|j| !j.status().is_terminal())
            .collect())
    }
}

/// Provider that always gives the same answer
pub(crate) struct StaticProvider {
    answer: std::result::Result<ProviderResponse, String>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub(crate) fn ok(data: Value) -> Arc<Self> {
        Self::answering(Ok(ProviderResponse::ok(data)))
    }

    pub(crate) fn answering(answer: std::result::Result<ProviderResponse, String>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(Error::Other)
    }
}

#[async_trait]
impl DependencyProvider for StaticProvider {
    async fn dependencies(&self, _key: &JobKey) -> Result<ProviderResponse> {
        self.respond()
    }
}

#[async_trait]
impl SummaryProvider for StaticProvider {
    async fn summary(&self, _key: &JobKey) -> Result<ProviderResponse> {
        self.respond()
    }
}

#[derive(Default)]
struct TransportLog {
    sent: Vec<String>,
    closes: usize,
    peer_closed: bool,
    fail_sends: bool,
    peer_closes_after: Option<usize>,
}

/// Transport that records what the session does; clones share the record
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    log: Arc<Mutex<TransportLog>>,
}

impl RecordingTransport {
    /// Every send fails as if the socket broke
    pub(crate) fn failing() -> Self {
        let transport = Self::default();
        transport.log.lock().unwrap().fail_sends = true;
        transport
    }

    /// The peer goes away after `sends` messages have been delivered
    pub(crate) fn peer_closes_after(sends: usize) -> Self {
        let transport = Self::default();
        transport.log.lock().unwrap().peer_closes_after = Some(sends);
        transport
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().sent.clone()
    }

    pub(crate) fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    pub(crate) fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn is_open(&self) -> bool {
        let log = self.log.lock().unwrap();
        !log.peer_closed && log.closes == 0
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.fail_sends || log.peer_closed || log.closes > 0 {
            return Err(Error::Transport("broken pipe".to_string()));
        }
        log.sent.push(text);
        if log.peer_closes_after == Some(log.sent.len()) {
            log.peer_closed = true;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}
