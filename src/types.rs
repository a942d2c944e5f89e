//! Core types for job-board

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::Job;

/// Identity of one party's view of a job
///
/// The same job id exists once per participating (role, party id) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct JobKey {
    /// Job identifier shared by all parties
    pub job_id: String,
    /// Role of this party in the job (e.g. "guest", "host", "arbiter")
    pub role: String,
    /// Party identifier
    pub party_id: String,
}

impl JobKey {
    /// Create a new JobKey
    pub fn new(
        job_id: impl Into<String>,
        role: impl Into<String>,
        party_id: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            role: role.into(),
            party_id: party_id.into(),
        }
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.job_id, self.role, self.party_id)
    }
}

/// Job status
///
/// Statuses the board does not know about are kept verbatim in
/// [`JobStatus::Other`] so they survive a round trip to storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    /// Queued, not yet started
    Waiting,
    /// Currently running
    Running,
    /// Finished successfully
    Success,
    /// Finished with an error
    Failed,
    /// Exceeded its time limit
    Timeout,
    /// Canceled by a user
    Canceled,
    /// Any other in-flight value reported by the flow service
    Other(String),
}

impl JobStatus {
    /// Parse a stored status string
    pub fn parse(status: &str) -> Self {
        match status {
            "waiting" => JobStatus::Waiting,
            "running" => JobStatus::Running,
            "success" => JobStatus::Success,
            "failed" => JobStatus::Failed,
            "timeout" => JobStatus::Timeout,
            "canceled" => JobStatus::Canceled,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// The value as it is stored; never rewritten
    pub fn persisted(&self) -> &str {
        match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Timeout => "timeout",
            JobStatus::Canceled => "canceled",
            JobStatus::Other(s) => s,
        }
    }

    /// The value shown to observers: `timeout` is reported as `failed`
    pub fn display(&self) -> JobStatus {
        match self {
            JobStatus::Timeout => JobStatus::Failed,
            other => other.clone(),
        }
    }

    /// Whether no further transitions will happen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Failed | JobStatus::Timeout | JobStatus::Canceled
        )
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        JobStatus::parse(&s)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.persisted().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.persisted())
    }
}

/// Paged job listing request
///
/// Blank filters are treated as absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PagedJobQuery {
    /// 1-based page number (default: 1)
    #[serde(default)]
    pub page_num: Option<i64>,
    /// Rows per page (default and maximum come from the paging config)
    #[serde(default)]
    pub page_size: Option<i64>,
    /// Substring of the job id
    #[serde(default)]
    pub job_id: Option<String>,
    /// Substring of the party id
    #[serde(default)]
    pub party_id: Option<String>,
    /// Substring of the partner list
    #[serde(default)]
    pub partner: Option<String>,
    /// Substring of the description
    #[serde(default)]
    pub description: Option<String>,
}

/// Validated listing filters; each present filter is a substring match on its own column
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobFilters {
    /// Job id substring
    pub job_id: Option<String>,
    /// Party id substring
    pub party_id: Option<String>,
    /// Partner substring
    pub partner: Option<String>,
    /// Description substring
    pub description: Option<String>,
}

impl JobFilters {
    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        self.job_id.is_none()
            && self.party_id.is_none()
            && self.partner.is_none()
            && self.description.is_none()
    }
}

/// One page of results
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[aliases(JobPage = Page<EnrichedJob>)]
pub struct Page<T> {
    /// Number of rows matching the filters
    pub total_record: i64,
    /// Number of pages at the current page size
    pub total_page: i64,
    /// Page number returned (1-based)
    pub page_num: i64,
    /// Page size applied
    pub page_size: i64,
    /// Rows in storage order
    pub list: Vec<T>,
}

/// A job row paired with its remote dataset view
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EnrichedJob {
    /// The job with payload fields removed and its status shown for display
    pub job: Job,
    /// Outcome of the dataset lookup
    pub dataset: EnrichmentResult,
}

/// Outcome of one row's dataset lookup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentResult {
    /// The flow service answered; holds its `data` field
    Ready(serde_json::Value),
    /// Every retry failed
    Failed {
        /// Last error message
        reason: String,
    },
}

impl EnrichmentResult {
    /// The dataset view, if the lookup succeeded
    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            EnrichmentResult::Ready(data) => Some(data),
            EnrichmentResult::Failed { .. } => None,
        }
    }

    /// Whether the lookup failed
    pub fn is_failed(&self) -> bool {
        matches!(self, EnrichmentResult::Failed { .. })
    }
}

/// Request to rerun a job from one of its components
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReRunRequest {
    /// Job to rerun
    pub job_id: String,
    /// Component to start from
    pub component_name: String,
    /// Rerun even if the component already succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
}

/// Result of a rerun request: 0 on success, 1 on any failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RerunOutcome {
    /// 0 = accepted by the flow service, 1 = failed
    pub code: i32,
}

impl RerunOutcome {
    /// Accepted
    pub const OK: Self = Self { code: 0 };
    /// Failed for any reason
    pub const FAILED: Self = Self { code: 1 };
}

/// Identifies one component of one party's job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentQuery {
    /// Job identifier
    pub job_id: String,
    /// Role of the party
    pub role: String,
    /// Party identifier
    pub party_id: String,
    /// Component name within the job's pipeline
    pub component_name: String,
}

/// Command line to export a component's output data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComponentCommand {
    /// Shell command for the flow CLI
    pub command: String,
}

/// Response envelope returned by the local read-model providers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponse {
    /// 0 on success
    pub code: i32,
    /// Message accompanying a non-zero code
    pub msg: String,
    /// Payload; may be null on failure
    pub data: serde_json::Value,
}

impl ProviderResponse {
    /// Successful response carrying `data`
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            code: 0,
            msg: "success".to_string(),
            data,
        }
    }

    /// Failed response with an explanatory message
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: serde_json::Value::Null,
        }
    }
}
