//! Merged per-iteration payload pushed to observers.

use crate::types::JobStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Graph fields only needed to lay out the first render
const GRAPH_LAYOUT_FIELDS: [&str; 3] = ["component_module", "component_need_run", "dependencies"];

/// Summary fields that do not change while a job runs
const SUMMARY_STATIC_FIELDS: [&str; 1] = ["dataset"];

/// One push to an observer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Progress in percent, as stored
    pub job_process: i32,
    /// Elapsed run time in milliseconds
    pub job_duration: i64,
    /// Display status (`timeout` shows as `failed`)
    pub job_status: JobStatus,
    /// Component dependency graph
    pub dependency_data: Value,
    /// Job summary
    pub summary_data: Value,
}

impl JobSnapshot {
    /// Drop the sub-fields the observer already has from the first push
    pub fn strip_redundant(mut self) -> Self {
        remove_fields(&mut self.dependency_data, &GRAPH_LAYOUT_FIELDS);
        remove_fields(&mut self.summary_data, &SUMMARY_STATIC_FIELDS);
        self
    }
}

fn remove_fields(value: &mut Value, fields: &[&str]) {
    if let Value::Object(map) = value {
        for field in fields {
            map.remove(*field);
        }
    }
}
