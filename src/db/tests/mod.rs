use crate::db::*;
use crate::types::{JobKey, JobStatus};


pub(super) fn new_job(job_id: &str, party_id: &str, create_time: i64) -> NewJob {
    NewJob {
        key: JobKey::new(job_id, "guest", party_id),
        name: format!("{job_id} name"),
        description: "hetero lr".to_string(),
        partner: "10000,10001".to_string(),
        initiator_party_id: party_id.to_string(),
        status: JobStatus::Waiting,
        dsl: Some(r#"{"components": {}}"#.to_string()),
        runtime_conf: Some(r#"{"initiator": {}}"#.to_string()),
        create_time,
    }
}
