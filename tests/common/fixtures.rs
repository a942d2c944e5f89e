//! Job rows and flow service answers shared by the integration tests

use job_board::{JobKey, JobStatus, NewJob};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Role and party every fixture job is viewed from
pub const ROLE: &str = "guest";
/// Party id every fixture job is viewed from
pub const PARTY_ID: &str = "9999";

/// Waiting job viewed by the guest party, created at `create_time`
pub fn new_job(job_id: &str, create_time: i64) -> NewJob {
    NewJob {
        key: JobKey::new(job_id, ROLE, PARTY_ID),
        name: format!("{job_id} hetero lr"),
        description: "hetero lr on breast".to_string(),
        partner: "10000".to_string(),
        initiator_party_id: PARTY_ID.to_string(),
        status: JobStatus::Waiting,
        dsl: Some(r#"{"components": {"reader_0": {}}}"#.to_string()),
        runtime_conf: Some(r#"{"initiator": {"role": "guest"}}"#.to_string()),
        create_time,
    }
}

/// Answer every flow endpoint the board calls
pub async fn mount_flow_service(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/job/dataview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retcode": 0,
            "retmsg": "success",
            "data": {"dataset": {"guest": {"9999": "breast_hetero_guest"}}}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/pipeline/dag/dependency"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retcode": 0,
            "retmsg": "success",
            "data": {
                "component_list": [
                    {"component_name": "reader_0", "status": "success"},
                    {"component_name": "hetero_lr_0", "status": "running"}
                ],
                "component_module": {"reader_0": "Reader", "hetero_lr_0": "HeteroLR"},
                "component_need_run": {"reader_0": true, "hetero_lr_0": true},
                "dependencies": {"hetero_lr_0": [{"component_name": "reader_0", "type": "data"}]}
            }
        })))
        .mount(server)
        .await;
}
