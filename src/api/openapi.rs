//! OpenAPI documentation and schema generation
//!
//! Uses utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the job-board REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "job-board REST API",
        version = "0.1.0",
        description = "Job board for a federated-learning flow service: paged job listing with dataset views, reruns, and live progress over WebSocket",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::query_jobs_page,
        crate::api::routes::job_status,
        crate::api::routes::job_summary,
        crate::api::routes::rerun_job,
        crate::api::routes::component_command,

        // Progress
        crate::api::routes::progress_socket,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::JobKey,
        crate::types::PagedJobQuery,
        crate::types::JobPage,
        crate::types::EnrichedJob,
        crate::types::EnrichmentResult,
        crate::types::ReRunRequest,
        crate::types::RerunOutcome,
        crate::types::ComponentQuery,
        crate::types::ComponentCommand,
        crate::db::Job,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Jobs - Paged listing, summaries, reruns and component output commands"),
        (name = "progress", description = "Progress - Live job snapshots over WebSocket"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();

        for path in [
            "/job/query/page",
            "/job/query/status",
            "/job/query/{job_id}/{role}/{party_id}",
            "/job/rerun",
            "/job/component/command",
            "/websocket/progress/{job_id}/{role}/{party_id}",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn test_openapi_spec_has_page_schema() {
        let spec = ApiDoc::openapi();
        let components = spec.components.unwrap();

        assert!(components.schemas.contains_key("JobPage"));
        assert!(components.schemas.contains_key("EnrichmentResult"));
        assert!(components.schemas.contains_key("ApiError"));
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.unwrap();
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(tag_names, vec!["jobs", "progress", "system"]);
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "job-board REST API");
        assert!(spec.info.description.is_some());
    }
}
