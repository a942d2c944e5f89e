//! Rerun requests and component export commands.

use crate::error::Result;
use crate::types::{ComponentCommand, ComponentQuery, ReRunRequest, RerunOutcome};
use crate::validation;

use super::JobBoard;

impl JobBoard {
    /// Ask the flow service to rerun a job from one component
    ///
    /// The request is retried per the configured policy. Any failure after
    /// that is logged and reported as [`RerunOutcome::FAILED`]; only a
    /// malformed request is returned as an error.
    pub async fn rerun(&self, request: ReRunRequest) -> Result<RerunOutcome> {
        validation::identifier("job_id", &request.job_id)?;
        validation::identifier("component_name", &request.component_name)?;

        let flow = self.flow.clone();
        let job_id = request.job_id.clone();
        let handle = self
            .pool
            .spawn_with_retry(self.config.retry.clone(), move || {
                let flow = flow.clone();
                let request = request.clone();
                async move { flow.rerun(&request).await }
            });

        match handle.join().await {
            Ok(()) => {
                tracing::info!(job_id = %job_id, "Rerun accepted");
                Ok(RerunOutcome::OK)
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Rerun failed");
                Ok(RerunOutcome::FAILED)
            }
        }
    }

    /// Build the flow CLI command that exports a component's output data
    pub fn component_output_command(&self, query: &ComponentQuery) -> Result<ComponentCommand> {
        validation::component(query)?;

        Ok(ComponentCommand {
            command: format!(
                "flow component output-data -j {} -r {} -p {} -cpn {} --output-path ./",
                query.job_id, query.role, query.party_id, query.component_name
            ),
        })
    }
}
