//! WebSocket progress stream.

use crate::api::AppState;
use crate::error::Result;
use crate::stream::WsTransport;
use crate::types::JobKey;
use crate::validation;
use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::rejection::WebSocketUpgradeRejection,
    },
    response::{IntoResponse, Response},
};

/// GET /websocket/progress/:job_id/:role/:party_id - Stream job progress
///
/// The path is validated before the upgrade, so a malformed key is answered
/// with 400 and never opens a socket. After the upgrade the board pushes a
/// snapshot every poll interval until the job finishes, disappears, or the
/// client goes away.
#[utoipa::path(
    get,
    path = "/websocket/progress/{job_id}/{role}/{party_id}",
    tag = "progress",
    params(
        ("job_id" = String, Path, description = "Job identifier"),
        ("role" = String, Path, description = "Role of the viewing party"),
        ("party_id" = String, Path, description = "Viewing party identifier")
    ),
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
        (status = 400, description = "A path part failed validation", body = crate::error::ApiError)
    )
)]
pub async fn progress_socket(
    State(state): State<AppState>,
    Path((job_id, role, party_id)): Path<(String, String, String)>,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response> {
    let key = JobKey::new(job_id, role, party_id);
    validation::job_key(&key)?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let board = state.board.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        tracing::debug!(job = %key, "Progress socket opened");
        let transport = WsTransport::new(socket);
        let outcome = board.open_session(key.clone(), transport).run().await;
        tracing::debug!(job = %key, state = ?outcome, "Progress socket finished");
    }))
}
