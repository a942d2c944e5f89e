//! WebSocket transport for streaming sessions.

use super::Transport;
use crate::error::{Error, Result};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// [`Transport`] over an upgraded axum WebSocket
///
/// A reader task drains incoming frames and cancels `closed` when the peer
/// sends a close frame, errors, or disconnects. Incoming text is ignored.
pub struct WsTransport {
    sink: SplitSink<WebSocket, Message>,
    closed: CancellationToken,
    close_sent: bool,
    reader: JoinHandle<()>,
}

impl WsTransport {
    /// Take ownership of an upgraded socket
    pub fn new(socket: WebSocket) -> Self {
        let (sink, mut stream) = socket.split();
        let closed = CancellationToken::new();

        let token = closed.clone();
        let reader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                            token.cancel();
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                }
            }
        });

        Self {
            sink,
            closed,
            close_sent: false,
            reader,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn is_open(&self) -> bool {
        !self.closed.is_cancelled()
    }

    async fn send_text(&mut self, text: String) -> Result<()> {
        if self.closed.is_cancelled() {
            return Err(Error::Transport("socket already closed".to_string()));
        }
        self.sink.send(Message::Text(text)).await.map_err(|e| {
            self.closed.cancel();
            Error::Transport(e.to_string())
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.cancel();
        if self.close_sent {
            return Ok(());
        }
        self.close_sent = true;

        // Closing the sink sends the close frame
        self.sink
            .close()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.closed.cancel();
        self.reader.abort();
    }
}
