//! The receive loop: read records off a transport, dispatch them concurrently.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::protocol::ProtocolHandler;
use crate::transport::Transport;
use crate::types::{McpError, McpResult};

use super::Session;

impl Session {
    /// Serve this session over `transport` until the peer hangs up, the
    /// transport fails, or `shutdown` is cancelled.
    ///
    /// Every inbound message is handled on its own task, so a slow handler
    /// never blocks the ones behind it and responses may go out in any order.
    /// Requests still running when the loop ends are allowed to finish; their
    /// contexts are cancelled along with `shutdown`.
    pub async fn serve(
        self: Arc<Self>,
        transport: Arc<dyn Transport>,
        shutdown: CancellationToken,
    ) -> McpResult<()> {
        let span = tracing::info_span!("session", id = %self.id(), server = %self.identity().name);
        self.run(transport, shutdown).instrument(span).await
    }

    async fn run(
        self: Arc<Self>,
        transport: Arc<dyn Transport>,
        shutdown: CancellationToken,
    ) -> McpResult<()> {
        self.attach(transport.clone()).await;
        tracing::info!("MCP session started");

        let handler = Arc::new(ProtocolHandler::with_shutdown(self.clone(), shutdown.clone()));
        let limiter = self
            .options()
            .max_in_flight
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let tracker = TaskTracker::new();

        let outcome = loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested");
                    break Ok(());
                }
                received = transport.receive() => received,
            };

            let message = match received {
                Ok(Some(message)) => message,
                Ok(None) => {
                    tracing::info!("Peer closed the connection");
                    break Ok(());
                }
                Err(McpError::Decode(err)) => {
                    tracing::warn!("Discarding malformed message: {err}");
                    if let Some(reply) = ProtocolHandler::decode_failure(&err) {
                        if let Err(e) = transport.send(&reply).await {
                            break Err(e);
                        }
                    }
                    continue;
                }
                Err(e) => {
                    tracing::error!("Transport failure: {e}");
                    break Err(e);
                }
            };

            let permit = match &limiter {
                Some(limiter) => tokio::select! {
                    _ = shutdown.cancelled() => break Ok(()),
                    permit = limiter.clone().acquire_owned() => permit.ok(),
                },
                None => None,
            };

            let handler = handler.clone();
            let transport = transport.clone();
            tracker.spawn(
                async move {
                    let _permit = permit;
                    if let Some(response) = handler.handle_message(message).await {
                        if let Err(e) = transport.send(&response).await {
                            tracing::warn!("Failed to send response: {e}");
                        }
                    }
                }
                .in_current_span(),
            );
        };

        tracker.close();
        tracker.wait().await;

        self.detach().await;
        if let Err(e) = transport.close().await {
            tracing::debug!("Error closing transport: {e}");
        }
        tracing::info!("MCP session ended");
        outcome
    }
}
