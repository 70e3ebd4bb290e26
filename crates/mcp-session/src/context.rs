//! Per-request context handed to capability handlers.

use tokio_util::sync::CancellationToken;

use crate::types::RequestId;

/// Identifies the request being served and carries its cancellation signal.
///
/// The session never aborts a running handler. The token is cancelled when the
/// session shuts down or the peer sends `notifications/cancelled` for this
/// request; handlers that care should watch it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Option<RequestId>,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(request_id: Option<RequestId>, cancellation: CancellationToken) -> Self {
        Self {
            request_id,
            cancellation,
        }
    }

    /// A context that is never cancelled, for calling handlers outside a session.
    pub fn detached() -> Self {
        Self::new(None, CancellationToken::new())
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once the request has been cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}
