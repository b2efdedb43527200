//! Response status capture.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Shared slot holding the first status code produced for a request.
///
/// Inserted into request extensions by the logging stage; written by the
/// capture and recovery stages.
#[derive(Debug, Clone, Default)]
pub struct CapturedStatus(Arc<AtomicU16>);

impl CapturedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `status` unless one was already recorded. Returns whether it was stored.
    pub(crate) fn record(&self, status: StatusCode) -> bool {
        self.0
            .compare_exchange(0, status.as_u16(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn get(&self) -> Option<StatusCode> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }
}

/// Innermost stage: records the handler's status once it returns.
pub async fn capture_status(request: Request, next: Next) -> Response {
    let captured = request.extensions().get::<CapturedStatus>().cloned();
    let response = next.run(request).await;
    if let Some(captured) = captured {
        captured.record(response.status());
    }
    response
}
