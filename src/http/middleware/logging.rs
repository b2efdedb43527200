//! Elapsed-time request logging.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::http::middleware::status::CapturedStatus;
use crate::http::request::request_id_of;
use crate::observability::metrics;

/// Outermost stage: owns the [`CapturedStatus`] slot and logs once the
/// inner stages have produced a response, recovered or not.
pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let captured = CapturedStatus::new();
    request.extensions_mut().insert(captured.clone());

    let request_id = request_id_of(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = captured.get().unwrap_or_else(|| response.status());
    let elapsed = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "Request completed"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}
