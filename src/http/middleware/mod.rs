//! Request middleware chain.
//!
//! # Data Flow
//! ```text
//! request
//!     → SetRequestId / PropagateRequestId (x-request-id)
//!     → logging.rs   (outermost: method, path, final status, elapsed)
//!     → recovery.rs  (panic → logged backtrace + 500 problem response)
//!     → status.rs    (innermost: records the handler's status)
//!     → DefaultBodyLimit (enforced when JsonBody buffers, 413 problem+json)
//!     → handler      (Result<_, ApiError> → problem+json on error)
//! ```
//!
//! # Design Decisions
//! - Stage order is fixed so logging sees the true status even after recovery
//! - Panics never escape the chain

pub mod logging;
pub mod recovery;
pub mod status;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::request::UuidRequestId;

pub use logging::log_requests;
pub use recovery::{install_panic_hook, recover_panics};
pub use status::{capture_status, CapturedStatus};

/// Wrap `router` in the full chain.
pub fn apply_chain(router: Router, max_body_size: usize) -> Router {
    install_panic_hook();

    router.layer(DefaultBodyLimit::max(max_body_size)).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(middleware::from_fn(log_requests))
            .layer(middleware::from_fn(recover_panics))
            .layer(middleware::from_fn(capture_status)),
    )
}
