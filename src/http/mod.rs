//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful shutdown)
//!     → middleware/ (request ID, logging, panic recovery, status capture)
//!     → api handlers (request.rs decodes bodies)
//!     → error.rs (ApiError → application/problem+json)
//!     → Send to client
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{JsonBody, PathParam, QueryParams, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
