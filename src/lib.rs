//! Service status board library.

pub mod api;
pub mod board;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod store;

pub use board::{Reconciler, ServiceCatalog};
pub use config::BoardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
