//! Health-state data model.
//!
//! # Structure
//! ```text
//! Service (name, status, tags)
//!     ├── health_checks: [HealthCheck]
//!     │       └── rels: [HealthCheck] (recursive)
//!     └── feed: [Outage]
//!
//! Dependency: parent_id → child_id (edge between service ids)
//! ```
//!
//! # Design Decisions
//! - Status codes are closed enums; out-of-range integers are rejected
//! - Sibling check titles are unique; reconciliation matches by title
//! - `id` belongs to storage, `name` belongs to callers

pub mod check;
pub mod dependency;
pub mod service;
pub mod status;

pub use check::{CheckTreeError, HealthCheck};
pub use dependency::Dependency;
pub use service::{Outage, Service, ServiceUpdate};
pub use status::{HealthCheckStatus, InvalidStatus, ServiceStatus};
