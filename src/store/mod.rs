//! Repository contract.
//!
//! # Data Flow
//! ```text
//! catalog / reconciler
//!     → Arc<dyn ServiceRepository>     (lookup by name, id assigned on create)
//!     → Arc<dyn DependencyRepository>  (edges between service ids)
//!     → backend (memory.rs: locked tables + optional JSON snapshot)
//! ```
//!
//! # Design Decisions
//! - Lookups return `Option`; absence is not an error at this layer
//! - Update/delete report whether a row matched instead of failing
//! - Every call is atomic; concurrent writers to one name are last-write-wins
//! - Dependencies are never cascaded when services change

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Dependency, HealthCheck, Service, ServiceUpdate};

pub use memory::MemoryStore;

/// Errors raised by a repository backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A service with this name already exists.
    #[error("service {0:?} already exists")]
    Conflict(String),

    /// The backend itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Persistence of [`Service`] aggregates, addressed by name.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Every service, in storage order.
    async fn all(&self) -> Result<Vec<Service>, StoreError>;

    /// Store a new service and return its assigned id.
    async fn create(&self, service: Service) -> Result<i64, StoreError>;

    async fn get(&self, name: &str) -> Result<Option<Service>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Service>, StoreError>;

    /// Coalesce `update` onto the named service. `Ok(false)` if no row matched.
    async fn update(&self, name: &str, update: ServiceUpdate) -> Result<bool, StoreError>;

    /// `Ok(false)` if no row matched.
    async fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Overwrite the check list in a single write. `Ok(false)` if no row matched.
    async fn replace_checks(&self, name: &str, checks: Vec<HealthCheck>) -> Result<bool, StoreError>;
}

/// Persistence of [`Dependency`] edges, addressed by id.
#[async_trait]
pub trait DependencyRepository: Send + Sync {
    /// Edges where the service is either parent or child.
    async fn dependencies_of(&self, service_id: i64) -> Result<Vec<Dependency>, StoreError>;

    async fn add_dependency(&self, dependency: Dependency) -> Result<i64, StoreError>;

    /// `Ok(false)` if no edge had this id.
    async fn remove_dependency(&self, id: i64) -> Result<bool, StoreError>;
}
