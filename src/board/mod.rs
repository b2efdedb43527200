//! Status board core.
//!
//! # Data Flow
//! ```text
//! CRUD request   → catalog.rs   → ServiceRepository / DependencyRepository
//! PATCH request  → reconcile.rs → ServiceRepository (load, match, write once)
//! ```
//!
//! # Design Decisions
//! - Repositories are injected as trait objects; no global state
//! - Check-not-found is a partial failure carried in the outcome, never an error
//! - Invalid status aborts the remaining patches without rolling back earlier ones

pub mod catalog;
pub mod reconcile;

pub use catalog::{CatalogError, ServiceCatalog};
pub use reconcile::{CheckPatch, FailedUpdate, ReconcileError, ReconcileOutcome, Reconciler, StatusPatch};
