//! Check-status reconciliation.
//!
//! Applies a batch of `{title, status}` patches to one service. Titles are
//! matched exactly against the service's direct checks; the first match wins.
//!
//! ```text
//! for each patch check:
//!     matched + valid status   → apply, continue
//!     matched + invalid status → persist what was applied so far, abort
//!     no match                 → record FailedUpdate, continue
//! persist once
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::model::check::find_by_title_mut;
use crate::model::{HealthCheck, InvalidStatus};
use crate::observability::metrics;
use crate::store::{ServiceRepository, StoreError};

/// Request body of the PATCH endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusPatch {
    /// Target service name.
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "health_checks")]
    pub checks: Vec<CheckPatch>,
}

/// One requested status change. The status stays a raw integer so that
/// out-of-range values reach the reconciler instead of failing decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckPatch {
    pub title: String,
    pub status: i64,
    #[serde(default)]
    pub details: String,
}

/// A patch check that matched nothing on the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpdate {
    pub service_name: String,
    pub check_title: String,
    pub check_details: String,
}

/// Result of a reconciliation that was not aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub service: String,
    pub applied: usize,
    pub health_checks: Vec<HealthCheck>,
    pub failed_updates: Vec<FailedUpdate>,
}

impl ReconcileOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failed_updates.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Service {0} is not supported, please create this service first")]
    ServiceNotFound(String),

    #[error("check {title:?} of service {service:?}: {source}")]
    InvalidStatus {
        service: String,
        title: String,
        #[source]
        source: InvalidStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies [`StatusPatch`]es against a repository.
#[derive(Clone)]
pub struct Reconciler {
    services: Arc<dyn ServiceRepository>,
}

impl Reconciler {
    pub fn new(services: Arc<dyn ServiceRepository>) -> Self {
        Self { services }
    }

    pub async fn reconcile(&self, target: &str, patch: &StatusPatch) -> Result<ReconcileOutcome, ReconcileError> {
        let mut service = self
            .services
            .get(target)
            .await?
            .ok_or_else(|| ReconcileError::ServiceNotFound(target.to_string()))?;

        let mut applied = 0;
        let mut failed_updates = Vec::new();

        for patch_check in &patch.checks {
            let Some(check) = find_by_title_mut(&mut service.checks, &patch_check.title) else {
                tracing::warn!(
                    service = %target,
                    check = %patch_check.title,
                    "No check with this title, skipping"
                );
                failed_updates.push(FailedUpdate {
                    service_name: target.to_string(),
                    check_title: patch_check.title.clone(),
                    check_details: patch_check.details.clone(),
                });
                continue;
            };

            if let Err(source) = check.set_status(patch_check.status) {
                // Earlier patches in this call stay applied.
                if applied > 0 {
                    self.persist(target, service.checks.clone()).await?;
                }
                metrics::record_reconcile("invalid_status", applied, failed_updates.len());
                return Err(ReconcileError::InvalidStatus {
                    service: target.to_string(),
                    title: patch_check.title.clone(),
                    source,
                });
            }
            applied += 1;
        }

        if applied > 0 {
            self.persist(target, service.checks.clone()).await?;
        }

        let outcome = ReconcileOutcome {
            service: target.to_string(),
            applied,
            health_checks: service.checks,
            failed_updates,
        };
        let label = if outcome.is_partial() { "partial" } else { "applied" };
        metrics::record_reconcile(label, applied, outcome.failed_updates.len());
        tracing::info!(
            service = %target,
            applied,
            failed = outcome.failed_updates.len(),
            "Reconciled check statuses"
        );
        Ok(outcome)
    }

    async fn persist(&self, target: &str, checks: Vec<HealthCheck>) -> Result<(), ReconcileError> {
        if self.services.replace_checks(target, checks).await? {
            Ok(())
        } else {
            // Deleted between load and write.
            Err(ReconcileError::ServiceNotFound(target.to_string()))
        }
    }
}
