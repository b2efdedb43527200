//! Health check tree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::status::{HealthCheckStatus, InvalidStatus};

/// A named probe result, optionally composed of nested sub-checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthCheck {
    pub title: String,

    #[serde(default)]
    pub status: HealthCheckStatus,

    #[serde(default)]
    pub details: String,

    #[serde(default)]
    pub priority: i64,

    /// Sub-checks. No depth limit; cycles cannot be expressed by value.
    #[serde(default, rename = "rels")]
    pub children: Vec<HealthCheck>,
}

impl HealthCheck {
    pub fn new(title: impl Into<String>, status: HealthCheckStatus) -> Self {
        Self {
            title: title.into(),
            status,
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_children(mut self, children: Vec<HealthCheck>) -> Self {
        self.children = children;
        self
    }

    /// Apply a raw status value. The check is left untouched on error.
    pub fn set_status(&mut self, raw: i64) -> Result<(), InvalidStatus> {
        self.status = HealthCheckStatus::try_from(raw)?;
        Ok(())
    }

    /// Worst status found in this check and all of its descendants.
    pub fn worst_status(&self) -> HealthCheckStatus {
        self.children
            .iter()
            .map(HealthCheck::worst_status)
            .fold(self.status, |worst, s| {
                if s.severity() > worst.severity() { s } else { worst }
            })
    }
}

/// Structural problems in a check list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckTreeError {
    #[error("health check title must not be empty")]
    EmptyTitle,

    #[error("duplicate health check title {0:?}")]
    DuplicateTitle(String),
}

/// Verify every level of the tree has non-empty, sibling-unique titles.
pub fn validate_checks(checks: &[HealthCheck]) -> Result<(), CheckTreeError> {
    let mut seen = std::collections::HashSet::with_capacity(checks.len());
    for check in checks {
        if check.title.is_empty() {
            return Err(CheckTreeError::EmptyTitle);
        }
        if !seen.insert(check.title.as_str()) {
            return Err(CheckTreeError::DuplicateTitle(check.title.clone()));
        }
        validate_checks(&check.children)?;
    }
    Ok(())
}

/// First direct child with exactly this title. Nested checks are not searched.
pub fn find_by_title_mut<'a>(checks: &'a mut [HealthCheck], title: &str) -> Option<&'a mut HealthCheck> {
    checks.iter_mut().find(|c| c.title == title)
}
