//! Service aggregate and its partial update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::check::HealthCheck;
use crate::model::status::ServiceStatus;

/// A monitored entity: the unit of storage and of patch targeting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Service {
    /// Storage-assigned identifier. Ignored on create.
    #[serde(default)]
    pub id: i64,

    /// External handle used for every lookup.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: ServiceStatus,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default, rename = "health_checks")]
    pub checks: Vec<HealthCheck>,

    #[serde(default, rename = "feed")]
    pub outages: Vec<Outage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_checks(mut self, checks: Vec<HealthCheck>) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(&self) -> (&str, &BTreeSet<String>) {
        (&self.name, &self.tags)
    }

    /// Board view: the service without its checks.
    pub fn summary(&self) -> Service {
        Service {
            checks: Vec::new(),
            ..self.clone()
        }
    }

    /// Status implied by the check tree. Informational; never stored.
    pub fn derived_status(&self) -> ServiceStatus {
        self.checks
            .iter()
            .map(HealthCheck::worst_status)
            .reduce(|worst, s| if s.severity() > worst.severity() { s } else { worst })
            .map(ServiceStatus::from)
            .unwrap_or(ServiceStatus::Unknown)
    }
}

/// Scheduled or ongoing outage notice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outage {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub details: String,

    #[serde(default, rename = "scheduled_begin")]
    pub scheduled_start: String,

    #[serde(default, rename = "scheduled_end", alias = "schedule_end")]
    pub scheduled_end: String,
}

/// Field-level partial update. `None` fields keep the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServiceStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,

    #[serde(rename = "health_checks", skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,

    #[serde(rename = "feed", skip_serializing_if = "Option::is_none")]
    pub outages: Option<Vec<Outage>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl ServiceUpdate {
    /// Coalesce onto `service`. The id is never touched.
    pub fn apply_to(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(status) = self.status {
            service.status = status;
        }
        if let Some(tags) = self.tags {
            service.tags = tags;
        }
        if let Some(checks) = self.checks {
            service.checks = checks;
        }
        if let Some(outages) = self.outages {
            service.outages = outages;
        }
        if let Some(parent_id) = self.parent_id {
            service.parent_id = Some(parent_id);
        }
    }

    /// New name, if this update renames the service.
    pub fn rename_to(&self, current: &str) -> Option<&str> {
        self.name.as_deref().filter(|n| *n != current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::HealthCheckStatus;

    fn auth_service() -> Service {
        Service::new("Auth service")
            .with_tags(["Prod", "Auth"])
            .with_checks(vec![
                HealthCheck::new("Ping https", HealthCheckStatus::Ok),
                HealthCheck::new("Error Response Rate", HealthCheckStatus::Warn),
            ])
    }

    #[test]
    fn test_summary_drops_checks_only() {
        let svc = auth_service();
        let short = svc.summary();
        assert!(short.checks.is_empty());
        assert_eq!(short.name, svc.name);
        assert_eq!(short.tags, svc.tags);
    }

    #[test]
    fn test_derived_status() {
        assert_eq!(auth_service().derived_status(), ServiceStatus::Degraded);
        assert_eq!(Service::new("empty").derived_status(), ServiceStatus::Unknown);
    }

    #[test]
    fn test_update_coalesces_unset_fields() {
        let mut svc = auth_service();
        svc.id = 7;
        let update = ServiceUpdate {
            status: Some(ServiceStatus::Down),
            ..Default::default()
        };
        update.apply_to(&mut svc);

        assert_eq!(svc.id, 7);
        assert_eq!(svc.name, "Auth service");
        assert_eq!(svc.status, ServiceStatus::Down);
        assert_eq!(svc.checks.len(), 2);
        assert!(svc.tags.contains("Auth"));
    }

    #[test]
    fn test_update_json_rejects_bad_status() {
        let ok: ServiceUpdate = serde_json::from_str(r#"{"status": 2}"#).unwrap();
        assert_eq!(ok.status, Some(ServiceStatus::Down));
        assert!(ok.name.is_none());

        assert!(serde_json::from_str::<ServiceUpdate>(r#"{"status": 5}"#).is_err());
    }

    #[test]
    fn test_outage_accepts_legacy_end_key() {
        let outage: Outage =
            serde_json::from_str(r#"{"summary":"db","scheduled_begin":"a","schedule_end":"b"}"#).unwrap();
        assert_eq!(outage.scheduled_end, "b");
    }

    #[test]
    fn test_service_json_shape() {
        let json = serde_json::to_value(auth_service()).unwrap();
        assert_eq!(json["name"], "Auth service");
        assert_eq!(json["health_checks"][0]["title"], "Ping https");
        assert_eq!(json["tags"], serde_json::json!(["Auth", "Prod"]));
        assert!(json.get("parent_id").is_none());
    }
}
