//! Service and dependency CRUD facade.

use std::sync::Arc;
use thiserror::Error;

use crate::model::check::validate_checks;
use crate::model::{Dependency, Service, ServiceUpdate};
use crate::store::{DependencyRepository, ServiceRepository, StoreError};

/// Errors surfaced by [`ServiceCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Service with title {0} doesn't exist")]
    NotFound(String),

    #[error("Service with id {0} doesn't exist")]
    UnknownId(i64),

    #[error("{0}")]
    Validation(String),

    #[error("service {0:?} already exists")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(name) => CatalogError::Conflict(name),
            other => CatalogError::Store(other),
        }
    }
}

/// Thin translation layer between handlers and the repositories.
#[derive(Clone)]
pub struct ServiceCatalog {
    services: Arc<dyn ServiceRepository>,
    dependencies: Arc<dyn DependencyRepository>,
}

impl ServiceCatalog {
    pub fn new(services: Arc<dyn ServiceRepository>, dependencies: Arc<dyn DependencyRepository>) -> Self {
        Self { services, dependencies }
    }

    /// Use one backend for both aggregates.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ServiceRepository + DependencyRepository + 'static,
    {
        Self {
            services: store.clone(),
            dependencies: store,
        }
    }

    pub fn services(&self) -> Arc<dyn ServiceRepository> {
        self.services.clone()
    }

    pub async fn all(&self) -> Result<Vec<Service>, CatalogError> {
        Ok(self.services.all().await?)
    }

    pub async fn create(&self, service: Service) -> Result<i64, CatalogError> {
        if service.name.is_empty() {
            return Err(CatalogError::Validation("service name must not be empty".into()));
        }
        validate_checks(&service.checks).map_err(|e| CatalogError::Validation(e.to_string()))?;

        let name = service.name.clone();
        let id = self.services.create(service).await?;
        tracing::info!(service = %name, id, "Service created");
        Ok(id)
    }

    pub async fn get(&self, name: &str) -> Result<Service, CatalogError> {
        self.services
            .get(name)
            .await?
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Partial update. `Ok(false)` when no service has this name.
    pub async fn update(&self, name: &str, update: ServiceUpdate) -> Result<bool, CatalogError> {
        if update.name.as_deref() == Some("") {
            return Err(CatalogError::Validation("service name must not be empty".into()));
        }
        if let Some(checks) = &update.checks {
            validate_checks(checks).map_err(|e| CatalogError::Validation(e.to_string()))?;
        }

        let applied = self.services.update(name, update).await?;
        if applied {
            tracing::info!(service = %name, "Service updated");
        }
        Ok(applied)
    }

    /// `Ok(false)` when no service has this name.
    pub async fn delete(&self, name: &str) -> Result<bool, CatalogError> {
        let deleted = self.services.delete(name).await?;
        if deleted {
            tracing::info!(service = %name, "Service deleted");
        }
        Ok(deleted)
    }

    /// Edges touching the named service.
    pub async fn dependencies(&self, name: &str) -> Result<Vec<Dependency>, CatalogError> {
        let service = self.get(name).await?;
        Ok(self.dependencies.dependencies_of(service.id).await?)
    }

    pub async fn add_dependency(&self, dependency: Dependency) -> Result<i64, CatalogError> {
        if dependency.parent_id == dependency.child_id {
            return Err(CatalogError::Validation(format!(
                "service {} cannot depend on itself",
                dependency.parent_id
            )));
        }
        for service_id in [dependency.parent_id, dependency.child_id] {
            if self.services.get_by_id(service_id).await?.is_none() {
                return Err(CatalogError::UnknownId(service_id));
            }
        }
        let id = self.dependencies.add_dependency(dependency).await?;
        tracing::info!(
            id,
            parent_id = dependency.parent_id,
            child_id = dependency.child_id,
            "Dependency created"
        );
        Ok(id)
    }

    pub async fn remove_dependency(&self, id: i64) -> Result<bool, CatalogError> {
        Ok(self.dependencies.remove_dependency(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HealthCheck, HealthCheckStatus, ServiceStatus};
    use crate::store::MemoryStore;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::from_store(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let catalog = catalog();
        let mut input = Service::new("NFS share").with_tags(["Prod", "Infra", "Storage"]);
        input.status = ServiceStatus::Degraded;

        let id = catalog.create(input.clone()).await.unwrap();
        let fetched = catalog.get("NFS share").await.unwrap();

        assert!(id >= 0);
        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.status, input.status);
        assert_eq!(fetched.tags, input.tags);
        assert_eq!(fetched.id, id);
        assert_eq!(catalog.get("NFS share").await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let catalog = catalog();
        assert!(matches!(
            catalog.create(Service::new("")).await,
            Err(CatalogError::Validation(_))
        ));

        let dup = Service::new("x").with_checks(vec![
            HealthCheck::new("Ping", HealthCheckStatus::Ok),
            HealthCheck::new("Ping", HealthCheckStatus::Ok),
        ]);
        assert!(matches!(catalog.create(dup).await, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let catalog = catalog();
        catalog.create(Service::new("a")).await.unwrap();
        assert!(matches!(
            catalog.create(Service::new("a")).await,
            Err(CatalogError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        assert!(matches!(catalog().get("ghost").await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_unmatched_is_not_an_error() {
        let catalog = catalog();
        assert!(!catalog.update("ghost", ServiceUpdate::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let catalog = catalog();
        catalog.create(Service::new("a")).await.unwrap();
        assert!(catalog.delete("a").await.unwrap());
        assert!(!catalog.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_dependencies_by_name() {
        let catalog = catalog();
        let a = catalog.create(Service::new("a")).await.unwrap();
        let b = catalog.create(Service::new("b")).await.unwrap();

        assert!(matches!(
            catalog.add_dependency(Dependency::new(a, a)).await,
            Err(CatalogError::Validation(_))
        ));

        let id = catalog.add_dependency(Dependency::new(a, b)).await.unwrap();
        let deps = catalog.dependencies("b").await.unwrap();
        assert_eq!(deps, vec![Dependency { id, parent_id: a, child_id: b }]);
        assert!(matches!(catalog.dependencies("ghost").await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dependency_endpoints_must_exist() {
        let catalog = catalog();
        assert!(matches!(
            catalog.add_dependency(Dependency::new(4242, 9999)).await,
            Err(CatalogError::UnknownId(4242))
        ));

        let a = catalog.create(Service::new("a")).await.unwrap();
        assert!(matches!(
            catalog.add_dependency(Dependency::new(a, 9999)).await,
            Err(CatalogError::UnknownId(9999))
        ));
        assert!(catalog.dependencies("a").await.unwrap().is_empty());

        // Edges survive a later delete; they are never cascaded.
        let b = catalog.create(Service::new("b")).await.unwrap();
        catalog.add_dependency(Dependency::new(a, b)).await.unwrap();
        catalog.delete("a").await.unwrap();
        assert_eq!(catalog.dependencies("b").await.unwrap().len(), 1);
    }
}
