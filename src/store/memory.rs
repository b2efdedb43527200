//! In-memory repository with JSON snapshot persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{Dependency, HealthCheck, Service, ServiceUpdate};
use crate::store::{DependencyRepository, ServiceRepository, StoreError};

/// Services ordered by id with a name index.
#[derive(Debug)]
struct ServiceTable {
    next_id: i64,
    by_id: BTreeMap<i64, Service>,
    ids: HashMap<String, i64>,
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            by_id: BTreeMap::new(),
            ids: HashMap::new(),
        }
    }
}

impl ServiceTable {
    fn get_mut(&mut self, name: &str) -> Option<&mut Service> {
        let id = *self.ids.get(name)?;
        self.by_id.get_mut(&id)
    }

    fn insert(&mut self, mut service: Service) -> Result<i64, StoreError> {
        if self.ids.contains_key(&service.name) {
            return Err(StoreError::Conflict(service.name));
        }
        let id = self.next_id;
        self.next_id += 1;
        service.id = id;
        self.ids.insert(service.name.clone(), id);
        self.by_id.insert(id, service);
        Ok(id)
    }
}

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    services: Vec<Service>,
    dependencies: Vec<Dependency>,
}

/// A thread-safe in-process repository.
///
/// Services live behind a single lock so renames stay atomic with respect to
/// the name index. Dependencies are independent rows in a concurrent map.
#[derive(Debug)]
pub struct MemoryStore {
    services: RwLock<ServiceTable>,
    dependencies: DashMap<i64, Dependency>,
    next_dependency_id: AtomicI64,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MemoryStore {
    /// Create an empty store. `snapshot_path` is where [`save_to_file`](Self::save_to_file) writes.
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            services: RwLock::new(ServiceTable::default()),
            dependencies: DashMap::new(),
            next_dependency_id: AtomicI64::new(1),
            snapshot_path,
        }
    }

    /// Load from a snapshot file if it exists, otherwise start empty.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if !path.exists() {
            return Ok(store);
        }

        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;

        {
            let mut table = store.write()?;
            for service in snapshot.services {
                let id = service.id;
                if table.ids.contains_key(&service.name) || table.by_id.contains_key(&id) {
                    return Err(StoreError::Conflict(service.name));
                }
                table.next_id = table.next_id.max(id + 1);
                table.ids.insert(service.name.clone(), id);
                table.by_id.insert(id, service);
            }
        }

        let mut next_dep = 1;
        for dep in snapshot.dependencies {
            next_dep = next_dep.max(dep.id + 1);
            store.dependencies.insert(dep.id, dep);
        }
        store.next_dependency_id.store(next_dep, Ordering::SeqCst);

        tracing::info!(
            path = %path.display(),
            services = store.service_count(),
            dependencies = store.dependencies.len(),
            "Loaded snapshot"
        );
        Ok(store)
    }

    /// Write a snapshot if a path was configured.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let services: Vec<Service> = self.read()?.by_id.values().cloned().collect();
        let mut dependencies: Vec<Dependency> = self.dependencies.iter().map(|r| *r.value()).collect();
        dependencies.sort_by_key(|d| d.id);

        let snapshot = Snapshot { services, dependencies };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &snapshot)?;

        tracing::info!(
            path = %path.display(),
            services = snapshot.services.len(),
            "Saved snapshot"
        );
        Ok(())
    }

    pub fn service_count(&self) -> usize {
        self.services.read().map(|t| t.by_id.len()).unwrap_or_default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ServiceTable>, StoreError> {
        self.services
            .read()
            .map_err(|_| StoreError::Backend("service table lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ServiceTable>, StoreError> {
        self.services
            .write()
            .map_err(|_| StoreError::Backend("service table lock poisoned".into()))
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn all(&self) -> Result<Vec<Service>, StoreError> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    async fn create(&self, service: Service) -> Result<i64, StoreError> {
        self.write()?.insert(service)
    }

    async fn get(&self, name: &str) -> Result<Option<Service>, StoreError> {
        let table = self.read()?;
        Ok(table.ids.get(name).and_then(|id| table.by_id.get(id)).cloned())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Service>, StoreError> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    async fn update(&self, name: &str, update: ServiceUpdate) -> Result<bool, StoreError> {
        let mut table = self.write()?;
        let Some(&id) = table.ids.get(name) else {
            return Ok(false);
        };

        if let Some(new_name) = update.rename_to(name) {
            if table.ids.contains_key(new_name) {
                return Err(StoreError::Conflict(new_name.to_string()));
            }
            let new_name = new_name.to_string();
            table.ids.remove(name);
            table.ids.insert(new_name, id);
        }

        match table.by_id.get_mut(&id) {
            Some(service) => {
                update.apply_to(service);
                Ok(true)
            }
            None => Err(StoreError::Backend(format!("name index points at missing id {}", id))),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut table = self.write()?;
        match table.ids.remove(name) {
            Some(id) => Ok(table.by_id.remove(&id).is_some()),
            None => Ok(false),
        }
    }

    async fn replace_checks(&self, name: &str, checks: Vec<HealthCheck>) -> Result<bool, StoreError> {
        let mut table = self.write()?;
        match table.get_mut(name) {
            Some(service) => {
                service.checks = checks;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl DependencyRepository for MemoryStore {
    async fn dependencies_of(&self, service_id: i64) -> Result<Vec<Dependency>, StoreError> {
        let mut deps: Vec<Dependency> = self
            .dependencies
            .iter()
            .filter(|r| r.value().involves(service_id))
            .map(|r| *r.value())
            .collect();
        deps.sort_by_key(|d| d.id);
        Ok(deps)
    }

    async fn add_dependency(&self, mut dependency: Dependency) -> Result<i64, StoreError> {
        let id = self.next_dependency_id.fetch_add(1, Ordering::SeqCst);
        dependency.id = id;
        self.dependencies.insert(id, dependency);
        Ok(id)
    }

    async fn remove_dependency(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.dependencies.remove(&id).is_some())
    }
}
