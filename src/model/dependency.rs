use serde::{Deserialize, Serialize};

/// Directed edge: the service `child_id` depends on `parent_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub id: i64,
    pub parent_id: i64,
    pub child_id: i64,
}

impl Dependency {
    pub fn new(parent_id: i64, child_id: i64) -> Self {
        Self { id: 0, parent_id, child_id }
    }

    pub fn involves(&self, service_id: i64) -> bool {
        self.parent_id == service_id || self.child_id == service_id
    }
}
