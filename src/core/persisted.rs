use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const CONTAINER_FORMAT_VERSION: u32 = 1;

/// Serializable snapshot of the defining fields of one runtime entity.
pub trait PersistedEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Human readable form used when the record cannot be restored.
    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.name().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    pub entity_count: usize,
}

impl Default for ContainerMetadata {
    fn default() -> Self {
        Self {
            version: CONTAINER_FORMAT_VERSION,
            saved_at: None,
            entity_count: 0,
        }
    }
}

/// Ordered batch of persisted entities written and read as a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "P: PersistedEntity")]
pub struct PersistedEntitiesContainer<P: PersistedEntity> {
    pub metadata: ContainerMetadata,
    entities: Vec<P>,
}

impl<P: PersistedEntity> PersistedEntitiesContainer<P> {
    pub fn new() -> Self {
        Self {
            metadata: ContainerMetadata::default(),
            entities: Vec::new(),
        }
    }

    pub fn with_entities(entities: Vec<P>) -> Self {
        let mut container = Self::new();
        for entity in entities {
            container.push(entity);
        }
        container
    }

    pub fn push(&mut self, entity: P) {
        self.entities.push(entity);
        self.metadata.entity_count = self.entities.len();
    }

    pub fn entities(&self) -> &[P] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<P> {
        self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Stamp the container right before it is handed to storage.
    pub fn seal(&mut self) {
        self.metadata.saved_at = Some(Utc::now());
        self.metadata.entity_count = self.entities.len();
    }
}

impl<P: PersistedEntity> Default for PersistedEntitiesContainer<P> {
    fn default() -> Self {
        Self::new()
    }
}
