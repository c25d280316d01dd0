//! Persistence gateway between a registry and durable storage

use crate::core::{PersistedEntitiesContainer, PersistedEntity, RegistryError, Result};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};
use tracing::{Level, event};

/// Reads and writes the persisted form of a registry.
///
/// `load` must not fail: an implementation that cannot read its medium logs
/// the problem and reports that no container is available.
pub trait EntityDao<P: PersistedEntity>: Send + Sync {
    fn load(&self) -> Option<PersistedEntitiesContainer<P>>;

    fn save(&self, container: &PersistedEntitiesContainer<P>) -> Result<()>;

    fn description(&self, key: &str) -> Option<String>;
}

// ============================================================================
// In-process gateway
// ============================================================================

/// Gateway keeping the last saved container as MessagePack bytes.
///
/// Every `load` decodes a fresh copy, so nothing saved is ever aliased by a
/// registry. Several registries may share one instance behind an `Arc`.
pub struct MemoryEntityDao<P: PersistedEntity> {
    snapshot: RwLock<Option<Vec<u8>>>,
    descriptions: HashMap<String, String>,
    _entity: PhantomData<fn() -> P>,
}

impl<P: PersistedEntity> MemoryEntityDao<P> {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            descriptions: HashMap::new(),
            _entity: PhantomData,
        }
    }

    /// Start from a previously saved container.
    pub fn with_container(container: &PersistedEntitiesContainer<P>) -> Result<Self> {
        let dao = Self::new();
        dao.save(container)?;
        Ok(dao)
    }

    /// Start from raw bytes, e.g. a snapshot produced by an older build.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            snapshot: RwLock::new(Some(bytes)),
            ..Self::new()
        }
    }

    pub fn with_description(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.descriptions.insert(key.into(), text.into());
        self
    }

    pub fn with_descriptions<I, K, V>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.descriptions
            .extend(descriptions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn snapshot_bytes(&self) -> Option<Vec<u8>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) -> Result<()> {
        *self.snapshot.write()? = None;
        Ok(())
    }
}

impl<P: PersistedEntity> Default for MemoryEntityDao<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PersistedEntity> EntityDao<P> for MemoryEntityDao<P> {
    fn load(&self) -> Option<PersistedEntitiesContainer<P>> {
        let bytes = self.snapshot_bytes()?;
        match rmp_serde::from_slice::<PersistedEntitiesContainer<P>>(&bytes) {
            Ok(container) => Some(container),
            Err(err) => {
                event!(Level::ERROR, error = %err, "stored entities could not be decoded");
                None
            }
        }
    }

    fn save(&self, container: &PersistedEntitiesContainer<P>) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(container)?;
        let mut snapshot = self.snapshot.write().map_err(RegistryError::from)?;
        *snapshot = Some(bytes);
        event!(Level::DEBUG, entities = container.len(), "entities stored");
        Ok(())
    }

    fn description(&self, key: &str) -> Option<String> {
        self.descriptions.get(key).cloned()
    }
}
