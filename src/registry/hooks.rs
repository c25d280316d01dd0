use crate::core::{MathEntity, PersistedEntitiesContainer, PersistedEntity, Result};
use std::collections::HashMap;

/// Conversions between one kind of runtime entity and its persisted form.
///
/// A registry holds one implementation and drives it from `load` and `save`.
pub trait RegistryHooks<T: MathEntity, P: PersistedEntity>: Send + Sync {
    /// Rebuild a runtime entity from its persisted record. An error marks
    /// the record as unrecoverable; the load carries on with the next one.
    fn create_entity(&self, persisted: &P) -> Result<T>;

    /// Persisted form of a user entity, or `None` to leave it out of storage.
    fn transform(&self, entity: &T) -> Result<Option<P>>;

    fn create_container(&self) -> PersistedEntitiesContainer<P> {
        PersistedEntitiesContainer::new()
    }

    /// Current name -> legacy name, consulted by description lookups only.
    fn substitutes(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
