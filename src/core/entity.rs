use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-scoped identifier of a math entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime math entity (variable, function, operator...) held by a registry.
///
/// Identity is the pair of a unique name and a unique id. The id is normally
/// assigned by the registry on insertion; an entity may carry a preset id,
/// which is kept as long as no other entity uses it.
pub trait MathEntity: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn id(&self) -> Option<EntityId>;

    /// Called once by the registry before the entity becomes visible.
    fn set_id(&mut self, id: EntityId);

    /// Built-in entities are never persisted and never removed.
    fn is_system(&self) -> bool;
}
