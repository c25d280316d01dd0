use crate::core::{EntityId, MathEntity, RegistryError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{Level, event};

const FIRST_ENTITY_ID: u32 = 1;

struct RegistryState<T> {
    /// Insertion order, system and user entities together
    entities: Vec<Arc<T>>,
    by_name: HashMap<String, Arc<T>>,
    by_id: HashMap<EntityId, Arc<T>>,
    next_id: u32,
}

impl<T: MathEntity> RegistryState<T> {
    fn position(&self, target: &Arc<T>) -> Option<usize> {
        self.entities.iter().position(|e| Arc::ptr_eq(e, target))
    }

    fn allocate_id(&mut self, preset: Option<EntityId>) -> Result<EntityId> {
        match preset {
            Some(id) => {
                if let Some(owner) = self.by_id.get(&id) {
                    return Err(RegistryError::IdConflict {
                        id: id.value(),
                        owner: owner.name().to_string(),
                    });
                }
                self.next_id = self.next_id.max(id.value().saturating_add(1));
                Ok(id)
            }
            None => {
                let id = EntityId(self.next_id);
                self.next_id = self.next_id.saturating_add(1);
                Ok(id)
            }
        }
    }

    fn insert(&mut self, mut entity: T) -> Result<Arc<T>> {
        let id = self.allocate_id(entity.id())?;
        entity.set_id(id);
        let entity = Arc::new(entity);
        let name = entity.name().to_string();
        self.entities.push(Arc::clone(&entity));
        self.by_name.insert(name.clone(), Arc::clone(&entity));
        self.by_id.insert(id, Arc::clone(&entity));
        event!(Level::DEBUG, entity = %name, id = %id, system = entity.is_system(), "entity added");
        Ok(entity)
    }
}

/// Thread-safe collection of math entities indexed by name and by id.
///
/// Readers never block each other; writers are serialized by the inner
/// `RwLock`. Registered entities are handed out as `Arc<T>` and are never
/// mutated in place.
pub struct MathRegistry<T: MathEntity> {
    state: RwLock<RegistryState<T>>,
}

impl<T: MathEntity> MathRegistry<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                entities: Vec::new(),
                by_name: HashMap::new(),
                by_id: HashMap::new(),
                next_id: FIRST_ENTITY_ID,
            }),
        }
    }

    pub fn with_entities<I>(entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let registry = Self::new();
        for entity in entities {
            registry.add(move || Ok(entity))?;
        }
        Ok(registry)
    }

    // Mutations never panic while holding the lock, so a poisoned state is
    // still consistent and safe to read.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new entity, or update a user entity registered under the
    /// same name (the registered id is kept).
    pub fn add<F>(&self, build: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut entity = build()?;
        let name = entity.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(name));
        }

        let mut state = self.state.write()?;

        if let Some(existing) = state.by_name.get(&name).cloned() {
            if existing.is_system() || entity.is_system() {
                return Err(RegistryError::EntityExists(name));
            }
            let id = existing
                .id()
                .ok_or_else(|| RegistryError::EntityNotFound(name.clone()))?;
            entity.set_id(id);
            let replacement = Arc::new(entity);
            if let Some(pos) = state.position(&existing) {
                state.entities[pos] = Arc::clone(&replacement);
            }
            state.by_name.insert(name.clone(), Arc::clone(&replacement));
            state.by_id.insert(id, Arc::clone(&replacement));
            event!(Level::DEBUG, entity = %name, id = %id, "entity updated");
            return Ok(replacement);
        }

        state.insert(entity)
    }

    /// Register a new entity without touching existing registrations.
    ///
    /// The name check and the insertion happen under one write lock, so a
    /// name registered concurrently is reported as `EntityExists`.
    pub fn insert<F>(&self, build: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let entity = build()?;
        let name = entity.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidName(name));
        }

        let mut state = self.state.write()?;
        if state.by_name.contains_key(&name) {
            return Err(RegistryError::EntityExists(name));
        }
        state.insert(entity)
    }

    /// Remove a user entity. The handle must refer to the registered entity
    /// (same name and id).
    pub fn remove(&self, entity: &T) -> Result<()> {
        let name = entity.name();
        let mut state = self.state.write()?;

        let registered = match state.by_name.get(name) {
            Some(registered) if registered.id() == entity.id() => Arc::clone(registered),
            _ => return Err(RegistryError::EntityNotFound(name.to_string())),
        };
        if registered.is_system() {
            return Err(RegistryError::SystemEntity(name.to_string()));
        }

        if let Some(pos) = state.position(&registered) {
            state.entities.remove(pos);
        }
        state.by_name.remove(name);
        if let Some(id) = registered.id() {
            state.by_id.remove(&id);
        }
        event!(Level::DEBUG, entity = %name, "entity removed");
        Ok(())
    }

    pub fn entities(&self) -> Vec<Arc<T>> {
        self.read().entities.clone()
    }

    pub fn system_entities(&self) -> Vec<Arc<T>> {
        self.read()
            .entities
            .iter()
            .filter(|e| e.is_system())
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.read()
            .entities
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.read().by_name.get(name).cloned()
    }

    pub fn get_by_id(&self, id: EntityId) -> Option<Arc<T>> {
        self.read().by_id.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: MathEntity> Default for MathRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
