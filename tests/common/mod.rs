#![allow(dead_code)]

use mathreg::{
    EntitiesRegistry, EntityDao, EntityId, MathEntity, MemoryEntityDao, PersistedEntitiesContainer,
    PersistedEntity, RecordingErrorSink, RecordingNotifier, RegistryConfig, RegistryError,
    RegistryHooks, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Runtime variable: a name bound to an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub id: Option<EntityId>,
    pub name: String,
    pub expression: String,
    pub system: bool,
}

impl Var {
    pub fn user(name: &str, expression: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            expression: expression.to_string(),
            system: false,
        }
    }

    pub fn system(name: &str, expression: &str) -> Self {
        Self { system: true, ..Self::user(name, expression) }
    }
}

impl MathEntity for Var {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn is_system(&self) -> bool {
        self.system
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedVar {
    pub name: String,
    pub expression: String,
}

impl PersistedVar {
    pub fn new(name: &str, expression: &str) -> Self {
        Self { name: name.to_string(), expression: expression.to_string() }
    }
}

impl PersistedEntity for PersistedVar {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!("{} = {}", self.name, self.expression)
    }
}

/// Expressions containing `?` cannot be parsed; `ans*` variables are transient.
#[derive(Default)]
pub struct VarHooks {
    pub substitutes: HashMap<String, String>,
}

impl VarHooks {
    pub fn new() -> Self {
        Self { substitutes: HashMap::new() }
    }

    pub fn with_substitute(mut self, name: &str, legacy: &str) -> Self {
        self.substitutes.insert(name.to_string(), legacy.to_string());
        self
    }
}

impl RegistryHooks<Var, PersistedVar> for VarHooks {
    fn create_entity(&self, persisted: &PersistedVar) -> Result<Var> {
        if persisted.expression.contains('?') {
            return Err(RegistryError::Build {
                name: persisted.name.clone(),
                reason: format!("cannot parse '{}'", persisted.expression),
            });
        }
        Ok(Var::user(&persisted.name, &persisted.expression))
    }

    fn transform(&self, entity: &Var) -> Result<Option<PersistedVar>> {
        if entity.name.starts_with("ans") {
            return Ok(None);
        }
        if entity.expression.is_empty() {
            return Err(RegistryError::Transform {
                name: entity.name.clone(),
                reason: "empty expression".to_string(),
            });
        }
        Ok(Some(PersistedVar::new(&entity.name, &entity.expression)))
    }

    fn substitutes(&self) -> HashMap<String, String> {
        self.substitutes.clone()
    }
}

pub type VarRegistry = EntitiesRegistry<Var, PersistedVar, VarHooks>;

pub struct Fixture {
    pub registry: VarRegistry,
    pub dao: Arc<MemoryEntityDao<PersistedVar>>,
    pub sink: Arc<RecordingErrorSink>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn system_vars() -> Vec<Var> {
    vec![Var::system("pi", "3.14159"), Var::system("e", "2.71828")]
}

pub fn fixture_with(dao: Arc<MemoryEntityDao<PersistedVar>>) -> Fixture {
    let sink = Arc::new(RecordingErrorSink::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let registry = EntitiesRegistry::builder(VarHooks::new(), dao.clone())
        .config(RegistryConfig::new("vars", "c_var_"))
        .system_entities(system_vars())
        .error_sink(sink.clone())
        .notifier(notifier.clone())
        .build()
        .unwrap();
    Fixture { registry, dao, sink, notifier }
}

pub fn fixture_with_stored(vars: Vec<PersistedVar>) -> Fixture {
    let container = PersistedEntitiesContainer::with_entities(vars);
    fixture_with(Arc::new(MemoryEntityDao::with_container(&container).unwrap()))
}

pub fn user_names(registry: &VarRegistry) -> Vec<String> {
    registry
        .entities()
        .iter()
        .filter(|e| !e.is_system())
        .map(|e| e.name().to_string())
        .collect()
}

// ============================================================================
// Gateway doubles
// ============================================================================

/// Gateway whose writes always fail.
pub struct FailingDao;

impl EntityDao<PersistedVar> for FailingDao {
    fn load(&self) -> Option<PersistedEntitiesContainer<PersistedVar>> {
        None
    }

    fn save(&self, _container: &PersistedEntitiesContainer<PersistedVar>) -> Result<()> {
        Err(RegistryError::Storage("read-only medium".to_string()))
    }

    fn description(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Gateway recording the description keys it is asked for.
#[derive(Default)]
pub struct KeyRecordingDao {
    pub keys: Mutex<Vec<String>>,
}

impl EntityDao<PersistedVar> for KeyRecordingDao {
    fn load(&self) -> Option<PersistedEntitiesContainer<PersistedVar>> {
        None
    }

    fn save(&self, _container: &PersistedEntitiesContainer<PersistedVar>) -> Result<()> {
        Ok(())
    }

    fn description(&self, key: &str) -> Option<String> {
        self.keys.lock().unwrap().push(key.to_string());
        None
    }
}
