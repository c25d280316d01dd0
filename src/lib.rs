// ============================================================================
// mathreg Library
// ============================================================================

//! Registries of math entities (variables, functions, operators) kept in
//! sync with persistent storage.
//!
//! A [`MathRegistry`] indexes runtime entities by name and id. An
//! [`EntitiesRegistry`] wraps one and reconciles it with an [`EntityDao`]:
//! `load` restores persisted entities without touching existing ones and
//! survives broken records, `save` writes every user entity back in a single
//! batch.
//!
//! # Examples
//!
//! ```
//! use mathreg::prelude::*;
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! struct Var { id: Option<EntityId>, name: String, value: f64, system: bool }
//!
//! impl MathEntity for Var {
//!     fn name(&self) -> &str { &self.name }
//!     fn id(&self) -> Option<EntityId> { self.id }
//!     fn set_id(&mut self, id: EntityId) { self.id = Some(id); }
//!     fn is_system(&self) -> bool { self.system }
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct PersistedVar { name: String, value: f64 }
//!
//! impl PersistedEntity for PersistedVar {
//!     fn name(&self) -> &str { &self.name }
//! }
//!
//! struct VarHooks;
//!
//! impl RegistryHooks<Var, PersistedVar> for VarHooks {
//!     fn create_entity(&self, p: &PersistedVar) -> Result<Var> {
//!         Ok(Var { id: None, name: p.name.clone(), value: p.value, system: false })
//!     }
//!     fn transform(&self, v: &Var) -> Result<Option<PersistedVar>> {
//!         Ok(Some(PersistedVar { name: v.name.clone(), value: v.value }))
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let dao: Arc<MemoryEntityDao<PersistedVar>> = Arc::new(MemoryEntityDao::new());
//! let vars = EntitiesRegistry::builder(VarHooks, dao.clone())
//!     .config(RegistryConfig::new("vars", "c_var_"))
//!     .system_entities([Var { id: None, name: "pi".into(), value: 3.5, system: true }])
//!     .build()?;
//!
//! vars.add(|| Ok(Var { id: None, name: "x".into(), value: 2.0, system: false }))?;
//! vars.save()?;
//!
//! let restored = EntitiesRegistry::builder(VarHooks, dao).build()?;
//! restored.load();
//! assert!(restored.contains("x"));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod storage;

pub use core::{
    ContainerMetadata, EntityId, MathEntity, PersistedEntitiesContainer, PersistedEntity,
    RegistryError, Result,
};
pub use registry::{
    EntitiesRegistry, EntitiesRegistryBuilder, LoadReport, RegistryConfig, RegistryHooks,
    SaveReport,
};
pub use report::{
    ErrorSink, MessageCode, MessageSeverity, RecordingErrorSink, RecordingNotifier,
    TracingErrorSink, TracingNotifier, UserMessage, UserNotifier,
};
pub use storage::{EntityDao, MathRegistry, MemoryEntityDao};
