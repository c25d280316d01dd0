//! Everything needed to define entity kinds and run a registry.
//!
//! ```
//! use mathreg::prelude::*;
//! ```

pub use crate::core::{
    EntityId, MathEntity, PersistedEntitiesContainer, PersistedEntity, RegistryError, Result,
};
pub use crate::registry::{EntitiesRegistry, LoadReport, RegistryConfig, RegistryHooks, SaveReport};
pub use crate::report::{ErrorSink, MessageCode, MessageSeverity, UserMessage, UserNotifier};
pub use crate::storage::{EntityDao, MathRegistry, MemoryEntityDao};
