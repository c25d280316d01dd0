pub mod entity;
pub mod error;
pub mod persisted;

pub use entity::{EntityId, MathEntity};
pub use error::{RegistryError, Result};
pub use persisted::{
    CONTAINER_FORMAT_VERSION, ContainerMetadata, PersistedEntitiesContainer, PersistedEntity,
};
