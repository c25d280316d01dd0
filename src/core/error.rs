use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid entity name: {0}")]
    InvalidName(String),

    #[error("Entity '{0}' already exists")]
    EntityExists(String),

    #[error("Entity '{0}' not found")]
    EntityNotFound(String),

    #[error("Entity id {id} is already used by '{owner}'")]
    IdConflict { id: u32, owner: String },

    #[error("System entity '{0}' cannot be modified")]
    SystemEntity(String),

    #[error("Failed to build entity '{name}': {reason}")]
    Build { name: String, reason: String },

    #[error("Failed to transform entity '{name}': {reason}")]
    Transform { name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

impl<T> From<std::sync::PoisonError<T>> for RegistryError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for RegistryError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for RegistryError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
