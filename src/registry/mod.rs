pub mod config;
pub mod entities;
pub mod hooks;

pub use config::RegistryConfig;
pub use entities::{EntitiesRegistry, EntitiesRegistryBuilder, LoadReport, SaveReport};
pub use hooks::RegistryHooks;
