use crate::core::{RegistryError, Result};

/// Entities registry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry name, used in log fields
    pub name: String,

    /// Namespace prepended to entity names when looking up descriptions
    pub prefix: String,

    /// Send one user notification when persisted entities fail to load
    pub notify_on_load_failure: bool,
}

impl RegistryConfig {
    /// Create a new registry configuration
    pub fn new(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            notify_on_load_failure: true,
        }
    }

    /// Set the registry name
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the description prefix
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Enable or disable the aggregate load-failure notification
    pub fn notify_on_load_failure(mut self, enabled: bool) -> Self {
        self.notify_on_load_failure = enabled;
        self
    }

    /// Full description key for an entity name
    pub fn description_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidName(
                "registry name cannot be empty".to_string(),
            ));
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(format!(
                "prefix '{}' cannot contain whitespace",
                self.prefix
            )));
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new("entities", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.name, "entities");
        assert_eq!(config.prefix, "");
        assert!(config.notify_on_load_failure);
    }

    #[test]
    fn test_builder_pattern() {
        let config = RegistryConfig::default()
            .name("functions")
            .prefix("c_fun_description_")
            .notify_on_load_failure(false);

        assert_eq!(config.name, "functions");
        assert_eq!(config.description_key("sin"), "c_fun_description_sin");
        assert!(!config.notify_on_load_failure);
    }

    #[test]
    fn test_validate() {
        assert!(RegistryConfig::new("vars", "c_var_").validate().is_ok());
        assert!(RegistryConfig::new(" ", "c_var_").validate().is_err());
        assert!(RegistryConfig::new("vars", "c var").validate().is_err());
    }
}
