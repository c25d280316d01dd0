use super::{RegistryConfig, RegistryHooks};
use crate::core::{EntityId, MathEntity, PersistedEntity, RegistryError, Result};
use crate::report::{
    ErrorSink, MessageCode, TracingErrorSink, TracingNotifier, UserMessage, UserNotifier,
};
use crate::storage::{EntityDao, MathRegistry};
use serde_json::json;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{Level, event, info_span};

/// Outcome of [`EntitiesRegistry::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names registered by this load, in storage order
    pub loaded: Vec<String>,
    /// Names already registered before the load
    pub skipped: Vec<String>,
    /// Descriptions of records that could not be restored
    pub failed: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`EntitiesRegistry::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Records written to storage
    pub saved: usize,
    /// User entities the hooks chose not to persist
    pub omitted: Vec<String>,
}

/// Math registry kept in sync with persistent storage.
///
/// `load` and `save` are serialized by an instance-scoped lock; lookups go
/// straight to the underlying [`MathRegistry`] and never wait for them.
pub struct EntitiesRegistry<T, P, H>
where
    T: MathEntity,
    P: PersistedEntity,
    H: RegistryHooks<T, P>,
{
    config: RegistryConfig,
    registry: MathRegistry<T>,
    hooks: H,
    dao: Arc<dyn EntityDao<P>>,
    error_sink: Arc<dyn ErrorSink>,
    notifier: Arc<dyn UserNotifier>,
    sync: Mutex<()>,
}

impl<T, P, H> EntitiesRegistry<T, P, H>
where
    T: MathEntity,
    P: PersistedEntity,
    H: RegistryHooks<T, P>,
{
    pub fn builder(hooks: H, dao: Arc<dyn EntityDao<P>>) -> EntitiesRegistryBuilder<T, P, H> {
        EntitiesRegistryBuilder::new(hooks, dao)
    }

    /// Restore persisted entities that are not registered yet.
    ///
    /// Records that fail to build or register are reported one by one to the
    /// error sink and once, together, to the user. Never fails as a whole.
    pub fn load(&self) -> LoadReport {
        let span = info_span!("registry.load", registry = %self.config.name);
        let _enter = span.enter();
        // The guarded value is `()`, a panic in a hook cannot leave it broken.
        let _guard = self.sync.lock().unwrap_or_else(PoisonError::into_inner);

        let mut report = LoadReport::default();
        let Some(container) = self.dao.load() else {
            event!(Level::DEBUG, "no persisted entities");
            return report;
        };

        let mut not_restored: Vec<P> = Vec::new();
        for persisted in container.into_entities() {
            let name = persisted.name().to_string();
            if self.registry.contains(&name) {
                report.skipped.push(name);
                continue;
            }

            match self.registry.insert(|| self.create_entity(&persisted)) {
                Ok(_) => report.loaded.push(name),
                Err(err) => {
                    event!(
                        Level::WARN,
                        entity = %name,
                        error = %err,
                        "persisted entity not restored"
                    );
                    self.error_sink.on_error(&err);
                    not_restored.push(persisted);
                }
            }
        }

        if !not_restored.is_empty() {
            report.failed = not_restored.iter().map(PersistedEntity::describe).collect();
            self.notify_not_restored(&report.failed);
        }

        event!(
            Level::INFO,
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "entities loaded"
        );
        report
    }

    // Corrupt records can make a hook panic; that costs the record, not the load.
    fn create_entity(&self, persisted: &P) -> Result<T> {
        let built = panic::catch_unwind(AssertUnwindSafe(|| self.hooks.create_entity(persisted)));
        built.unwrap_or_else(|payload| {
            Err(RegistryError::Build {
                name: persisted.name().to_string(),
                reason: format!("builder panicked: {}", panic_message(payload.as_ref())),
            })
        })
    }

    fn notify_not_restored(&self, descriptions: &[String]) {
        if !self.config.notify_on_load_failure {
            return;
        }

        let mut text = String::with_capacity(descriptions.len() * 100);
        for description in descriptions {
            text.push_str(description);
            text.push_str("\n\n");
        }
        let message =
            UserMessage::error(MessageCode::EntitiesNotRestored, text).with_payload(json!({
                "registry": self.config.name,
                "count": descriptions.len(),
            }));

        let sent = panic::catch_unwind(AssertUnwindSafe(|| self.notifier.notify(message)))
            .unwrap_or_else(|payload| {
                Err(RegistryError::Notification(format!(
                    "notifier panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
        if let Err(err) = sent {
            event!(Level::ERROR, error = %err, "load failure notification failed");
            self.error_sink.on_error(&err);
        }
    }

    /// Write every user entity to storage in one batch.
    ///
    /// Any transform or storage error aborts the save and is returned.
    pub fn save(&self) -> Result<SaveReport> {
        let span = info_span!("registry.save", registry = %self.config.name);
        let _enter = span.enter();
        let _guard = self.sync.lock().unwrap_or_else(PoisonError::into_inner);

        let mut container = self.hooks.create_container();
        let mut report = SaveReport::default();

        for entity in self.registry.entities() {
            if entity.is_system() {
                continue;
            }
            match self.hooks.transform(&entity) {
                Ok(Some(persisted)) => {
                    container.push(persisted);
                    report.saved += 1;
                }
                Ok(None) => report.omitted.push(entity.name().to_string()),
                Err(err) => {
                    event!(
                        Level::ERROR,
                        entity = %entity.name(),
                        error = %err,
                        "entity transform failed"
                    );
                    return Err(err);
                }
            }
        }

        container.seal();
        if let Err(err) = self.dao.save(&container) {
            event!(Level::ERROR, error = %err, "entities save failed");
            return Err(err);
        }

        event!(
            Level::INFO,
            saved = report.saved,
            omitted = report.omitted.len(),
            "entities saved"
        );
        Ok(report)
    }

    /// Description of an entity, looked up under its legacy name if it has one.
    pub fn description(&self, name: &str) -> Option<String> {
        let substitutes = self.hooks.substitutes();
        let lookup = substitutes.get(name).map(String::as_str).unwrap_or(name);
        self.dao.description(&self.config.description_key(lookup))
    }

    pub fn entities(&self) -> Vec<Arc<T>> {
        self.registry.entities()
    }

    pub fn system_entities(&self) -> Vec<Arc<T>> {
        self.registry.system_entities()
    }

    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.registry.get(name)
    }

    pub fn get_by_id(&self, id: EntityId) -> Option<Arc<T>> {
        self.registry.get_by_id(id)
    }

    pub fn add<F>(&self, build: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        self.registry.add(build)
    }

    pub fn remove(&self, entity: &T) -> Result<()> {
        self.registry.remove(entity)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct EntitiesRegistryBuilder<T, P, H>
where
    T: MathEntity,
    P: PersistedEntity,
    H: RegistryHooks<T, P>,
{
    config: RegistryConfig,
    hooks: H,
    dao: Arc<dyn EntityDao<P>>,
    system_entities: Vec<T>,
    error_sink: Arc<dyn ErrorSink>,
    notifier: Arc<dyn UserNotifier>,
    _persisted: PhantomData<fn() -> P>,
}

impl<T, P, H> EntitiesRegistryBuilder<T, P, H>
where
    T: MathEntity,
    P: PersistedEntity,
    H: RegistryHooks<T, P>,
{
    pub fn new(hooks: H, dao: Arc<dyn EntityDao<P>>) -> Self {
        Self {
            config: RegistryConfig::default(),
            hooks,
            dao,
            system_entities: Vec::new(),
            error_sink: Arc::new(TracingErrorSink),
            notifier: Arc::new(TracingNotifier),
            _persisted: PhantomData,
        }
    }

    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Built-in entities registered before anything is loaded.
    pub fn system_entities<I>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.system_entities.extend(entities);
        self
    }

    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> Result<EntitiesRegistry<T, P, H>> {
        self.config.validate()?;
        let registry = MathRegistry::with_entities(self.system_entities)?;
        event!(
            Level::DEBUG,
            registry = %self.config.name,
            system = registry.len(),
            "entities registry created"
        );

        Ok(EntitiesRegistry {
            config: self.config,
            registry,
            hooks: self.hooks,
            dao: self.dao,
            error_sink: self.error_sink,
            notifier: self.notifier,
            sync: Mutex::new(()),
        })
    }
}
