//! Error sink and user-notification channel consumed by registries.
//!
//! Both collaborators are injected into a registry at construction. The
//! tracing-backed defaults let a registry run headless; hosts with a UI
//! plug in their own implementations.

use crate::core::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{Level, event};

/// Receives every fault a registry absorbs instead of returning.
pub trait ErrorSink: Send + Sync {
    fn on_error(&self, error: &RegistryError);
}

/// Channel used to show a message to the user.
pub trait UserNotifier: Send + Sync {
    fn notify(&self, message: UserMessage) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCode {
    /// Some persisted entities could not be restored.
    EntitiesNotRestored,
}

impl MessageCode {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageCode::EntitiesNotRestored => "entities_not_restored",
        }
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    pub severity: MessageSeverity,
    pub code: MessageCode,
    pub text: String,
    pub payload: Option<serde_json::Value>,
}

impl UserMessage {
    pub fn error(code: MessageCode, text: impl Into<String>) -> Self {
        Self {
            severity: MessageSeverity::Error,
            code,
            text: text.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

// ============================================================================
// Tracing-backed defaults
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn on_error(&self, error: &RegistryError) {
        event!(Level::ERROR, error = %error, "registry fault");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn notify(&self, message: UserMessage) -> Result<()> {
        match message.severity {
            MessageSeverity::Error => {
                event!(
                    Level::ERROR,
                    code = %message.code,
                    text = %message.text,
                    "user notification"
                )
            }
            MessageSeverity::Warning => {
                event!(Level::WARN, code = %message.code, text = %message.text, "user notification")
            }
            MessageSeverity::Info => {
                event!(Level::INFO, code = %message.code, text = %message.text, "user notification")
            }
        }
        Ok(())
    }
}

// ============================================================================
// Recording collaborators
// ============================================================================

/// Keeps the rendered text of every reported fault, e.g. for a diagnostics view.
#[derive(Debug, Default)]
pub struct RecordingErrorSink {
    errors: Mutex<Vec<String>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for RecordingErrorSink {
    fn on_error(&self, error: &RegistryError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }
}

/// Queues notifications instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<UserMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<UserMessage> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take(&self) -> Vec<UserMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, message: UserMessage) -> Result<()> {
        self.messages.lock()?.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_rendered_errors() {
        let sink = RecordingErrorSink::new();
        sink.on_error(&RegistryError::EntityNotFound("x".into()));
        assert_eq!(sink.errors(), vec!["Entity 'x' not found".to_string()]);
    }

    #[test]
    fn test_recording_notifier_take_drains() {
        let notifier = RecordingNotifier::new();
        notifier
            .notify(UserMessage::error(MessageCode::EntitiesNotRestored, "x"))
            .unwrap();
        assert_eq!(notifier.take().len(), 1);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_tracing_defaults_never_fail() {
        TracingErrorSink.on_error(&RegistryError::Storage("disk full".into()));
        let message = UserMessage::error(MessageCode::EntitiesNotRestored, "x")
            .with_payload(serde_json::json!({ "failed": 1 }));
        assert!(TracingNotifier.notify(message).is_ok());
    }
}
