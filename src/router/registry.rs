//! Intent → handler table.
//!
//! Built once at startup through [`RegistryBuilder`], then frozen into a
//! [`HandlerRegistry`] that is shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::handlers::ResponseHandler;
use super::intent::IntentKey;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("handler already registered for intent '{0}'")]
    DuplicateIntent(IntentKey),
    #[error("fallback intent '{0}' has no registered handler")]
    MissingFallback(IntentKey),
}

#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<IntentKey, Arc<dyn ResponseHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: ResponseHandler + 'static>(
        &mut self,
        intent: IntentKey,
        handler: H,
    ) -> Result<&mut Self, RegistryError> {
        if self.handlers.contains_key(&intent) {
            return Err(RegistryError::DuplicateIntent(intent));
        }
        self.handlers.insert(intent, Arc::new(handler));
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry { handlers: self.handlers }
    }
}

/// Read-only intent table.
pub struct HandlerRegistry {
    handlers: HashMap<IntentKey, Arc<dyn ResponseHandler>>,
}

impl HandlerRegistry {
    pub fn get(&self, intent: &IntentKey) -> Option<&Arc<dyn ResponseHandler>> {
        self.handlers.get(intent)
    }

    pub fn contains(&self, intent: &IntentKey) -> bool {
        self.handlers.contains_key(intent)
    }

    /// Registered intents, sorted.
    pub fn intents(&self) -> Vec<IntentKey> {
        let mut keys: Vec<_> = self.handlers.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").field("intents", &self.intents()).finish()
    }
}
