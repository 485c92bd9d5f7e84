use crate::app::ports::KeyValueStore;
use crate::common::error::{Result, SwipeError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory slots for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| SwipeError::persistence(key, e))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| SwipeError::persistence(key, e))?;
        slots.insert(key.to_string(), value.to_string());
        debug!("Stored slot {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
