//! Persistence contract for calibration state
//!
//! The store is an opaque key-value collaborator (Firestore, localStorage
//! bridge, a test double). The engine writes the complete state object on
//! every persist; there are no partial writes.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

/// Key-value persistence collaborator
#[allow(async_fn_in_trait)]
pub trait CalibrationStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
}

impl<T: CalibrationStore> CalibrationStore for &T {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        (**self).set(key, value).await
    }
}

/// In-memory store for tests and offline operation
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one persisted payload
    pub fn seeded(key: &str, value: Value) -> Self {
        let store = Self::new();
        store
            .data
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value);
        store
    }

    /// Synchronous peek at the persisted payload
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.data
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
    }
}

impl CalibrationStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.data
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }
}
