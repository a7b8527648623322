//! Durable key/value storage for state that must survive a restart.
//!
//! Two keys are used: [`AGENT_CREATION_KEY`] holds the wizard draft and
//! [`AUTH_KEY`] holds the logged-in user. Values are JSON envelopes of the
//! form `{"state": ..., "version": 0}`.

mod auth;
mod sqlite_store;

pub use auth::{AuthState, AuthStore};
pub use sqlite_store::SqliteStore;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const AGENT_CREATION_KEY: &str = "agent-creation-storage";
pub const AUTH_KEY: &str = "auth-storage";

/// Version written into every envelope.
pub const STATE_VERSION: u32 = 0;

/// Backing store for persisted state.
pub trait DurableStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, used by tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// Load the state stored under `key`.
///
/// A value that no longer parses is logged and treated as absent.
pub fn load_state<T: DeserializeOwned>(storage: &dyn DurableStorage, key: &str) -> Result<Option<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) => Ok(Some(envelope.state)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable persisted state");
            Ok(None)
        }
    }
}

pub fn save_state<T: Serialize>(storage: &dyn DurableStorage, key: &str, state: &T) -> Result<()> {
    let envelope = Envelope {
        state,
        version: STATE_VERSION,
    };
    storage.set(key, &serde_json::to_string(&envelope)?)
}
