//! Session state handed to every screen and command.

use std::sync::Arc;

use crate::api::Backend;
use crate::cache::ResourceCache;
use crate::config::Config;
use crate::draft::DraftStore;
use crate::error::Result;
use crate::storage::{AuthStore, DurableStorage};

/// Everything a session shares. Tests build one per case with an in-memory
/// store and a fake backend.
#[derive(Clone)]
pub struct AppContext {
    pub backend: Arc<dyn Backend>,
    pub cache: ResourceCache,
    pub draft: DraftStore,
    pub auth: AuthStore,
    pub config: Config,
}

impl AppContext {
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn DurableStorage>,
        config: Config,
    ) -> Result<Self> {
        Ok(Self {
            backend,
            cache: ResourceCache::new(),
            draft: DraftStore::open(storage.clone())?,
            auth: AuthStore::new(storage),
            config,
        })
    }
}
