use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{load_state, save_state, DurableStorage, AUTH_KEY};
use crate::entity::{Role, User};
use crate::error::{DeskError, Result};

/// Persisted auth state. The session token lives elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
}

#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn DurableStorage>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Result<AuthState> {
        Ok(load_state(self.storage.as_ref(), AUTH_KEY)?.unwrap_or_default())
    }

    pub fn user(&self) -> Result<Option<User>> {
        Ok(self.load()?.user)
    }

    pub fn set_user(&self, user: User) -> Result<()> {
        save_state(self.storage.as_ref(), AUTH_KEY, &AuthState { user: Some(user) })
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(AUTH_KEY)
    }

    /// Role of the logged-in user.
    pub fn role(&self) -> Result<Role> {
        self.user()?
            .map(|u| u.role)
            .ok_or(DeskError::NotLoggedIn)
    }
}
