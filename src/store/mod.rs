//! Persistence for the refresh-session handle.
//!
//! A browser keeps the refresh cookie in its jar between page loads. A CLI or
//! service process does not, so the handle is saved after every successful
//! login/register/refresh and cleared after logout. The next process seeds its
//! cookie store from it and can refresh or log out without a password.

mod file;

pub use file::FileStore;

use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Mutex, PoisonError};

/// The refresh cookie issued by the auth service.
#[derive(Debug)]
pub struct RefreshHandle {
    pub cookie_name: String,
    pub value: SecretString,
}

impl RefreshHandle {
    #[must_use]
    pub fn new(cookie_name: impl Into<String>, value: SecretString) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            value,
        }
    }
}

pub trait RefreshHandleStore: Send + Sync {
    /// Returns `None` when no handle has been saved.
    /// # Errors
    /// Returns an error if the backing storage exists but cannot be read.
    fn load(&self) -> Result<Option<RefreshHandle>>;

    /// # Errors
    /// Returns an error if the handle cannot be written.
    fn save(&self, handle: &RefreshHandle) -> Result<()>;

    /// Returns `true` if a handle was removed.
    /// # Errors
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&self) -> Result<bool>;
}

/// In-process store; the handle is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    handle: Mutex<Option<(String, String)>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefreshHandleStore for MemoryStore {
    fn load(&self) -> Result<Option<RefreshHandle>> {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(handle
            .as_ref()
            .map(|(name, value)| RefreshHandle::new(name.clone(), SecretString::from(value.clone()))))
    }

    fn save(&self, handle: &RefreshHandle) -> Result<()> {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some((
            handle.cookie_name.clone(),
            handle.value.expose_secret().to_string(),
        ));
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        Ok(self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some())
    }
}
