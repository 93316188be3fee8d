//! Mock session for testing.

use crate::error::{PasswordlessError, Result};
use crate::providers::Session;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock session.
///
/// Writes are buffered in the handle and only reach the shared backing
/// store on [`Session::save`], like a server-side session store. Use
/// [`Self::resume`] to open the same session on a later request.
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    values: HashMap<String, String>,
    persisted: Arc<Mutex<HashMap<String, String>>>,
    saves: Arc<AtomicUsize>,
    fail_save: bool,
}

impl MockSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session whose backing store already holds `key = value`.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            values: HashMap::from([(key.to_string(), value.clone())]),
            persisted: Arc::new(Mutex::new(HashMap::from([(key.to_string(), value)]))),
            ..Self::default()
        }
    }

    /// Make every `save` call fail.
    #[must_use]
    pub const fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// Open the persisted session for a new request.
    ///
    /// Unsaved writes of this handle are not visible in the new one.
    #[must_use]
    pub fn resume(&self) -> Self {
        Self {
            values: self
                .persisted
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone(),
            persisted: Arc::clone(&self.persisted),
            saves: Arc::clone(&self.saves),
            fail_save: self.fail_save,
        }
    }

    /// Value persisted under `key`.
    #[must_use]
    pub fn persisted(&self, key: &str) -> Option<String> {
        self.persisted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of successful saves across every handle of this session.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Session for MockSession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    fn save(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.fail_save {
                return Err(PasswordlessError::session("session backend unavailable"));
            }
            *self
                .persisted
                .lock()
                .map_err(|_| PasswordlessError::Internal("Mutex lock failed".to_string()))? =
                self.values.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
