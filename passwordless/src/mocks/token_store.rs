//! Mock token store for testing.

use crate::error::{PasswordlessError, Result};
use crate::providers::{Authentication, Clock, SystemClock, TokenRecord, TokenStore};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// [`TokenStore::authenticate`]
    Authenticate,
    /// [`TokenStore::consume`]
    Consume,
    /// [`TokenStore::store_or_update`]
    Store,
    /// [`TokenStore::invalidate_user`]
    InvalidateUser,
}

/// Mock token store.
///
/// In-memory reference store keeping at most one record per uid. Storing a
/// new token for a uid replaces the previous record; a token value already
/// held by another record is rejected with `token already exists`.
#[derive(Clone)]
pub struct MockTokenStore {
    records: Arc<Mutex<HashMap<String, TokenRecord>>>,
    failures: Arc<Mutex<HashSet<StoreOperation>>>,
    clock: Arc<dyn Clock>,
}

impl MockTokenStore {
    /// Create a new mock token store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a store that reads the current time from `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            clock: Arc::new(clock),
        }
    }

    /// Make `operation` fail until [`Self::recover`] is called.
    pub fn fail_on(&self, operation: StoreOperation) {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(operation);
    }

    /// Stop injecting failures.
    pub fn recover(&self) {
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Get the record stored for `uid` (for testing).
    #[must_use]
    pub fn get(&self, uid: &str) -> Option<TokenRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(uid)
            .cloned()
    }

    /// Get all stored records keyed by uid (for testing).
    #[must_use]
    pub fn get_all(&self) -> HashMap<String, TokenRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn check(&self, operation: StoreOperation) -> Result<()> {
        let failing = self
            .failures
            .lock()
            .map_err(|_| PasswordlessError::Internal("Mutex lock failed".to_string()))?
            .contains(&operation);
        if failing {
            return Err(PasswordlessError::store(format!(
                "injected failure: {operation:?}"
            )));
        }
        Ok(())
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<String, TokenRecord>>> {
        self.records
            .lock()
            .map_err(|_| PasswordlessError::Internal("Mutex lock failed".to_string()))
    }
}

impl Default for MockTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTokenStore")
            .field("records", &self.records)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl TokenStore for MockTokenStore {
    async fn authenticate(&self, token: &str, uid: &str) -> Result<Authentication> {
        self.check(StoreOperation::Authenticate)?;
        let now = self.clock.now();
        let mut records = self.records()?;
        Ok(verify(&mut records, token, uid, now))
    }

    async fn consume(&self, token: &str, uid: &str) -> Result<Authentication> {
        self.check(StoreOperation::Consume)?;
        let now = self.clock.now();
        let mut records = self.records()?;

        // Check and removal happen under the same lock
        let authentication = verify(&mut records, token, uid, now);
        if authentication.is_valid() {
            records.remove(uid);
        }
        Ok(authentication)
    }

    async fn store_or_update(
        &self,
        token: &str,
        uid: &str,
        ttl: Duration,
        origin_url: Option<&str>,
    ) -> Result<()> {
        self.check(StoreOperation::Store)?;
        let now = self.clock.now();
        let mut records = self.records()?;

        let taken = records
            .values()
            .any(|record| record.uid != uid && record.token == token);
        if taken {
            return Err(PasswordlessError::store("token already exists"));
        }

        records.insert(
            uid.to_string(),
            TokenRecord::new(uid, token, now, ttl, origin_url.map(str::to_string)),
        );
        Ok(())
    }

    async fn invalidate_user(&self, uid: &str) -> Result<()> {
        self.check(StoreOperation::InvalidateUser)?;
        self.records()?.remove(uid);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records()?.clear();
        Ok(())
    }

    async fn length(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }
}

/// Check `token` against the record of `uid`, dropping the record if it
/// has expired.
fn verify(
    records: &mut HashMap<String, TokenRecord>,
    token: &str,
    uid: &str,
    now: DateTime<Utc>,
) -> Authentication {
    let Some(record) = records.get(uid) else {
        return Authentication::Invalid;
    };

    // Compare and check expiry on every path so timing does not reveal
    // whether the token or the expiry was wrong.
    let token_matches =
        constant_time_eq::constant_time_eq(token.as_bytes(), record.token.as_bytes());
    let is_active = record.is_active_at(now);
    let origin_url = record.origin_url.clone();

    if !is_active {
        records.remove(uid);
        return Authentication::Invalid;
    }

    if token_matches {
        Authentication::Valid { origin_url }
    } else {
        Authentication::Invalid
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::ManualClock;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_store_and_authenticate() {
        let store = MockTokenStore::new();
        store
            .store_or_update("token-123", "alice", HOUR, Some("/admin"))
            .await
            .unwrap();

        assert_eq!(store.length().await.unwrap(), 1);
        assert_eq!(
            store.authenticate("token-123", "alice").await.unwrap(),
            Authentication::Valid {
                origin_url: Some("/admin".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_wrong_token_or_uid() {
        let store = MockTokenStore::new();
        store
            .store_or_update("token-123", "alice", HOUR, None)
            .await
            .unwrap();

        assert_eq!(
            store.authenticate("token-124", "alice").await.unwrap(),
            Authentication::Invalid
        );
        assert_eq!(
            store.authenticate("token-123", "bob").await.unwrap(),
            Authentication::Invalid
        );
        // Wrong token does not consume the record
        assert_eq!(store.length().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_replaces_previous_record_of_uid() {
        let store = MockTokenStore::new();
        store.store_or_update("first", "alice", HOUR, None).await.unwrap();
        store.store_or_update("second", "alice", HOUR, None).await.unwrap();

        assert_eq!(store.length().await.unwrap(), 1);
        assert!(!store.authenticate("first", "alice").await.unwrap().is_valid());
        assert!(store.authenticate("second", "alice").await.unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_duplicate_token_rejected() {
        let store = MockTokenStore::new();
        store.store_or_update("same", "alice", HOUR, None).await.unwrap();

        let result = store.store_or_update("same", "bob", HOUR, None).await;
        assert_eq!(
            result,
            Err(PasswordlessError::Store("token already exists".to_string()))
        );
        assert!(store.get("bob").is_none());
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let clock = ManualClock::default();
        let store = MockTokenStore::with_clock(clock.clone());
        store
            .store_or_update("token", "alice", Duration::from_millis(100), None)
            .await
            .unwrap();

        clock.advance(Duration::from_millis(99));
        assert!(store.authenticate("token", "alice").await.unwrap().is_valid());

        clock.advance(Duration::from_millis(1));
        assert!(!store.authenticate("token", "alice").await.unwrap().is_valid());

        // Expired records are dropped on access
        assert_eq!(store.length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let store = MockTokenStore::new();
        store
            .store_or_update("token", "alice", HOUR, Some("/admin"))
            .await
            .unwrap();

        // Wrong token leaves the record in place
        assert_eq!(
            store.consume("other", "alice").await.unwrap(),
            Authentication::Invalid
        );
        assert!(store.get("alice").is_some());

        assert_eq!(
            store.consume("token", "alice").await.unwrap(),
            Authentication::Valid {
                origin_url: Some("/admin".to_string())
            }
        );
        assert!(store.get("alice").is_none());
        assert_eq!(
            store.consume("token", "alice").await.unwrap(),
            Authentication::Invalid
        );
    }

    #[tokio::test]
    async fn test_concurrent_consume_succeeds_once() {
        let store = MockTokenStore::new();
        store.store_or_update("token", "alice", HOUR, None).await.unwrap();

        let (first, second) = tokio::join!(
            store.consume("token", "alice"),
            store.consume("token", "alice")
        );

        let successes = [first.unwrap(), second.unwrap()]
            .iter()
            .filter(|a| a.is_valid())
            .count();
        assert_eq!(successes, 1);
        assert_eq!(store.length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consume_expired_token() {
        let clock = ManualClock::default();
        let store = MockTokenStore::with_clock(clock.clone());
        store
            .store_or_update("token", "alice", Duration::from_millis(100), None)
            .await
            .unwrap();

        clock.advance(Duration::from_millis(100));
        assert!(!store.consume("token", "alice").await.unwrap().is_valid());
        assert_eq!(store.length().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let store = MockTokenStore::new();
        store.store_or_update("a", "alice", HOUR, None).await.unwrap();
        store.store_or_update("b", "bob", HOUR, None).await.unwrap();

        store.invalidate_user("alice").await.unwrap();
        assert!(store.get("alice").is_none());
        assert_eq!(store.length().await.unwrap(), 1);

        // Unknown uid is not an error
        store.invalidate_user("carol").await.unwrap();

        store.clear().await.unwrap();
        assert!(store.get_all().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MockTokenStore::new();
        store.fail_on(StoreOperation::Store);

        let result = store.store_or_update("a", "alice", HOUR, None).await;
        assert!(matches!(result, Err(PasswordlessError::Store(_))));

        store.recover();
        store.store_or_update("a", "alice", HOUR, None).await.unwrap();

        store.fail_on(StoreOperation::Authenticate);
        assert!(store.authenticate("a", "alice").await.is_err());
        // Other operations are unaffected
        assert!(store.consume("wrong", "alice").await.is_ok());

        store.fail_on(StoreOperation::Consume);
        assert!(store.consume("a", "alice").await.is_err());
        assert!(store.get("alice").is_some());
        store.invalidate_user("alice").await.unwrap();
    }
}
