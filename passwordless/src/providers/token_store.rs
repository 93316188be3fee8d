//! Token store trait.
//!
//! This module defines the persistence contract for issued tokens. The core
//! never touches a store's representation; it only calls the operations
//! below.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A persisted token.
///
/// Stores are free to keep a hash instead of `token`; this type is what the
/// reference store keeps in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// User the token was issued for.
    pub uid: String,

    /// Token value.
    pub token: String,

    /// Expiration time. The record is valid only while `now < expires_at`.
    pub expires_at: DateTime<Utc>,

    /// Where to send the user after authentication.
    pub origin_url: Option<String>,
}

impl TokenRecord {
    /// Create a record expiring `ttl` after `now`.
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        token: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
        origin_url: Option<String>,
    ) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            uid: uid.into(),
            token: token.into(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            origin_url,
        }
    }

    /// Returns `true` if the record is still valid at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Result of [`TokenStore::authenticate`] and [`TokenStore::consume`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Token and uid match an active record.
    Valid {
        /// Origin URL stored with the token, if any.
        origin_url: Option<String>,
    },

    /// No active record matches (unknown, expired or already used).
    Invalid,
}

impl Authentication {
    /// Returns `true` for [`Authentication::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Token store.
///
/// Tokens travel together with the uid they were issued for, and a store
/// authenticates the pair.
///
/// # Implementation Notes
///
/// - At most one active record per uid: `store_or_update` replaces the
///   previous record of the same uid (or fails deterministically)
/// - Expiry is a comparison against the current time, no eviction task needed
/// - `consume` must check and invalidate in one atomic step (a transaction,
///   `GETDEL`, or a single lock for in-memory stores). Of two concurrent
///   `consume` calls for the same token, at most one returns `Valid`
/// - Stores impose their own timeouts; the core imposes none
pub trait TokenStore: Send + Sync {
    /// Check whether `token` is an active token for `uid`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails. An unknown or expired
    /// token is **not** an error; it yields [`Authentication::Invalid`].
    fn authenticate(
        &self,
        token: &str,
        uid: &str,
    ) -> impl std::future::Future<Output = Result<Authentication>> + Send;

    /// Authenticate `token` for `uid` and, if it is valid, invalidate every
    /// outstanding token of `uid` in the same atomic operation.
    ///
    /// Used for single-use tokens. A wrong token leaves the record intact.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails. An unknown, expired or
    /// already consumed token yields [`Authentication::Invalid`].
    fn consume(
        &self,
        token: &str,
        uid: &str,
    ) -> impl std::future::Future<Output = Result<Authentication>> + Send;

    /// Store a new token for `uid`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails or the store rejects
    /// the record.
    fn store_or_update(
        &self,
        token: &str,
        uid: &str,
        ttl: Duration,
        origin_url: Option<&str>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Invalidate every outstanding token of `uid`.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn invalidate_user(&self, uid: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns error if the storage operation fails.
    fn length(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}
