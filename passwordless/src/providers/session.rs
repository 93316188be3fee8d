//! Session trait.

use crate::error::Result;
use futures::future::BoxFuture;

/// Per-request view of a session provided by upstream session middleware.
///
/// Only a single string value (the authenticated uid) is ever written by
/// the passwordless middleware.
///
/// # Implementation Notes
///
/// - `insert` and `remove` may buffer changes in memory
/// - `save` must durably persist buffered changes; redirects are only
///   emitted after it completes, so the client never follows a redirect
///   before the session write has landed
pub trait Session: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn insert(&mut self, key: &str, value: String);

    /// Remove a value, returning the previous one.
    fn remove(&mut self, key: &str) -> Option<String>;

    /// Persist the session.
    ///
    /// # Errors
    ///
    /// Returns error if the session backend fails.
    fn save(&mut self) -> BoxFuture<'_, Result<()>>;
}
