//! Mock delivery method for testing.

use crate::error::{PasswordlessError, Result};
use crate::providers::DeliveryMethod;
use crate::request::RequestContext;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A token handed to [`MockDelivery::send_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredToken {
    /// Token value.
    pub token: String,
    /// User id.
    pub uid: String,
    /// Contact details the token was sent to.
    pub recipient: String,
}

/// Mock delivery method.
///
/// Resolves contacts through a fixed directory and records every token it
/// is asked to send instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockDelivery {
    users: HashMap<String, String>,
    delivered: Arc<Mutex<Vec<DeliveredToken>>>,
    lookups: Arc<Mutex<Vec<(String, Option<String>)>>>,
    fail_resolution: bool,
    fail_delivery: bool,
}

impl MockDelivery {
    /// Create a mock delivery method with an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user: `contact` resolves to `uid`.
    #[must_use]
    pub fn with_user(mut self, contact: impl Into<String>, uid: impl Into<String>) -> Self {
        self.users.insert(contact.into(), uid.into());
        self
    }

    /// Make every `resolve_user` call fail.
    #[must_use]
    pub const fn failing_resolution(mut self) -> Self {
        self.fail_resolution = true;
        self
    }

    /// Make every `send_token` call fail.
    #[must_use]
    pub const fn failing_delivery(mut self) -> Self {
        self.fail_delivery = true;
        self
    }

    /// Tokens sent so far, oldest first.
    #[must_use]
    pub fn delivered(&self) -> Vec<DeliveredToken> {
        self.delivered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Most recently sent token.
    #[must_use]
    pub fn last_delivered(&self) -> Option<DeliveredToken> {
        self.delivered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// `(contact, delivery selector)` pairs passed to `resolve_user`.
    #[must_use]
    pub fn lookups(&self) -> Vec<(String, Option<String>)> {
        self.lookups
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl DeliveryMethod for MockDelivery {
    fn resolve_user<'a>(
        &'a self,
        contact: &'a str,
        delivery: Option<&'a str>,
        _request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            self.lookups
                .lock()
                .map_err(|_| PasswordlessError::Internal("Mutex lock failed".to_string()))?
                .push((contact.to_string(), delivery.map(str::to_string)));

            if self.fail_resolution {
                return Err(PasswordlessError::user_resolution("user directory unavailable"));
            }
            Ok(self.users.get(contact).cloned())
        })
    }

    fn send_token<'a>(
        &'a self,
        token: &'a str,
        uid: &'a str,
        recipient: &'a str,
        _request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.fail_delivery {
                return Err(PasswordlessError::delivery("mail server unavailable"));
            }
            self.delivered
                .lock()
                .map_err(|_| PasswordlessError::Internal("Mutex lock failed".to_string()))?
                .push(DeliveredToken {
                    token: token.to_string(),
                    uid: uid.to_string(),
                    recipient: recipient.to_string(),
                });
            Ok(())
        })
    }
}
