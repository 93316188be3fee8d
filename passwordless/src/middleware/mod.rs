//! Passwordless middleware.
//!
//! [`Passwordless`] owns the token store, the global configuration and the
//! delivery registry. Its procedures are meant to run in a request
//! pipeline, each one taking the request's [`RequestContext`] and returning
//! an [`Outcome`]:
//!
//! ```text
//! session_support → accept_token → restricted → handler
//!                                    ▲
//! request_token ─── delivery ──► user follows link (token + uid)
//! ```
//!
//! - [`Passwordless::request_token`]: issue a token and hand it to a delivery method
//! - [`Passwordless::accept_token`]: authenticate a token + uid pair
//! - [`Passwordless::restricted`]: gate a route on an attached identity
//! - [`Passwordless::session_support`]: restore the identity from the session
//! - [`Passwordless::logout`]: drop the identity and outstanding tokens
//!
//! # Example
//!
//! ```
//! use passwordless::mocks::{MockDelivery, MockTokenStore};
//! use passwordless::{
//!     AcceptTokenOptions, DeliveryOptions, Outcome, Passwordless, PasswordlessConfig,
//!     RequestContext, RequestTokenOptions, RestrictedOptions,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> passwordless::Result<()> {
//! let delivery = MockDelivery::new().with_user("alice@example.com", "alice");
//! let sent = delivery.clone();
//!
//! let mut passwordless = Passwordless::new(MockTokenStore::new(), PasswordlessConfig::new());
//! passwordless.add_delivery(delivery, DeliveryOptions::new())?;
//!
//! // POST /sendtoken
//! let mut ctx = RequestContext::post("/sendtoken").with_body([("user", "alice@example.com")]);
//! let outcome = passwordless
//!     .request_token(&mut ctx, &RequestTokenOptions::new())
//!     .await?;
//! assert_eq!(outcome, Outcome::Continue);
//!
//! // GET /?token=..&uid=alice
//! let link = sent.last_delivered().map(|d| d.token).unwrap_or_default();
//! let mut ctx = RequestContext::get(format!("/?token={link}&uid=alice"));
//! passwordless
//!     .accept_token(&mut ctx, &AcceptTokenOptions::new())
//!     .await?;
//! assert_eq!(passwordless.identity(&ctx), Some("alice"));
//!
//! let outcome = passwordless
//!     .restricted(&mut ctx, &RestrictedOptions::new())
//!     .await?;
//! assert!(outcome.is_continue());
//! # Ok(())
//! # }
//! ```

mod accept_token;
mod logout;
mod request_token;
mod restricted;
mod session_support;

use crate::config::PasswordlessConfig;
use crate::delivery::{DeliveryOptions, DeliveryRegistry};
use crate::error::{ConfigError, Result};
use crate::outcome::Outcome;
use crate::providers::{DeliveryMethod, TokenStore};
use crate::request::RequestContext;

/// Passwordless authentication middleware.
///
/// Generic over the token store so the store's futures are dispatched
/// statically. Delivery methods are stored as trait objects because several
/// different ones can be registered side by side.
#[derive(Debug)]
pub struct Passwordless<S> {
    store: S,
    config: PasswordlessConfig,
    registry: DeliveryRegistry,
}

impl<S: TokenStore> Passwordless<S> {
    /// Create the middleware on top of `store`.
    #[must_use]
    pub const fn new(store: S, config: PasswordlessConfig) -> Self {
        Self {
            store,
            config,
            registry: DeliveryRegistry::new(),
        }
    }

    /// Register the default delivery method.
    ///
    /// # Errors
    ///
    /// Returns error if the options are invalid, a default method already
    /// exists, or named methods are registered.
    pub fn add_delivery(
        &mut self,
        method: impl DeliveryMethod + 'static,
        options: DeliveryOptions,
    ) -> std::result::Result<(), ConfigError> {
        self.registry.register_default(method, options)?;
        tracing::debug!("Registered default delivery method");
        Ok(())
    }

    /// Register a named delivery method, selected through the delivery
    /// field of a token request.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or taken, the options are
    /// invalid, or a default method is registered.
    pub fn add_named_delivery(
        &mut self,
        name: impl Into<String>,
        method: impl DeliveryMethod + 'static,
        options: DeliveryOptions,
    ) -> std::result::Result<(), ConfigError> {
        let name = name.into();
        self.registry.register_named(name.clone(), method, options)?;
        tracing::debug!(delivery = %name, "Registered named delivery method");
        Ok(())
    }

    /// The token store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Global configuration.
    #[must_use]
    pub const fn config(&self) -> &PasswordlessConfig {
        &self.config
    }

    /// Registered delivery methods.
    #[must_use]
    pub const fn registry(&self) -> &DeliveryRegistry {
        &self.registry
    }

    /// Uid attached to the request, if it is authenticated.
    #[must_use]
    pub fn identity<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
        ctx.attribute(&self.config.user_property)
    }

    /// Redirect to `target`, persisting the session first.
    ///
    /// The session save is awaited so the client cannot follow the redirect
    /// before the session write has landed. Skipped without a session or
    /// when `skip_force_session_save` is set.
    async fn redirect_with_session_save(
        &self,
        ctx: &mut RequestContext,
        target: impl Into<String>,
    ) -> Result<Outcome> {
        let target = target.into();
        if !self.config.skip_force_session_save {
            if let Some(session) = ctx.session_mut() {
                session.save().await.inspect_err(|e| {
                    tracing::error!(
                        error = %e,
                        target = %target,
                        "Failed to save session before redirect"
                    );
                })?;
            }
        }
        Ok(Outcome::Redirect(target))
    }

    fn check_config(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }
}

/// Queue `message` under `key` if flash messages are available.
fn flash(ctx: &mut RequestContext, key: &str, message: Option<&str>) {
    if let (Some(message), Some(flash)) = (message, ctx.flash_mut()) {
        flash.push(key, message);
    }
}

/// Fail unless the request carries a flash capability.
fn require_flash(ctx: &RequestContext, needed: bool) -> Result<()> {
    if needed && ctx.flash().is_none() {
        return Err(ConfigError::MissingFlash.into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{MockDelivery, MockSession, MockTokenStore};

    fn passwordless(config: PasswordlessConfig) -> Passwordless<MockTokenStore> {
        Passwordless::new(MockTokenStore::new(), config)
    }

    #[test]
    fn test_mixed_registration_rejected_in_both_orders() {
        let mut named_first = passwordless(PasswordlessConfig::new());
        named_first
            .add_named_delivery("email", MockDelivery::new(), DeliveryOptions::new())
            .unwrap();
        assert_eq!(
            named_first.add_delivery(MockDelivery::new(), DeliveryOptions::new()),
            Err(ConfigError::MixedDeliveryMethods)
        );

        let mut default_first = passwordless(PasswordlessConfig::new());
        default_first
            .add_delivery(MockDelivery::new(), DeliveryOptions::new())
            .unwrap();
        assert_eq!(
            default_first.add_named_delivery("sms", MockDelivery::new(), DeliveryOptions::new()),
            Err(ConfigError::MixedDeliveryMethods)
        );
        assert_eq!(default_first.registry().len(), 1);
    }

    #[test]
    fn test_identity_uses_user_property() {
        let pwdless = passwordless(PasswordlessConfig::new().with_user_property("account"));
        let mut ctx = RequestContext::get("/");
        ctx.set_attribute("user", "mallory");
        assert_eq!(pwdless.identity(&ctx), None);

        ctx.set_attribute("account", "alice");
        assert_eq!(pwdless.identity(&ctx), Some("alice"));
    }

    #[tokio::test]
    async fn test_redirect_saves_session_first() {
        let pwdless = passwordless(PasswordlessConfig::new());
        let session = MockSession::new();
        let mut ctx = RequestContext::get("/").with_session(session.clone());
        ctx.session_mut()
            .unwrap()
            .insert("passwordless", "alice".to_string());

        let outcome = pwdless
            .redirect_with_session_save(&mut ctx, "/home")
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Redirect("/home".to_string()));
        assert_eq!(session.save_count(), 1);
        assert_eq!(session.persisted("passwordless").as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_redirect_skips_save_when_configured() {
        let pwdless = passwordless(PasswordlessConfig::new().with_skip_force_session_save(true));
        let session = MockSession::new();
        let mut ctx = RequestContext::get("/").with_session(session.clone());

        let outcome = pwdless
            .redirect_with_session_save(&mut ctx, "/home")
            .await
            .unwrap();

        assert_eq!(outcome.location(), Some("/home"));
        assert_eq!(session.save_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_session_save_is_an_error() {
        let pwdless = passwordless(PasswordlessConfig::new());
        let mut ctx = RequestContext::get("/").with_session(MockSession::new().failing_save());

        let result = pwdless.redirect_with_session_save(&mut ctx, "/home").await;
        assert!(matches!(result, Err(crate::PasswordlessError::Session(_))));
    }
}
