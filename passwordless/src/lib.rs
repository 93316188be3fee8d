//! # Passwordless
//!
//! Token based, passwordless authentication for web request pipelines.
//!
//! A user submits contact details (an email address, a phone number), the
//! middleware resolves them into a user id, issues a short-lived token and
//! hands it to a delivery method. Following the delivered link (token plus
//! uid) authenticates the request; the identity can then be kept in a
//! session.
//!
//! ## Features
//!
//! - **Single-use tokens** by default, reusable until expiry on request
//! - **Several delivery methods** selected per request (email, SMS, ...)
//! - **Origin redirects**: send users back to the page they asked for
//! - **Framework agnostic**: procedures take a [`RequestContext`] and return
//!   an [`Outcome`]; the store, delivery methods and session are traits
//!
//! ## Architecture
//!
//! ```text
//! RequestContext → Passwordless procedure → Outcome (continue, redirect, 400, 401)
//!                        │
//!                        ├── TokenStore      (consume, authenticate, store_or_update, ...)
//!                        ├── DeliveryMethod  (resolve_user, send_token)
//!                        └── Session         (get, insert, remove, save)
//! ```
//!
//! Failed authentication is an [`Outcome`]. Collaborator failures and
//! wiring mistakes are a [`PasswordlessError`], so a broken store is never
//! mistaken for a bad token.
//!
//! See [`Passwordless`] for a complete flow.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod middleware;
pub mod outcome;
pub mod providers;
pub mod request;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{
    AcceptTokenOptions, LogoutOptions, PasswordlessConfig, RequestTokenOptions, RestrictedOptions,
};
pub use delivery::{DeliveryOptions, DeliveryRegistry, RegisteredDelivery};
pub use error::{ConfigError, PasswordlessError, Result};
pub use middleware::Passwordless;
pub use outcome::Outcome;
pub use request::{Flash, RequestContext};
pub use token::{NumberTokenGenerator, RandomTokenGenerator, TokenAlgorithm, TokenGenerator};
