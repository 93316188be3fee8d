//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of all provider
//! traits for use in unit and integration tests. Every mock is cheap to
//! clone and clones share state, so a test can keep a handle after moving
//! the mock into the middleware.

pub mod clock;
pub mod delivery;
pub mod session;
pub mod token_store;

pub use clock::ManualClock;
pub use delivery::{DeliveredToken, MockDelivery};
pub use session::MockSession;
pub use token_store::{MockTokenStore, StoreOperation};
