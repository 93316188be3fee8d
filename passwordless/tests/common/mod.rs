//! Shared helpers for integration tests.

#![allow(dead_code)]

use passwordless::mocks::{MockDelivery, MockTokenStore};
use passwordless::{DeliveryOptions, Passwordless, PasswordlessConfig, RequestContext};

/// Route log output through the test harness. Set `RUST_LOG=passwordless=debug`
/// to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Delivery method knowing alice and bob.
pub fn directory() -> MockDelivery {
    MockDelivery::new()
        .with_user("alice@example.com", "alice")
        .with_user("bob@example.com", "bob")
}

/// Middleware with a single default delivery method.
#[allow(clippy::unwrap_used)]
pub fn setup(
    store: MockTokenStore,
    config: PasswordlessConfig,
) -> (Passwordless<MockTokenStore>, MockDelivery) {
    init_tracing();
    let delivery = directory();
    let mut passwordless = Passwordless::new(store, config);
    passwordless
        .add_delivery(delivery.clone(), DeliveryOptions::new())
        .unwrap();
    (passwordless, delivery)
}

/// POST to the token request endpoint.
pub fn token_request(contact: &str) -> RequestContext {
    RequestContext::post("/sendtoken").with_body([("user", contact)])
}

/// GET following a delivered link.
pub fn link(path: &str, token: &str, uid: &str) -> RequestContext {
    RequestContext::get(passwordless::providers::token_url(path, token, uid))
}
