//! Passwordless providers.
//!
//! This module defines traits for every external collaborator of the
//! middleware. The core depends on these traits only, which keeps the
//! token lifecycle testable against in-memory mocks.
//!
//! ```text
//! ┌──────────────────┐   consume / authenticate / store_or_update / invalidate_user
//! │   Passwordless   │──────────────────────────────────────► TokenStore
//! │  (middleware)    │   resolve_user / send_token
//! │                  │──────────────────────────────────────► DeliveryMethod
//! │                  │   get / insert / remove / save
//! │                  │──────────────────────────────────────► Session
//! └──────────────────┘
//! ```

pub mod clock;
pub mod console_delivery;
pub mod delivery;
pub mod session;
pub mod token_store;

// Re-export provider traits
pub use clock::{Clock, SystemClock};
pub use console_delivery::ConsoleDelivery;
pub use delivery::{DeliveryMethod, token_url};
pub use session::Session;
pub use token_store::{Authentication, TokenRecord, TokenStore};
