//! Passwordless constants.
//!
//! Default field names, flash keys and token parameters shared by the
//! middleware procedures.

use std::time::Duration;

/// Default token time-to-live (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_millis(60 * 60 * 1000);

/// Request attribute that carries the authenticated uid by default.
pub const DEFAULT_USER_PROPERTY: &str = "user";

/// Session key under which the authenticated uid is mirrored.
pub const SESSION_KEY: &str = "passwordless";

/// Number of random bytes drawn for a default token.
pub const TOKEN_RANDOM_BYTES: usize = 16;

/// Minimum length of a default (base58) token.
pub const MIN_TOKEN_LENGTH: usize = 20;

/// Default request field names.
pub mod fields {
    /// Query/body field carrying the token.
    pub const TOKEN: &str = "token";

    /// Query/body field carrying the uid.
    pub const UID: &str = "uid";

    /// Field carrying the user's contact details (e.g. email address).
    pub const USER: &str = "user";

    /// Field selecting a named delivery method.
    pub const DELIVERY: &str = "delivery";
}

/// Flash message keys.
pub mod flash {
    /// Key for failure messages.
    pub const ERROR: &str = "passwordless";

    /// Key for success messages.
    pub const SUCCESS: &str = "passwordless-success";
}

/// Authentication challenges sent along 401 outcomes.
pub mod challenges {
    /// Contact was empty or could not be resolved.
    pub const INVALID_USER: &str = "Provide a valid user";

    /// Restricted resource requested without identity.
    pub const MISSING_TOKEN: &str = "Provide a token";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(DEFAULT_TTL.as_millis(), 3_600_000);
    }

    #[test]
    fn test_flash_keys() {
        assert_eq!(flash::ERROR, "passwordless");
        assert_eq!(flash::SUCCESS, "passwordless-success");
    }
}
