//! Error types for passwordless authentication.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for passwordless operations.
pub type Result<T> = std::result::Result<T, PasswordlessError>;

/// Error taxonomy for the passwordless middleware.
///
/// Failed authentication is not represented here: an invalid, expired or
/// reused token is a normal negative outcome (see [`crate::Outcome`]).
/// Everything in this enum is either a wiring mistake ([`Self::Config`])
/// or a failure of a collaborator the core calls into.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordlessError {
    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// The middleware has been wired incorrectly.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // ═══════════════════════════════════════════════════════════
    // Collaborator Errors
    // ═══════════════════════════════════════════════════════════

    /// Token store operation failed.
    #[error("Token store error: {0}")]
    Store(String),

    /// Delivery method failed to transmit a token.
    #[error("Token delivery error: {0}")]
    Delivery(String),

    /// Delivery method failed to resolve a contact into a user id.
    #[error("User resolution error: {0}")]
    UserResolution(String),

    /// Session could not be persisted.
    #[error("Session error: {0}")]
    Session(String),

    /// Token generator could not produce a token.
    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    /// Internal error (lock poisoning and similar).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wiring errors, raised at setup or on first use.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No delivery method has been registered.
    #[error("at least one delivery method is required, register one with add_delivery()")]
    NoDeliveryMethod,

    /// Unnamed and named delivery methods cannot be combined.
    #[error("default delivery methods and named delivery methods shall not be mixed")]
    MixedDeliveryMethods,

    /// A second unnamed delivery method was registered.
    #[error("only one default delivery method may be registered")]
    DuplicateDefaultDelivery,

    /// Two named delivery methods share a name.
    #[error("a delivery method named '{0}' is already registered")]
    DuplicateDeliveryName(String),

    /// Both a custom token algorithm and a number token were configured.
    #[error("token_algorithm cannot be used together with number_token_max")]
    ConflictingTokenAlgorithms,

    /// An option carries an unusable value.
    #[error("invalid value for '{key}': {message}")]
    InvalidOption {
        /// Option name.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// An option requires another option that is not set.
    #[error("'{option}' cannot be used without '{requires}'")]
    MissingDependentOption {
        /// The option that was set.
        option: &'static str,
        /// The option it depends on.
        requires: &'static str,
    },

    /// Request body was expected but no body parser ran upstream.
    #[error("request body does not exist, a body parser is required upstream")]
    MissingBodyParser,

    /// Session support was requested but no session exists on the request.
    #[error("session support requires session middleware upstream")]
    MissingSession,

    /// Flash messages were configured but no flash capability exists.
    #[error("flash messages require flash middleware upstream")]
    MissingFlash,
}

impl PasswordlessError {
    /// Create a token store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a delivery error.
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a user resolution error.
    pub fn user_resolution(msg: impl Into<String>) -> Self {
        Self::UserResolution(msg.into())
    }

    /// Create a session error.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Returns `true` if this error is caused by incorrect wiring.
    ///
    /// # Examples
    ///
    /// ```
    /// # use passwordless::{ConfigError, PasswordlessError};
    /// assert!(PasswordlessError::Config(ConfigError::MissingFlash).is_config_error());
    /// assert!(!PasswordlessError::store("down").is_config_error());
    /// ```
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this error was reported by a collaborator
    /// (store, delivery, resolver, session or entropy source).
    ///
    /// # Examples
    ///
    /// ```
    /// # use passwordless::PasswordlessError;
    /// assert!(PasswordlessError::delivery("smtp refused").is_collaborator_error());
    /// ```
    pub const fn is_collaborator_error(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Delivery(_)
                | Self::UserResolution(_)
                | Self::Session(_)
                | Self::TokenGeneration(_)
        )
    }

    /// HTTP status the surrounding framework should answer with.
    ///
    /// Every error is a server-side failure; user input problems are
    /// reported through [`crate::Outcome`] instead.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PasswordlessError::from(ConfigError::DuplicateDeliveryName("sms".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: a delivery method named 'sms' is already registered"
        );
    }

    #[test]
    fn test_dependent_option_display() {
        let err = ConfigError::MissingDependentOption {
            option: "failure_flash",
            requires: "failure_redirect",
        };
        assert_eq!(
            err.to_string(),
            "'failure_flash' cannot be used without 'failure_redirect'"
        );
    }

    #[test]
    fn test_classification() {
        assert!(PasswordlessError::store("x").is_collaborator_error());
        assert!(PasswordlessError::user_resolution("x").is_collaborator_error());
        assert!(!PasswordlessError::Internal("x".to_string()).is_collaborator_error());
        assert!(PasswordlessError::from(ConfigError::NoDeliveryMethod).is_config_error());
        assert_eq!(
            PasswordlessError::session("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
