//! Passwordless configuration.
//!
//! This module provides the global configuration and the per-procedure
//! option sets. Values are provided by the application; the defaults mirror
//! the conventional field names (`user`, `delivery`, `token`, `uid`).
//!
//! Option combinations are checked by `validate()`, which applications can
//! call at setup time. The middleware procedures run the same check on every
//! call, so a bad combination fails on first use at the latest.

use crate::constants::{DEFAULT_USER_PROPERTY, fields};
use crate::error::ConfigError;

/// Global passwordless configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordlessConfig {
    /// Request attribute under which the authenticated uid is exposed.
    ///
    /// Default: `"user"`
    pub user_property: String,

    /// Allow a token to authenticate more than once until it expires.
    ///
    /// Usually required for stateless operation, but tokens seen in transit
    /// can then be replayed. Default: `false`
    pub allow_token_reuse: bool,

    /// Skip saving the session before redirects.
    ///
    /// For session backends that persist on their own (cookie sessions).
    /// Default: `false`
    pub skip_force_session_save: bool,
}

impl PasswordlessConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_property: DEFAULT_USER_PROPERTY.to_string(),
            allow_token_reuse: false,
            skip_force_session_save: false,
        }
    }

    /// Set the request attribute name for the uid.
    #[must_use]
    pub fn with_user_property(mut self, name: impl Into<String>) -> Self {
        self.user_property = name.into();
        self
    }

    /// Allow token reuse.
    #[must_use]
    pub const fn with_token_reuse(mut self, allow: bool) -> Self {
        self.allow_token_reuse = allow;
        self
    }

    /// Skip the forced session save before redirects.
    #[must_use]
    pub const fn with_skip_force_session_save(mut self, skip: bool) -> Self {
        self.skip_force_session_save = skip;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if `user_property` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_name("user_property", &self.user_property)
    }
}

impl Default for PasswordlessConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn require_name(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidOption {
            key,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Options for [`crate::Passwordless::request_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTokenOptions {
    /// Field carrying the user's contact details. Default: `"user"`
    pub user_field: String,

    /// Field selecting a named delivery method. Default: `"delivery"`
    pub delivery_field: String,

    /// Field carrying the URL to return to after authentication.
    ///
    /// Only read when set. Default: `None`
    pub origin_field: Option<String>,

    /// Read fields from the query string of GET requests. Default: `false`
    pub allow_get: bool,

    /// Redirect target for rejected requests. Default: `None`
    pub failure_redirect: Option<String>,

    /// Redirect target for missing, empty or unknown contacts.
    ///
    /// Takes precedence over `failure_redirect` for those cases.
    /// Default: `None`
    pub unknown_user_redirect: Option<String>,

    /// Message flashed when a request is rejected. Requires a failure or
    /// unknown-user redirect. Default: `None`
    pub failure_flash: Option<String>,

    /// Message flashed once the token has been sent. Default: `None`
    pub success_flash: Option<String>,

    /// Redirect target once the token has been sent.
    ///
    /// Without it the next handler renders the response. Default: `None`
    pub success_redirect: Option<String>,
}

impl RequestTokenOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_field: fields::USER.to_string(),
            delivery_field: fields::DELIVERY.to_string(),
            origin_field: None,
            allow_get: false,
            failure_redirect: None,
            unknown_user_redirect: None,
            failure_flash: None,
            success_flash: None,
            success_redirect: None,
        }
    }

    /// Set the contact field name.
    #[must_use]
    pub fn with_user_field(mut self, name: impl Into<String>) -> Self {
        self.user_field = name.into();
        self
    }

    /// Set the delivery selector field name.
    #[must_use]
    pub fn with_delivery_field(mut self, name: impl Into<String>) -> Self {
        self.delivery_field = name.into();
        self
    }

    /// Set the origin URL field name.
    #[must_use]
    pub fn with_origin_field(mut self, name: impl Into<String>) -> Self {
        self.origin_field = Some(name.into());
        self
    }

    /// Accept GET requests.
    #[must_use]
    pub const fn with_allow_get(mut self, allow: bool) -> Self {
        self.allow_get = allow;
        self
    }

    /// Set the failure redirect.
    #[must_use]
    pub fn with_failure_redirect(mut self, target: impl Into<String>) -> Self {
        self.failure_redirect = Some(target.into());
        self
    }

    /// Set the unknown-user redirect.
    #[must_use]
    pub fn with_unknown_user_redirect(mut self, target: impl Into<String>) -> Self {
        self.unknown_user_redirect = Some(target.into());
        self
    }

    /// Set the failure flash message.
    #[must_use]
    pub fn with_failure_flash(mut self, message: impl Into<String>) -> Self {
        self.failure_flash = Some(message.into());
        self
    }

    /// Set the success flash message.
    #[must_use]
    pub fn with_success_flash(mut self, message: impl Into<String>) -> Self {
        self.success_flash = Some(message.into());
        self
    }

    /// Set the success redirect.
    #[must_use]
    pub fn with_success_redirect(mut self, target: impl Into<String>) -> Self {
        self.success_redirect = Some(target.into());
        self
    }

    /// Check option combinations.
    ///
    /// # Errors
    ///
    /// Returns error if a field name is empty or `failure_flash` is set
    /// without any failure redirect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_name("user_field", &self.user_field)?;
        require_name("delivery_field", &self.delivery_field)?;
        if let Some(origin_field) = &self.origin_field {
            require_name("origin_field", origin_field)?;
        }
        if self.failure_flash.is_some()
            && self.failure_redirect.is_none()
            && self.unknown_user_redirect.is_none()
        {
            return Err(ConfigError::MissingDependentOption {
                option: "failure_flash",
                requires: "failure_redirect",
            });
        }
        Ok(())
    }

    /// Returns `true` if any flash message is configured.
    #[must_use]
    pub const fn uses_flash(&self) -> bool {
        self.failure_flash.is_some() || self.success_flash.is_some()
    }
}

impl Default for RequestTokenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`crate::Passwordless::accept_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptTokenOptions {
    /// Field carrying the token. Default: `"token"`
    pub token_field: String,

    /// Field carrying the uid. Default: `"uid"`
    pub uid_field: String,

    /// Also look for token and uid in the request body. Default: `false`
    pub allow_post: bool,

    /// Redirect target after successful authentication.
    ///
    /// Strongly recommended with sessions, so that tokens do not leak
    /// through the `Referer` header. Default: `None`
    pub success_redirect: Option<String>,

    /// Redirect to the origin URL stored with the token, if present.
    ///
    /// Takes precedence over `success_redirect`. Default: `false`
    pub enable_origin_redirect: bool,

    /// Message flashed when token and uid were supplied but rejected.
    /// Default: `None`
    pub failure_flash: Option<String>,

    /// Message flashed after successful authentication. Default: `None`
    pub success_flash: Option<String>,
}

impl AcceptTokenOptions {
    /// Create default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_field: fields::TOKEN.to_string(),
            uid_field: fields::UID.to_string(),
            allow_post: false,
            success_redirect: None,
            enable_origin_redirect: false,
            failure_flash: None,
            success_flash: None,
        }
    }

    /// Set the token field name.
    #[must_use]
    pub fn with_token_field(mut self, name: impl Into<String>) -> Self {
        self.token_field = name.into();
        self
    }

    /// Set the uid field name.
    #[must_use]
    pub fn with_uid_field(mut self, name: impl Into<String>) -> Self {
        self.uid_field = name.into();
        self
    }

    /// Accept token and uid from the request body.
    #[must_use]
    pub const fn with_allow_post(mut self, allow: bool) -> Self {
        self.allow_post = allow;
        self
    }

    /// Set the success redirect.
    #[must_use]
    pub fn with_success_redirect(mut self, target: impl Into<String>) -> Self {
        self.success_redirect = Some(target.into());
        self
    }

    /// Redirect to the stored origin URL.
    #[must_use]
    pub const fn with_origin_redirect(mut self, enable: bool) -> Self {
        self.enable_origin_redirect = enable;
        self
    }

    /// Set the failure flash message.
    #[must_use]
    pub fn with_failure_flash(mut self, message: impl Into<String>) -> Self {
        self.failure_flash = Some(message.into());
        self
    }

    /// Set the success flash message.
    #[must_use]
    pub fn with_success_flash(mut self, message: impl Into<String>) -> Self {
        self.success_flash = Some(message.into());
        self
    }

    /// Check option combinations.
    ///
    /// # Errors
    ///
    /// Returns error if a field name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_name("token_field", &self.token_field)?;
        require_name("uid_field", &self.uid_field)
    }

    /// Returns `true` if any flash message is configured.
    #[must_use]
    pub const fn uses_flash(&self) -> bool {
        self.failure_flash.is_some() || self.success_flash.is_some()
    }
}

impl Default for AcceptTokenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for [`crate::Passwordless::restricted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictedOptions {
    /// Redirect target for unauthenticated requests, typically a login
    /// page. Without it a `401` is returned. Default: `None`
    pub failure_redirect: Option<String>,

    /// Message flashed before redirecting. Requires `failure_redirect`.
    /// Default: `None`
    pub failure_flash: Option<String>,

    /// Query parameter carrying the originally requested URL on the
    /// failure redirect. Requires `failure_redirect`. Default: `None`
    pub origin_field: Option<String>,
}

impl RestrictedOptions {
    /// Create default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            failure_redirect: None,
            failure_flash: None,
            origin_field: None,
        }
    }

    /// Set the failure redirect.
    #[must_use]
    pub fn with_failure_redirect(mut self, target: impl Into<String>) -> Self {
        self.failure_redirect = Some(target.into());
        self
    }

    /// Set the failure flash message.
    #[must_use]
    pub fn with_failure_flash(mut self, message: impl Into<String>) -> Self {
        self.failure_flash = Some(message.into());
        self
    }

    /// Set the origin query parameter name.
    #[must_use]
    pub fn with_origin_field(mut self, name: impl Into<String>) -> Self {
        self.origin_field = Some(name.into());
        self
    }

    /// Check option combinations.
    ///
    /// # Errors
    ///
    /// Returns error if `failure_flash` or `origin_field` is set without
    /// `failure_redirect`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_redirect.is_some() {
            if let Some(origin_field) = &self.origin_field {
                require_name("origin_field", origin_field)?;
            }
            return Ok(());
        }
        if self.failure_flash.is_some() {
            return Err(ConfigError::MissingDependentOption {
                option: "failure_flash",
                requires: "failure_redirect",
            });
        }
        if self.origin_field.is_some() {
            return Err(ConfigError::MissingDependentOption {
                option: "origin_field",
                requires: "failure_redirect",
            });
        }
        Ok(())
    }
}

/// Options for [`crate::Passwordless::logout`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutOptions {
    /// Message flashed after logging out. Default: `None`
    pub success_flash: Option<String>,

    /// Message flashed when the outstanding tokens could not be
    /// invalidated. Default: `None`
    pub failure_flash: Option<String>,
}

impl LogoutOptions {
    /// Create default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success_flash: None,
            failure_flash: None,
        }
    }

    /// Set the success flash message.
    #[must_use]
    pub fn with_success_flash(mut self, message: impl Into<String>) -> Self {
        self.success_flash = Some(message.into());
        self
    }

    /// Set the failure flash message.
    #[must_use]
    pub fn with_failure_flash(mut self, message: impl Into<String>) -> Self {
        self.failure_flash = Some(message.into());
        self
    }

    /// Returns `true` if any flash message is configured.
    #[must_use]
    pub const fn uses_flash(&self) -> bool {
        self.failure_flash.is_some() || self.success_flash.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passwordless_config_builder() {
        let config = PasswordlessConfig::new()
            .with_user_property("uid")
            .with_token_reuse(true)
            .with_skip_force_session_save(true);

        assert_eq!(config.user_property, "uid");
        assert!(config.allow_token_reuse);
        assert!(config.skip_force_session_save);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_configs() {
        let config = PasswordlessConfig::default();
        assert_eq!(config.user_property, "user");
        assert!(!config.allow_token_reuse);

        let request = RequestTokenOptions::default();
        assert_eq!(request.user_field, "user");
        assert_eq!(request.delivery_field, "delivery");
        assert!(!request.allow_get);

        let accept = AcceptTokenOptions::default();
        assert_eq!(accept.token_field, "token");
        assert_eq!(accept.uid_field, "uid");
        assert!(!accept.allow_post);
    }

    #[test]
    fn test_empty_user_property_rejected() {
        let config = PasswordlessConfig::new().with_user_property("");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { key: "user_property", .. })
        ));
    }

    #[test]
    fn test_request_failure_flash_needs_redirect() {
        let options = RequestTokenOptions::new().with_failure_flash("Unknown user");
        assert_eq!(
            options.validate(),
            Err(ConfigError::MissingDependentOption {
                option: "failure_flash",
                requires: "failure_redirect",
            })
        );

        let options = options.with_unknown_user_redirect("/login");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_restricted_dependent_options() {
        let flash_only = RestrictedOptions::new().with_failure_flash("No access");
        assert!(flash_only.validate().is_err());

        let origin_only = RestrictedOptions::new().with_origin_field("origin");
        assert_eq!(
            origin_only.validate(),
            Err(ConfigError::MissingDependentOption {
                option: "origin_field",
                requires: "failure_redirect",
            })
        );

        let full = RestrictedOptions::new()
            .with_failure_redirect("/login")
            .with_failure_flash("No access")
            .with_origin_field("origin");
        assert!(full.validate().is_ok());
    }
}
