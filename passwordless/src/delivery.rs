//! Delivery registry.
//!
//! A registry holds either exactly one unnamed (default) delivery method or
//! one or more named methods, never both. The variants of
//! [`DeliveryRegistry`] encode that rule; registration returns a
//! [`ConfigError`] for anything that would break it.

use crate::constants::DEFAULT_TTL;
use crate::error::ConfigError;
use crate::providers::DeliveryMethod;
use crate::token::{NumberTokenGenerator, RandomTokenGenerator, TokenAlgorithm, TokenGenerator};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Per-method delivery options.
#[derive(Clone, Default)]
pub struct DeliveryOptions {
    /// Token time-to-live. Default: 1 hour
    pub ttl: Option<Duration>,

    /// Custom token algorithm. Default: 16 random bytes, base58 encoded
    pub token_algorithm: Option<Arc<dyn TokenGenerator>>,

    /// Generate numeric tokens in `[0, max)` instead.
    ///
    /// Cannot be combined with `token_algorithm`. Default: `None`
    pub number_token_max: Option<u32>,
}

impl DeliveryOptions {
    /// Create default options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ttl: None,
            token_algorithm: None,
            number_token_max: None,
        }
    }

    /// Set the token time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set a custom token algorithm.
    #[must_use]
    pub fn with_token_algorithm(mut self, algorithm: impl TokenGenerator + 'static) -> Self {
        self.token_algorithm = Some(Arc::new(algorithm));
        self
    }

    /// Generate numeric tokens below `max`.
    #[must_use]
    pub const fn with_number_token(mut self, max: u32) -> Self {
        self.number_token_max = Some(max);
        self
    }

    /// Validate the options and resolve TTL and algorithm.
    fn resolve(self) -> Result<(Duration, TokenAlgorithm), ConfigError> {
        let ttl = match self.ttl {
            Some(ttl) if ttl.is_zero() => {
                return Err(ConfigError::InvalidOption {
                    key: "ttl",
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(ttl) => ttl,
            None => DEFAULT_TTL,
        };

        let algorithm = match (self.token_algorithm, self.number_token_max) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingTokenAlgorithms),
            (Some(custom), None) => TokenAlgorithm::Custom(custom),
            (None, Some(max)) => {
                let max = NonZeroU32::new(max).ok_or_else(|| ConfigError::InvalidOption {
                    key: "number_token_max",
                    message: "must be greater than zero".to_string(),
                })?;
                TokenAlgorithm::Number(NumberTokenGenerator::new(max))
            }
            (None, None) => TokenAlgorithm::Random(RandomTokenGenerator::new()),
        };

        Ok((ttl, algorithm))
    }
}

impl fmt::Debug for DeliveryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryOptions")
            .field("ttl", &self.ttl)
            .field("token_algorithm", &self.token_algorithm.as_ref().map(|_| ".."))
            .field("number_token_max", &self.number_token_max)
            .finish()
    }
}

/// A delivery method together with its resolved options.
#[derive(Clone)]
pub struct RegisteredDelivery {
    name: Option<String>,
    method: Arc<dyn DeliveryMethod>,
    ttl: Duration,
    algorithm: TokenAlgorithm,
}

impl RegisteredDelivery {
    /// Name, or `None` for the default method.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The delivery method.
    #[must_use]
    pub fn method(&self) -> &dyn DeliveryMethod {
        self.method.as_ref()
    }

    /// Token time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Token algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> &TokenAlgorithm {
        &self.algorithm
    }
}

impl fmt::Debug for RegisteredDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredDelivery")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Registered delivery methods.
#[derive(Clone, Debug, Default)]
pub enum DeliveryRegistry {
    /// Nothing registered yet.
    #[default]
    Empty,

    /// A single default method.
    Unnamed(RegisteredDelivery),

    /// One or more named methods.
    Named(BTreeMap<String, RegisteredDelivery>),
}

impl DeliveryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self::Empty
    }

    /// Register the default delivery method.
    ///
    /// # Errors
    ///
    /// Returns error if the options are invalid, a default method already
    /// exists, or named methods are registered.
    pub fn register_default(
        &mut self,
        method: impl DeliveryMethod + 'static,
        options: DeliveryOptions,
    ) -> Result<(), ConfigError> {
        let (ttl, algorithm) = options.resolve()?;
        match self {
            Self::Unnamed(_) => Err(ConfigError::DuplicateDefaultDelivery),
            Self::Named(_) => Err(ConfigError::MixedDeliveryMethods),
            Self::Empty => {
                *self = Self::Unnamed(RegisteredDelivery {
                    name: None,
                    method: Arc::new(method),
                    ttl,
                    algorithm,
                });
                Ok(())
            }
        }
    }

    /// Register a named delivery method.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty, the options are invalid, a
    /// default method is registered, or the name is taken.
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        method: impl DeliveryMethod + 'static,
        options: DeliveryOptions,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::InvalidOption {
                key: "name",
                message: "delivery method names must not be empty".to_string(),
            });
        }
        let (ttl, algorithm) = options.resolve()?;
        let registered = RegisteredDelivery {
            name: Some(name.clone()),
            method: Arc::new(method),
            ttl,
            algorithm,
        };

        match self {
            Self::Unnamed(_) => Err(ConfigError::MixedDeliveryMethods),
            Self::Named(methods) => {
                if methods.contains_key(&name) {
                    return Err(ConfigError::DuplicateDeliveryName(name));
                }
                methods.insert(name, registered);
                Ok(())
            }
            Self::Empty => {
                *self = Self::Named(BTreeMap::from([(name, registered)]));
                Ok(())
            }
        }
    }

    /// Look up a delivery method.
    ///
    /// Returns the named method if `name` is given and registered,
    /// otherwise the default method. `None` if neither exists.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>) -> Option<&RegisteredDelivery> {
        match self {
            Self::Empty => None,
            Self::Unnamed(default) => Some(default),
            Self::Named(methods) => name.and_then(|name| methods.get(name)),
        }
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Unnamed(_) => 1,
            Self::Named(methods) => methods.len(),
        }
    }

    /// Names of the registered named methods, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Named(methods) => methods.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::mocks::MockDelivery;

    #[test]
    fn test_default_registration() {
        let mut registry = DeliveryRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(None).is_none());

        registry
            .register_default(MockDelivery::new(), DeliveryOptions::default())
            .unwrap();

        let delivery = registry.resolve(None).unwrap();
        assert_eq!(delivery.name(), None);
        assert_eq!(delivery.ttl(), DEFAULT_TTL);
        assert!(matches!(delivery.algorithm(), TokenAlgorithm::Random(_)));

        // Selector is ignored for the default method
        assert!(registry.resolve(Some("sms")).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_second_default_rejected() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_default(MockDelivery::new(), DeliveryOptions::default())
            .unwrap();

        assert_eq!(
            registry.register_default(MockDelivery::new(), DeliveryOptions::default()),
            Err(ConfigError::DuplicateDefaultDelivery)
        );
    }

    #[test]
    fn test_default_then_named_rejected() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_default(MockDelivery::new(), DeliveryOptions::default())
            .unwrap();

        assert_eq!(
            registry.register_named("sms", MockDelivery::new(), DeliveryOptions::default()),
            Err(ConfigError::MixedDeliveryMethods)
        );
    }

    #[test]
    fn test_named_then_default_rejected() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_named("email", MockDelivery::new(), DeliveryOptions::default())
            .unwrap();

        assert_eq!(
            registry.register_default(MockDelivery::new(), DeliveryOptions::default()),
            Err(ConfigError::MixedDeliveryMethods)
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_named("email", MockDelivery::new(), DeliveryOptions::default())
            .unwrap();

        assert_eq!(
            registry.register_named("email", MockDelivery::new(), DeliveryOptions::default()),
            Err(ConfigError::DuplicateDeliveryName("email".to_string()))
        );
    }

    #[test]
    fn test_named_resolution() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_named("email", MockDelivery::new(), DeliveryOptions::default())
            .unwrap();
        registry
            .register_named(
                "sms",
                MockDelivery::new(),
                DeliveryOptions::new()
                    .with_ttl(Duration::from_secs(300))
                    .with_number_token(1_000_000),
            )
            .unwrap();

        assert_eq!(registry.names(), vec!["email", "sms"]);
        assert_eq!(registry.resolve(Some("email")).unwrap().name(), Some("email"));

        let sms = registry.resolve(Some("sms")).unwrap();
        assert_eq!(sms.ttl(), Duration::from_secs(300));
        assert!(matches!(sms.algorithm(), TokenAlgorithm::Number(g) if g.max() == 1_000_000));

        // No default to fall back to
        assert!(registry.resolve(None).is_none());
        assert!(registry.resolve(Some("pigeon")).is_none());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut registry = DeliveryRegistry::new();

        let both = DeliveryOptions::new()
            .with_token_algorithm(|| -> Result<String> { Ok("token".to_string()) })
            .with_number_token(100);
        assert_eq!(
            registry.register_default(MockDelivery::new(), both),
            Err(ConfigError::ConflictingTokenAlgorithms)
        );

        let zero_ttl = DeliveryOptions::new().with_ttl(Duration::ZERO);
        assert!(matches!(
            registry.register_default(MockDelivery::new(), zero_ttl),
            Err(ConfigError::InvalidOption { key: "ttl", .. })
        ));

        let zero_max = DeliveryOptions::new().with_number_token(0);
        assert!(matches!(
            registry.register_named("sms", MockDelivery::new(), zero_max),
            Err(ConfigError::InvalidOption { key: "number_token_max", .. })
        ));

        assert!(matches!(
            registry.register_named("", MockDelivery::new(), DeliveryOptions::default()),
            Err(ConfigError::InvalidOption { key: "name", .. })
        ));

        // Failed registrations leave the registry untouched
        assert!(registry.is_empty());
    }

    #[test]
    fn test_custom_algorithm_registered() {
        let mut registry = DeliveryRegistry::new();
        registry
            .register_default(
                MockDelivery::new(),
                DeliveryOptions::new()
                    .with_token_algorithm(|| -> Result<String> { Ok("random".to_string()) }),
            )
            .unwrap();

        let delivery = registry.resolve(None).unwrap();
        assert_eq!(delivery.algorithm().generate().unwrap(), "random");
    }
}
