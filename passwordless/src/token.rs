//! Token generation.
//!
//! Tokens are drawn from the operating system's secure random source.
//! The default generator encodes 16 random bytes as base58, which keeps the
//! token URL-safe and free of lookalike characters (`0`, `O`, `I`, `l`).
//! The numeric generator produces short codes for channels like SMS.
//!
//! Custom algorithms implement [`TokenGenerator`] directly, or are plain
//! closures returning [`Result<String>`].

use crate::constants::{MIN_TOKEN_LENGTH, TOKEN_RANDOM_BYTES};
use crate::error::{PasswordlessError, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use std::num::NonZeroU32;

/// Produces token values.
pub trait TokenGenerator: Send + Sync {
    /// Generate a new token.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordlessError::TokenGeneration`] if no token can be
    /// produced (for example when the entropy source fails).
    fn generate(&self) -> Result<String>;
}

impl<F> TokenGenerator for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn generate(&self) -> Result<String> {
        self()
    }
}

/// Fill `buf` from the OS random source.
fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| PasswordlessError::TokenGeneration(e.to_string()))
}

/// Default generator: random bytes encoded as base58.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomTokenGenerator {
    bytes: usize,
}

impl RandomTokenGenerator {
    /// Create a generator drawing 16 random bytes per token.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: TOKEN_RANDOM_BYTES,
        }
    }

    /// Create a generator drawing `bytes` random bytes per token.
    ///
    /// Values below 16 are raised to 16.
    #[must_use]
    pub const fn with_bytes(bytes: usize) -> Self {
        let bytes = if bytes < TOKEN_RANDOM_BYTES {
            TOKEN_RANDOM_BYTES
        } else {
            bytes
        };
        Self { bytes }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> Result<String> {
        let mut buf = vec![0u8; self.bytes];
        // Leading zero bytes shorten the encoding; redraw until long enough.
        loop {
            fill_random(&mut buf)?;
            let token = bs58::encode(&buf).into_string();
            if token.len() >= MIN_TOKEN_LENGTH {
                return Ok(token);
            }
        }
    }
}

/// Numeric generator producing decimal strings in `[0, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberTokenGenerator {
    max: NonZeroU32,
}

impl NumberTokenGenerator {
    /// Create a generator for numbers in `[0, max)`.
    #[must_use]
    pub const fn new(max: NonZeroU32) -> Self {
        Self { max }
    }

    /// Upper bound (exclusive).
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max.get()
    }
}

impl TokenGenerator for NumberTokenGenerator {
    fn generate(&self) -> Result<String> {
        let mut buf = [0u8; 4];
        fill_random(&mut buf)?;
        let value = u32::from_be_bytes(buf) % self.max.get();
        Ok(value.to_string())
    }
}

/// Token algorithm selected for a delivery method.
#[derive(Clone)]
pub enum TokenAlgorithm {
    /// Base58 random token.
    Random(RandomTokenGenerator),
    /// Numeric code.
    Number(NumberTokenGenerator),
    /// User supplied generator.
    Custom(std::sync::Arc<dyn TokenGenerator>),
}

impl TokenAlgorithm {
    /// Generate a token with the selected algorithm.
    ///
    /// # Errors
    ///
    /// Propagates the generator's failure.
    pub fn generate(&self) -> Result<String> {
        match self {
            Self::Random(generator) => generator.generate(),
            Self::Number(generator) => generator.generate(),
            Self::Custom(generator) => generator.generate(),
        }
    }
}

impl Default for TokenAlgorithm {
    fn default() -> Self {
        Self::Random(RandomTokenGenerator::new())
    }
}

impl fmt::Debug for TokenAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random(generator) => f.debug_tuple("Random").field(generator).finish(),
            Self::Number(generator) => f.debug_tuple("Number").field(generator).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
