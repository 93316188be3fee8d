//! Delivery method trait.

use crate::error::Result;
use crate::request::RequestContext;
use futures::future::BoxFuture;

/// Delivery method.
///
/// Pairs contact resolution with out-of-band token transmission
/// (email, SMS, chat, ...). Implementations are registered once and shared
/// by every request, so they are object safe and return boxed futures.
pub trait DeliveryMethod: Send + Sync {
    /// Resolve the contact details a user submitted into a user id.
    ///
    /// # Arguments
    ///
    /// - `contact`: Contact details as submitted (e.g. an email address)
    /// - `delivery`: Delivery selector submitted with the request, if any
    /// - `request`: The current request
    ///
    /// # Returns
    ///
    /// - `Ok(Some(uid))`: Contact belongs to a known user
    /// - `Ok(None)`: Unknown contact (not an error)
    ///
    /// # Errors
    ///
    /// Returns error if the user lookup itself fails.
    fn resolve_user<'a>(
        &'a self,
        contact: &'a str,
        delivery: Option<&'a str>,
        request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<Option<String>>>;

    /// Transmit a token to the user.
    ///
    /// # Arguments
    ///
    /// - `token`: Token to send
    /// - `uid`: User id, to be embedded in the link next to the token
    /// - `recipient`: Contact details as submitted by the user
    /// - `request`: The current request
    ///
    /// # Errors
    ///
    /// Returns error if transmission fails.
    fn send_token<'a>(
        &'a self,
        token: &'a str,
        uid: &'a str,
        recipient: &'a str,
        request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Build the link a user follows to authenticate.
///
/// # Examples
///
/// ```
/// use passwordless::providers::token_url;
///
/// assert_eq!(
///     token_url("https://example.com/", "3xT9", "alice@example.com"),
///     "https://example.com/?token=3xT9&uid=alice%40example.com"
/// );
/// assert_eq!(
///     token_url("https://example.com/?lang=en", "3xT9", "42"),
///     "https://example.com/?lang=en&token=3xT9&uid=42"
/// );
/// ```
#[must_use]
pub fn token_url(base_url: &str, token: &str, uid: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{base_url}{separator}token={}&uid={}",
        urlencoding::encode(token),
        urlencoding::encode(uid)
    )
}
