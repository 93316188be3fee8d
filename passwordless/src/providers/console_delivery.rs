//! Console delivery method for development and testing.

use crate::error::Result;
use crate::providers::delivery::{DeliveryMethod, token_url};
use crate::request::RequestContext;
use futures::future::BoxFuture;
use tracing::info;

/// Console delivery method.
///
/// Treats the submitted contact as the user id and prints the token link
/// instead of sending it. Useful during development where no mail or SMS
/// gateway is available.
///
/// # Examples
///
/// ```
/// use passwordless::mocks::MockTokenStore;
/// use passwordless::providers::ConsoleDelivery;
/// use passwordless::{DeliveryOptions, Passwordless, PasswordlessConfig};
///
/// let mut passwordless = Passwordless::new(MockTokenStore::new(), PasswordlessConfig::new());
/// passwordless.add_delivery(
///     ConsoleDelivery::new("http://localhost:3000/"),
///     DeliveryOptions::default(),
/// )?;
/// # Ok::<(), passwordless::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConsoleDelivery {
    base_url: String,
}

impl ConsoleDelivery {
    /// Create a console delivery printing links relative to `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Base URL used for printed links.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DeliveryMethod for ConsoleDelivery {
    fn resolve_user<'a>(
        &'a self,
        contact: &'a str,
        _delivery: Option<&'a str>,
        _request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<Option<String>>> {
        let uid = contact.trim();
        let uid = (!uid.is_empty()).then(|| uid.to_string());
        Box::pin(async move { Ok(uid) })
    }

    fn send_token<'a>(
        &'a self,
        token: &'a str,
        uid: &'a str,
        recipient: &'a str,
        _request: &'a RequestContext,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let link = token_url(&self.base_url, token, uid);

            info!(
                to = %recipient,
                uid = %uid,
                "Passwordless token (development mode)"
            );
            println!("{}", banner(recipient, token, &link));

            Ok(())
        })
    }
}

/// Development banner. Only the title is boxed; values of any length follow
/// on their own lines.
fn banner(recipient: &str, token: &str, link: &str) -> String {
    format!(
        "\n╔══════════════════════════════════════════════════════════════╗\n\
         ║                   PASSWORDLESS TOKEN                         ║\n\
         ╚══════════════════════════════════════════════════════════════╝\n\
         To:    {recipient}\n\
         Token: {token}\n\
         Link:  {link}\n"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contact_is_uid() {
        let delivery = ConsoleDelivery::new("http://localhost:3000/");
        let request = RequestContext::post("/sendtoken");

        let uid = delivery
            .resolve_user(" alice@example.com ", None, &request)
            .await
            .unwrap();
        assert_eq!(uid.as_deref(), Some("alice@example.com"));

        let unknown = delivery.resolve_user("   ", None, &request).await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_send_token_succeeds() {
        let delivery = ConsoleDelivery::new("http://localhost:3000/");
        let request = RequestContext::post("/sendtoken");

        delivery
            .send_token("3xT9abc", "alice", "alice@example.com", &request)
            .await
            .unwrap();
        assert_eq!(delivery.base_url(), "http://localhost:3000/");
    }

    #[test]
    fn test_banner_keeps_long_links_intact() {
        let link = token_url(
            "https://accounts.example.com/passwordless/callback",
            "3xT9abcDEFghiJKLmnoPQr",
            "alice@example.com",
        );
        let banner = banner("alice@example.com", "3xT9abcDEFghiJKLmnoPQr", &link);

        assert!(link.chars().count() > 61);
        assert!(banner.lines().any(|line| line == format!("Link:  {link}")));

        let boxed: Vec<usize> = banner
            .lines()
            .filter(|line| line.starts_with(['╔', '║', '╚']))
            .map(|line| line.chars().count())
            .collect();
        assert_eq!(boxed.len(), 3);
        assert!(boxed.iter().all(|&width| width == boxed[0]));
    }
}
