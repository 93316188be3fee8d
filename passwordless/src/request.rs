//! Per-request context.
//!
//! The surrounding web framework builds one [`RequestContext`] per incoming
//! request, hands it to the middleware procedures in pipeline order, and
//! reads the attached identity back afterwards. Nothing here is shared
//! between requests.
//!
//! Capabilities that upstream middleware would normally provide are
//! optional: a context without a body means no body parser ran, a context
//! without a session means no session middleware ran, and a context without
//! a [`Flash`] means flash messages are unavailable.

use crate::providers::Session;
use http::Method;
use std::collections::HashMap;
use std::fmt;

/// Flash messages queued for the next rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    messages: Vec<(String, String)>,
}

impl Flash {
    /// Create an empty flash store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Queue a message under `key`.
    pub fn push(&mut self, key: &str, message: impl Into<String>) {
        self.messages.push((key.to_string(), message.into()));
    }

    /// Messages queued under `key`, oldest first.
    #[must_use]
    pub fn messages(&self, key: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Remove and return the messages queued under `key`.
    pub fn take(&mut self, key: &str) -> Vec<String> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.messages.drain(..).partition(|(k, _)| k == key);
        self.messages = kept;
        taken.into_iter().map(|(_, m)| m).collect()
    }

    /// Returns `true` if no message is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Request-scoped state threaded through the middleware pipeline.
pub struct RequestContext {
    method: Method,
    original_url: String,
    query: HashMap<String, String>,
    body: Option<HashMap<String, String>>,
    session: Option<Box<dyn Session>>,
    flash: Option<Flash>,
    attributes: HashMap<String, String>,
    pending_uid: Option<String>,
}

/// Parse the query string part of `url` into a map.
fn parse_query(url: &str) -> HashMap<String, String> {
    url.split_once('?')
        .map(|(_, query)| query.split_once('#').map_or(query, |(q, _)| q))
        .and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

impl RequestContext {
    /// Create a context for `method` and the originally requested URL
    /// (path plus query string). Query parameters are parsed from the URL.
    #[must_use]
    pub fn new(method: Method, original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        let query = parse_query(&original_url);
        Self {
            method,
            original_url,
            query,
            body: None,
            session: None,
            flash: None,
            attributes: HashMap::new(),
            pending_uid: None,
        }
    }

    /// Create a GET context.
    #[must_use]
    pub fn get(original_url: impl Into<String>) -> Self {
        Self::new(Method::GET, original_url)
    }

    /// Create a POST context without a parsed body.
    #[must_use]
    pub fn post(original_url: impl Into<String>) -> Self {
        Self::new(Method::POST, original_url)
    }

    /// Attach a parsed body.
    #[must_use]
    pub fn with_body<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Attach a session.
    #[must_use]
    pub fn with_session(mut self, session: impl Session + 'static) -> Self {
        self.session = Some(Box::new(session));
        self
    }

    /// Enable the flash capability.
    #[must_use]
    pub fn with_flash(mut self) -> Self {
        self.flash = Some(Flash::new());
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Originally requested URL.
    #[must_use]
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Query parameter value.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns `true` if a body parser ran upstream.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Body field value.
    #[must_use]
    pub fn body(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name).map(String::as_str)
    }

    /// Session, if session middleware ran upstream.
    #[must_use]
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    /// Mutable session.
    pub fn session_mut(&mut self) -> Option<&mut (dyn Session + 'static)> {
        self.session.as_deref_mut()
    }

    /// Flash messages, if the flash capability is enabled.
    #[must_use]
    pub const fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    /// Mutable flash messages.
    pub fn flash_mut(&mut self) -> Option<&mut Flash> {
        self.flash.as_mut()
    }

    /// Request attribute, such as the authenticated uid.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set a request attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Remove a request attribute.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Uid resolved by a token request on this request.
    #[must_use]
    pub fn pending_uid(&self) -> Option<&str> {
        self.pending_uid.as_deref()
    }

    pub(crate) fn set_pending_uid(&mut self, uid: impl Into<String>) {
        self.pending_uid = Some(uid.into());
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("original_url", &self.original_url)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("session", &self.session.is_some())
            .field("flash", &self.flash)
            .field("attributes", &self.attributes)
            .field("pending_uid", &self.pending_uid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let ctx = RequestContext::get("/restricted?token=abc&uid=alice%40example.com#top");
        assert_eq!(ctx.query("token"), Some("abc"));
        assert_eq!(ctx.query("uid"), Some("alice@example.com"));
        assert_eq!(ctx.original_url(), "/restricted?token=abc&uid=alice%40example.com#top");
    }

    #[test]
    fn test_no_query() {
        let ctx = RequestContext::get("/restricted");
        assert_eq!(ctx.query("token"), None);
        assert!(!ctx.has_body());
        assert!(ctx.session().is_none());
        assert!(ctx.flash().is_none());
    }

    #[test]
    fn test_body_fields() {
        let ctx = RequestContext::post("/login").with_body([("user", "alice@example.com")]);
        assert!(ctx.has_body());
        assert_eq!(ctx.body("user"), Some("alice@example.com"));
        assert_eq!(ctx.body("delivery"), None);
        assert_eq!(*ctx.method(), Method::POST);
    }

    #[test]
    fn test_flash_take() {
        let mut flash = Flash::new();
        flash.push("passwordless", "bad token");
        flash.push("passwordless-success", "welcome");
        flash.push("passwordless", "still bad");

        assert_eq!(flash.messages("passwordless"), vec!["bad token", "still bad"]);
        assert_eq!(flash.take("passwordless-success"), vec!["welcome".to_string()]);
        assert!(flash.messages("passwordless-success").is_empty());
        assert!(!flash.is_empty());
    }

    #[test]
    fn test_attributes() {
        let mut ctx = RequestContext::get("/");
        ctx.set_attribute("user", "alice");
        assert_eq!(ctx.attribute("user"), Some("alice"));
        assert_eq!(ctx.remove_attribute("user").as_deref(), Some("alice"));
        assert_eq!(ctx.attribute("user"), None);
    }
}
