//! Session bridge.

use super::Passwordless;
use crate::constants::SESSION_KEY;
use crate::error::{ConfigError, Result};
use crate::outcome::Outcome;
use crate::providers::TokenStore;
use crate::request::RequestContext;

impl<S: TokenStore> Passwordless<S> {
    /// Restore the identity stored in the session.
    ///
    /// Runs before [`Self::accept_token`] so that a user who authenticated
    /// on an earlier request stays logged in. Restoring twice yields the
    /// same identity. Always continues.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSession`] if the request has no session.
    #[allow(clippy::unused_async)]
    pub async fn session_support(&self, ctx: &mut RequestContext) -> Result<Outcome> {
        let session = ctx.session().ok_or(ConfigError::MissingSession)?;
        if let Some(uid) = session.get(SESSION_KEY) {
            tracing::debug!(uid = %uid, "Restored identity from session");
            ctx.set_attribute(&self.config.user_property, uid);
        }
        Ok(Outcome::Continue)
    }
}
