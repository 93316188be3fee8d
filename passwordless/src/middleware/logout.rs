//! Logout.

use super::{Passwordless, flash, require_flash};
use crate::config::LogoutOptions;
use crate::constants::{SESSION_KEY, flash as flash_keys};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::providers::TokenStore;
use crate::request::RequestContext;

impl<S: TokenStore> Passwordless<S> {
    /// Log the current user out.
    ///
    /// Removes the identity from the session and the request and
    /// invalidates the user's outstanding tokens. Invalidation is best
    /// effort: a store failure is logged and flashed through
    /// `failure_flash`, and the local state is cleared regardless. Without
    /// an identity this does nothing. Always continues.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingFlash`] if flash messages are
    /// configured without flash support.
    pub async fn logout(
        &self,
        ctx: &mut RequestContext,
        options: &LogoutOptions,
    ) -> Result<Outcome> {
        if let Some(session) = ctx.session_mut() {
            session.remove(SESSION_KEY);
        }

        let Some(uid) = self.identity(ctx).map(str::to_string) else {
            return Ok(Outcome::Continue);
        };
        require_flash(ctx, options.uses_flash())?;

        let invalidated = self.store.invalidate_user(&uid).await;
        ctx.remove_attribute(&self.config.user_property);

        match invalidated {
            Ok(()) => {
                tracing::info!(uid = %uid, "Logged out");
                flash(ctx, flash_keys::SUCCESS, options.success_flash.as_deref());
            }
            Err(e) => {
                tracing::warn!(
                    uid = %uid,
                    error = %e,
                    "Logged out, but outstanding tokens could not be invalidated"
                );
                flash(ctx, flash_keys::ERROR, options.failure_flash.as_deref());
            }
        }
        Ok(Outcome::Continue)
    }
}
