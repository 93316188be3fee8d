//! Restriction gate.

use super::{Passwordless, flash, require_flash};
use crate::config::RestrictedOptions;
use crate::constants::{challenges, flash as flash_keys};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::providers::TokenStore;
use crate::request::RequestContext;

impl<S: TokenStore> Passwordless<S> {
    /// Let the request through only if an identity is attached.
    ///
    /// Unauthenticated requests are redirected to `failure_redirect`, with
    /// the originally requested URL appended as `origin_field` if set, or
    /// answered with `401` and the challenge `Provide a token`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigError`] if `failure_flash` or `origin_field`
    /// is set without `failure_redirect`, or flash support is missing, and
    /// a session error if the session cannot be saved before the redirect.
    pub async fn restricted(
        &self,
        ctx: &mut RequestContext,
        options: &RestrictedOptions,
    ) -> Result<Outcome> {
        if self.identity(ctx).is_some() {
            return Ok(Outcome::Continue);
        }

        options.validate()?;
        let Some(failure_redirect) = &options.failure_redirect else {
            tracing::debug!(
                url = %ctx.original_url(),
                "Restricted resource requested without identity"
            );
            return Ok(Outcome::unauthorized(challenges::MISSING_TOKEN));
        };

        require_flash(ctx, options.failure_flash.is_some())?;
        flash(ctx, flash_keys::ERROR, options.failure_flash.as_deref());

        let target = match &options.origin_field {
            Some(origin_field) => {
                let separator = if failure_redirect.contains('?') { '&' } else { '?' };
                format!(
                    "{failure_redirect}{separator}{origin_field}={}",
                    urlencoding::encode(ctx.original_url())
                )
            }
            None => failure_redirect.clone(),
        };

        tracing::debug!(target = %target, "Redirecting unauthenticated request");
        self.redirect_with_session_save(ctx, target).await
    }
}
