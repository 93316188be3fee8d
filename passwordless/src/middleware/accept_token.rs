//! Token acceptance: authenticate a token + uid pair.

use super::{Passwordless, flash, require_flash};
use crate::config::AcceptTokenOptions;
use crate::constants::{SESSION_KEY, flash as flash_keys};
use crate::error::{ConfigError, Result};
use crate::outcome::Outcome;
use crate::providers::{Authentication, TokenStore};
use crate::request::RequestContext;

impl<S: TokenStore> Passwordless<S> {
    /// Authenticate the token and uid carried by the request.
    ///
    /// Credentials are read from the query. With `allow_post` they are also
    /// read from the body when the query carries neither. A request without
    /// credentials passes through untouched.
    ///
    /// On success the uid is attached to the request (and mirrored into the
    /// session, if there is one). Unless token reuse is allowed, the token is
    /// checked and all outstanding tokens of the uid are invalidated in one
    /// atomic [`TokenStore::consume`] call. The request is then
    /// redirected to the stored origin URL (with `enable_origin_redirect`),
    /// else to `success_redirect`, else it continues.
    ///
    /// An invalid, expired or already used token is not an error: the
    /// request continues without identity.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingBodyParser`] if `allow_post` is set, the
    ///   query carries no credentials and the request has no parsed body
    /// - [`ConfigError::MissingFlash`] if flash messages are configured
    ///   without flash support
    /// - A store error if authentication or consumption fails
    /// - A session error if the session cannot be saved before a redirect
    pub async fn accept_token(
        &self,
        ctx: &mut RequestContext,
        options: &AcceptTokenOptions,
    ) -> Result<Outcome> {
        self.check_config()?;
        options.validate()?;

        let mut token = ctx.query(&options.token_field).map(str::to_string);
        let mut uid = ctx.query(&options.uid_field).map(str::to_string);
        if token.is_none() && uid.is_none() && options.allow_post {
            if !ctx.has_body() {
                return Err(ConfigError::MissingBodyParser.into());
            }
            if let (Some(body_token), Some(body_uid)) =
                (ctx.body(&options.token_field), ctx.body(&options.uid_field))
            {
                token = Some(body_token.to_string());
                uid = Some(body_uid.to_string());
            }
        }

        require_flash(ctx, options.uses_flash())?;

        let (Some(token), Some(uid)) = (token, uid) else {
            return Ok(Outcome::Continue);
        };
        if token.is_empty() || uid.is_empty() {
            return Ok(Outcome::Continue);
        }

        let authentication = if self.config.allow_token_reuse {
            self.store.authenticate(&token, &uid).await
        } else {
            self.store.consume(&token, &uid).await
        }
        .inspect_err(|e| {
            tracing::error!(uid = %uid, error = %e, "Failed to authenticate token");
        })?;

        let Authentication::Valid { origin_url } = authentication else {
            tracing::debug!(uid = %uid, "Invalid or expired token");
            flash(ctx, flash_keys::ERROR, options.failure_flash.as_deref());
            return Ok(Outcome::Continue);
        };

        tracing::info!(uid = %uid, "Accepted token");

        ctx.set_attribute(&self.config.user_property, uid.clone());
        if let Some(session) = ctx.session_mut() {
            session.insert(SESSION_KEY, uid);
        }
        flash(ctx, flash_keys::SUCCESS, options.success_flash.as_deref());

        let target = origin_url
            .filter(|_| options.enable_origin_redirect)
            .or_else(|| options.success_redirect.clone());
        match target {
            Some(target) => self.redirect_with_session_save(ctx, target).await,
            None => Ok(Outcome::Continue),
        }
    }
}
