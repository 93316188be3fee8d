//! Token request: resolve a contact, issue a token and deliver it.

use super::{Passwordless, flash, require_flash};
use crate::config::RequestTokenOptions;
use crate::constants::{challenges, flash as flash_keys};
use crate::error::{ConfigError, Result};
use crate::outcome::Outcome;
use crate::providers::TokenStore;
use crate::request::RequestContext;
use http::Method;

/// Fields read from the token request.
#[derive(Debug, Default)]
struct TokenRequest {
    contact: Option<String>,
    delivery: Option<String>,
    origin: Option<String>,
}

impl TokenRequest {
    fn read(ctx: &RequestContext, options: &RequestTokenOptions) -> Self {
        let from_body = ctx.has_body() && *ctx.method() == Method::POST;
        let from_query = !from_body && options.allow_get && *ctx.method() == Method::GET;
        let field = |name: &str| -> Option<String> {
            if from_body {
                ctx.body(name).map(str::to_string)
            } else if from_query {
                ctx.query(name).map(str::to_string)
            } else {
                None
            }
        };

        Self {
            contact: field(&options.user_field),
            delivery: field(&options.delivery_field),
            origin: options.origin_field.as_deref().and_then(field),
        }
    }
}

/// Why a token request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// Contact given but empty, or not resolvable to a user.
    InvalidUser,
    /// Contact field missing.
    MissingUser,
    /// No delivery method for the selector.
    NoDelivery,
}

impl<S: TokenStore> Passwordless<S> {
    /// Issue a token for the contact submitted with the request.
    ///
    /// Reads the contact, delivery selector and (optionally) origin URL from
    /// the body of a POST request, or from the query of a GET request when
    /// `allow_get` is set. On success the uid is exposed through
    /// [`RequestContext::pending_uid`] and the pipeline continues, unless a
    /// success redirect is configured.
    ///
    /// # Outcomes
    ///
    /// - Empty or unknown contact: `401` with challenge `Provide a valid user`
    /// - Missing contact or no matching delivery method: `400`
    /// - Either, with a matching redirect configured: redirect
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] if no delivery method is registered, the request
    ///   has no parsed body and `allow_get` is not set, flash messages are
    ///   configured without flash support, or the options are inconsistent
    /// - A collaborator error if user resolution, token generation, the
    ///   store or the delivery method fails. A token stored before a failed
    ///   delivery stays valid.
    pub async fn request_token(
        &self,
        ctx: &mut RequestContext,
        options: &RequestTokenOptions,
    ) -> Result<Outcome> {
        self.check_config()?;
        options.validate()?;
        if !ctx.has_body() && !options.allow_get {
            return Err(ConfigError::MissingBodyParser.into());
        }
        if self.registry.is_empty() {
            return Err(ConfigError::NoDeliveryMethod.into());
        }
        require_flash(ctx, options.uses_flash())?;

        let request = TokenRequest::read(ctx, options);
        let contact = match request.contact.as_deref() {
            Some("") => return self.reject(ctx, options, Rejection::InvalidUser).await,
            Some(contact) => contact,
            None => return self.reject(ctx, options, Rejection::MissingUser).await,
        };
        let Some(delivery) = self.registry.resolve(request.delivery.as_deref()) else {
            return self.reject(ctx, options, Rejection::NoDelivery).await;
        };

        let uid = delivery
            .method()
            .resolve_user(contact, request.delivery.as_deref(), ctx)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to resolve user"))?;
        let Some(uid) = uid else {
            return self.reject(ctx, options, Rejection::InvalidUser).await;
        };

        let token = delivery
            .algorithm()
            .generate()
            .inspect_err(|e| tracing::error!(error = %e, "Failed to generate token"))?;

        self.store
            .store_or_update(&token, &uid, delivery.ttl(), request.origin.as_deref())
            .await
            .inspect_err(|e| tracing::error!(uid = %uid, error = %e, "Failed to store token"))?;

        delivery
            .method()
            .send_token(&token, &uid, contact, ctx)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    uid = %uid,
                    delivery = ?delivery.name(),
                    error = %e,
                    "Failed to deliver token, stored token remains valid"
                );
            })?;

        tracing::info!(
            uid = %uid,
            delivery = ?delivery.name(),
            ttl = ?delivery.ttl(),
            "Issued token"
        );

        ctx.set_pending_uid(uid);
        flash(ctx, flash_keys::SUCCESS, options.success_flash.as_deref());

        match &options.success_redirect {
            Some(target) => self.redirect_with_session_save(ctx, target.as_str()).await,
            None => Ok(Outcome::Continue),
        }
    }

    async fn reject(
        &self,
        ctx: &mut RequestContext,
        options: &RequestTokenOptions,
        rejection: Rejection,
    ) -> Result<Outcome> {
        tracing::debug!(?rejection, "Token request rejected");

        let redirect = match rejection {
            Rejection::InvalidUser | Rejection::MissingUser => options
                .unknown_user_redirect
                .as_ref()
                .or(options.failure_redirect.as_ref()),
            Rejection::NoDelivery => options.failure_redirect.as_ref(),
        };

        if let Some(target) = redirect {
            flash(ctx, flash_keys::ERROR, options.failure_flash.as_deref());
            return self.redirect_with_session_save(ctx, target.as_str()).await;
        }

        Ok(match rejection {
            Rejection::InvalidUser => Outcome::unauthorized(challenges::INVALID_USER),
            Rejection::MissingUser | Rejection::NoDelivery => Outcome::BadRequest,
        })
    }
}
