//! Middleware outcomes.

use http::StatusCode;

/// What the surrounding framework should do after a middleware procedure.
///
/// Outcomes cover every non-exceptional result, including rejected user
/// input and failed authentication. Collaborator failures and wiring
/// mistakes are reported as [`crate::PasswordlessError`] instead, so a broken
/// store is never mistaken for invalid credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Hand the request to the next handler.
    Continue,

    /// Answer with a redirect to the given location.
    Redirect(String),

    /// Answer with `400 Bad Request`.
    BadRequest,

    /// Answer with `401 Unauthorized`.
    Unauthorized {
        /// Value for the `WWW-Authenticate` header, if any.
        challenge: Option<String>,
    },
}

impl Outcome {
    /// Create an unauthorized outcome carrying `challenge`.
    #[must_use]
    pub fn unauthorized(challenge: impl Into<String>) -> Self {
        Self::Unauthorized {
            challenge: Some(challenge.into()),
        }
    }

    /// Returns `true` if the pipeline should continue.
    #[must_use]
    pub const fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Redirect target, if this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect(target) => Some(target),
            _ => None,
        }
    }

    /// Status code to answer with, or `None` when the pipeline continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use http::StatusCode;
    /// use passwordless::Outcome;
    ///
    /// assert_eq!(Outcome::Continue.status_code(), None);
    /// assert_eq!(Outcome::BadRequest.status_code(), Some(StatusCode::BAD_REQUEST));
    /// assert_eq!(
    ///     Outcome::Redirect("/login".to_string()).status_code(),
    ///     Some(StatusCode::FOUND)
    /// );
    /// ```
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Continue => None,
            Self::Redirect(_) => Some(StatusCode::FOUND),
            Self::BadRequest => Some(StatusCode::BAD_REQUEST),
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
        }
    }
}
