// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the caller's identity.
//!
//! Use the `Auth` extractor in handlers to require an identity:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is the resolved user record (or token claims)
//! }
//! ```
//!
//! Identity is resolved at most once per request: the result is kept in the
//! request extensions, where the [`authenticate`](super::middleware::authenticate)
//! middleware also leaves it.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use super::{AuthAttempt, AuthError, AuthFailure, Authenticator, Identity};
use crate::state::AppState;

/// Rejection of the [`Auth`] extractor.
#[derive(Debug)]
pub enum AuthRejection {
    /// Reported failure, rendered as `{error, message, code, url}`.
    Failure { failure: AuthFailure, url: String },
    /// No identity and reporting is disabled.
    Unauthenticated,
    /// Debug-mode verification error or datastore failure.
    Error(AuthError),
}

impl From<AuthError> for AuthRejection {
    fn from(e: AuthError) -> Self {
        AuthRejection::Error(e)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Failure { failure, url } => failure.render(url),
            AuthRejection::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            AuthRejection::Error(e) => e.into_response(),
        }
    }
}

/// Resolve the identity of the request, reusing an earlier resolution.
///
/// The attempt (and the identity, if any) is stored in the request
/// extensions.
pub(crate) fn resolve(
    parts: &mut Parts,
    authenticator: &Authenticator,
) -> Result<Option<Identity>, AuthError> {
    if let Some(identity) = parts.extensions.get::<Identity>() {
        return Ok(Some(identity.clone()));
    }
    if parts
        .extensions
        .get::<AuthAttempt>()
        .is_some_and(|attempt| attempt.state().is_terminal())
    {
        return Ok(None);
    }

    let mut attempt = AuthAttempt::new();
    let identity = authenticator.resolve_identity(&*parts, &mut attempt)?;
    parts.extensions.insert(attempt);
    if let Some(ref identity) = identity {
        parts.extensions.insert(identity.clone());
    }
    Ok(identity)
}

/// Extractor requiring an identity.
///
/// Without one, the configured failure is reported.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(Auth(identity): Auth) -> Json<Identity> {
///     Json(identity)
/// }
/// ```
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(identity) = resolve(parts, &state.authenticator)? {
            return Ok(Auth(identity));
        }

        let attempt = parts
            .extensions
            .get::<AuthAttempt>()
            .cloned()
            .unwrap_or_default();
        match state.authenticator.report_unauthenticated(&attempt) {
            Err(failure) => Err(AuthRejection::Failure {
                failure,
                url: request_path(parts),
            }),
            Ok(()) => Err(AuthRejection::Unauthenticated),
        }
    }
}

/// Path of the request as received, before any router nesting.
fn request_path(parts: &Parts) -> String {
    match parts.extensions.get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => parts.uri.path().to_string(),
    }
}

/// Optional identity extractor.
///
/// Returns `None` if no identity can be resolved. Errors that escape
/// resolution (debug mode, datastore failures) still reject.
pub struct OptionalAuth(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(resolve(parts, &state.authenticator)?))
    }
}
