// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! - [`VerificationError`]: why a located token was rejected. Recovered into
//!   "no identity" in production, propagated in debug mode.
//! - [`AuthError`]: what may cross the `resolve_identity` boundary.
//! - [`AuthFailure`]: the structured, user-visible failure raised by
//!   `report_unauthenticated`, rendered as `{error, message, code, url}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// Token verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Not a structurally valid JWT (segments, base64, JSON).
    #[error("Malformed token: {0}")]
    Malformed(String),
    /// The header algorithm is not allow-listed.
    #[error("Algorithm not allowed: {0}")]
    DisallowedAlgorithm(String),
    /// Signature does not validate under the resolved key.
    #[error("Signature verification failed")]
    InvalidSignature,
    /// `exp` is in the past.
    #[error("Expired token")]
    Expired,
    /// `nbf` is in the future.
    #[error("Token is not yet valid")]
    NotYetValid,
    /// The key set has no entry for this token.
    #[error("No verification key found for {0}")]
    UnknownKey(String),
    /// Neither a configured key nor an application secret is available.
    #[error("No verification key configured")]
    MissingKey,
    /// The key cannot be used (bad PEM, wrong family for the algorithm).
    #[error("Invalid verification key: {0}")]
    InvalidKey(String),
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => VerificationError::Expired,
            ErrorKind::ImmatureSignature => VerificationError::NotYetValid,
            ErrorKind::InvalidSignature => VerificationError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => {
                VerificationError::InvalidKey("key does not match the token algorithm".to_string())
            }
            ErrorKind::InvalidAlgorithmName => VerificationError::DisallowedAlgorithm(e.to_string()),
            _ => VerificationError::Malformed(e.to_string()),
        }
    }
}

/// Errors that escape identity resolution.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Only returned in debug mode; production recovers these locally.
    #[error(transparent)]
    Verification(#[from] VerificationError),
    /// Datastore failures are not masked or retried.
    #[error("identity store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Verification(_) => "invalid_token",
            AuthError::Store(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Verification(_) => StatusCode::UNAUTHORIZED,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            AuthError::Verification(e) => e.to_string(),
            AuthError::Store(e) => {
                tracing::error!(error = %e, "identity lookup failed");
                "Internal server error".to_string()
            }
        };
        let body = Json(AuthErrorBody {
            error,
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

/// Kind of failure raised for unauthenticated access to a protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Plain `401 Unauthorized`.
    Unauthorized,
    /// `401` flagged as a token problem (`invalid_token`).
    InvalidToken,
    /// `403 Forbidden`.
    Forbidden,
}

impl FailureKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::InvalidToken => "invalid_token",
            FailureKind::Forbidden => "forbidden",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FailureKind::Unauthorized | FailureKind::InvalidToken => StatusCode::UNAUTHORIZED,
            FailureKind::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Parse a configuration value. `None` means reporting is disabled.
    pub fn parse(value: &str) -> Result<Option<FailureKind>, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "none" | "0" | "off" => Ok(None),
            "unauthorized" => Ok(Some(FailureKind::Unauthorized)),
            "invalid_token" | "jwt" => Ok(Some(FailureKind::InvalidToken)),
            "forbidden" => Ok(Some(FailureKind::Forbidden)),
            other => Err(format!("unknown failure kind '{other}'")),
        }
    }
}

/// Structured authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Wire body for a rendered [`AuthFailure`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthFailureBody {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub url: String,
}

impl AuthFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Render the failure for the request at `url`.
    pub fn render(&self, url: impl Into<String>) -> Response {
        let status = self.status_code();
        let body = AuthFailureBody {
            error: self.kind.error_code().to_string(),
            message: self.message.clone(),
            code: status.as_u16(),
            url: url.into(),
        };
        (status, Json(body)).into_response()
    }
}
