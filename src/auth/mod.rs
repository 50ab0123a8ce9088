// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication: every request carries a signed
//! JWT, and the caller's identity is derived from it alone.
//!
//! ## Auth Flow
//!
//! 1. Locate the token: `Authorization: Bearer <JWT>` header, then the
//!    configured cookie, then the query parameter (`?token=`)
//! 2. Verify it:
//!    - header `alg` must be in the allow-list (default `HS256`)
//!    - signature checked with the configured key, or the application
//!      secret when none is configured
//!    - `exp` / `nbf` enforced when present
//! 3. Resolve the identity:
//!    - `sub` → record lookup in the identity store (secret field removed)
//!    - or the claims themselves when the datastore is disabled
//! 4. Protected routes without an identity report the configured failure
//!
//! ## Failure Handling
//!
//! - Production: verification errors become "no identity"; the last one is
//!   kept on the [`AuthAttempt`] and used as the reported message
//! - Debug: verification errors are returned to the caller
//! - Datastore errors always propagate

pub mod authenticator;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod keys;
pub mod locator;
pub mod middleware;
pub mod request;
pub mod settings;
pub mod verifier;

pub use authenticator::{AttemptState, AuthAttempt, Authenticator, DEFAULT_AUTH_ERROR};
pub use error::{AuthError, AuthFailure, AuthFailureBody, FailureKind, VerificationError};
pub use extractor::{Auth, AuthRejection, OptionalAuth};
pub use identity::{Claims, Identity};
pub use keys::{KeyMaterial, VerificationKey};
pub use locator::TokenLocator;
pub use request::RequestCredentials;
pub use settings::AuthSettings;
pub use verifier::Verifier;
