// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Resolves the identity once, before the handler runs, and leaves the
//! [`AuthAttempt`](super::AuthAttempt) and the [`Identity`](super::Identity)
//! (if any) in the request extensions for the extractors.
//!
//! The middleware never rejects a request for lacking an identity: that is
//! up to the `Auth` extractor on protected routes. Only errors that escape
//! resolution (debug mode, datastore failures) short-circuit.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::{resolve, AuthRejection};
use crate::state::AppState;

/// Authentication middleware function.
pub async fn authenticate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    if let Err(e) = resolve(&mut parts, &state.authenticator) {
        return AuthRejection::Error(e).into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
