// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Identity, OptionalAuth};

/// Response for GET /v1/session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Whether the request carried a usable token
    pub authenticated: bool,
    /// The resolved identity, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

impl From<Option<Identity>> for SessionResponse {
    fn from(identity: Option<Identity>) -> Self {
        Self {
            authenticated: identity.is_some(),
            identity,
        }
    }
}

/// Get the current authenticated user's record.
///
/// The record comes from the identity store (with the secret field removed),
/// or is the token's claims when the datastore lookup is disabled.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User record", body = Identity),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(identity): Auth) -> Json<Identity> {
    Json(identity)
}

/// Describe the caller without requiring authentication.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Users",
    security((), ("bearer" = [])),
    responses(
        (status = 200, description = "Session information", body = SessionResponse),
    )
)]
pub async fn get_session(OptionalAuth(identity): OptionalAuth) -> Json<SessionResponse> {
    Json(identity.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_response_from_identity() {
        let identity = Identity::new(json!({"id": 1}).as_object().cloned().unwrap());

        let response: SessionResponse = Some(identity.clone()).into();
        assert!(response.authenticated);
        assert_eq!(response.identity, Some(identity));

        let response: SessionResponse = None.into();
        assert!(!response.authenticated);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"authenticated": false})
        );
    }
}
