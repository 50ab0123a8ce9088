// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors raised by the router itself, outside any handler.
//!
//! They are rendered with the same `{error, message, code, url}` body as
//! authentication failures, so a client only has to parse one shape.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::AuthFailureBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_code: &'static str,
    pub message: String,
    /// Request path, without the query string.
    pub url: String,
}

impl ApiError {
    /// No route matched `uri`.
    pub fn not_found(uri: &Uri) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error_code: "not_found",
            message: format!("No route for {}", uri.path()),
            url: uri.path().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = AuthFailureBody {
            error: self.error_code.to_string(),
            message: self.message,
            code: self.status.as_u16(),
            url: self.url,
        };
        (self.status, Json(body)).into_response()
    }
}
