// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token location.
//!
//! Sources are searched in a fixed order and the first hit wins:
//!
//! 1. the configured header, when it carries the configured prefix
//!    (`Authorization: Bearer <token>`)
//! 2. the configured cookie
//! 3. the configured query parameter (`?token=<token>`)
//!
//! A source whose name is `None` is disabled and skipped entirely.

use super::request::RequestCredentials;
use super::settings::AuthSettings;

/// Finds the first bearer token present in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLocator {
    header: String,
    prefix: String,
    cookie: Option<String>,
    query_param: Option<String>,
}

impl TokenLocator {
    pub fn new(
        header: impl Into<String>,
        prefix: impl Into<String>,
        cookie: Option<String>,
        query_param: Option<String>,
    ) -> Self {
        Self {
            header: header.into(),
            prefix: prefix.into(),
            cookie: cookie.filter(|name| !name.is_empty()),
            query_param: query_param.filter(|name| !name.is_empty()),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.header.clone(),
            settings.prefix.clone(),
            settings.cookie.clone(),
            settings.query_param.clone(),
        )
    }

    /// Scan the request for a token.
    ///
    /// This always reads the request; per-request caching lives in
    /// [`AuthAttempt`](super::AuthAttempt).
    pub fn locate<R>(&self, request: &R) -> Option<String>
    where
        R: RequestCredentials + ?Sized,
    {
        if let Some(token) = request
            .header(&self.header)
            .and_then(|value| strip_prefix(value, &self.prefix))
        {
            tracing::debug!(source = "header", "bearer token located");
            return Some(token.to_string());
        }

        if let Some(token) = self.cookie.as_deref().and_then(|name| request.cookie(name)) {
            tracing::debug!(source = "cookie", "bearer token located");
            return Some(token);
        }

        if let Some(token) = self
            .query_param
            .as_deref()
            .and_then(|name| request.query_param(name))
        {
            tracing::debug!(source = "query", "bearer token located");
            return Some(token);
        }

        None
    }
}

/// Strip `<prefix><whitespace>` from a header value, ignoring ASCII case.
///
/// Blank values, values without the prefix and values with nothing after
/// the prefix yield `None`.
fn strip_prefix<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if prefix.is_empty() {
        return Some(value);
    }

    let head = value.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }

    let token = value[prefix.len()..]
        .strip_prefix(char::is_whitespace)?
        .trim_start();
    (!token.is_empty()).then_some(token)
}
