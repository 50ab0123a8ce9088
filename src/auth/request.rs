// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read access to the credential-bearing parts of an inbound request.

use axum::http::{header::COOKIE, request::Parts};

/// Capability to read the places a bearer token may be carried in.
///
/// The authenticator never touches the HTTP request directly; anything that
/// can answer these three questions can be authenticated.
pub trait RequestCredentials {
    /// Value of the named header, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the named cookie, if present. An empty value is still present.
    fn cookie(&self, name: &str) -> Option<String>;

    /// Percent-decoded value of the named query parameter, if present.
    fn query_param(&self, name: &str) -> Option<String>;
}

impl RequestCredentials for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|line| find_cookie(line, name))
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Find `name` in a `Cookie` header line (`a=1; b=2`).
fn find_cookie(line: &str, name: &str) -> Option<String> {
    line.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"').to_string())
    })
}
