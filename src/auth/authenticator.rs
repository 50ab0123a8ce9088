// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity resolution.
//!
//! One [`Authenticator`] is shared by all requests; everything learned while
//! authenticating a single request lives in an [`AuthAttempt`] owned by that
//! request.
//!
//! ```text
//! Pending ─► NoToken
//!        └─► Located ─► VerificationFailed
//!                   └─► Verified ─► Resolved
//!                               └─► Unresolved (no sub / no record)
//! ```

use std::sync::{Arc, OnceLock};

use super::error::{AuthError, AuthFailure, FailureKind, VerificationError};
use super::identity::{subject, Claims, Identity};
use super::locator::TokenLocator;
use super::request::RequestCredentials;
use super::settings::AuthSettings;
use super::verifier::Verifier;
use crate::storage::{IdentityStore, Lookup};

/// Message used when nothing more specific is known about the failure.
pub const DEFAULT_AUTH_ERROR: &str = "You are not authorized to access that location.";

/// Where an authentication attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Nothing has been looked at yet.
    Pending,
    /// No enabled source carried a token.
    NoToken,
    /// A token was found but not yet verified.
    Located,
    /// The token was rejected.
    VerificationFailed,
    /// The token verified; identity not yet resolved.
    Verified,
    /// An identity was produced.
    Resolved,
    /// The token verified but no identity could be derived from it.
    Unresolved,
}

impl AttemptState {
    /// Whether identity resolution has run to completion.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::NoToken
                | AttemptState::VerificationFailed
                | AttemptState::Resolved
                | AttemptState::Unresolved
        )
    }
}

/// Request-scoped authentication state.
///
/// Create one per request and never share it across requests.
#[derive(Debug, Clone)]
pub struct AuthAttempt {
    token: OnceLock<Option<String>>,
    payload: Option<Claims>,
    last_error: Option<VerificationError>,
    state: AttemptState,
}

impl Default for AuthAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthAttempt {
    pub fn new() -> Self {
        Self {
            token: OnceLock::new(),
            payload: None,
            last_error: None,
            state: AttemptState::Pending,
        }
    }

    /// The located token, if location has happened.
    pub fn token(&self) -> Option<&str> {
        self.token.get().and_then(|t| t.as_deref())
    }

    /// Claims of the token, only set after a successful verification.
    pub fn payload(&self) -> Option<&Claims> {
        self.payload.as_ref()
    }

    /// The most recent verification failure of this attempt.
    pub fn last_error(&self) -> Option<&VerificationError> {
        self.last_error.as_ref()
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }
}

/// JWT authenticator.
#[derive(Clone)]
pub struct Authenticator {
    settings: AuthSettings,
    locator: TokenLocator,
    verifier: Verifier,
    store: Arc<dyn IdentityStore>,
    debug: bool,
    auth_error: String,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("locator", &self.locator)
            .field("verifier", &self.verifier)
            .field("query_datastore", &self.settings.query_datastore)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Authenticator {
    pub fn new(settings: AuthSettings, store: Arc<dyn IdentityStore>) -> Self {
        let settings = settings.normalized();
        let locator = TokenLocator::from_settings(&settings);
        let verifier = Verifier::new(settings.allowed_algorithms.clone(), settings.key.clone());
        Self {
            settings,
            locator,
            verifier,
            store,
            debug: false,
            auth_error: DEFAULT_AUTH_ERROR.to_string(),
        }
    }

    /// Propagate verification errors instead of recovering them.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Message reported when no verification error was recorded.
    pub fn with_auth_error(mut self, message: impl Into<String>) -> Self {
        self.auth_error = message.into();
        self
    }

    /// HMAC secret used when the settings carry no verification key.
    pub fn with_app_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.verifier = self.verifier.with_app_secret(secret);
        self
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Whether a verification key or application secret is available.
    pub fn can_verify(&self) -> bool {
        self.verifier.has_key()
    }

    /// Locate the request's token, scanning the request at most once per
    /// attempt.
    pub fn locate_token<'a, R>(&self, request: &R, attempt: &'a AuthAttempt) -> Option<&'a str>
    where
        R: RequestCredentials + ?Sized,
    {
        attempt
            .token
            .get_or_init(|| self.locator.locate(request))
            .as_deref()
    }

    /// Verify a token.
    ///
    /// In debug mode a failure is returned as an error. Otherwise it is
    /// recorded on the attempt and `Ok(None)` is returned.
    pub fn verify(&self, token: &str, attempt: &mut AuthAttempt) -> Result<Option<Claims>, AuthError> {
        match self.verifier.verify(token) {
            Ok(claims) => {
                attempt.payload = Some(claims.clone());
                attempt.state = AttemptState::Verified;
                Ok(Some(claims))
            }
            Err(e) => {
                attempt.payload = None;
                attempt.state = AttemptState::VerificationFailed;
                if self.debug {
                    return Err(e.into());
                }
                tracing::warn!(error = %e, "bearer token verification failed");
                attempt.last_error = Some(e);
                Ok(None)
            }
        }
    }

    /// Resolve the caller's identity.
    ///
    /// `Ok(None)` covers every "no identity" outcome: no token, rejected
    /// token (outside debug mode), missing `sub`, or no matching record.
    /// Datastore failures are returned unchanged.
    pub fn resolve_identity<R>(
        &self,
        request: &R,
        attempt: &mut AuthAttempt,
    ) -> Result<Option<Identity>, AuthError>
    where
        R: RequestCredentials + ?Sized,
    {
        let Some(token) = self.locate_token(request, attempt).map(str::to_string) else {
            attempt.state = AttemptState::NoToken;
            return Ok(None);
        };
        attempt.state = AttemptState::Located;

        let Some(claims) = self.verify(&token, attempt)? else {
            return Ok(None);
        };

        let identity = if self.settings.query_datastore {
            self.lookup(&claims)?
        } else {
            Some(Identity::new(claims))
        };

        attempt.state = if identity.is_some() {
            AttemptState::Resolved
        } else {
            AttemptState::Unresolved
        };
        Ok(identity)
    }

    /// Alias of [`resolve_identity`](Self::resolve_identity).
    pub fn authenticate<R>(
        &self,
        request: &R,
        attempt: &mut AuthAttempt,
    ) -> Result<Option<Identity>, AuthError>
    where
        R: RequestCredentials + ?Sized,
    {
        self.resolve_identity(request, attempt)
    }

    fn lookup(&self, claims: &Claims) -> Result<Option<Identity>, AuthError> {
        let Some(sub) = subject(claims) else {
            tracing::debug!("verified token has no sub claim");
            return Ok(None);
        };

        let record = self.store.find_one_by(&Lookup {
            entity: &self.settings.user_model,
            field: &self.settings.identity_field,
            value: &sub,
            conditions: &self.settings.scope,
            contain: &self.settings.contain,
        })?;

        let Some(record) = record else {
            tracing::debug!(sub = %sub, "no identity record for token subject");
            return Ok(None);
        };

        let mut identity = Identity::new(record);
        identity.strip(&self.settings.secret_field);
        Ok(Some(identity))
    }

    /// Handle access to a protected resource without a usable identity.
    ///
    /// With reporting disabled this does nothing. Otherwise the configured
    /// failure is returned, carrying the attempt's verification error message
    /// or the default authentication error message.
    pub fn report_unauthenticated(&self, attempt: &AuthAttempt) -> Result<(), AuthFailure> {
        let Some(kind) = self.settings.unauthenticated else {
            return Ok(());
        };
        Err(self.failure(kind, attempt))
    }

    fn failure(&self, kind: FailureKind, attempt: &AuthAttempt) -> AuthFailure {
        let message = attempt
            .last_error
            .as_ref()
            .map_or_else(|| self.auth_error.clone(), ToString::to_string);
        AuthFailure::new(kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerificationKey;
    use crate::storage::{MemoryIdentityStore, Record};
    use axum::http::{request::Parts, Request};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};
    use std::cell::Cell;

    const SECRET: &str = "secret-key";

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn token(claims: Value) -> String {
        token_with(Algorithm::HS256, claims, SECRET)
    }

    fn token_with(alg: Algorithm, claims: Value, secret: &str) -> String {
        encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn store() -> Arc<MemoryIdentityStore> {
        let store = MemoryIdentityStore::new();
        store
            .insert(
                "Users",
                record(json!({
                    "id": 1,
                    "group_id": 1,
                    "user_name": "admad",
                    "email": "admad@example.com",
                    "password": "5f4dcc3b5aa765d61d8327deb882cf99"
                })),
            )
            .unwrap();
        store
            .insert("Groups", record(json!({"id": 1, "title": "admin"})))
            .unwrap();
        Arc::new(store)
    }

    fn settings() -> AuthSettings {
        AuthSettings::default().with_key(VerificationKey::secret(SECRET))
    }

    fn authenticator(settings: AuthSettings) -> Authenticator {
        Authenticator::new(settings, store())
    }

    fn request(uri: &str, authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn expected_user() -> Identity {
        Identity::new(record(json!({
            "id": 1,
            "group_id": 1,
            "user_name": "admad",
            "email": "admad@example.com"
        })))
    }

    fn resolve(auth: &Authenticator, request: &Parts) -> Option<Identity> {
        auth.resolve_identity(request, &mut AuthAttempt::new()).unwrap()
    }

    #[test]
    fn no_token_anywhere_is_absent() {
        let auth = authenticator(settings().with_cookie("jwt"));
        let request = request("/posts/index", None);
        let mut attempt = AuthAttempt::new();

        assert_eq!(auth.resolve_identity(&request, &mut attempt).unwrap(), None);
        assert_eq!(auth.locate_token(&request, &attempt), None);
        assert_eq!(attempt.state(), AttemptState::NoToken);
        assert!(attempt.last_error().is_none());
    }

    #[test]
    fn header_token_resolves_record_without_secret() {
        let auth = authenticator(settings());
        let bearer = format!("Bearer {}", token(json!({"sub": "1"})));
        let mut attempt = AuthAttempt::new();

        let identity = auth
            .resolve_identity(&request("/", Some(&bearer)), &mut attempt)
            .unwrap();
        assert_eq!(identity, Some(expected_user()));
        assert_eq!(attempt.state(), AttemptState::Resolved);
        assert_eq!(attempt.payload().unwrap()["sub"], "1");
    }

    #[test]
    fn numeric_sub_is_looked_up_as_string() {
        let auth = authenticator(settings());
        let bearer = format!("Bearer {}", token(json!({"sub": 1})));
        assert_eq!(
            resolve(&auth, &request("/", Some(&bearer))),
            Some(expected_user())
        );
    }

    #[test]
    fn query_param_token_resolves_record() {
        let auth = authenticator(settings());
        let uri = format!("/posts/index?token={}", token(json!({"sub": "1"})));
        assert_eq!(resolve(&auth, &request(&uri, None)), Some(expected_user()));
    }

    #[test]
    fn custom_query_param_name_is_used() {
        let auth = authenticator(settings().with_query_param(Some("tokenname")));
        let t = token(json!({"sub": "1"}));

        let uri = format!("/posts/index?tokenname={t}");
        assert_eq!(resolve(&auth, &request(&uri, None)), Some(expected_user()));

        let uri = format!("/posts/index?wrongtoken={t}");
        assert_eq!(resolve(&auth, &request(&uri, None)), None);
    }

    #[test]
    fn cookie_token_resolves_record() {
        let auth = authenticator(settings().with_cookie("jwt"));
        let t = token(json!({"sub": "1"}));

        let with_cookie = Request::builder()
            .uri("/posts/index")
            .header("Cookie", format!("jwt={t}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(resolve(&auth, &with_cookie), Some(expected_user()));

        let wrong_cookie = Request::builder()
            .uri("/posts/index")
            .header("Cookie", format!("wrongtoken={t}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(resolve(&auth, &wrong_cookie), None);
    }

    #[test]
    fn empty_cookie_is_located_and_fails_verification() {
        let auth = authenticator(settings().with_cookie("jwt"));
        let t = token(json!({"sub": "1"}));
        let request = Request::builder()
            .uri(format!("/posts/index?token={t}"))
            .header("Cookie", "jwt=")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let mut attempt = AuthAttempt::new();

        assert_eq!(auth.resolve_identity(&request, &mut attempt).unwrap(), None);
        assert_eq!(attempt.token(), Some(""));
        assert_eq!(attempt.state(), AttemptState::VerificationFailed);
    }

    #[test]
    fn payload_returned_directly_without_datastore() {
        let auth = authenticator(settings().with_query_datastore(false));
        let claims = json!({"id": 99, "username": "ADmad", "group": {"name": "admin"}});
        let t = token(claims.clone());

        let bearer = format!("Bearer {t}");
        let identity = resolve(&auth, &request("/", Some(&bearer))).unwrap();
        assert_eq!(serde_json::to_value(&identity).unwrap(), claims);

        let uri = format!("/posts/index?token={t}");
        let identity = resolve(&auth, &request(&uri, None)).unwrap();
        assert_eq!(serde_json::to_value(&identity).unwrap(), claims);
    }

    #[test]
    fn sub_payload_returned_not_record_when_datastore_disabled() {
        let auth = authenticator(settings().with_query_datastore(false));
        let bearer = format!("Bearer {}", token(json!({"sub": "1"})));
        let identity = resolve(&auth, &request("/", Some(&bearer))).unwrap();
        assert_eq!(serde_json::to_value(&identity).unwrap(), json!({"sub": "1"}));
    }

    #[test]
    fn unknown_subject_is_absent() {
        let auth = authenticator(settings());
        let bearer = format!("Bearer {}", token(json!({"sub": "4"})));
        let mut attempt = AuthAttempt::new();
        assert_eq!(
            auth.resolve_identity(&request("/", Some(&bearer)), &mut attempt)
                .unwrap(),
            None
        );
        assert_eq!(attempt.state(), AttemptState::Unresolved);
    }

    #[test]
    fn missing_sub_is_absent() {
        let auth = authenticator(settings());
        let bearer = format!("Bearer {}", token(json!({"id": 4})));
        let mut attempt = AuthAttempt::new();
        assert_eq!(
            auth.resolve_identity(&request("/", Some(&bearer)), &mut attempt)
                .unwrap(),
            None
        );
        assert_eq!(attempt.state(), AttemptState::Unresolved);
        assert!(attempt.payload().is_some());
    }

    #[test]
    fn wrong_prefix_is_ignored() {
        let auth = authenticator(settings());
        let bearer = format!("WrongBearer {}", token(json!({"sub": "1"})));
        assert_eq!(resolve(&auth, &request("/", Some(&bearer))), None);
    }

    #[test]
    fn header_takes_precedence_over_query() {
        let auth = authenticator(settings().with_query_datastore(false));
        let header_token = token(json!({"sub": "from-header"}));
        let query_token = token(json!({"sub": "from-query"}));
        let uri = format!("/?token={query_token}");
        let bearer = format!("Bearer {header_token}");

        let identity = resolve(&auth, &request(&uri, Some(&bearer))).unwrap();
        assert_eq!(identity.get("sub"), Some(&json!("from-header")));
    }

    #[test]
    fn disabled_query_param_hides_query_token() {
        let auth = authenticator(settings().with_query_param(None));
        let uri = format!("/posts/index?token={}", token(json!({"sub": "1"})));
        let mut attempt = AuthAttempt::new();
        assert_eq!(
            auth.resolve_identity(&request(&uri, None), &mut attempt)
                .unwrap(),
            None
        );
        assert_eq!(attempt.state(), AttemptState::NoToken);
    }

    #[test]
    fn bad_signature_is_recovered_in_production() {
        let auth = authenticator(settings());
        let forged = token_with(Algorithm::HS256, json!({"sub": "1"}), "other-key");
        let bearer = format!("Bearer {forged}");
        let mut attempt = AuthAttempt::new();

        let identity = auth
            .resolve_identity(&request("/", Some(&bearer)), &mut attempt)
            .unwrap();
        assert_eq!(identity, None);
        assert_eq!(attempt.payload(), None);
        assert_eq!(
            attempt.last_error(),
            Some(&VerificationError::InvalidSignature)
        );
        assert_eq!(attempt.state(), AttemptState::VerificationFailed);
    }

    #[test]
    fn disallowed_algorithm_is_recovered_in_production() {
        let auth = authenticator(settings());
        let t = token_with(Algorithm::HS512, json!({"sub": "1"}), SECRET);
        let bearer = format!("Bearer {t}");
        let mut attempt = AuthAttempt::new();

        assert_eq!(
            auth.resolve_identity(&request("/", Some(&bearer)), &mut attempt)
                .unwrap(),
            None
        );
        assert!(matches!(
            attempt.last_error(),
            Some(VerificationError::DisallowedAlgorithm(_))
        ));
    }

    #[test]
    fn verification_error_propagates_in_debug_mode() {
        let auth = authenticator(settings()).with_debug(true);
        let forged = token_with(Algorithm::HS256, json!({"sub": "1"}), "other-key");
        let bearer = format!("Bearer {forged}");
        let mut attempt = AuthAttempt::new();

        let result = auth.resolve_identity(&request("/", Some(&bearer)), &mut attempt);
        assert!(matches!(
            result,
            Err(AuthError::Verification(VerificationError::InvalidSignature))
        ));
        assert_eq!(attempt.payload(), None);

        let garbage = request("/", Some("Bearer this.is.invalid"));
        let result = auth.resolve_identity(&garbage, &mut AuthAttempt::new());
        assert!(matches!(
            result,
            Err(AuthError::Verification(VerificationError::Malformed(_)))
        ));
    }

    #[test]
    fn authenticate_matches_resolve_identity() {
        let auth = authenticator(settings());
        let bearer = format!("Bearer {}", token(json!({"sub": "1"})));
        let mut attempt = AuthAttempt::new();

        let identity = auth
            .authenticate(&request("/", Some(&bearer)), &mut attempt)
            .unwrap();
        assert_eq!(identity, Some(expected_user()));
        assert_eq!(attempt.state(), AttemptState::Resolved);

        let mut attempt = AuthAttempt::new();
        assert_eq!(
            auth.authenticate(&request("/", None), &mut attempt).unwrap(),
            None
        );
        assert_eq!(attempt.state(), AttemptState::NoToken);
    }

    #[test]
    fn app_secret_verifies_when_no_key_configured() {
        let auth = Authenticator::new(
            AuthSettings::default().with_query_datastore(false),
            store(),
        );
        assert!(!auth.can_verify());
        let t = token_with(Algorithm::HS256, json!({"sub": "7"}), "app-secret");
        let bearer = format!("Bearer {t}");
        let mut attempt = AuthAttempt::new();
        assert_eq!(
            auth.resolve_identity(&request("/", Some(&bearer)), &mut attempt)
                .unwrap(),
            None
        );
        assert_eq!(attempt.last_error(), Some(&VerificationError::MissingKey));

        let auth = auth.with_app_secret("app-secret");
        assert!(auth.can_verify());
        let identity = resolve(&auth, &request("/", Some(&bearer))).unwrap();
        assert_eq!(identity.get("sub"), Some(&json!("7")));
    }

    #[test]
    fn custom_key_verifies_token() {
        let auth = authenticator(
            AuthSettings::default()
                .with_key(VerificationKey::secret("my-custom-key"))
                .with_query_datastore(false),
        );
        let t = token_with(Algorithm::HS256, json!({"sub": 100}), "my-custom-key");
        let bearer = format!("Bearer {t}");
        let identity = resolve(&auth, &request("/", Some(&bearer))).unwrap();
        assert_eq!(serde_json::to_value(&identity).unwrap(), json!({"sub": 100}));
    }

    #[test]
    fn scope_and_contain_shape_the_lookup() {
        let mut settings = settings();
        settings.contain = vec!["Groups".to_string()];
        let auth = authenticator(settings);
        let bearer = format!("Bearer {}", token(json!({"sub": "1"})));
        let identity = resolve(&auth, &request("/", Some(&bearer))).unwrap();
        assert_eq!(identity.get("group"), Some(&json!({"id": 1, "title": "admin"})));
        assert_eq!(identity.get("password"), None);

        let mut settings = self::settings();
        settings.scope = record(json!({"group_id": 2}));
        let auth = authenticator(settings);
        assert_eq!(resolve(&auth, &request("/", Some(&bearer))), None);
    }

    #[test]
    fn store_failure_propagates() {
        struct DownStore;
        impl IdentityStore for DownStore {
            fn find_one_by(
                &self,
                _lookup: &Lookup<'_>,
            ) -> Result<Option<Record>, crate::storage::StoreError> {
                Err(crate::storage::StoreError::Unavailable("connection refused".to_string()))
            }
        }

        let auth = Authenticator::new(settings(), Arc::new(DownStore));
        let bearer = format!("Bearer {}", token(json!({"sub": "1"})));
        let result = auth.resolve_identity(&request("/", Some(&bearer)), &mut AuthAttempt::new());
        assert!(matches!(result, Err(AuthError::Store(_))));
    }

    struct CountingRequest {
        reads: Cell<usize>,
    }

    impl RequestCredentials for CountingRequest {
        fn header(&self, _name: &str) -> Option<&str> {
            self.reads.set(self.reads.get() + 1);
            Some("Bearer abc.def.ghi")
        }

        fn cookie(&self, _name: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            None
        }

        fn query_param(&self, _name: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            None
        }
    }

    #[test]
    fn token_is_located_once_per_attempt() {
        let auth = authenticator(settings());
        let request = CountingRequest {
            reads: Cell::new(0),
        };
        let attempt = AuthAttempt::new();

        let first = auth.locate_token(&request, &attempt).map(str::to_string);
        let reads_after_first = request.reads.get();
        let second = auth.locate_token(&request, &attempt).map(str::to_string);

        assert_eq!(first.as_deref(), Some("abc.def.ghi"));
        assert_eq!(first, second);
        assert_eq!(request.reads.get(), reads_after_first);
    }

    #[test]
    fn report_disabled_does_nothing() {
        let auth = authenticator(settings().with_unauthenticated(None));
        assert_eq!(auth.report_unauthenticated(&AuthAttempt::new()), Ok(()));
    }

    #[test]
    fn report_uses_default_message_without_error() {
        let auth = authenticator(settings()).with_auth_error("Auth error");
        let failure = auth
            .report_unauthenticated(&AuthAttempt::new())
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Unauthorized);
        assert_eq!(failure.message, "Auth error");

        let auth = authenticator(settings());
        let failure = auth
            .report_unauthenticated(&AuthAttempt::new())
            .unwrap_err();
        assert_eq!(failure.message, DEFAULT_AUTH_ERROR);
    }

    #[test]
    fn report_uses_last_verification_error() {
        let auth = authenticator(settings().with_unauthenticated(Some(FailureKind::InvalidToken)));
        let mut attempt = AuthAttempt::new();
        let garbage = request("/", Some("Bearer this.is.invalid"));
        assert_eq!(auth.resolve_identity(&garbage, &mut attempt).unwrap(), None);

        let failure = auth.report_unauthenticated(&attempt).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidToken);
        assert_eq!(
            failure.message,
            attempt.last_error().unwrap().to_string()
        );
    }
}
