// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification on top of `jsonwebtoken`.
//!
//! The header is decoded first so the algorithm can be checked against the
//! allow-list and the matching key selected; `jsonwebtoken` then checks the
//! signature and the temporal claims. `exp` and `nbf` are enforced only when
//! the token carries them.

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::error::VerificationError;
use super::identity::Claims;
use super::keys::{KeyMaterial, VerificationKey};

/// Verifies bearer tokens against an algorithm allow-list and key set.
#[derive(Debug, Clone)]
pub struct Verifier {
    allowed_algorithms: Vec<Algorithm>,
    key: Option<VerificationKey>,
    app_secret: Option<KeyMaterial>,
}

impl Verifier {
    /// `key: None` falls back to the application secret, see
    /// [`with_app_secret`](Self::with_app_secret).
    pub fn new(allowed_algorithms: Vec<Algorithm>, key: Option<VerificationKey>) -> Self {
        Self {
            allowed_algorithms,
            key,
            app_secret: None,
        }
    }

    /// Secret used as an HMAC key when no verification key is configured.
    pub fn with_app_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.app_secret = Some(KeyMaterial::secret(secret));
        self
    }

    /// Whether any token could be checked at all.
    pub fn has_key(&self) -> bool {
        self.key.is_some() || self.app_secret.is_some()
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        let header =
            decode_header(token).map_err(|e| VerificationError::Malformed(e.to_string()))?;

        if !self.allowed_algorithms.contains(&header.alg) {
            return Err(VerificationError::DisallowedAlgorithm(format!(
                "{:?}",
                header.alg
            )));
        }

        let material = self.key_material(&header)?;
        let decoding_key = material.decoding_key()?;

        let mut validation = Validation::new(header.alg);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(data.claims)
    }

    fn key_material(
        &self,
        header: &jsonwebtoken::Header,
    ) -> Result<&KeyMaterial, VerificationError> {
        match &self.key {
            Some(key) => key.select(header),
            None => self.app_secret.as_ref().ok_or(VerificationError::MissingKey),
        }
    }
}
