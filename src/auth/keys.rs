// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification keys.
//!
//! A deployment supplies either one key for every accepted algorithm, a map
//! of algorithm to key, or a map of `kid` header to key. When nothing is
//! configured the application secret handed to the
//! [`Verifier`](super::Verifier) is used as an HMAC key.

use std::collections::HashMap;

use jsonwebtoken::{Algorithm, DecodingKey, Header};
use serde::Deserialize;

use super::error::VerificationError;

/// Raw key material for one verification key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum KeyMaterial {
    /// Shared secret for the HMAC family (HS256/384/512).
    Secret(#[serde(deserialize_with = "bytes_from_str")] Vec<u8>),
    /// PEM encoded RSA public key (RS*/PS*).
    RsaPem(#[serde(deserialize_with = "bytes_from_str")] Vec<u8>),
    /// PEM encoded EC public key (ES*).
    EcPem(#[serde(deserialize_with = "bytes_from_str")] Vec<u8>),
    /// PEM encoded Ed25519 public key (EdDSA).
    EdPem(#[serde(deserialize_with = "bytes_from_str")] Vec<u8>),
}

fn bytes_from_str<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(String::into_bytes)
}

impl KeyMaterial {
    pub fn secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::Secret(secret.into())
    }

    pub fn decoding_key(&self) -> Result<DecodingKey, VerificationError> {
        let key = match self {
            KeyMaterial::Secret(secret) => return Ok(DecodingKey::from_secret(secret)),
            KeyMaterial::RsaPem(pem) => DecodingKey::from_rsa_pem(pem),
            KeyMaterial::EcPem(pem) => DecodingKey::from_ec_pem(pem),
            KeyMaterial::EdPem(pem) => DecodingKey::from_ed_pem(pem),
        };
        key.map_err(|e| VerificationError::InvalidKey(e.to_string()))
    }

    fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Secret(_) => "secret",
            KeyMaterial::RsaPem(_) => "rsa_pem",
            KeyMaterial::EcPem(_) => "ec_pem",
            KeyMaterial::EdPem(_) => "ed_pem",
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_tuple("KeyMaterial").field(&self.kind()).finish()
    }
}

/// The key (or keys) a token may be verified with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKey {
    /// One key for every allowed algorithm.
    Single(KeyMaterial),
    /// A key per algorithm.
    ByAlgorithm(HashMap<Algorithm, KeyMaterial>),
    /// A key per `kid` header value.
    ByKeyId(HashMap<String, KeyMaterial>),
}

impl VerificationKey {
    pub fn secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::Single(KeyMaterial::secret(secret))
    }

    /// Select the key material matching a token header.
    pub fn select(&self, header: &Header) -> Result<&KeyMaterial, VerificationError> {
        match self {
            VerificationKey::Single(material) => Ok(material),
            VerificationKey::ByAlgorithm(keys) => keys
                .get(&header.alg)
                .ok_or_else(|| VerificationError::UnknownKey(format!("{:?}", header.alg))),
            VerificationKey::ByKeyId(keys) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| VerificationError::UnknownKey("missing kid".to_string()))?;
                keys.get(kid)
                    .ok_or_else(|| VerificationError::UnknownKey(kid.to_string()))
            }
        }
    }
}

impl From<KeyMaterial> for VerificationKey {
    fn from(material: KeyMaterial) -> Self {
        Self::Single(material)
    }
}
