// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key derivation.
//!
//! The service holds exactly one HS256 key for its whole lifetime. It is
//! derived once at startup from `JWT_SECRET` and never rotated, so tokens
//! issued before a restart keep validating as long as the secret is unchanged.

use base64ct::{Base64, Encoding};
use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;

/// Minimum key length recommended for HS256 (256 bits).
pub const MIN_KEY_BYTES: usize = 32;

/// Development secret used when `JWT_SECRET` is unset.
///
/// INSECURE: it is public. Base64 for `fake-jwt-secret-for-testing-at-least-32-chars`.
pub const INSECURE_DEFAULT_SECRET: &str =
    "ZmFrZS1qd3Qtc2VjcmV0LWZvci10ZXN0aW5nLWF0LWxlYXN0LTMyLWNoYXJz";

/// How a configured secret is turned into key material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Try standard base64 first, fall back to the raw UTF-8 bytes of the secret.
    #[default]
    Permissive,
    /// Require a base64 secret of at least [`MIN_KEY_BYTES`] decoded bytes.
    Strict,
}

impl KeyPolicy {
    /// Parse from configuration (case-insensitive).
    pub fn parse(value: &str) -> Option<KeyPolicy> {
        match value.trim().to_lowercase().as_str() {
            "permissive" => Some(KeyPolicy::Permissive),
            "strict" => Some(KeyPolicy::Strict),
            _ => None,
        }
    }
}

/// Startup-only key errors. Only returned under [`KeyPolicy::Strict`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("JWT secret is not valid base64")]
    NotBase64,
    #[error("JWT secret decodes to {len} bytes, at least {MIN_KEY_BYTES} are required")]
    TooShort { len: usize },
}

/// Symmetric HS256 key material.
#[derive(Clone)]
pub struct SigningKey {
    material: Vec<u8>,
}

impl SigningKey {
    /// Derive the key from a configured secret.
    pub fn derive(secret: &str, policy: KeyPolicy) -> Result<Self, KeyError> {
        let material = match policy {
            KeyPolicy::Permissive => permissive_material(secret),
            KeyPolicy::Strict => {
                let bytes = Base64::decode_vec(secret).map_err(|_| KeyError::NotBase64)?;
                if bytes.len() < MIN_KEY_BYTES {
                    return Err(KeyError::TooShort { len: bytes.len() });
                }
                bytes
            }
        };

        if secret == INSECURE_DEFAULT_SECRET {
            tracing::warn!("JWT_SECRET is the built-in development secret; tokens are forgeable");
        } else if material.len() < MIN_KEY_BYTES {
            tracing::warn!(
                key_bytes = material.len(),
                "JWT signing key is shorter than {MIN_KEY_BYTES} bytes"
            );
        }

        Ok(Self { material })
    }

    /// Number of bytes of key material.
    pub fn len(&self) -> usize {
        self.material.len()
    }

    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.material)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.material)
    }

    #[cfg(test)]
    pub(crate) fn material(&self) -> &[u8] {
        &self.material
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.material.len())
            .finish_non_exhaustive()
    }
}

fn permissive_material(secret: &str) -> Vec<u8> {
    match Base64::decode_vec(secret) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => secret.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_secret_is_decoded() {
        let key = SigningKey::derive(INSECURE_DEFAULT_SECRET, KeyPolicy::Permissive).unwrap();
        assert_eq!(key.material(), b"fake-jwt-secret-for-testing-at-least-32-chars");
    }

    #[test]
    fn non_base64_secret_falls_back_to_raw_bytes() {
        let secret = "test-secret-32-bytes-minimum-xx";
        let key = SigningKey::derive(secret, KeyPolicy::Permissive).unwrap();
        assert_eq!(key.material(), secret.as_bytes());
    }

    #[test]
    fn bad_padding_falls_back_to_raw_bytes() {
        let key = SigningKey::derive("abc", KeyPolicy::Permissive).unwrap();
        assert_eq!(key.material(), b"abc");
    }

    #[test]
    fn empty_secret_never_fails_in_permissive_mode() {
        let key = SigningKey::derive("", KeyPolicy::Permissive).unwrap();
        assert!(key.is_empty());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = SigningKey::derive("same secret", KeyPolicy::Permissive).unwrap();
        let b = SigningKey::derive("same secret", KeyPolicy::Permissive).unwrap();
        assert_eq!(a.material(), b.material());
    }

    #[test]
    fn strict_rejects_raw_secrets() {
        let err = SigningKey::derive("test-secret-32-bytes-minimum-xx", KeyPolicy::Strict)
            .unwrap_err();
        assert_eq!(err, KeyError::NotBase64);
    }

    #[test]
    fn strict_rejects_short_keys() {
        // "c2hvcnQ=" is "short"
        let err = SigningKey::derive("c2hvcnQ=", KeyPolicy::Strict).unwrap_err();
        assert_eq!(err, KeyError::TooShort { len: 5 });
    }

    #[test]
    fn strict_accepts_long_base64_keys() {
        let key = SigningKey::derive(INSECURE_DEFAULT_SECRET, KeyPolicy::Strict).unwrap();
        assert_eq!(key.len(), 45);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(KeyPolicy::parse("Strict"), Some(KeyPolicy::Strict));
        assert_eq!(KeyPolicy::parse("permissive"), Some(KeyPolicy::Permissive));
        assert_eq!(KeyPolicy::parse("lenient"), None);
    }

    #[test]
    fn debug_redacts_material() {
        let key = SigningKey::derive("super-secret-value", KeyPolicy::Permissive).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("len"));
    }
}
