// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 session token codec.
//!
//! Tokens use compact JWS framing: `header.payload.signature`, each segment
//! base64url without padding. Verification runs in three steps and reports
//! the first failure:
//!
//! 1. structure: segment count, base64url, JSON header with `alg: HS256`,
//!    JSON payload with `sub`, `iat` and `exp` ⇒ [`VerificationFailure::Malformed`]
//! 2. signature: HMAC-SHA256 over `header.payload`, compared in constant
//!    time by jsonwebtoken ⇒ [`VerificationFailure::BadSignature`]
//! 3. expiry: `now > exp + leeway` ⇒ [`VerificationFailure::Expired`]
//!
//! jsonwebtoken's own time checks are disabled so the clock is read in one
//! place and can be pinned in tests.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::claims::TokenClaims;
use super::key::SigningKey;

/// Default token lifetime (24 hours).
pub const DEFAULT_VALIDITY_SECS: u64 = 86_400;

/// Token lifetime and expiry tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    /// Seconds between `iat` and `exp`. Must be at least 1.
    pub validity_secs: u64,
    /// Seconds a token is still accepted past `exp`. 0 means strict expiry.
    pub leeway_secs: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            validity_secs: DEFAULT_VALIDITY_SECS,
            leeway_secs: 0,
        }
    }
}

/// Why a token was rejected.
///
/// The gate treats all three the same way; the distinction only exists for
/// logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl VerificationFailure {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationFailure::Malformed => "malformed",
            VerificationFailure::BadSignature => "bad_signature",
            VerificationFailure::Expired => "expired",
        }
    }
}

/// Minting failure. Only reachable if claim serialization breaks.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Mints and verifies session tokens with the process-wide signing key.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    settings: TokenSettings,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, settings: TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: key.encoding_key(),
            decoding_key: key.decoding_key(),
            header: Header::new(Algorithm::HS256),
            validation,
            settings,
        }
    }

    pub fn settings(&self) -> TokenSettings {
        self.settings
    }

    /// Mint a token for `subject`, issued now.
    pub fn mint(&self, subject: &str, extra: Map<String, Value>) -> Result<String, TokenError> {
        self.mint_at(subject, extra, Utc::now().timestamp())
    }

    /// Mint a token for `subject` issued at `now` (seconds since the epoch).
    pub fn mint_at(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        now: i64,
    ) -> Result<String, TokenError> {
        let validity = i64::try_from(self.settings.validity_secs).unwrap_or(i64::MAX);
        let claims = TokenClaims::new(subject, extra, now, validity);
        Ok(encode(&self.header, &claims, &self.encoding_key)?)
    }

    /// Verify a token against the current wall clock.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, VerificationFailure> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as of `now` (seconds since the epoch).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, VerificationFailure> {
        check_structure(token)?;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::Base64(_) => {
                    VerificationFailure::BadSignature
                }
                _ => VerificationFailure::Malformed,
            })?
            .claims;

        if claims.is_expired_at(now, self.settings.leeway_secs) {
            return Err(VerificationFailure::Expired);
        }

        Ok(claims)
    }

    /// True when the token verifies and belongs to `expected_subject`.
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        self.is_valid_at(token, expected_subject, Utc::now().timestamp())
    }

    pub fn is_valid_at(&self, token: &str, expected_subject: &str, now: i64) -> bool {
        self.verify_at(token, now)
            .map(|claims| claims.sub == expected_subject)
            .unwrap_or(false)
    }
}

/// Reject anything that is not a well-formed HS256 token before touching
/// the signature.
fn check_structure(token: &str) -> Result<(), VerificationFailure> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(VerificationFailure::Malformed);
    };

    let header: JoseHeader = decode_segment(header)?;
    if header.alg != "HS256" {
        return Err(VerificationFailure::Malformed);
    }
    decode_segment::<TokenClaims>(payload)?;
    Ok(())
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, VerificationFailure> {
    let bytes =
        Base64UrlUnpadded::decode_vec(segment).map_err(|_| VerificationFailure::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| VerificationFailure::Malformed)
}
