// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Issues and verifies HS256 session tokens and resolves the caller of each
//! request.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/auth/login` resolves (or provisions) a user and mints a token
//!    whose `sub` is the user id
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The gate (`middleware::authenticate`):
//!    - Verifies structure, signature and expiry
//!    - Installs an [`AuthContext`] in the request extensions, anonymous on
//!      any failure
//! 4. Handlers read the context through extractors
//!
//! ## Security
//!
//! - One signing key per process, derived at startup, never rotated
//! - Signatures are compared in constant time
//! - Expiry is strict unless `JWT_LEEWAY_SECONDS` is set
//! - Rejection reasons are logged, never returned to the client

pub mod claims;
pub mod codec;
pub mod context;
pub mod error;
pub mod extractor;
pub mod key;
pub mod middleware;

pub use claims::TokenClaims;
pub use codec::{TokenCodec, TokenError, TokenSettings, VerificationFailure};
pub use context::AuthContext;
pub use error::AuthError;
pub use extractor::{Authenticated, CallerId};
pub use key::{KeyError, KeyPolicy, SigningKey};
pub use middleware::authenticate;
