// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{KeyError, SigningKey, TokenCodec};
use crate::config::Settings;
use crate::store::UserStore;

/// Shared application state.
///
/// The codec is immutable and read concurrently without locking. Only the
/// user store needs a lock.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub users: Arc<RwLock<UserStore>>,
}

impl AppState {
    pub fn new(tokens: TokenCodec, users: UserStore) -> Self {
        Self {
            tokens: Arc::new(tokens),
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Derive the signing key and build the state. Called once at startup.
    pub fn from_settings(settings: &Settings) -> Result<Self, KeyError> {
        let key = SigningKey::derive(&settings.jwt_secret, settings.key_policy)?;
        tracing::info!(
            key_bytes = key.len(),
            validity_secs = settings.tokens.validity_secs,
            leeway_secs = settings.tokens.leeway_secs,
            "token signing key ready"
        );
        Ok(Self::new(TokenCodec::new(&key, settings.tokens), UserStore::new()))
    }
}
