// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user store.
//!
//! Users are keyed by their canonical email address. Lookups normalise the
//! raw identifier first (trim, NFKC, lowercase) so `Alice@Example.com ` and
//! `alice@example.com` resolve to the same user.

use std::collections::HashMap;

use chrono::Utc;
use unicode_normalization::UnicodeNormalization;

use crate::error::ApiError;
use crate::models::CallerIdentity;

#[derive(Default)]
pub struct UserStore {
    users: HashMap<u64, CallerIdentity>,
    by_email: HashMap<String, u64>,
    next_id: u64,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find_by_id(&self, id: u64) -> Option<&CallerIdentity> {
        self.users.get(&id)
    }

    pub fn find_by_email(&self, raw: &str) -> Option<&CallerIdentity> {
        let email = canonical_identifier(raw);
        self.by_email.get(&email).and_then(|id| self.users.get(id))
    }

    /// Return the user for `raw`, creating it on first sight.
    ///
    /// `display_name` is only used when creating; otherwise the name is the
    /// part of the identifier before `@`.
    pub fn resolve_or_provision(
        &mut self,
        raw: &str,
        display_name: Option<&str>,
    ) -> Result<CallerIdentity, ApiError> {
        let email = canonical_identifier(raw);
        if email.is_empty() {
            return Err(ApiError::bad_request("username must not be blank"));
        }

        if let Some(user) = self.by_email.get(&email).and_then(|id| self.users.get(id)) {
            return Ok(user.clone());
        }

        self.next_id += 1;
        let name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(&email));
        let user = CallerIdentity {
            id: self.next_id,
            name,
            email: email.clone(),
            created_at: Utc::now(),
        };

        tracing::info!(user_id = user.id, "provisioned user on first login");
        self.by_email.insert(email, user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Trim, NFKC-normalise and lowercase an identifier.
pub fn canonical_identifier(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

fn default_display_name(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}
