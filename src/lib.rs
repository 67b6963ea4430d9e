// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tasklist Auth - session tokens and the per-request authentication gate
//!
//! This crate issues HS256 bearer tokens and resolves, for every request,
//! which user (if any) is calling. Resource handlers consume the resolved
//! identity; they never see the token.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Signing key, token codec, authentication gate and extractors
//! - `config` - Environment configuration
//! - `store` - In-memory user store (identity resolution)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
