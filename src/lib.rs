// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! jwt-authn - JSON Web Token authentication adapter
//!
//! Authenticates requests from a bearer token: the token is located in the
//! request, verified against the configured keys and algorithms, and turned
//! into an identity record.
//!
//! ## Modules
//!
//! - `auth` - Token location, verification and identity resolution
//! - `storage` - Identity datastore (in-memory and redb)
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
