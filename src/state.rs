// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthSettings, Authenticator};
use crate::storage::MemoryIdentityStore;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Authenticator::new(
            AuthSettings::default(),
            Arc::new(MemoryIdentityStore::new()),
        ))
    }
}
