// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::ChatDatabase;

/// Shared application state.
///
/// Both members are immutable after startup; interior mutability lives
/// inside the database.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ChatDatabase>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: ChatDatabase, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
        }
    }
}
