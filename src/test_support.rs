// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared helpers for handler and extractor tests.

use tempfile::TempDir;

use crate::auth::TokenService;
use crate::state::AppState;
use crate::storage::{ChatDatabase, RoomRepository, StoredRoom, StoredUser, UserRepository};

const PRIVATE_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/keys/jwt_test.pem"));
const PUBLIC_PEM: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/keys/jwt_test.pub.pem"));

/// App state backed by a fresh database in a temp dir. Keep the TempDir
/// alive for the duration of the test.
pub(crate) fn test_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = ChatDatabase::open(&temp_dir.path().join("chat.redb")).expect("Failed to open db");
    let tokens = TokenService::new(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes())
        .expect("Failed to build token service");
    (AppState::new(db, tokens), temp_dir)
}

/// Register a user directly through the repository.
///
/// The stored hash uses a low bcrypt cost to keep tests fast; the
/// matching plaintext is `password123`.
pub(crate) fn create_user(state: &AppState, email: &str) -> StoredUser {
    let hash = bcrypt::hash("password123", 4).expect("Failed to hash password");
    let (user, _profile) = UserRepository::new(&state.db)
        .create(email, &hash)
        .expect("Failed to create user");
    user
}

/// Bearer header value for the given user.
pub(crate) fn token_for(state: &AppState, user_id: i64) -> String {
    state.tokens.issue(user_id).expect("Failed to issue token").token
}

/// Seed the public room.
pub(crate) fn seed_general(state: &AppState) -> StoredRoom {
    RoomRepository::new(&state.db)
        .ensure_general()
        .expect("Failed to seed general room")
}
