// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing.

use super::error::AuthError;

/// bcrypt work factor for stored credentials.
pub const BCRYPT_COST: u32 = 10;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
}

/// Check a candidate password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::InternalError(format!("password verification failed: {e}")))
}
