// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission guards.
//!
//! Handlers check permissions through these explicit functions after the
//! target resource has been loaded, so a missing resource surfaces as 404
//! before any 403 can leak information about it.

use crate::models::{MessageAuthor, Role};
use crate::storage::{StoredMessage, StoredRoom};

use super::error::AuthError;

/// The authenticated caller of a request, resolved from a verified token.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// The caller must be admitted to the room (member, or the room is
/// public).
pub fn require_room_member(caller: &Caller, room: &StoredRoom) -> Result<(), AuthError> {
    if room.admits(caller.id) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}

/// The caller must be the registered author of the message. Guest
/// messages have no owner and can never be edited or deleted.
pub fn require_message_owner(caller: &Caller, message: &StoredMessage) -> Result<(), AuthError> {
    match &message.author {
        MessageAuthor::Registered { user_id } if *user_id == caller.id => Ok(()),
        _ => Err(AuthError::InsufficientPermissions),
    }
}

/// The caller must be acting on their own account.
pub fn require_self(caller: &Caller, user_id: i64) -> Result<(), AuthError> {
    if caller.id == user_id {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}
