// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the ChatDatabase for all transactional access.

pub mod messages;
pub mod rooms;
pub mod users;

pub use messages::{MessageRepository, StoredMessage};
pub use rooms::{RoomRepository, StoredRoom, GENERAL_NAME, GENERAL_SLUG};
pub use users::{StoredProfile, StoredUser, UserRepository};
