// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage backed by an embedded redb database at
//! `{DATA_DIR}/chat.redb`. All writes are ACID transactions; the
//! repository layer exposes typed operations per entity.
//!
//! ## Storage Layout
//!
//! ```text
//! users               user_id → StoredUser
//! user_email_index    lowercase email → user_id
//! profiles            profile_id → StoredProfile
//! rooms               room_id → StoredRoom
//! room_slug_index     slug → room_id
//! messages            message_id → StoredMessage
//! room_message_index  (room_id, message_id) → ()
//! sequences           entity name → last allocated id
//! ```

pub mod database;
pub mod repository;

pub use database::{ChatDatabase, StoreError, StoreResult};
pub use repository::{
    MessageRepository, RoomRepository, StoredMessage, StoredProfile, StoredRoom, StoredUser,
    UserRepository, GENERAL_NAME, GENERAL_SLUG,
};
