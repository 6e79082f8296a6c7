// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded chat database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `user_email_index`: lowercase email → user_id
//! - `profiles`: profile_id → serialized StoredProfile
//! - `rooms`: room_id → serialized StoredRoom
//! - `room_slug_index`: slug → room_id
//! - `messages`: message_id → serialized StoredMessage
//! - `room_message_index`: composite key (room_id_be|message_id_be) → ()
//! - `sequences`: entity name → last allocated id
//!
//! Ids are allocated from the `sequences` table inside the same write
//! transaction as the insert, so they are strictly monotonic per entity.
//! Message listing order (ascending id) therefore equals insertion order.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized StoredUser (JSON bytes).
pub(crate) const USERS: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Index: lowercase email → user_id. Enforces email uniqueness.
pub(crate) const USER_EMAIL_INDEX: TableDefinition<&str, i64> =
    TableDefinition::new("user_email_index");

/// Primary table: profile_id → serialized StoredProfile.
pub(crate) const PROFILES: TableDefinition<i64, &[u8]> = TableDefinition::new("profiles");

/// Primary table: room_id → serialized StoredRoom.
pub(crate) const ROOMS: TableDefinition<i64, &[u8]> = TableDefinition::new("rooms");

/// Index: slug → room_id (only the well-known public room carries a slug).
pub(crate) const ROOM_SLUG_INDEX: TableDefinition<&str, i64> =
    TableDefinition::new("room_slug_index");

/// Primary table: message_id → serialized StoredMessage.
pub(crate) const MESSAGES: TableDefinition<i64, &[u8]> = TableDefinition::new("messages");

/// Index: composite key `room_id_be | message_id_be` → ().
///
/// Big-endian encoding keeps forward range scans in ascending message id
/// order, which is the required listing order.
pub(crate) const ROOM_MESSAGE_INDEX: TableDefinition<&[u8], ()> =
    TableDefinition::new("room_message_index");

/// Sequence counters: entity name → last allocated id.
pub(crate) const SEQUENCES: TableDefinition<&str, i64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the room_message_index table.
fn make_room_message_key(room_id: i64, message_id: i64) -> [u8; 16] {
    // Ids are always positive, so big-endian byte order matches numeric order.
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&room_id.to_be_bytes());
    key[8..].copy_from_slice(&message_id.to_be_bytes());
    key
}

/// Lower bound for a range scan over all messages of a room.
fn make_room_prefix(room_id: i64) -> [u8; 16] {
    make_room_message_key(room_id, 0)
}

/// Upper bound (exclusive) for a range scan over all messages of a room.
fn make_room_prefix_end(room_id: i64) -> [u8; 16] {
    make_room_message_key(room_id, i64::MAX)
}

// =============================================================================
// ChatDatabase
// =============================================================================

/// Embedded ACID database holding users, profiles, rooms, and messages.
///
/// Every public repository operation is a single redb transaction; the
/// database provides the per-call atomicity the domain layer relies on
/// (e.g. the duplicate-member-set check runs inside the same write
/// transaction as the room insert).
pub struct ChatDatabase {
    db: Database,
}

impl ChatDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAIL_INDEX)?;
            let _ = write_txn.open_table(PROFILES)?;
            let _ = write_txn.open_table(ROOMS)?;
            let _ = write_txn.open_table(ROOM_SLUG_INDEX)?;
            let _ = write_txn.open_table(MESSAGES)?;
            let _ = write_txn.open_table(ROOM_MESSAGE_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> StoreResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Allocate the next id for an entity inside an open write transaction.
    pub(crate) fn next_id(write_txn: &WriteTransaction, entity: &str) -> StoreResult<i64> {
        let mut table = write_txn.open_table(SEQUENCES)?;
        let next = match table.get(entity)? {
            Some(last) => last.value() + 1,
            None => 1,
        };
        table.insert(entity, next)?;
        Ok(next)
    }

    /// Range scan keys for one room's messages, ascending by message id.
    pub(crate) fn room_message_range(room_id: i64) -> ([u8; 16], [u8; 16]) {
        (make_room_prefix(room_id), make_room_prefix_end(room_id))
    }

    /// Composite index key for a single message.
    pub(crate) fn room_message_key(room_id: i64, message_id: i64) -> [u8; 16] {
        make_room_message_key(room_id, message_id)
    }
}
