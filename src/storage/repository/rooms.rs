// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chat room repository.
//!
//! Rooms come in two shapes: the single public room (seeded at startup
//! under the slug `general`) and private rooms identified by their member
//! set. Member ids are stored sorted so that two rooms with the same
//! members always compare equal, and the uniqueness check for a member set
//! runs inside the same write transaction that inserts the room.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::storage::database::{ChatDatabase, StoreError, StoreResult, ROOMS, ROOM_SLUG_INDEX};

pub const GENERAL_SLUG: &str = "general";
pub const GENERAL_NAME: &str = "General Chat";

/// Chat room record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRoom {
    pub id: i64,
    /// Stable lookup handle; only the public room carries one today.
    pub slug: Option<String>,
    pub name: String,
    pub is_private: bool,
    /// Sorted, deduplicated. Empty for the public room.
    pub member_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl StoredRoom {
    /// Whether the given user may read and post in this room. The public
    /// room is open to everyone; private rooms admit members only.
    pub fn admits(&self, user_id: i64) -> bool {
        !self.is_private || self.member_ids.contains(&user_id)
    }
}

/// Repository for chat room operations.
pub struct RoomRepository<'a> {
    db: &'a ChatDatabase,
}

impl<'a> RoomRepository<'a> {
    pub fn new(db: &'a ChatDatabase) -> Self {
        Self { db }
    }

    /// Seed the public room if it does not exist yet. Idempotent; called
    /// once at startup.
    pub fn ensure_general(&self) -> StoreResult<StoredRoom> {
        if let Some(room) = self.find_by_slug(GENERAL_SLUG)? {
            return Ok(room);
        }

        let write_txn = self.db.begin_write()?;
        let room = {
            let mut slug_index = write_txn.open_table(ROOM_SLUG_INDEX)?;
            // Re-check inside the transaction; another starter may have won.
            let existing = slug_index.get(GENERAL_SLUG)?.map(|v| v.value());
            if let Some(existing_id) = existing {
                let rooms = write_txn.open_table(ROOMS)?;
                let value = rooms
                    .get(existing_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Chat room {existing_id}")))?;
                serde_json::from_slice(value.value())?
            } else {
                let room_id = ChatDatabase::next_id(&write_txn, "rooms")?;
                let room = StoredRoom {
                    id: room_id,
                    slug: Some(GENERAL_SLUG.to_string()),
                    name: GENERAL_NAME.to_string(),
                    is_private: false,
                    member_ids: Vec::new(),
                    created_at: Utc::now(),
                };
                let mut rooms = write_txn.open_table(ROOMS)?;
                rooms.insert(room_id, serde_json::to_vec(&room)?.as_slice())?;
                slug_index.insert(GENERAL_SLUG, room_id)?;
                room
            }
        };
        write_txn.commit()?;
        Ok(room)
    }

    /// Create a private room for the given member set.
    ///
    /// `member_ids` is sorted and deduplicated here; the duplicate-set
    /// check and the insert share one write transaction, so two racing
    /// creates for the same set cannot both succeed.
    pub fn create_private(&self, member_ids: &[i64]) -> StoreResult<StoredRoom> {
        let mut members: Vec<i64> = member_ids.to_vec();
        members.sort_unstable();
        members.dedup();

        let write_txn = self.db.begin_write()?;
        let room = {
            let mut rooms = write_txn.open_table(ROOMS)?;
            for entry in rooms.iter()? {
                let (_, value) = entry?;
                let existing: StoredRoom = serde_json::from_slice(value.value())?;
                if existing.is_private && existing.member_ids == members {
                    return Err(StoreError::AlreadyExists(format!(
                        "Chat room between {members:?}"
                    )));
                }
            }

            let room_id = ChatDatabase::next_id(&write_txn, "rooms")?;
            let room = StoredRoom {
                id: room_id,
                slug: None,
                name: format!("Chat room {room_id}"),
                is_private: true,
                member_ids: members,
                created_at: Utc::now(),
            };
            rooms.insert(room_id, serde_json::to_vec(&room)?.as_slice())?;
            room
        };
        write_txn.commit()?;
        Ok(room)
    }

    /// Look up a room by id.
    pub fn find_by_id(&self, room_id: i64) -> StoreResult<Option<StoredRoom>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROOMS)?;
        match table.get(room_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a room by slug.
    pub fn find_by_slug(&self, slug: &str) -> StoreResult<Option<StoredRoom>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ROOM_SLUG_INDEX)?;
        let Some(room_id) = index.get(slug)?.map(|v| v.value()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(ROOMS)?;
        match table.get(room_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Private rooms the given user is a member of, ascending by id.
    pub fn list_for_member(&self, user_id: i64) -> StoreResult<Vec<StoredRoom>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROOMS)?;
        let mut rooms = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let room: StoredRoom = serde_json::from_slice(value.value())?;
            if room.is_private && room.member_ids.contains(&user_id) {
                rooms.push(room);
            }
        }
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_db() -> (ChatDatabase, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = ChatDatabase::open(&dir.path().join("chat.redb")).expect("open db");
        (db, dir)
    }

    #[test]
    fn ensure_general_is_idempotent() {
        let (db, _dir) = open_db();
        let repo = RoomRepository::new(&db);

        let first = repo.ensure_general().unwrap();
        let second = repo.ensure_general().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.slug.as_deref(), Some(GENERAL_SLUG));
        assert_eq!(first.name, GENERAL_NAME);
        assert!(!first.is_private);

        let by_slug = repo.find_by_slug(GENERAL_SLUG).unwrap().unwrap();
        assert_eq!(by_slug.id, first.id);
    }

    #[test]
    fn public_room_admits_everyone() {
        let (db, _dir) = open_db();
        let repo = RoomRepository::new(&db);

        let general = repo.ensure_general().unwrap();
        assert!(general.admits(1));
        assert!(general.admits(999));
    }

    #[test]
    fn private_room_admits_members_only() {
        let (db, _dir) = open_db();
        let repo = RoomRepository::new(&db);

        let room = repo.create_private(&[2, 1]).unwrap();
        assert!(room.is_private);
        // Stored sorted regardless of input order.
        assert_eq!(room.member_ids, vec![1, 2]);
        assert!(room.admits(1));
        assert!(room.admits(2));
        assert!(!room.admits(3));
    }

    #[test]
    fn duplicate_member_set_is_rejected() {
        let (db, _dir) = open_db();
        let repo = RoomRepository::new(&db);

        repo.create_private(&[1, 2]).unwrap();
        // Same set in a different order with a duplicate entry.
        let result = repo.create_private(&[2, 1, 2]);
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));

        // A different set is fine.
        repo.create_private(&[1, 3]).unwrap();
    }

    #[test]
    fn list_for_member_returns_only_own_rooms() {
        let (db, _dir) = open_db();
        let repo = RoomRepository::new(&db);

        repo.ensure_general().unwrap();
        let first = repo.create_private(&[1, 2]).unwrap();
        let second = repo.create_private(&[1, 3]).unwrap();
        repo.create_private(&[2, 3]).unwrap();

        let rooms = repo.list_for_member(1).unwrap();
        let ids: Vec<i64> = rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        // The public room never appears in a member listing.
        assert!(rooms.iter().all(|r| r.is_private));
    }
}
