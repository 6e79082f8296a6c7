// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message repository.
//!
//! Messages live in a primary table keyed by id plus a composite
//! room-message index used for per-room listing. Ids come from the shared
//! sequence table, so ascending id order is insertion order within a room.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::models::MessageAuthor;
use crate::storage::database::{
    ChatDatabase, StoreError, StoreResult, MESSAGES, ROOM_MESSAGE_INDEX,
};

/// Message record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: i64,
    pub room_id: i64,
    pub author: MessageAuthor,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for message operations.
pub struct MessageRepository<'a> {
    db: &'a ChatDatabase,
}

impl<'a> MessageRepository<'a> {
    pub fn new(db: &'a ChatDatabase) -> Self {
        Self { db }
    }

    /// Persist a new message in the given room.
    pub fn create(
        &self,
        room_id: i64,
        author: MessageAuthor,
        text: &str,
    ) -> StoreResult<StoredMessage> {
        let write_txn = self.db.begin_write()?;
        let message = {
            let message_id = ChatDatabase::next_id(&write_txn, "messages")?;
            let message = StoredMessage {
                id: message_id,
                room_id,
                author,
                text: text.to_string(),
                created_at: Utc::now(),
            };

            let mut messages = write_txn.open_table(MESSAGES)?;
            messages.insert(message_id, serde_json::to_vec(&message)?.as_slice())?;

            let mut index = write_txn.open_table(ROOM_MESSAGE_INDEX)?;
            let key = ChatDatabase::room_message_key(room_id, message_id);
            index.insert(key.as_slice(), ())?;
            message
        };
        write_txn.commit()?;
        Ok(message)
    }

    /// Look up a message by id.
    pub fn find_by_id(&self, message_id: i64) -> StoreResult<Option<StoredMessage>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MESSAGES)?;
        match table.get(message_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All messages of a room, ascending by id (insertion order).
    pub fn list_by_room(&self, room_id: i64) -> StoreResult<Vec<StoredMessage>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ROOM_MESSAGE_INDEX)?;
        let messages_table = read_txn.open_table(MESSAGES)?;

        let (start, end) = ChatDatabase::room_message_range(room_id);
        let mut messages = Vec::new();
        for entry in index.range(start.as_slice()..end.as_slice())? {
            let (key, _) = entry?;
            let key = key.value();
            let message_id = i64::from_be_bytes(key[8..16].try_into().unwrap_or_default());
            let value = messages_table
                .get(message_id)?
                .ok_or_else(|| StoreError::NotFound(format!("Message {message_id}")))?;
            messages.push(serde_json::from_slice(value.value())?);
        }
        Ok(messages)
    }

    /// Replace a message's text, leaving author and room untouched.
    pub fn update_text(&self, message_id: i64, text: &str) -> StoreResult<StoredMessage> {
        let write_txn = self.db.begin_write()?;
        let message = {
            let mut table = write_txn.open_table(MESSAGES)?;
            let existing_bytes = {
                let existing = table
                    .get(message_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Message {message_id}")))?;
                existing.value().to_vec()
            };

            let mut message: StoredMessage = serde_json::from_slice(&existing_bytes)?;
            message.text = text.to_string();

            table.insert(message_id, serde_json::to_vec(&message)?.as_slice())?;
            message
        };
        write_txn.commit()?;
        Ok(message)
    }

    /// Remove a message and its index entry.
    pub fn delete(&self, message_id: i64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MESSAGES)?;
            let room_id = {
                let existing = table
                    .get(message_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Message {message_id}")))?;
                let message: StoredMessage = serde_json::from_slice(existing.value())?;
                message.room_id
            };
            table.remove(message_id)?;

            let mut index = write_txn.open_table(ROOM_MESSAGE_INDEX)?;
            let key = ChatDatabase::room_message_key(room_id, message_id);
            index.remove(key.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
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

    fn registered(user_id: i64) -> MessageAuthor {
        MessageAuthor::Registered { user_id }
    }

    #[test]
    fn create_and_list_preserves_insertion_order() {
        let (db, _dir) = open_db();
        let repo = MessageRepository::new(&db);

        let first = repo.create(1, registered(10), "first").unwrap();
        let second = repo
            .create(1, MessageAuthor::Guest { name: "guest_ab12cd34".into() }, "second")
            .unwrap();
        // A message in another room must not leak into the listing.
        repo.create(2, registered(10), "elsewhere").unwrap();

        let messages = repo.list_by_room(1).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, first.id);
        assert_eq!(messages[0].text, "first");
        assert_eq!(messages[1].id, second.id);
        assert_eq!(messages[1].author, MessageAuthor::Guest { name: "guest_ab12cd34".into() });
    }

    #[test]
    fn update_text_keeps_author_and_room() {
        let (db, _dir) = open_db();
        let repo = MessageRepository::new(&db);

        let message = repo.create(1, registered(10), "draft").unwrap();
        let updated = repo.update_text(message.id, "final").unwrap();

        assert_eq!(updated.text, "final");
        assert_eq!(updated.author, message.author);
        assert_eq!(updated.room_id, message.room_id);

        let loaded = repo.find_by_id(message.id).unwrap().unwrap();
        assert_eq!(loaded.text, "final");
    }

    #[test]
    fn update_missing_message_is_not_found() {
        let (db, _dir) = open_db();
        let repo = MessageRepository::new(&db);

        let result = repo.update_text(42, "nope");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_removes_message_and_index_entry() {
        let (db, _dir) = open_db();
        let repo = MessageRepository::new(&db);

        let keep = repo.create(1, registered(10), "keep").unwrap();
        let gone = repo.create(1, registered(10), "gone").unwrap();

        repo.delete(gone.id).unwrap();

        assert!(repo.find_by_id(gone.id).unwrap().is_none());
        let messages = repo.list_by_room(1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, keep.id);

        assert!(matches!(repo.delete(gone.id), Err(StoreError::NotFound(_))));
    }
}
