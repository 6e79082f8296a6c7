// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User and profile repository.
//!
//! A user owns exactly one profile, created in the same transaction as the
//! user record. Email uniqueness is enforced by the `user_email_index`
//! table inside the registration transaction.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::models::Role;
use crate::storage::database::{
    ChatDatabase, StoreError, StoreResult, PROFILES, USERS, USER_EMAIL_INDEX,
};

/// User record as persisted. The password hash never leaves the storage
/// and auth layers; wire responses are built from `models::UserView`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    /// Lowercase, unique.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Directed follow relation: ids of users this user follows.
    pub following: Vec<i64>,
    /// Id of the profile owned by this user.
    pub profile_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Display identity owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredProfile {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub display_color: String,
}

/// Repository for user and profile operations.
pub struct UserRepository<'a> {
    db: &'a ChatDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a ChatDatabase) -> Self {
        Self { db }
    }

    /// Create a user together with its profile.
    ///
    /// The new profile starts with `name = email` and a black display color,
    /// matching what registration promises the client.
    pub fn create(&self, email: &str, password_hash: &str) -> StoreResult<(StoredUser, StoredProfile)> {
        let email = email.to_lowercase();

        let write_txn = self.db.begin_write()?;
        let (user, profile) = {
            let mut email_index = write_txn.open_table(USER_EMAIL_INDEX)?;
            if email_index.get(email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("User {email}")));
            }

            let user_id = ChatDatabase::next_id(&write_txn, "users")?;
            let profile_id = ChatDatabase::next_id(&write_txn, "profiles")?;

            let user = StoredUser {
                id: user_id,
                email: email.clone(),
                password_hash: password_hash.to_string(),
                role: Role::default(),
                following: Vec::new(),
                profile_id,
                created_at: Utc::now(),
            };
            let profile = StoredProfile {
                id: profile_id,
                user_id,
                name: email.clone(),
                display_color: "#000000".to_string(),
            };

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user_id, serde_json::to_vec(&user)?.as_slice())?;

            let mut profiles = write_txn.open_table(PROFILES)?;
            profiles.insert(profile_id, serde_json::to_vec(&profile)?.as_slice())?;

            email_index.insert(email.as_str(), user_id)?;
            (user, profile)
        };
        write_txn.commit()?;

        Ok((user, profile))
    }

    /// Look up a user by id.
    pub fn find_by_id(&self, user_id: i64) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let email = email.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_EMAIL_INDEX)?;
        let Some(user_id) = index.get(email.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a profile by its own id.
    pub fn find_profile(&self, profile_id: i64) -> StoreResult<Option<StoredProfile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROFILES)?;
        match table.get(profile_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Profile owned by the given user. Missing profile is an integrity
    /// fault, reported as NotFound.
    pub fn profile_of(&self, user: &StoredUser) -> StoreResult<StoredProfile> {
        self.find_profile(user.profile_id)?
            .ok_or_else(|| StoreError::NotFound(format!("Profile of user {}", user.id)))
    }

    /// Update a profile's display identity.
    pub fn update_profile(&self, profile_id: i64, name: &str, display_color: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PROFILES)?;
            let existing_bytes = {
                let existing = table
                    .get(profile_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Profile {profile_id}")))?;
                existing.value().to_vec()
            };

            let mut profile: StoredProfile = serde_json::from_slice(&existing_bytes)?;
            profile.name = name.to_string();
            profile.display_color = display_color.to_string();

            table.insert(profile_id, serde_json::to_vec(&profile)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Add a directed follow edge.
    pub fn follow(&self, user_id: i64, target_id: i64) -> StoreResult<()> {
        self.update_following(user_id, |following| {
            if !following.contains(&target_id) {
                following.push(target_id);
            }
        })
    }

    /// Remove a directed follow edge.
    pub fn unfollow(&self, user_id: i64, target_id: i64) -> StoreResult<()> {
        self.update_following(user_id, |following| {
            following.retain(|id| *id != target_id);
        })
    }

    fn update_following(
        &self,
        user_id: i64,
        mutate: impl FnOnce(&mut Vec<i64>),
    ) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(USERS)?;
            let existing_bytes = {
                let existing = table
                    .get(user_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))?;
                existing.value().to_vec()
            };

            let mut user: StoredUser = serde_json::from_slice(&existing_bytes)?;
            mutate(&mut user.following);

            table.insert(user_id, serde_json::to_vec(&user)?.as_slice())?;
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

    #[test]
    fn create_and_find_user_with_profile() {
        let (db, _dir) = open_db();
        let repo = UserRepository::new(&db);

        let (user, profile) = repo.create("User1@Example.com", "hash").unwrap();
        assert_eq!(user.email, "user1@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.name, "user1@example.com");
        assert_eq!(profile.display_color, "#000000");

        let loaded = repo.find_by_id(user.id).unwrap().unwrap();
        assert_eq!(loaded, user);

        // Email lookup is case-insensitive.
        let by_email = repo.find_by_email("USER1@example.COM").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (db, _dir) = open_db();
        let repo = UserRepository::new(&db);

        repo.create("user1@example.com", "hash").unwrap();
        let result = repo.create("USER1@example.com", "other-hash");
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn follow_and_unfollow_update_edge_list() {
        let (db, _dir) = open_db();
        let repo = UserRepository::new(&db);

        let (alice, _) = repo.create("alice@example.com", "hash").unwrap();
        let (bob, _) = repo.create("bob@example.com", "hash").unwrap();

        repo.follow(alice.id, bob.id).unwrap();
        // Following is a set: a second follow does not duplicate the edge.
        repo.follow(alice.id, bob.id).unwrap();
        let loaded = repo.find_by_id(alice.id).unwrap().unwrap();
        assert_eq!(loaded.following, vec![bob.id]);

        // The relation is directed; bob does not follow alice.
        let bob_loaded = repo.find_by_id(bob.id).unwrap().unwrap();
        assert!(bob_loaded.following.is_empty());

        repo.unfollow(alice.id, bob.id).unwrap();
        let loaded = repo.find_by_id(alice.id).unwrap().unwrap();
        assert!(loaded.following.is_empty());
    }

    #[test]
    fn update_profile_changes_display_identity() {
        let (db, _dir) = open_db();
        let repo = UserRepository::new(&db);

        let (user, profile) = repo.create("user1@example.com", "hash").unwrap();
        repo.update_profile(profile.id, "Alice", "#ff0000").unwrap();

        let loaded = repo.profile_of(&user).unwrap();
        assert_eq!(loaded.name, "Alice");
        assert_eq!(loaded.display_color, "#ff0000");
    }

    #[test]
    fn update_missing_profile_is_not_found() {
        let (db, _dir) = open_db();
        let repo = UserRepository::new(&db);

        let result = repo.update_profile(99, "ghost", "#ffffff");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
