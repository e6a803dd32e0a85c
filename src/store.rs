// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory implementation of the storage ports.
//!
//! Backs the server when no external database is wired in, and every test in
//! the crate. The challenge catalog can be loaded from a JSON file holding an
//! array of challenges.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::models::{Challenge, ChallengeId, UserRecord};
use crate::progression::CompletionSet;
use crate::storage::{
    ChallengeCatalog, ProgressStore, StoreError, StoreResult, UserDirectory,
};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    challenges: RwLock<BTreeMap<ChallengeId, Challenge>>,
    progress: RwLock<HashMap<String, CompletionSet>>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_challenges(challenges: impl IntoIterator<Item = Challenge>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.challenges.write() {
            map.extend(challenges.into_iter().map(|c| (c.id, c)));
        }
        store
    }

    /// Insert or replace a challenge.
    pub fn upsert_challenge(&self, challenge: Challenge) -> StoreResult<()> {
        write(&self.challenges)?.insert(challenge.id, challenge);
        Ok(())
    }

    /// Load a JSON array of challenges, replacing entries with the same id.
    ///
    /// Returns the number of challenges read.
    pub fn load_catalog_file(&self, path: &Path) -> StoreResult<usize> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let challenges: Vec<Challenge> = serde_json::from_str(&raw).map_err(|e| {
            StoreError::Unavailable(format!("invalid catalog {}: {e}", path.display()))
        })?;

        let count = challenges.len();
        let mut map = write(&self.challenges)?;
        map.extend(challenges.into_iter().map(|c| (c.id, c)));
        Ok(count)
    }
}

impl UserDirectory for InMemoryStore {
    fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<UserRecord>> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.principal.display_name == name)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(read(&self.users)?
            .values()
            .find(|u| {
                u.principal
                    .email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    fn insert(&self, record: UserRecord) -> StoreResult<()> {
        let mut users = write(&self.users)?;

        if users.contains_key(record.id()) {
            return Err(StoreError::Conflict(format!("user {} already exists", record.id())));
        }
        if users
            .values()
            .any(|u| u.principal.display_name == record.principal.display_name)
        {
            return Err(StoreError::Conflict(
                "User with this name already exists".to_string(),
            ));
        }
        if let Some(email) = record.principal.email.as_deref() {
            let taken = users.values().any(|u| {
                u.principal
                    .email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });
            if taken {
                return Err(StoreError::Conflict(
                    "User with this email already exists".to_string(),
                ));
            }
        }

        users.insert(record.id().to_string(), record);
        Ok(())
    }

    fn touch_last_active(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        let user = users
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        user.last_active_at = Some(at);
        Ok(())
    }
}

impl ChallengeCatalog for InMemoryStore {
    fn find_by_id(&self, id: ChallengeId) -> StoreResult<Option<Challenge>> {
        Ok(read(&self.challenges)?.get(&id).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<Challenge>> {
        Ok(read(&self.challenges)?.values().cloned().collect())
    }

    fn find_by_module(&self, module_id: &str) -> StoreResult<Vec<Challenge>> {
        Ok(read(&self.challenges)?
            .values()
            .filter(|c| c.module_id == module_id)
            .cloned()
            .collect())
    }
}

impl ProgressStore for InMemoryStore {
    fn completed_challenge_ids(&self, user_id: &str) -> StoreResult<CompletionSet> {
        Ok(read(&self.progress)?
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn record_completion(&self, user_id: &str, challenge_id: ChallengeId) -> StoreResult<()> {
        write(&self.progress)?
            .entry(user_id.to_string())
            .or_default()
            .insert(challenge_id);
        Ok(())
    }
}
