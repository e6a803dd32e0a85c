// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::Utc;

use crate::auth::Guard;
use crate::progression::ProgressionService;
use crate::storage::{ChallengeCatalog, ProgressStore, UserDirectory};
use crate::store::InMemoryStore;

/// Shared request state. Everything in here is immutable or internally
/// synchronized, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<Guard>,
    pub users: Arc<dyn UserDirectory>,
    pub progression: ProgressionService,
}

impl AppState {
    pub fn new(
        guard: Guard,
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn ChallengeCatalog>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            guard: Arc::new(guard),
            users,
            progression: ProgressionService::new(catalog, progress),
        }
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(guard: Guard, store: Arc<InMemoryStore>) -> Self {
        Self::new(guard, store.clone(), store.clone(), store)
    }

    /// Update the caller's last-active timestamp. Failures are logged and
    /// otherwise ignored.
    pub fn record_activity(&self, user_id: &str) {
        if let Err(e) = self.users.touch_last_active(user_id, Utc::now()) {
            tracing::warn!(user_id = %user_id, error = %e, "failed to record activity");
        }
    }
}
