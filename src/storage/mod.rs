// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Ports
//!
//! The access-control and progression core never performs I/O. It consumes
//! already-materialized data through the traits below; whatever implements
//! them owns blocking, retries and timeouts.
//!
//! ## Collaborators
//!
//! - [`UserDirectory`] - principal records for authentication
//! - [`ChallengeCatalog`] - challenge nodes and their prerequisite edges
//! - [`ProgressStore`] - completed-challenge sets per user
//!
//! [`crate::store::InMemoryStore`] implements all three.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Challenge, ChallengeId, UserRecord};
use crate::progression::CompletionSet;

/// Error type for store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Uniqueness violation (duplicate id, name or email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Entity not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Backing store failed or is unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Principal lookup used by the authentication flow.
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Exact match on display name.
    fn find_by_name(&self, name: &str) -> StoreResult<Option<UserRecord>>;

    /// Case-insensitive match on email.
    fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Insert a new record. Id, display name and email (when present) must be unique.
    fn insert(&self, record: UserRecord) -> StoreResult<()>;

    /// Record activity. Callers treat this as fire-and-forget.
    fn touch_last_active(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;
}

/// Read access to the challenge catalog.
pub trait ChallengeCatalog: Send + Sync {
    fn find_by_id(&self, id: ChallengeId) -> StoreResult<Option<Challenge>>;

    /// Every challenge, ascending by id.
    fn find_all(&self) -> StoreResult<Vec<Challenge>>;

    /// Challenges of one module, ascending by id.
    fn find_by_module(&self, module_id: &str) -> StoreResult<Vec<Challenge>>;
}

/// Per-user completion records.
pub trait ProgressStore: Send + Sync {
    fn completed_challenge_ids(&self, user_id: &str) -> StoreResult<CompletionSet>;

    /// Idempotent.
    fn record_completion(&self, user_id: &str, challenge_id: ChallengeId) -> StoreResult<()>;
}
