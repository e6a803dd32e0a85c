// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models
//!
//! Records owned by the external stores (user directory, challenge catalog).
//! The access-control and progression core only reads them.
//!
//! ## Model Categories
//!
//! - **Principals**: authenticated identities and their stored records
//! - **Challenges**: graph nodes with their prerequisite edges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Principals
// =============================================================================

/// The identity a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user identifier.
    pub id: String,
    /// Name shown in the UI; also usable as a login identifier.
    pub display_name: String,
    pub role: Role,
    /// Unique when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A principal as kept by the user directory.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub principal: Principal,
    /// Argon2 PHC string. `None` for accounts that cannot log in with a password.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn id(&self) -> &str {
        &self.principal.id
    }
}

// =============================================================================
// Challenges
// =============================================================================

/// Challenge identifier. Ordering is the tie-breaker for learning paths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ChallengeId(pub i64);

impl std::fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChallengeId {
    fn from(value: i64) -> Self {
        ChallengeId(value)
    }
}

/// Challenge difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

fn default_points() -> u32 {
    50
}

fn default_active() -> bool {
    true
}

/// A challenge node in the prerequisite graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Challenge {
    pub id: ChallengeId,
    pub module_id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<u32>,
    /// Challenges that must be completed first, in authoring order.
    #[serde(default)]
    pub prerequisites: Vec<ChallengeId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Challenge {
    /// Minimal active challenge, mainly for seeding and tests.
    pub fn new(id: i64, module_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: ChallengeId(id),
            module_id: module_id.into(),
            title: title.into(),
            difficulty: Difficulty::default(),
            points: default_points(),
            estimated_duration_minutes: None,
            prerequisites: Vec::new(),
            is_active: true,
        }
    }

    pub fn with_prerequisites(mut self, prerequisites: impl IntoIterator<Item = i64>) -> Self {
        self.prerequisites = prerequisites.into_iter().map(ChallengeId).collect();
        self
    }
}
