// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{permissions, Permission, Role};
use crate::models::Principal;

/// Claims bound into a credential.
///
/// This is the payload that the token codec serializes and signs, and the
/// value handed back to request handlers once a credential verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the principal identifier
    pub sub: String,

    /// Role at issuance time
    pub role: Role,

    /// Display name at issuance time
    pub name: String,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `principal` valid from `issued_at` until `expires_at`.
    pub fn for_principal(
        principal: &Principal,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: principal.id.clone(),
            role: principal.role,
            name: principal.display_name.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Strictly after `exp` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        permissions::has(self.role, permission)
    }
}
