// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Guard
//!
//! Turns a credential plus a requested operation into an allow/deny decision.
//!
//! - No I/O
//! - No panics
//! - No retries: a denial is final for the request
//!
//! Handlers compose these checks explicitly (see `api`), usually through the
//! [`Credential`](super::Credential) extractor:
//!
//! ```rust,ignore
//! let claims = state.guard.authorize(&credential, Permission::ViewChallenges).into_result()?;
//! ```

use super::{permissions, Claims, Permission, Role, TokenCodec};
use crate::models::Principal;

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Credential missing, malformed, tampered or expired. Recover by
    /// obtaining a new credential.
    Unauthenticated,
    /// Credential valid, but none of `required` is held.
    Forbidden { required: Vec<Permission> },
}

impl Denial {
    pub fn reason(&self) -> &'static str {
        match self {
            Denial::Unauthenticated => "unauthenticated",
            Denial::Forbidden { .. } => "forbidden",
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Permitted; carries the verified claims.
    Allow(Claims),
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Decision::Allow(claims) => Some(claims),
            Decision::Deny(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Claims, Denial> {
        match self {
            Decision::Allow(claims) => Ok(claims),
            Decision::Deny(denial) => Err(denial),
        }
    }

    fn from_check(claims: Claims, check: Result<(), Denial>) -> Self {
        match check {
            Ok(()) => {
                tracing::debug!(principal_id = %claims.sub, role = %claims.role, "access allowed");
                Decision::Allow(claims)
            }
            Err(denial) => {
                tracing::info!(
                    principal_id = %claims.sub,
                    role = %claims.role,
                    reason = denial.reason(),
                    "access denied"
                );
                Decision::Deny(denial)
            }
        }
    }
}

/// Credential-level authorization entry points.
#[derive(Debug, Clone)]
pub struct Guard {
    codec: TokenCodec,
}

impl Guard {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify the credential only.
    pub fn authenticate(&self, credential: &str) -> Result<Claims, Denial> {
        self.codec.verify(credential).map_err(|_| {
            tracing::info!(reason = "unauthenticated", "access denied");
            Denial::Unauthenticated
        })
    }

    /// Allow if the credential verifies and its role holds `permission`.
    pub fn authorize(&self, credential: &str, permission: Permission) -> Decision {
        self.decide(credential, |claims| check_permission(claims, permission))
    }

    /// Allow the resource owner unconditionally; everyone else needs `permission`.
    pub fn authorize_owner_or_permission(
        &self,
        credential: &str,
        resource_owner_id: &str,
        permission: Permission,
    ) -> Decision {
        self.decide(credential, |claims| {
            check_owner_or_permission(claims, resource_owner_id, permission)
        })
    }

    /// Allow if any of `permissions` is held. An empty list never allows.
    pub fn authorize_any(&self, credential: &str, permissions: &[Permission]) -> Decision {
        self.decide(credential, |claims| check_any(claims, permissions))
    }

    /// Allow if the credential's role is one of `roles`.
    pub fn authorize_role(&self, credential: &str, roles: &[Role]) -> Decision {
        self.decide(credential, |claims| {
            if claims.role.is_known() && roles.contains(&claims.role) {
                Ok(())
            } else {
                Err(Denial::Forbidden {
                    required: Vec::new(),
                })
            }
        })
    }

    fn decide<F>(&self, credential: &str, check: F) -> Decision
    where
        F: FnOnce(&Claims) -> Result<(), Denial>,
    {
        match self.authenticate(credential) {
            Ok(claims) => {
                let outcome = check(&claims);
                Decision::from_check(claims, outcome)
            }
            Err(denial) => Decision::Deny(denial),
        }
    }
}

// =============================================================================
// Claims-level checks
// =============================================================================

pub fn check_permission(claims: &Claims, permission: Permission) -> Result<(), Denial> {
    if claims.has_permission(permission) {
        Ok(())
    } else {
        Err(Denial::Forbidden {
            required: vec![permission],
        })
    }
}

pub fn check_any(claims: &Claims, permissions: &[Permission]) -> Result<(), Denial> {
    if permissions.iter().any(|p| claims.has_permission(*p)) {
        Ok(())
    } else {
        Err(Denial::Forbidden {
            required: permissions.to_vec(),
        })
    }
}

pub fn check_owner_or_permission(
    claims: &Claims,
    resource_owner_id: &str,
    permission: Permission,
) -> Result<(), Denial> {
    if claims.sub == resource_owner_id {
        return Ok(());
    }
    check_permission(claims, permission)
}

/// Whether the caller may read another user's profile and progress.
///
/// Self access is always allowed. Admins need `ViewAllProgress`; teachers
/// need `ViewStudentProgress` and may never read an admin's data.
pub fn can_access_user_data(claims: &Claims, target: &Principal) -> bool {
    if claims.sub == target.id {
        return true;
    }
    match claims.role {
        Role::Admin => permissions::has(claims.role, Permission::ViewAllProgress),
        Role::Teacher => {
            target.role != Role::Admin
                && permissions::has(claims.role, Permission::ViewStudentProgress)
        }
        Role::Student | Role::Unknown => false,
    }
}

/// Whether the caller may manage a class.
///
/// `existing_class_owner` is `None` when creating a new class. Teachers may
/// only edit classes they own.
pub fn can_manage_class(claims: &Claims, existing_class_owner: Option<&str>) -> bool {
    match claims.role {
        Role::Admin => true,
        Role::Teacher => match existing_class_owner {
            None => permissions::has(claims.role, Permission::CreateClasses),
            Some(owner) => {
                owner == claims.sub && permissions::has(claims.role, Permission::EditClasses)
            }
        },
        Role::Student | Role::Unknown => false,
    }
}
