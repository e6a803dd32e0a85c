// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Permission Catalog
//!
//! Fixed mapping of roles to permission sets. The catalog is compiled into the
//! binary: there is no API to grant a role more capabilities at runtime, any
//! change ships as a new deployment.
//!
//! Capability grows monotonically with the role:
//!
//! ```text
//! Student ⊂ Teacher ⊂ Admin
//! ```
//!
//! `Role::Unknown` and `Permission::Unknown` exist only to absorb untyped
//! input; neither ever grants access.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Role;

/// Atomic capability a role may or may not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Permission {
    // User management
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,

    // Class management
    ViewClasses,
    CreateClasses,
    EditClasses,
    DeleteClasses,
    ManageClassMembers,

    // Challenge management
    ViewChallenges,
    CreateChallenges,
    EditChallenges,
    DeleteChallenges,

    // Content management
    ViewContent,
    CreateContent,
    EditContent,
    DeleteContent,
    PublishContent,

    // Progress and reporting
    ViewOwnProgress,
    ViewStudentProgress,
    ViewAllProgress,
    ExportReports,

    // Team challenges
    JoinTeamChallenges,
    CreateTeamChallenges,

    // Achievements
    ViewAchievements,
    ManageAchievements,

    // System administration
    ManageSystem,
    ViewLogs,

    /// Unrecognized permission text. No role holds it.
    Unknown,
}

impl Permission {
    /// Every grantable permission, in declaration order.
    pub const ALL: [Permission; 28] = [
        Permission::ViewUsers,
        Permission::CreateUsers,
        Permission::EditUsers,
        Permission::DeleteUsers,
        Permission::ViewClasses,
        Permission::CreateClasses,
        Permission::EditClasses,
        Permission::DeleteClasses,
        Permission::ManageClassMembers,
        Permission::ViewChallenges,
        Permission::CreateChallenges,
        Permission::EditChallenges,
        Permission::DeleteChallenges,
        Permission::ViewContent,
        Permission::CreateContent,
        Permission::EditContent,
        Permission::DeleteContent,
        Permission::PublishContent,
        Permission::ViewOwnProgress,
        Permission::ViewStudentProgress,
        Permission::ViewAllProgress,
        Permission::ExportReports,
        Permission::JoinTeamChallenges,
        Permission::CreateTeamChallenges,
        Permission::ViewAchievements,
        Permission::ManageAchievements,
        Permission::ManageSystem,
        Permission::ViewLogs,
    ];

    /// Wire name (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewUsers => "view_users",
            Permission::CreateUsers => "create_users",
            Permission::EditUsers => "edit_users",
            Permission::DeleteUsers => "delete_users",
            Permission::ViewClasses => "view_classes",
            Permission::CreateClasses => "create_classes",
            Permission::EditClasses => "edit_classes",
            Permission::DeleteClasses => "delete_classes",
            Permission::ManageClassMembers => "manage_class_members",
            Permission::ViewChallenges => "view_challenges",
            Permission::CreateChallenges => "create_challenges",
            Permission::EditChallenges => "edit_challenges",
            Permission::DeleteChallenges => "delete_challenges",
            Permission::ViewContent => "view_content",
            Permission::CreateContent => "create_content",
            Permission::EditContent => "edit_content",
            Permission::DeleteContent => "delete_content",
            Permission::PublishContent => "publish_content",
            Permission::ViewOwnProgress => "view_own_progress",
            Permission::ViewStudentProgress => "view_student_progress",
            Permission::ViewAllProgress => "view_all_progress",
            Permission::ExportReports => "export_reports",
            Permission::JoinTeamChallenges => "join_team_challenges",
            Permission::CreateTeamChallenges => "create_team_challenges",
            Permission::ViewAchievements => "view_achievements",
            Permission::ManageAchievements => "manage_achievements",
            Permission::ManageSystem => "manage_system",
            Permission::ViewLogs => "view_logs",
            Permission::Unknown => "unknown",
        }
    }

    /// Parse a wire name. Unrecognized text maps to [`Permission::Unknown`].
    pub fn parse(s: &str) -> Permission {
        let s = s.trim();
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(Permission::Unknown)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Permission::parse(&value)
    }
}

impl From<Permission> for &'static str {
    fn from(value: Permission) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Role → Permission mapping
// =============================================================================

const STUDENT_PERMISSIONS: &[Permission] = &[
    Permission::ViewOwnProgress,
    Permission::ViewChallenges,
    Permission::ViewContent,
    Permission::ViewAchievements,
    Permission::JoinTeamChallenges,
];

const TEACHER_PERMISSIONS: &[Permission] = &[
    // Everything a student can do
    Permission::ViewOwnProgress,
    Permission::ViewChallenges,
    Permission::ViewContent,
    Permission::ViewAchievements,
    Permission::JoinTeamChallenges,
    // Classroom and authoring
    Permission::ViewUsers,
    Permission::ViewClasses,
    Permission::CreateClasses,
    Permission::EditClasses,
    Permission::ManageClassMembers,
    Permission::ViewStudentProgress,
    Permission::CreateChallenges,
    Permission::EditChallenges,
    Permission::CreateContent,
    Permission::EditContent,
    Permission::PublishContent,
    Permission::CreateTeamChallenges,
    Permission::ExportReports,
];

const ADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

fn granted(role: Role) -> &'static [Permission] {
    match role {
        Role::Student => STUDENT_PERMISSIONS,
        Role::Teacher => TEACHER_PERMISSIONS,
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Unknown => &[],
    }
}

/// All permissions held by `role`. Unknown roles get the empty set.
pub fn permissions_for(role: Role) -> BTreeSet<Permission> {
    granted(role).iter().copied().collect()
}

/// Membership test, equivalent to `permissions_for(role).contains(&permission)`.
pub fn has(role: Role, permission: Permission) -> bool {
    permission != Permission::Unknown && granted(role).contains(&permission)
}

/// Sorted wire names of the permissions held by `role`.
pub fn permission_names(role: Role) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = granted(role).iter().map(Permission::as_str).collect();
    names.sort_unstable();
    names
}
