// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, including user deletion and system management
/// - `Teacher` - Manages classes, content and challenges; sees student progress
/// - `Student` - Works through challenges and sees own progress
/// - `Unknown` - Anything that arrived from untyped input and did not parse;
///   holds no permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Role {
    /// Learner working through challenges
    Student,
    /// Instructor managing classes and content
    Teacher,
    /// Full administrative access
    Admin,
    /// Unrecognized role text (no access)
    Unknown,
}

impl Role {
    /// Every role that grants access, lowest privilege first.
    pub const KNOWN: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    /// Parse role from string (case-insensitive).
    ///
    /// Unrecognized text maps to [`Role::Unknown`] instead of failing, so that
    /// callers always get a value that the permission catalog denies.
    pub fn parse(s: &str) -> Role {
        match s.trim().to_lowercase().as_str() {
            "student" => Role::Student,
            "teacher" => Role::Teacher,
            "admin" => Role::Admin,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Role::Unknown
    }
}

impl Default for Role {
    /// Self-registered accounts start as students.
    fn default() -> Self {
        Role::Student
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for &'static str {
    fn from(value: Role) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("Teacher"), Role::Teacher);
        assert_eq!(Role::parse(" student "), Role::Student);
    }

    #[test]
    fn unrecognized_text_maps_to_unknown() {
        assert_eq!(Role::parse("superuser"), Role::Unknown);
        assert_eq!(Role::parse(""), Role::Unknown);
        assert!(!Role::Unknown.is_known());
    }

    #[test]
    fn default_role_is_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn serde_uses_lowercase_and_tolerates_garbage() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), r#""teacher""#);

        let parsed: Role = serde_json::from_str(r#""Admin""#).unwrap();
        assert_eq!(parsed, Role::Admin);

        let parsed: Role = serde_json::from_str(r#""root""#).unwrap();
        assert_eq!(parsed, Role::Unknown);
    }
}
