// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Challenge Progression
//!
//! Prerequisite graph resolution over a per-call snapshot of the challenge
//! catalog and a user's completion set.
//!
//! ## Graph Model
//!
//! An edge `C -> D` means `D` must be completed before `C` is accessible.
//! Challenge data is managed outside this service, so the graph is treated as
//! untrusted input:
//!
//! - Dangling prerequisite references are tolerated and reported with a
//!   placeholder descriptor.
//! - Every traversal uses an explicit worklist, a single shared visited set
//!   and an iteration budget, so malformed (cyclic) data always terminates.
//! - Cycles are reported as [`GraphError::CycleDetected`], never as an empty
//!   or truncated learning path.

use std::collections::HashSet;

use crate::models::ChallengeId;

pub mod graph;
pub mod insights;
pub mod service;

pub use graph::{
    AccessCheck, ChainEntry, ChainExpansion, ChallengeDescriptor, GraphError, PrerequisiteGraph,
};
pub use insights::{
    Availability, AvailableChallenge, ChallengeStatus, LearningStep, LockedChallenge,
    PrerequisiteStatistics,
};
pub use service::{ProgressionError, ProgressionService, UserProgress};

/// Challenge ids a user has finished.
pub type CompletionSet = HashSet<ChallengeId>;
