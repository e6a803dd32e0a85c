// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog-wide views built on the resolver: availability per user,
//! detailed learning steps and prerequisite statistics.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::graph::{ChallengeDescriptor, PrerequisiteGraph};
use super::CompletionSet;
use crate::models::{Challenge, ChallengeId, Difficulty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Completed,
    Available,
    Locked,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailableChallenge {
    pub challenge: Challenge,
    pub status: ChallengeStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockedChallenge {
    pub challenge: Challenge,
    pub missing_prerequisites: Vec<ChallengeDescriptor>,
}

/// Active challenges split by whether the user may start them.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Availability {
    pub available: Vec<AvailableChallenge>,
    pub locked: Vec<LockedChallenge>,
}

/// One entry of a detailed learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LearningStep {
    pub id: ChallengeId,
    pub title: String,
    pub module_id: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_minutes: Option<u32>,
    pub points: u32,
}

impl From<&Challenge> for LearningStep {
    fn from(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id,
            title: challenge.title.clone(),
            module_id: challenge.module_id.clone(),
            difficulty: challenge.difficulty,
            estimated_duration_minutes: challenge.estimated_duration_minutes,
            points: challenge.points,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PrerequisiteStatistics {
    pub total_challenges: usize,
    pub challenges_with_prerequisites: usize,
    /// Mean over challenges that have prerequisites, two decimals.
    pub average_prerequisites: f64,
    pub max_prerequisites: usize,
    /// Prerequisite count -> number of challenges with that count (zero omitted).
    pub prerequisite_distribution: BTreeMap<usize, usize>,
    /// Challenges whose chain contains a cycle.
    pub circular_dependencies: Vec<ChallengeId>,
}

impl PrerequisiteGraph {
    /// Partition active challenges, optionally of one module, for a user.
    pub fn availability(&self, completed: &CompletionSet, module_id: Option<&str>) -> Availability {
        self.partition(
            self.challenges()
                .filter(|c| module_id.is_none_or(|m| c.module_id == m)),
            completed,
        )
    }

    /// Partition the active challenges among `candidates`.
    ///
    /// Prerequisites resolve against the whole graph, so candidates may come
    /// from a narrower listing.
    pub fn partition<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a Challenge>,
        completed: &CompletionSet,
    ) -> Availability {
        let mut result = Availability::default();

        for challenge in candidates.into_iter().filter(|c| c.is_active) {
            let check = self.can_access(challenge.id, completed);
            if check.accessible {
                let status = if completed.contains(&challenge.id) {
                    ChallengeStatus::Completed
                } else {
                    ChallengeStatus::Available
                };
                result.available.push(AvailableChallenge {
                    challenge: challenge.clone(),
                    status,
                });
            } else {
                result.locked.push(LockedChallenge {
                    challenge: challenge.clone(),
                    missing_prerequisites: check.missing_prerequisites,
                });
            }
        }

        result
    }

    /// Resolve path ids to detailed steps, dropping ids not in the catalog.
    pub fn learning_steps(&self, path: &[ChallengeId]) -> Vec<LearningStep> {
        path.iter()
            .filter_map(|id| self.get(*id))
            .map(LearningStep::from)
            .collect()
    }

    pub fn statistics(&self) -> PrerequisiteStatistics {
        let mut stats = PrerequisiteStatistics {
            total_challenges: self.len(),
            ..Default::default()
        };
        let mut total = 0usize;

        for challenge in self.challenges() {
            let count = challenge.prerequisites.len();
            if count > 0 {
                stats.challenges_with_prerequisites += 1;
                stats.max_prerequisites = stats.max_prerequisites.max(count);
                *stats.prerequisite_distribution.entry(count).or_default() += 1;
                total += count;
            }
        }
        stats.circular_dependencies = self.cyclic_challenges();

        if stats.challenges_with_prerequisites > 0 {
            let mean = total as f64 / stats.challenges_with_prerequisites as f64;
            stats.average_prerequisites = (mean * 100.0).round() / 100.0;
        }

        stats
    }
}
