// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolver entry points that read their inputs from the storage ports.
//!
//! Each call takes a fresh snapshot of the catalog, so concurrent content
//! edits are observed on the next request.

use std::sync::Arc;

use thiserror::Error;

use super::graph::{AccessCheck, ChainExpansion, ChallengeDescriptor, GraphError, PrerequisiteGraph};
use super::insights::{Availability, LearningStep, PrerequisiteStatistics};
use super::CompletionSet;
use crate::models::ChallengeId;
use crate::storage::{ChallengeCatalog, ProgressStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A user's completions with the availability they imply.
#[derive(Debug, Clone)]
pub struct UserProgress {
    pub completed: CompletionSet,
    pub availability: Availability,
}

#[derive(Clone)]
pub struct ProgressionService {
    catalog: Arc<dyn ChallengeCatalog>,
    progress: Arc<dyn ProgressStore>,
}

impl ProgressionService {
    pub fn new(catalog: Arc<dyn ChallengeCatalog>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { catalog, progress }
    }

    /// Snapshot of the whole catalog.
    pub fn graph(&self) -> Result<PrerequisiteGraph, StoreError> {
        Ok(PrerequisiteGraph::new(self.catalog.find_all()?))
    }

    pub fn can_access(
        &self,
        user_id: &str,
        challenge_id: ChallengeId,
    ) -> Result<AccessCheck, ProgressionError> {
        let completed = self.progress.completed_challenge_ids(user_id)?;
        Ok(self.graph()?.can_access(challenge_id, &completed))
    }

    pub fn expand_chain(&self, challenge_id: ChallengeId) -> Result<ChainExpansion, ProgressionError> {
        Ok(self.graph()?.expand_chain(challenge_id))
    }

    pub fn validate_acyclic(&self, challenge_id: ChallengeId) -> Result<(), ProgressionError> {
        Ok(self.graph()?.validate_acyclic(challenge_id)?)
    }

    pub fn suggest_path(
        &self,
        user_id: &str,
        target: ChallengeId,
    ) -> Result<Vec<ChallengeId>, ProgressionError> {
        let completed = self.progress.completed_challenge_ids(user_id)?;
        Ok(self.graph()?.suggest_path(target, &completed)?)
    }

    /// Like [`Self::suggest_path`] with each id resolved to its details.
    pub fn suggest_path_detailed(
        &self,
        user_id: &str,
        target: ChallengeId,
    ) -> Result<Vec<LearningStep>, ProgressionError> {
        let completed = self.progress.completed_challenge_ids(user_id)?;
        let graph = self.graph()?;
        let path = graph.suggest_path(target, &completed)?;
        Ok(graph.learning_steps(&path))
    }

    pub fn dependents(&self, challenge_id: ChallengeId) -> Result<Vec<ChallengeDescriptor>, ProgressionError> {
        Ok(self.graph()?.dependents(challenge_id))
    }

    pub fn available_challenges(
        &self,
        user_id: &str,
        module_id: Option<&str>,
    ) -> Result<Availability, ProgressionError> {
        let completed = self.progress.completed_challenge_ids(user_id)?;
        let graph = self.graph()?;
        match module_id {
            // Prerequisites may live in other modules; only the listing is narrowed.
            Some(module_id) => {
                let listing = self.catalog.find_by_module(module_id)?;
                Ok(graph.partition(&listing, &completed))
            }
            None => Ok(graph.availability(&completed, None)),
        }
    }

    pub fn progress_for(&self, user_id: &str) -> Result<UserProgress, ProgressionError> {
        let completed = self.progress.completed_challenge_ids(user_id)?;
        let availability = self.graph()?.availability(&completed, None);
        Ok(UserProgress {
            completed,
            availability,
        })
    }

    pub fn validate_prerequisite_update(
        &self,
        challenge_id: ChallengeId,
        prerequisites: &[ChallengeId],
    ) -> Result<(), ProgressionError> {
        Ok(self
            .graph()?
            .validate_prerequisite_update(challenge_id, prerequisites)?)
    }

    pub fn statistics(&self) -> Result<PrerequisiteStatistics, ProgressionError> {
        Ok(self.graph()?.statistics())
    }

    /// Record a completion once every prerequisite is met.
    ///
    /// Returns the access check; nothing is recorded when it denies.
    pub fn complete(
        &self,
        user_id: &str,
        challenge_id: ChallengeId,
    ) -> Result<AccessCheck, ProgressionError> {
        if self.catalog.find_by_id(challenge_id)?.is_none() {
            return Err(GraphError::NotFound(challenge_id).into());
        }

        let graph = self.graph()?;
        let completed = self.progress.completed_challenge_ids(user_id)?;
        let check = graph.can_access(challenge_id, &completed);
        if check.accessible {
            self.progress.record_completion(user_id, challenge_id)?;
        }
        Ok(check)
    }
}
