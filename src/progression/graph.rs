// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prerequisite graph over a catalog snapshot.
//!
//! Traversals share one visited map per call and are bounded by
//! `nodes + edges + 1` steps, which a well-formed catalog can never exceed.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use super::CompletionSet;
use crate::models::{Challenge, ChallengeId};

/// Resolver failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The prerequisite data contains a circular dependency.
    #[error("circular prerequisite dependency involving challenges [{}]", join_ids(.challenge_ids))]
    CycleDetected { challenge_ids: Vec<ChallengeId> },

    #[error("challenge {0} not found")]
    NotFound(ChallengeId),
}

fn join_ids(ids: &[ChallengeId]) -> String {
    ids.iter()
        .map(ChallengeId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display-friendly reference to a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChallengeDescriptor {
    pub id: ChallengeId,
    pub title: String,
    /// `None` for a dangling reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

impl ChallengeDescriptor {
    fn of(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id,
            title: challenge.title.clone(),
            module_id: Some(challenge.module_id.clone()),
        }
    }

    fn dangling(id: ChallengeId) -> Self {
        Self {
            id,
            title: format!("Unknown challenge ({id})"),
            module_id: None,
        }
    }
}

/// Outcome of [`PrerequisiteGraph::can_access`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccessCheck {
    pub challenge_id: ChallengeId,
    pub accessible: bool,
    /// Every unmet prerequisite, in authoring order.
    pub missing_prerequisites: Vec<ChallengeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChainEntry {
    pub id: ChallengeId,
    /// 1 for direct prerequisites.
    pub depth: usize,
    pub title: String,
    pub module_id: String,
}

/// Outcome of [`PrerequisiteGraph::expand_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChainExpansion {
    pub challenge_id: ChallengeId,
    /// Pre-order, each challenge at most once.
    pub entries: Vec<ChainEntry>,
    /// A back edge was skipped; the data contains a cycle.
    pub cycle_pruned: bool,
    /// The walk stopped at the step budget.
    pub budget_exhausted: bool,
}

impl ChainExpansion {
    pub fn is_complete(&self) -> bool {
        !self.cycle_pruned && !self.budget_exhausted
    }

    pub fn ids(&self) -> Vec<ChallengeId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

struct Frame {
    id: ChallengeId,
    depth: usize,
    next: usize,
}

enum Step {
    Pop,
    Skip,
    Enter(ChallengeId, usize),
    BackEdge(ChallengeId),
}

/// Result of one depth-first walk.
struct Walk {
    entries: Vec<ChainEntry>,
    /// Path of the first back edge found, closed on its first id.
    cycle: Option<Vec<ChallengeId>>,
    budget_exhausted: bool,
}

/// Immutable view of the challenge catalog as a prerequisite graph.
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    nodes: BTreeMap<ChallengeId, Challenge>,
}

impl FromIterator<Challenge> for PrerequisiteGraph {
    fn from_iter<I: IntoIterator<Item = Challenge>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|c| (c.id, c)).collect(),
        }
    }
}

impl PrerequisiteGraph {
    pub fn new(challenges: impl IntoIterator<Item = Challenge>) -> Self {
        challenges.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: ChallengeId) -> Option<&Challenge> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: ChallengeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Challenges in ascending id order.
    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> {
        self.nodes.values()
    }

    /// Descriptor for `id`, or a placeholder when it is not in the catalog.
    pub fn describe(&self, id: ChallengeId) -> ChallengeDescriptor {
        self.nodes
            .get(&id)
            .map(ChallengeDescriptor::of)
            .unwrap_or_else(|| ChallengeDescriptor::dangling(id))
    }

    fn prerequisites_of(&self, id: ChallengeId) -> &[ChallengeId] {
        self.nodes
            .get(&id)
            .map(|c| c.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    fn step_budget(&self) -> usize {
        let edges: usize = self.nodes.values().map(|c| c.prerequisites.len()).sum();
        self.nodes.len() + edges + 1
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Whether every direct prerequisite of `id` is in `completed`.
    ///
    /// An unknown challenge imposes no constraint.
    pub fn can_access(&self, id: ChallengeId, completed: &CompletionSet) -> AccessCheck {
        let mut seen = HashSet::new();
        let missing_prerequisites: Vec<ChallengeDescriptor> = self
            .prerequisites_of(id)
            .iter()
            .filter(|p| !completed.contains(p) && seen.insert(**p))
            .map(|p| self.describe(*p))
            .collect();

        AccessCheck {
            challenge_id: id,
            accessible: missing_prerequisites.is_empty(),
            missing_prerequisites,
        }
    }

    /// Transitive prerequisites of `id` with their depth.
    ///
    /// Back edges are pruned and flagged instead of followed, so the result is
    /// incomplete when [`ChainExpansion::is_complete`] is false.
    pub fn expand_chain(&self, id: ChallengeId) -> ChainExpansion {
        let walk = self.walk(id);
        ChainExpansion {
            challenge_id: id,
            entries: walk.entries,
            cycle_pruned: walk.cycle.is_some(),
            budget_exhausted: walk.budget_exhausted,
        }
    }

    /// Fails when the chain below `id` contains a cycle.
    pub fn validate_acyclic(&self, id: ChallengeId) -> Result<(), GraphError> {
        let walk = self.walk(id);
        if let Some(challenge_ids) = walk.cycle {
            warn!(challenge_id = %id, cycle = %join_ids(&challenge_ids), "Circular prerequisite dependency");
            return Err(GraphError::CycleDetected { challenge_ids });
        }
        if walk.budget_exhausted {
            warn!(challenge_id = %id, "Prerequisite walk exceeded its step budget");
            return Err(GraphError::CycleDetected {
                challenge_ids: vec![id],
            });
        }
        Ok(())
    }

    /// Ordered list of challenges to complete before `target` is accessible.
    ///
    /// Empty when the target is unknown or already accessible. Ties among
    /// ready challenges go to the lowest id.
    pub fn suggest_path(
        &self,
        target: ChallengeId,
        completed: &CompletionSet,
    ) -> Result<Vec<ChallengeId>, GraphError> {
        if !self.contains(target) {
            return Ok(Vec::new());
        }

        let pending = self.unmet_closure(target, completed)?;
        self.topological_order(&pending)
    }

    /// Challenges that list `id` as a direct prerequisite.
    pub fn dependents(&self, id: ChallengeId) -> Vec<ChallengeDescriptor> {
        self.nodes
            .values()
            .filter(|c| c.prerequisites.contains(&id))
            .map(ChallengeDescriptor::of)
            .collect()
    }

    /// Every challenge whose prerequisite chain contains a cycle, ascending.
    ///
    /// One pass over the whole graph: a challenge is peeled off once all of
    /// its prerequisites have been, and whatever is left reaches a cycle.
    pub fn cyclic_challenges(&self) -> Vec<ChallengeId> {
        let mut remaining: BTreeMap<ChallengeId, usize> = BTreeMap::new();
        let mut unlocks: HashMap<ChallengeId, Vec<ChallengeId>> = HashMap::new();

        for challenge in self.nodes.values() {
            let edges: BTreeSet<ChallengeId> = challenge
                .prerequisites
                .iter()
                .copied()
                .filter(|p| self.contains(*p))
                .collect();
            for prerequisite in &edges {
                unlocks.entry(*prerequisite).or_default().push(challenge.id);
            }
            remaining.insert(challenge.id, edges.len());
        }

        let mut ready: Vec<ChallengeId> = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();

        while let Some(id) = ready.pop() {
            remaining.remove(&id);
            for next in unlocks.get(&id).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(count) = remaining.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(*next);
                    }
                }
            }
        }

        if !remaining.is_empty() {
            warn!(
                count = remaining.len(),
                "Catalog contains circular prerequisite dependencies"
            );
        }
        remaining.into_keys().collect()
    }

    /// Check that replacing the prerequisites of `id` keeps its chain acyclic.
    ///
    /// The graph itself is left untouched.
    pub fn validate_prerequisite_update(
        &self,
        id: ChallengeId,
        prerequisites: &[ChallengeId],
    ) -> Result<(), GraphError> {
        let mut proposed = self.clone();
        let challenge = proposed
            .nodes
            .get_mut(&id)
            .ok_or(GraphError::NotFound(id))?;
        challenge.prerequisites = prerequisites.to_vec();
        proposed.validate_acyclic(id)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Iterative depth-first walk below `root`.
    ///
    /// Dangling references are skipped. A node already finished is not
    /// re-entered, so shared sub-chains appear once.
    fn walk(&self, root: ChallengeId) -> Walk {
        let mut marks: HashMap<ChallengeId, Mark> = HashMap::new();
        let mut stack = Vec::new();
        let mut entries = Vec::new();
        let mut cycle = None;
        let mut budget_exhausted = false;

        if self.contains(root) {
            marks.insert(root, Mark::OnPath);
            stack.push(Frame {
                id: root,
                depth: 0,
                next: 0,
            });
        }

        let budget = self.step_budget();
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > budget {
                budget_exhausted = true;
                break;
            }

            let step = {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let prerequisites = self.prerequisites_of(frame.id);
                match prerequisites.get(frame.next) {
                    None => Step::Pop,
                    Some(&child) => {
                        frame.next += 1;
                        if !self.contains(child) {
                            Step::Skip
                        } else {
                            match marks.get(&child) {
                                Some(Mark::OnPath) => Step::BackEdge(child),
                                Some(Mark::Done) => Step::Skip,
                                None => Step::Enter(child, frame.depth + 1),
                            }
                        }
                    }
                }
            };

            match step {
                Step::Pop => {
                    if let Some(frame) = stack.pop() {
                        marks.insert(frame.id, Mark::Done);
                    }
                }
                Step::Skip => {}
                Step::BackEdge(child) => {
                    if cycle.is_none() {
                        let start = stack.iter().position(|f| f.id == child).unwrap_or(0);
                        let mut path: Vec<ChallengeId> =
                            stack[start..].iter().map(|f| f.id).collect();
                        path.push(child);
                        cycle = Some(path);
                    }
                }
                Step::Enter(child, depth) => {
                    marks.insert(child, Mark::OnPath);
                    if let Some(challenge) = self.nodes.get(&child) {
                        entries.push(ChainEntry {
                            id: child,
                            depth,
                            title: challenge.title.clone(),
                            module_id: challenge.module_id.clone(),
                        });
                    }
                    stack.push(Frame {
                        id: child,
                        depth,
                        next: 0,
                    });
                }
            }
        }

        Walk {
            entries,
            cycle,
            budget_exhausted,
        }
    }

    /// Every uncompleted, existing challenge reachable from the unmet direct
    /// prerequisites of `target`.
    fn unmet_closure(
        &self,
        target: ChallengeId,
        completed: &CompletionSet,
    ) -> Result<BTreeSet<ChallengeId>, GraphError> {
        let mut worklist: Vec<ChallengeId> = self
            .prerequisites_of(target)
            .iter()
            .copied()
            .filter(|p| !completed.contains(p))
            .collect();

        let mut visited = HashSet::new();
        let mut pending = BTreeSet::new();
        // The target's own edges may be queued twice when it sits on a cycle.
        let budget = self.step_budget() + worklist.len();
        let mut steps = 0usize;

        while let Some(id) = worklist.pop() {
            steps += 1;
            if steps > budget {
                warn!(challenge_id = %target, "Learning path walk exceeded its step budget");
                return Err(GraphError::CycleDetected {
                    challenge_ids: vec![target],
                });
            }
            if !visited.insert(id) || !self.contains(id) {
                continue;
            }
            if !completed.contains(&id) {
                pending.insert(id);
            }
            worklist.extend(
                self.prerequisites_of(id)
                    .iter()
                    .filter(|p| !visited.contains(*p)),
            );
        }

        Ok(pending)
    }

    /// Kahn's algorithm over the subgraph induced by `pending`.
    fn topological_order(
        &self,
        pending: &BTreeSet<ChallengeId>,
    ) -> Result<Vec<ChallengeId>, GraphError> {
        let mut in_degree: BTreeMap<ChallengeId, usize> =
            pending.iter().map(|id| (*id, 0)).collect();
        let mut unlocks: HashMap<ChallengeId, Vec<ChallengeId>> = HashMap::new();

        for id in pending {
            let edges: BTreeSet<ChallengeId> = self
                .prerequisites_of(*id)
                .iter()
                .copied()
                .filter(|p| pending.contains(p))
                .collect();
            for prerequisite in edges {
                unlocks.entry(prerequisite).or_default().push(*id);
                if let Some(degree) = in_degree.get_mut(id) {
                    *degree += 1;
                }
            }
        }

        let mut ready: BTreeSet<ChallengeId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for next in unlocks.get(&id).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*next);
                    }
                }
            }
        }

        if order.len() < pending.len() {
            let challenge_ids: Vec<ChallengeId> = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id)
                .collect();
            warn!(cycle = %join_ids(&challenge_ids), "Learning path blocked by circular prerequisites");
            return Err(GraphError::CycleDetected { challenge_ids });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<ChallengeId> {
        raw.iter().copied().map(ChallengeId).collect()
    }

    fn done(raw: &[i64]) -> CompletionSet {
        raw.iter().copied().map(ChallengeId).collect()
    }

    fn graph(spec: &[(i64, &[i64])]) -> PrerequisiteGraph {
        spec.iter()
            .map(|(id, prereqs)| {
                Challenge::new(*id, "m1", format!("Challenge {id}"))
                    .with_prerequisites(prereqs.iter().copied())
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // can_access
    // -------------------------------------------------------------------------

    #[test]
    fn challenge_without_prerequisites_is_accessible() {
        let g = graph(&[(1, &[])]);
        let check = g.can_access(ChallengeId(1), &done(&[]));
        assert!(check.accessible);
        assert!(check.missing_prerequisites.is_empty());
    }

    #[test]
    fn prerequisite_gates_access_until_completed() {
        let g = graph(&[(1, &[]), (2, &[1])]);

        let locked = g.can_access(ChallengeId(2), &done(&[]));
        assert!(!locked.accessible);
        assert_eq!(locked.missing_prerequisites.len(), 1);
        assert_eq!(locked.missing_prerequisites[0].id, ChallengeId(1));
        assert_eq!(locked.missing_prerequisites[0].title, "Challenge 1");

        let open = g.can_access(ChallengeId(2), &done(&[1]));
        assert!(open.accessible);
        assert!(open.missing_prerequisites.is_empty());
    }

    #[test]
    fn all_unmet_prerequisites_are_reported() {
        let g = graph(&[(1, &[]), (2, &[]), (3, &[]), (4, &[3, 1, 2])]);
        let check = g.can_access(ChallengeId(4), &done(&[1]));
        let missing: Vec<ChallengeId> = check.missing_prerequisites.iter().map(|d| d.id).collect();
        assert_eq!(missing, ids(&[3, 2]));
    }

    #[test]
    fn dangling_prerequisite_gets_placeholder() {
        let g = graph(&[(2, &[99])]);
        let check = g.can_access(ChallengeId(2), &done(&[]));
        assert!(!check.accessible);
        let placeholder = &check.missing_prerequisites[0];
        assert_eq!(placeholder.id, ChallengeId(99));
        assert_eq!(placeholder.title, "Unknown challenge (99)");
        assert!(placeholder.module_id.is_none());
    }

    #[test]
    fn unknown_challenge_imposes_no_constraint() {
        let g = graph(&[(1, &[])]);
        let check = g.can_access(ChallengeId(42), &done(&[]));
        assert!(check.accessible);
        assert!(check.missing_prerequisites.is_empty());
    }

    // -------------------------------------------------------------------------
    // expand_chain / validate_acyclic
    // -------------------------------------------------------------------------

    #[test]
    fn chain_lists_transitive_prerequisites_with_depth() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[2])]);
        let chain = g.expand_chain(ChallengeId(3));
        assert!(chain.is_complete());
        let shape: Vec<(i64, usize)> = chain.entries.iter().map(|e| (e.id.0, e.depth)).collect();
        assert_eq!(shape, vec![(2, 1), (1, 2)]);
    }

    #[test]
    fn diamond_shares_one_visit() {
        // 4 -> {2, 3}, both -> 1
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])]);
        let chain = g.expand_chain(ChallengeId(4));
        assert!(chain.is_complete());
        assert_eq!(chain.ids(), ids(&[2, 1, 3]));
    }

    #[test]
    fn chain_prunes_cycles_and_says_so() {
        let g = graph(&[(1, &[2]), (2, &[1])]);
        let chain = g.expand_chain(ChallengeId(1));
        assert!(chain.cycle_pruned);
        assert!(!chain.is_complete());
        assert_eq!(chain.ids(), ids(&[2]));
    }

    #[test]
    fn chain_skips_dangling_references() {
        let g = graph(&[(1, &[]), (2, &[99, 1])]);
        let chain = g.expand_chain(ChallengeId(2));
        assert!(chain.is_complete());
        assert_eq!(chain.ids(), ids(&[1]));
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let g = graph(&[(1, &[2]), (2, &[1])]);
        match g.validate_acyclic(ChallengeId(1)) {
            Err(GraphError::CycleDetected { challenge_ids }) => {
                assert_eq!(challenge_ids, ids(&[1, 2, 1]));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let g = graph(&[(1, &[1])]);
        assert!(matches!(
            g.validate_acyclic(ChallengeId(1)),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn cycle_below_root_is_detected() {
        let g = graph(&[(1, &[2]), (2, &[3]), (3, &[2])]);
        match g.validate_acyclic(ChallengeId(1)) {
            Err(GraphError::CycleDetected { challenge_ids }) => {
                assert_eq!(challenge_ids, ids(&[2, 3, 2]));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn acyclic_diamond_validates() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])]);
        assert_eq!(g.validate_acyclic(ChallengeId(4)), Ok(()));
        assert_eq!(g.validate_acyclic(ChallengeId(404)), Ok(()));
    }

    #[test]
    fn long_chain_terminates_within_budget() {
        let spec: Vec<(i64, Vec<i64>)> = (1..=2_000)
            .map(|i| (i, if i == 1 { vec![] } else { vec![i - 1] }))
            .collect();
        let g: PrerequisiteGraph = spec
            .into_iter()
            .map(|(id, prereqs)| Challenge::new(id, "m", "t").with_prerequisites(prereqs))
            .collect();

        let chain = g.expand_chain(ChallengeId(2_000));
        assert!(chain.is_complete());
        assert_eq!(chain.entries.len(), 1_999);
        assert_eq!(chain.entries.last().map(|e| e.depth), Some(1_999));
    }

    // -------------------------------------------------------------------------
    // suggest_path
    // -------------------------------------------------------------------------

    #[test]
    fn path_follows_dependency_order() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[2])]);
        let path = g.suggest_path(ChallengeId(3), &done(&[])).unwrap();
        assert_eq!(path, ids(&[1, 2]));
    }

    #[test]
    fn path_is_idempotent() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[]), (5, &[3, 2, 4])]);
        let completed = done(&[]);
        let first = g.suggest_path(ChallengeId(5), &completed).unwrap();
        let second = g.suggest_path(ChallengeId(5), &completed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ready_ties_break_by_ascending_id() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[]), (5, &[3, 2, 4])]);
        let path = g.suggest_path(ChallengeId(5), &done(&[])).unwrap();
        assert_eq!(path, ids(&[1, 2, 3, 4]));
    }

    #[test]
    fn completed_challenges_are_left_out() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[2])]);
        let path = g.suggest_path(ChallengeId(3), &done(&[1])).unwrap();
        assert_eq!(path, ids(&[2]));
    }

    #[test]
    fn walk_continues_through_completed_prerequisites() {
        // 2 is done but 1 below it is not.
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[2]), (4, &[3])]);
        let path = g.suggest_path(ChallengeId(4), &done(&[2])).unwrap();
        assert_eq!(path, ids(&[1, 3]));
    }

    #[test]
    fn accessible_or_unknown_target_has_empty_path() {
        let g = graph(&[(1, &[]), (2, &[1])]);
        assert!(g.suggest_path(ChallengeId(2), &done(&[1])).unwrap().is_empty());
        assert!(g.suggest_path(ChallengeId(1), &done(&[])).unwrap().is_empty());
        assert!(g.suggest_path(ChallengeId(77), &done(&[])).unwrap().is_empty());
    }

    #[test]
    fn path_excludes_dangling_references() {
        let g = graph(&[(1, &[]), (2, &[99, 1])]);
        let path = g.suggest_path(ChallengeId(2), &done(&[])).unwrap();
        assert_eq!(path, ids(&[1]));
    }

    #[test]
    fn cyclic_unmet_set_is_reported_not_truncated() {
        let g = graph(&[(1, &[2]), (2, &[1]), (3, &[1]), (4, &[])]);
        let target = Challenge::new(5, "m1", "Target").with_prerequisites([3, 4]);
        let g: PrerequisiteGraph = g.challenges().cloned().chain([target]).collect();

        match g.suggest_path(ChallengeId(5), &done(&[])) {
            Err(GraphError::CycleDetected { challenge_ids }) => {
                assert_eq!(challenge_ids, ids(&[1, 2, 3]));
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_prerequisite_entries_count_once() {
        let g = graph(&[(1, &[]), (2, &[1, 1]), (3, &[2, 2, 1])]);
        let path = g.suggest_path(ChallengeId(3), &done(&[])).unwrap();
        assert_eq!(path, ids(&[1, 2]));
        assert_eq!(g.can_access(ChallengeId(2), &done(&[])).missing_prerequisites.len(), 1);
    }

    // -------------------------------------------------------------------------
    // dependents / updates
    // -------------------------------------------------------------------------

    #[test]
    fn cyclic_challenges_match_per_challenge_validation() {
        let g = PrerequisiteGraph::new([
            Challenge::new(1, "m", "a").with_prerequisites([2]),
            Challenge::new(2, "m", "b").with_prerequisites([3]),
            Challenge::new(3, "m", "c").with_prerequisites([1]),
            Challenge::new(4, "m", "d").with_prerequisites([3, 5]),
            Challenge::new(5, "m", "e"),
            Challenge::new(6, "m", "f").with_prerequisites([6]),
            Challenge::new(7, "m", "g").with_prerequisites([5, 5, 99]),
            Challenge::new(8, "m", "h").with_prerequisites([7, 5]),
        ]);

        let cyclic = g.cyclic_challenges();
        assert_eq!(cyclic, ids(&[1, 2, 3, 4, 6]));

        let expected: Vec<ChallengeId> = g
            .challenges()
            .map(|c| c.id)
            .filter(|id| g.validate_acyclic(*id).is_err())
            .collect();
        assert_eq!(cyclic, expected);
    }

    #[test]
    fn acyclic_catalog_has_no_cyclic_challenges() {
        let g = PrerequisiteGraph::new((1..=500).map(|i| {
            Challenge::new(i, "m", "step").with_prerequisites((i > 1).then_some(i - 1))
        }));
        assert!(g.cyclic_challenges().is_empty());
    }

    #[test]
    fn dependents_are_reverse_edges() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1, 2]), (4, &[])]);
        let found: Vec<ChallengeId> = g.dependents(ChallengeId(1)).iter().map(|d| d.id).collect();
        assert_eq!(found, ids(&[2, 3]));
        assert!(g.dependents(ChallengeId(4)).is_empty());
    }

    #[test]
    fn update_that_closes_a_loop_is_rejected() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[2])]);
        assert!(matches!(
            g.validate_prerequisite_update(ChallengeId(1), &ids(&[3])),
            Err(GraphError::CycleDetected { .. })
        ));
        assert_eq!(g.validate_prerequisite_update(ChallengeId(1), &[]), Ok(()));
        // Unchanged.
        assert!(g.get(ChallengeId(1)).unwrap().prerequisites.is_empty());
    }

    #[test]
    fn update_of_unknown_challenge_is_not_found() {
        let g = graph(&[(1, &[])]);
        assert_eq!(
            g.validate_prerequisite_update(ChallengeId(9), &[]),
            Err(GraphError::NotFound(ChallengeId(9)))
        );
    }

    #[test]
    fn cycle_error_names_challenges() {
        let err = GraphError::CycleDetected {
            challenge_ids: ids(&[1, 2]),
        };
        assert_eq!(
            err.to_string(),
            "circular prerequisite dependency involving challenges [1, 2]"
        );
    }
}
