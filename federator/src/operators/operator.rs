/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use shared::Source;
use std::collections::BTreeSet;

/// Where a join is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinExecution {
    /// Both inputs are fetched and joined by the federator
    Local,
    /// Both inputs live at the same single source, the join is shipped there
    Remote,
}

/// Physical join algorithm, only interpreted by execution and the cost model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinAlgorithm {
    HashJoin,
    BindJoin,
    NestedLoopJoin,
}

/// Leaf operator: one pattern answered by a non-empty set of sources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPlan<P, F> {
    pub pattern: P,
    pub filters: Vec<F>,
    pub sources: BTreeSet<Source>,
}

/// Binary join of two subtrees
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Join<P, F> {
    pub left: Box<Operator<P, F>>,
    pub right: Box<Operator<P, F>>,
    pub execution: JoinExecution,
    pub algorithm: JoinAlgorithm,
    pub filters: Vec<F>,
}

/// Operator tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator<P, F> {
    AccessPlan(AccessPlan<P, F>),
    Join(Join<P, F>),
}

impl<P, F> Operator<P, F> {
    /// Creates a new access plan leaf.
    ///
    /// # Panics
    ///
    /// Panics if `sources` is empty. A pattern no source can answer is
    /// reported by source selection and never reaches a plan.
    pub fn access_plan(pattern: P, sources: BTreeSet<Source>) -> Self {
        assert!(!sources.is_empty(), "access plan without sources");
        Self::AccessPlan(AccessPlan {
            pattern,
            filters: Vec::new(),
            sources,
        })
    }

    /// Creates a new join node without attached filters
    pub fn join(
        left: Operator<P, F>,
        right: Operator<P, F>,
        execution: JoinExecution,
        algorithm: JoinAlgorithm,
    ) -> Self {
        Self::Join(Join {
            left: Box::new(left),
            right: Box::new(right),
            execution,
            algorithm,
            filters: Vec::new(),
        })
    }

    /// Returns the same node with `filters` appended to its own filters
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = F>) -> Self {
        match &mut self {
            Operator::AccessPlan(plan) => plan.filters.extend(filters),
            Operator::Join(join) => join.filters.extend(filters),
        }
        self
    }

    pub fn filters(&self) -> &[F] {
        match self {
            Operator::AccessPlan(plan) => &plan.filters,
            Operator::Join(join) => &join.filters,
        }
    }

    /// Number of access-plan leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            Operator::AccessPlan(_) => 1,
            Operator::Join(join) => join.left.leaf_count() + join.right.leaf_count(),
        }
    }

    /// Number of join nodes
    pub fn join_count(&self) -> usize {
        match self {
            Operator::AccessPlan(_) => 0,
            Operator::Join(join) => 1 + join.left.join_count() + join.right.join_count(),
        }
    }
}
