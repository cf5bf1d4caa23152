/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::query_model::QueryModel;
use crate::error::{FederationError, FederationResult};
use crate::operators::{collect_patterns, collect_sources, JoinAlgorithm, JoinExecution, Operator};
use crate::source_selection::SourceGroups;
use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use shared::{FilterExpression, PatternTerms, TriplePattern};
use std::collections::BTreeSet;

type Plan = Operator<TriplePattern, FilterExpression>;

/// Query model over source-selected triple patterns.
///
/// Each distinct pattern becomes one access plan answered by its candidate
/// sources. A filter is attached to the first access plan binding all of its
/// variables; the others wait for the lowest join whose inputs together bind
/// them.
pub struct FederatedQueryModel {
    access_plans: Vec<Plan>,
    relation_index: FxHashMap<TriplePattern, usize>,
    join_filters: Vec<FilterExpression>,
    join_algorithms: Vec<JoinAlgorithm>,
    allow_cartesian: bool,
    root: Option<Plan>,
}

fn plan_variables(plan: &Plan) -> BTreeSet<String> {
    collect_patterns(plan)
        .iter()
        .flat_map(|pattern| pattern.variables().into_iter().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

fn binds_all(bound: &BTreeSet<String>, filter: &FilterExpression) -> bool {
    filter.variables().into_iter().all(|var| bound.contains(var))
}

impl FederatedQueryModel {
    /// Builds the model from the groups of a source selection.
    ///
    /// Fails with [`FederationError::EmptyQuery`] when the groups hold no
    /// pattern, and with [`FederationError::Unsupported`] for a filter over
    /// a variable no pattern binds.
    pub fn new(groups: &SourceGroups, filters: &[FilterExpression]) -> FederationResult<Self> {
        let mut access_plans: Vec<Plan> = Vec::new();
        let mut relation_index = FxHashMap::default();

        for (sources, patterns) in groups {
            for pattern in patterns {
                if relation_index.contains_key(pattern) {
                    debug!("Folding duplicate pattern {:?}", pattern);
                    continue;
                }
                relation_index.insert(pattern.clone(), access_plans.len());
                access_plans.push(Operator::access_plan(pattern.clone(), sources.clone()));
            }
        }

        if access_plans.is_empty() {
            return Err(FederationError::EmptyQuery);
        }

        let leaf_variables: Vec<BTreeSet<String>> = access_plans.iter().map(plan_variables).collect();
        let all_variables: BTreeSet<String> = leaf_variables.iter().flatten().cloned().collect();

        let mut join_filters = Vec::new();
        for filter in filters {
            if !binds_all(&all_variables, filter) {
                return Err(FederationError::Unsupported(format!(
                    "filter {} uses a variable no pattern binds",
                    filter
                )));
            }

            let leaf = leaf_variables
                .iter()
                .position(|vars| binds_all(vars, filter));
            match leaf {
                Some(index) => {
                    if let Operator::AccessPlan(plan) = &mut access_plans[index] {
                        plan.filters.push(filter.clone());
                    }
                }
                None => join_filters.push(filter.clone()),
            }
        }

        debug!(
            "Query model: {} access plan(s), {} join filter(s)",
            access_plans.len(),
            join_filters.len()
        );

        Ok(Self {
            access_plans,
            relation_index,
            join_filters,
            join_algorithms: vec![JoinAlgorithm::HashJoin],
            allow_cartesian: false,
            root: None,
        })
    }

    /// Algorithms offered for every feasible join, in preference order
    pub fn with_join_algorithms(mut self, algorithms: Vec<JoinAlgorithm>) -> Self {
        if !algorithms.is_empty() {
            self.join_algorithms = algorithms;
        }
        self
    }

    /// Whether inputs without a shared variable may still be joined
    pub fn with_cartesian_products(mut self, allow: bool) -> Self {
        self.allow_cartesian = allow;
        self
    }

    fn filters_for(&self, left: &BTreeSet<String>, right: &BTreeSet<String>) -> Vec<FilterExpression> {
        let combined: BTreeSet<String> = left.union(right).cloned().collect();
        self.join_filters
            .iter()
            .filter(|filter| {
                binds_all(&combined, filter) && !binds_all(left, filter) && !binds_all(right, filter)
            })
            .cloned()
            .collect()
    }

    fn single_shared_source(left: &Plan, right: &Plan) -> bool {
        let left_sources = collect_sources(left);
        left_sources.len() == 1 && left_sources == collect_sources(right)
    }
}

impl QueryModel<TriplePattern, FilterExpression> for FederatedQueryModel {
    fn create_access_plans(&self) -> Vec<Plan> {
        self.access_plans.clone()
    }

    fn create_joins(&self, left: &Plan, candidates: &[Plan]) -> Vec<Plan> {
        let left_relations = self.relations(left);
        let left_variables = plan_variables(left);
        let mut joins = Vec::new();

        for right in candidates {
            if !left_relations.is_disjoint(&self.relations(right)) {
                continue;
            }

            let right_variables = plan_variables(right);
            if !self.allow_cartesian && left_variables.is_disjoint(&right_variables) {
                trace!("No shared variable, skipping candidate");
                continue;
            }

            let filters = self.filters_for(&left_variables, &right_variables);
            if Self::single_shared_source(left, right) {
                joins.push(
                    Operator::join(
                        left.clone(),
                        right.clone(),
                        JoinExecution::Remote,
                        self.join_algorithms[0],
                    )
                    .with_filters(filters.iter().cloned()),
                );
            }
            for algorithm in &self.join_algorithms {
                joins.push(
                    Operator::join(left.clone(), right.clone(), JoinExecution::Local, *algorithm)
                        .with_filters(filters.iter().cloned()),
                );
            }
        }

        joins
    }

    fn group_equivalent_plans(&self, plans: Vec<Plan>) -> Vec<Vec<Plan>> {
        let mut positions: FxHashMap<BTreeSet<usize>, usize> = FxHashMap::default();
        let mut groups: Vec<Vec<Plan>> = Vec::new();

        for plan in plans {
            let relations = self.relations(&plan);
            match positions.get(&relations) {
                Some(&index) => groups[index].push(plan),
                None => {
                    positions.insert(relations, groups.len());
                    groups.push(vec![plan]);
                }
            }
        }

        groups
    }

    fn filter_distinct_plans(&self, plans: Vec<Plan>) -> Vec<Plan> {
        let mut seen: FxHashSet<&Plan> = FxHashSet::default();
        let first: Vec<bool> = plans.iter().map(|plan| seen.insert(plan)).collect();
        drop(seen);

        plans
            .into_iter()
            .zip(first)
            .filter_map(|(plan, first)| first.then_some(plan))
            .collect()
    }

    fn base_relation_count(&self) -> usize {
        self.access_plans.len()
    }

    fn relations(&self, plan: &Plan) -> BTreeSet<usize> {
        collect_patterns(plan)
            .iter()
            .filter_map(|pattern| self.relation_index.get(pattern).copied())
            .collect()
    }

    fn root(&self) -> Option<&Plan> {
        self.root.as_ref()
    }

    fn replace_root(&mut self, root: Plan) {
        self.root = Some(root);
    }
}
