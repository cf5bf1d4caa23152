/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::operators::Operator;
use std::collections::BTreeSet;

/// Search space of one query, as seen by the join-ordering strategies.
///
/// The model owns the initial access plans and decides which joins are
/// feasible. Strategies only combine what the model hands out and report
/// their result through [`QueryModel::replace_root`].
pub trait QueryModel<P, F> {
    /// The initial access plans, one per base relation
    fn create_access_plans(&self) -> Vec<Operator<P, F>>;

    /// Feasible joins of `left` with any of `candidates`.
    ///
    /// An empty result means no candidate can be joined with `left`.
    fn create_joins(&self, left: &Operator<P, F>, candidates: &[Operator<P, F>]) -> Vec<Operator<P, F>>;

    /// Partitions `plans` into groups producing the same result
    fn group_equivalent_plans(&self, plans: Vec<Operator<P, F>>) -> Vec<Vec<Operator<P, F>>>;

    /// Drops plans that duplicate an earlier one
    fn filter_distinct_plans(&self, plans: Vec<Operator<P, F>>) -> Vec<Operator<P, F>>;

    fn base_relation_count(&self) -> usize;

    /// Indices of the base relations covered by `plan`
    fn relations(&self, plan: &Operator<P, F>) -> BTreeSet<usize>;

    fn root(&self) -> Option<&Operator<P, F>>;

    fn replace_root(&mut self, root: Operator<P, F>);
}
