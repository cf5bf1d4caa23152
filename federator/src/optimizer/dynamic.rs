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
use super::Optimizer;
use crate::cost::CostCalculator;
use crate::error::{FederationError, FederationResult};
use crate::operators::Operator;
use log::debug;
use std::slice;

/// Largest number of base relations the exhaustive search accepts.
///
/// Work grows with the 3^n subset splits; past ten relations a run takes
/// seconds to minutes and the greedy search is the practical choice.
pub const MAX_DP_RELATIONS: usize = 10;

/// Exhaustive bushy join enumeration over relation subsets.
///
/// `best[mask]` holds the cheapest plan covering exactly the base relations
/// in `mask`. Subsets are filled by increasing size, each from every split
/// into two already solved subsets.
pub struct DynamicProgrammingOptimizer<P, F> {
    calculator: CostCalculator<P, F>,
}

struct Entry<P, F> {
    plan: Operator<P, F>,
    cost: f64,
}

fn mask_of<P, F>(model: &dyn QueryModel<P, F>, plan: &Operator<P, F>) -> usize {
    model
        .relations(plan)
        .into_iter()
        .fold(0usize, |mask, relation| mask | (1 << relation))
}

/// Joins of every split of `mask` into two solved, non-empty halves
fn join_candidates<P, F>(
    model: &dyn QueryModel<P, F>,
    best: &[Option<Entry<P, F>>],
    mask: usize,
) -> Vec<Operator<P, F>> {
    let mut candidates = Vec::new();
    let mut left_mask = (mask - 1) & mask;
    while left_mask > 0 {
        let right_mask = mask ^ left_mask;
        if let (Some(left), Some(right)) = (&best[left_mask], &best[right_mask]) {
            candidates.extend(model.create_joins(&left.plan, slice::from_ref(&right.plan)));
        }
        left_mask = (left_mask - 1) & mask;
    }
    candidates
}

impl<P: Clone, F: Clone> DynamicProgrammingOptimizer<P, F> {
    pub fn new(calculator: CostCalculator<P, F>) -> Self {
        Self { calculator }
    }

    /// Groups candidates by covered relations, drops duplicates and keeps
    /// the cheapest plan of every group
    fn keep_cheapest(
        &self,
        model: &dyn QueryModel<P, F>,
        candidates: Vec<Operator<P, F>>,
        best: &mut [Option<Entry<P, F>>],
    ) -> FederationResult<()> {
        for group in model.group_equivalent_plans(candidates) {
            for plan in model.filter_distinct_plans(group) {
                let mask = mask_of(model, &plan);
                let cost = self.calculator.cost(&plan)?;
                let better = match &best[mask] {
                    Some(entry) => cost < entry.cost,
                    None => true,
                };
                if better {
                    best[mask] = Some(Entry { plan, cost });
                }
            }
        }
        Ok(())
    }
}

impl<P: Clone, F: Clone> Optimizer<P, F> for DynamicProgrammingOptimizer<P, F> {
    fn name(&self) -> &'static str {
        "dynamic-programming"
    }

    fn optimize(&self, model: &mut dyn QueryModel<P, F>) -> FederationResult<()> {
        let n = model.base_relation_count();
        if n == 0 {
            return Err(FederationError::EmptyQuery);
        }
        if n > MAX_DP_RELATIONS {
            return Err(FederationError::Config(format!(
                "dynamic programming supports at most {} relations, query has {}",
                MAX_DP_RELATIONS, n
            )));
        }

        let full = (1usize << n) - 1;
        let mut best: Vec<Option<Entry<P, F>>> = Vec::with_capacity(full + 1);
        best.resize_with(full + 1, || None);

        self.keep_cheapest(&*model, model.create_access_plans(), &mut best)?;

        for subset_size in 2..=n {
            for mask in 1..=full {
                if mask.count_ones() as usize != subset_size {
                    continue;
                }
                // Same-size subsets never split into each other, so each
                // target is settled before the next one reads the table
                let candidates = join_candidates(&*model, &best, mask);
                if !candidates.is_empty() {
                    self.keep_cheapest(&*model, candidates, &mut best)?;
                }
            }
        }

        match best[full].take() {
            Some(entry) => {
                debug!("Dynamic programming plan, cost {:.2}", entry.cost);
                model.replace_root(entry.plan);
                Ok(())
            }
            None => {
                let covered = (1..full)
                    .filter(|&mask| best[mask].is_some())
                    .map(|mask| mask.count_ones() as usize)
                    .max()
                    .unwrap_or(0);
                Err(FederationError::PlanIncomplete {
                    remaining: n - covered,
                })
            }
        }
    }
}
