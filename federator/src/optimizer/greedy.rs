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
use log::{debug, trace};
use rayon::prelude::*;
use std::slice;

/// Greedy join ordering.
///
/// Access plans are ranked by their own cost. The cheapest one becomes the
/// root, then the root is repeatedly joined with the cheapest remaining plan
/// the model accepts as a partner. If one full pass over the remaining plans
/// finds no partner, the search stops with
/// [`FederationError::PlanIncomplete`].
pub struct PatternOrderOptimizer<P, F> {
    calculator: CostCalculator<P, F>,
}

impl<P, F> PatternOrderOptimizer<P, F>
where
    P: Clone + Send + Sync,
    F: Clone + Send + Sync,
{
    pub fn new(calculator: CostCalculator<P, F>) -> Self {
        Self { calculator }
    }

    /// Access plans paired with their cost, cheapest first
    fn ranked_plans(&self, plans: Vec<Operator<P, F>>) -> FederationResult<Vec<Operator<P, F>>> {
        let costs = plans
            .par_iter()
            .map(|plan| self.calculator.cost(plan))
            .collect::<FederationResult<Vec<f64>>>()?;

        let mut ranked: Vec<(f64, Operator<P, F>)> = costs.into_iter().zip(plans).collect();
        // Stable sort keeps the model's order among equal costs
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        trace!("Access plan costs: {:?}", ranked.iter().map(|(c, _)| *c).collect::<Vec<_>>());
        Ok(ranked.into_iter().map(|(_, plan)| plan).collect())
    }
}

impl<P, F> Optimizer<P, F> for PatternOrderOptimizer<P, F>
where
    P: Clone + Send + Sync,
    F: Clone + Send + Sync,
{
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn optimize(&self, model: &mut dyn QueryModel<P, F>) -> FederationResult<()> {
        let mut pool = self.ranked_plans(model.create_access_plans())?;
        if pool.is_empty() {
            return Err(FederationError::EmptyQuery);
        }

        let mut root = pool.remove(0);
        while !pool.is_empty() {
            let mut joined = None;
            for (index, candidate) in pool.iter().enumerate() {
                if let Some(join) = model
                    .create_joins(&root, slice::from_ref(candidate))
                    .into_iter()
                    .next()
                {
                    joined = Some((index, join));
                    break;
                }
            }

            match joined {
                Some((index, join)) => {
                    pool.remove(index);
                    root = join;
                }
                None => {
                    debug!("No remaining access plan joins with the current root");
                    return Err(FederationError::PlanIncomplete {
                        remaining: pool.len(),
                    });
                }
            }
        }

        debug!("Greedy plan with {} join(s)", root.join_count());
        model.replace_root(root);
        Ok(())
    }
}
