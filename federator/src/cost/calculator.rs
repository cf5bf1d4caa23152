/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::model::CostModel;
use crate::cardinality::CardinalityEstimator;
use crate::error::FederationResult;
use crate::operators::{AccessPlan, Join, Operator, OperatorFold};
use std::sync::Arc;

/// Folds an operator tree into its total cost.
///
/// An access plan costs `scan_cost(estimate(plan))`. A join costs
/// `join_cost(estimate(left), estimate(right))` plus the cost of both
/// children. The result depends only on the tree, the estimator and the
/// cost model.
pub struct CostCalculator<P, F> {
    estimator: Arc<dyn CardinalityEstimator<P, F>>,
    model: Arc<dyn CostModel>,
}

struct CostFold<'a, P, F> {
    estimator: &'a dyn CardinalityEstimator<P, F>,
    model: &'a dyn CostModel,
}

impl<P: Clone, F: Clone> OperatorFold<P, F> for CostFold<'_, P, F> {
    type Output = FederationResult<f64>;

    fn fold_access_plan(&mut self, plan: &AccessPlan<P, F>) -> Self::Output {
        let leaf = Operator::AccessPlan(plan.clone());
        Ok(self.model.scan_cost(self.estimator.estimate(&leaf)?))
    }

    fn fold_join(&mut self, join: &Join<P, F>, left: Self::Output, right: Self::Output) -> Self::Output {
        let (left_cost, right_cost) = (left?, right?);
        let left_cardinality = self.estimator.estimate(&join.left)?;
        let right_cardinality = self.estimator.estimate(&join.right)?;
        Ok(self.model.join_cost(left_cardinality, right_cardinality) + left_cost + right_cost)
    }
}

impl<P: Clone, F: Clone> CostCalculator<P, F> {
    pub fn new(estimator: Arc<dyn CardinalityEstimator<P, F>>, model: Arc<dyn CostModel>) -> Self {
        Self { estimator, model }
    }

    pub fn cost(&self, operator: &Operator<P, F>) -> FederationResult<f64> {
        operator.fold(&mut CostFold {
            estimator: self.estimator.as_ref(),
            model: self.model.as_ref(),
        })
    }
}

impl<P, F> Clone for CostCalculator<P, F> {
    fn clone(&self) -> Self {
        Self {
            estimator: Arc::clone(&self.estimator),
            model: Arc::clone(&self.model),
        }
    }
}
