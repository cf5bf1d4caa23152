/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::FederationResult;
use crate::operators::Operator;
use rayon::prelude::*;
use std::sync::Arc;

/// Estimates the number of result rows an operator produces
pub trait CardinalityEstimator<P, F>: Send + Sync {
    fn estimate(&self, operator: &Operator<P, F>) -> FederationResult<f64>;
}

impl<P, F, E> CardinalityEstimator<P, F> for Arc<E>
where
    E: CardinalityEstimator<P, F> + ?Sized,
{
    fn estimate(&self, operator: &Operator<P, F>) -> FederationResult<f64> {
        self.as_ref().estimate(operator)
    }
}

/// Estimates independent subtrees in parallel.
///
/// Results keep the order of `operators`. When the estimator is cached, all
/// workers share the one cache.
pub fn estimate_all<P, F, E>(
    estimator: &E,
    operators: &[&Operator<P, F>],
) -> Vec<FederationResult<f64>>
where
    P: Sync,
    F: Sync,
    E: CardinalityEstimator<P, F> + ?Sized,
{
    operators
        .par_iter()
        .map(|operator| estimator.estimate(operator))
        .collect()
}
