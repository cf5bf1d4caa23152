/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::estimator::CardinalityEstimator;
use crate::error::FederationResult;
use crate::operators::Operator;
use log::warn;
use std::sync::Arc;

/// Uses `primary` and substitutes `fallback` when the primary cannot answer.
///
/// Only unsupported subtrees and remote failures are substituted; every
/// other error still aborts the estimation.
pub struct FallbackEstimator<P, F> {
    primary: Arc<dyn CardinalityEstimator<P, F>>,
    fallback: Arc<dyn CardinalityEstimator<P, F>>,
}

impl<P, F> FallbackEstimator<P, F> {
    pub fn new(
        primary: Arc<dyn CardinalityEstimator<P, F>>,
        fallback: Arc<dyn CardinalityEstimator<P, F>>,
    ) -> Self {
        Self { primary, fallback }
    }
}

impl<P, F> CardinalityEstimator<P, F> for FallbackEstimator<P, F> {
    fn estimate(&self, operator: &Operator<P, F>) -> FederationResult<f64> {
        match self.primary.estimate(operator) {
            Err(e) if e.is_recoverable_estimate() => {
                warn!("Falling back to statistics estimate: {}", e);
                self.fallback.estimate(operator)
            }
            result => result,
        }
    }
}
