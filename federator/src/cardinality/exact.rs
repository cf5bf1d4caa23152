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
use crate::adapter::{ModelAdapter, RemoteExecutor};
use crate::error::{FederationError, FederationResult};
use crate::operators::{collect_sources, Operator, QueryRenderer};
use log::debug;
use std::sync::Arc;

/// Counts the distinct results of a subtree at its single source
pub struct ExactCountEstimator<P, F> {
    adapter: Arc<dyn ModelAdapter<P, F>>,
    executor: Arc<dyn RemoteExecutor>,
}

impl<P, F> ExactCountEstimator<P, F> {
    pub fn new(adapter: Arc<dyn ModelAdapter<P, F>>, executor: Arc<dyn RemoteExecutor>) -> Self {
        Self { adapter, executor }
    }
}

impl<P, F> CardinalityEstimator<P, F> for ExactCountEstimator<P, F> {
    /// Only subtrees answered by exactly one source can be counted;
    /// anything else is [`FederationError::Unsupported`]. Transport errors
    /// are returned unchanged.
    fn estimate(&self, operator: &Operator<P, F>) -> FederationResult<f64> {
        let sources = collect_sources(operator);
        let mut iter = sources.iter();
        let source = match (iter.next(), iter.next()) {
            (Some(source), None) => source,
            _ => {
                return Err(FederationError::Unsupported(format!(
                    "exact count needs a subtree bound to one source, found {}",
                    sources.len()
                )))
            }
        };

        let query = QueryRenderer::new(self.adapter.as_ref()).render_select_distinct(operator);
        debug!("Counting at {}: {}", source, query);
        let count = self.executor.result_row_count(source, &query)?;
        Ok(count as f64)
    }
}
