/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::config::{EstimatorKind, OptimizerConfig, Strategy};
use super::dynamic::DynamicProgrammingOptimizer;
use super::federated_model::FederatedQueryModel;
use super::greedy::PatternOrderOptimizer;
use super::Optimizer;
use crate::adapter::{ModelAdapter, RemoteExecutor, SparqlAdapter};
use crate::cardinality::{
    CachedEstimator, CardinalityCache, CardinalityEstimator, ExactCountEstimator, FallbackEstimator,
    StatisticsEstimator,
};
use crate::cost::CostCalculator;
use crate::error::{FederationError, FederationResult};
use crate::source_selection::{SourceGroups, SourceSelector, StatisticsProvider};
use log::info;
use shared::{FilterExpression, TriplePattern};
use std::sync::Arc;

type Estimator = Arc<dyn CardinalityEstimator<TriplePattern, FilterExpression>>;

/// Builds selectors, query models and optimizers from one configuration
pub struct OptimizerFactory {
    config: OptimizerConfig,
    provider: Arc<dyn StatisticsProvider>,
    adapter: Arc<dyn ModelAdapter<TriplePattern, FilterExpression>>,
    executor: Option<Arc<dyn RemoteExecutor>>,
}

impl OptimizerFactory {
    pub fn new(config: OptimizerConfig, provider: Arc<dyn StatisticsProvider>) -> Self {
        Self {
            config,
            provider,
            adapter: Arc::new(SparqlAdapter),
            executor: None,
        }
    }

    /// Remote executor used by exact counting
    pub fn with_executor(mut self, executor: Arc<dyn RemoteExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ModelAdapter<TriplePattern, FilterExpression>>) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn source_selector(&self) -> SourceSelector {
        SourceSelector::new(
            self.provider.clone(),
            self.config.handle_type,
            self.config.handle_same_as,
        )
    }

    pub fn query_model(
        &self,
        groups: &SourceGroups,
        filters: &[FilterExpression],
    ) -> FederationResult<FederatedQueryModel> {
        Ok(FederatedQueryModel::new(groups, filters)?
            .with_join_algorithms(self.config.join_algorithms.clone())
            .with_cartesian_products(self.config.allow_cartesian))
    }

    /// The configured estimator. With caching enabled every call starts a
    /// fresh cache, so one cache lives as long as one optimizer.
    pub fn estimator(&self) -> FederationResult<Estimator> {
        let statistics: Estimator = Arc::new(StatisticsEstimator::new(self.provider.clone()));

        let estimator: Estimator = match self.config.estimator {
            EstimatorKind::Statistics => statistics,
            EstimatorKind::ExactCount => {
                let executor = self.executor.clone().ok_or_else(|| {
                    FederationError::Config("exact counting needs a remote executor".to_string())
                })?;
                let exact: Estimator = Arc::new(ExactCountEstimator::new(self.adapter.clone(), executor));
                Arc::new(FallbackEstimator::new(exact, statistics))
            }
        };

        if !self.config.use_cache {
            return Ok(estimator);
        }
        let cache = Arc::new(CardinalityCache::new(self.adapter.clone()));
        Ok(Arc::new(CachedEstimator::new(cache, estimator)))
    }

    pub fn cost_calculator(&self) -> FederationResult<CostCalculator<TriplePattern, FilterExpression>> {
        Ok(CostCalculator::new(
            self.estimator()?,
            Arc::new(self.config.cost_model),
        ))
    }

    /// Optimizer for a query with `relations` base relations
    pub fn create(
        &self,
        relations: usize,
    ) -> FederationResult<Box<dyn Optimizer<TriplePattern, FilterExpression>>> {
        self.config.validate()?;
        let calculator = self.cost_calculator()?;
        let strategy = self.config.resolve_strategy(relations);
        info!("Using {:?} join ordering for {} relation(s)", strategy, relations);

        let optimizer: Box<dyn Optimizer<TriplePattern, FilterExpression>> = match strategy {
            Strategy::DynamicProgramming => Box::new(DynamicProgrammingOptimizer::new(calculator)),
            Strategy::Greedy | Strategy::Auto => Box::new(PatternOrderOptimizer::new(calculator)),
        };
        Ok(optimizer)
    }
}
