/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::dynamic::MAX_DP_RELATIONS;
use crate::cost::SimpleCostModel;
use crate::error::{FederationError, FederationResult};
use crate::operators::JoinAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Join-ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Greedy,
    DynamicProgramming,
    /// Dynamic programming up to `dp_relation_limit` relations, greedy above
    Auto,
}

/// Source of cardinality estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    Statistics,
    /// Remote counting, statistics where a count is not possible
    ExactCount,
}

/// Optimizer settings, every field optional in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub strategy: Strategy,
    pub dp_relation_limit: usize,
    pub estimator: EstimatorKind,
    pub use_cache: bool,
    pub cost_model: SimpleCostModel,
    pub join_algorithms: Vec<JoinAlgorithm>,
    pub allow_cartesian: bool,
    pub handle_type: bool,
    pub handle_same_as: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            dp_relation_limit: 8,
            estimator: EstimatorKind::Statistics,
            use_cache: true,
            cost_model: SimpleCostModel::default(),
            join_algorithms: vec![JoinAlgorithm::HashJoin],
            allow_cartesian: false,
            handle_type: true,
            handle_same_as: true,
        }
    }
}

impl OptimizerConfig {
    pub fn from_json_str(json: &str) -> FederationResult<Self> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<Q: AsRef<Path>>(path: Q) -> FederationResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> FederationResult<()> {
        if self.join_algorithms.is_empty() {
            return Err(FederationError::Config(
                "at least one join algorithm is required".to_string(),
            ));
        }
        if self.dp_relation_limit > MAX_DP_RELATIONS {
            return Err(FederationError::Config(format!(
                "dp_relation_limit {} exceeds {}",
                self.dp_relation_limit, MAX_DP_RELATIONS
            )));
        }
        let costs = [
            self.cost_model.cost_per_row_scan,
            self.cost_model.cost_per_row_pair,
        ];
        if costs.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(FederationError::Config(
                "cost constants must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Strategy to run for a query with `relations` base relations
    pub fn resolve_strategy(&self, relations: usize) -> Strategy {
        match self.strategy {
            Strategy::Auto if relations <= self.dp_relation_limit => Strategy::DynamicProgramming,
            Strategy::Auto => Strategy::Greedy,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(OptimizerConfig::from_json_str("{}").unwrap(), OptimizerConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = OptimizerConfig::from_json_str(
            r#"{
                "strategy": "greedy",
                "estimator": "exact_count",
                "join_algorithms": ["BindJoin", "HashJoin"],
                "cost_model": { "cost_per_row_pair": 0.5 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Greedy);
        assert_eq!(config.estimator, EstimatorKind::ExactCount);
        assert_eq!(config.join_algorithms, vec![JoinAlgorithm::BindJoin, JoinAlgorithm::HashJoin]);
        assert_eq!(config.cost_model.cost_per_row_pair, 0.5);
        assert_eq!(config.cost_model.cost_per_row_scan, 1.0);
        assert!(config.use_cache);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            OptimizerConfig::from_json_str(r#"{"join_algorithms": []}"#),
            Err(FederationError::Config(_))
        ));
        assert!(matches!(
            OptimizerConfig::from_json_str(r#"{"cost_model": {"cost_per_row_scan": -1.0}}"#),
            Err(FederationError::Config(_))
        ));
        assert!(matches!(
            OptimizerConfig::from_json_str(r#"{"strategy": "random"}"#),
            Err(FederationError::Json(_))
        ));
    }

    #[test]
    fn test_auto_strategy_resolution() {
        let config = OptimizerConfig::default();
        assert_eq!(config.resolve_strategy(8), Strategy::DynamicProgramming);
        assert_eq!(config.resolve_strategy(9), Strategy::Greedy);
    }

    #[test]
    fn test_dp_limit_above_exhaustive_ceiling_is_rejected() {
        let at_ceiling = format!(r#"{{"dp_relation_limit": {}}}"#, MAX_DP_RELATIONS);
        assert!(OptimizerConfig::from_json_str(&at_ceiling).is_ok());

        let above = format!(r#"{{"dp_relation_limit": {}}}"#, MAX_DP_RELATIONS + 1);
        assert!(matches!(
            OptimizerConfig::from_json_str(&above),
            Err(FederationError::Config(_))
        ));
        assert_eq!(MAX_DP_RELATIONS, 10);
    }
}
