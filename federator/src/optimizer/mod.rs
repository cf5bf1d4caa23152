/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod config;
pub mod dynamic;
pub mod factory;
pub mod federated_model;
pub mod greedy;
pub mod query_model;

pub use config::{EstimatorKind, OptimizerConfig, Strategy};
pub use dynamic::{DynamicProgrammingOptimizer, MAX_DP_RELATIONS};
pub use factory::OptimizerFactory;
pub use federated_model::FederatedQueryModel;
pub use greedy::PatternOrderOptimizer;
pub use query_model::QueryModel;

use crate::error::FederationResult;

/// Join-ordering strategy working only through a [`QueryModel`]
pub trait Optimizer<P, F> {
    fn name(&self) -> &'static str;

    /// Searches a join tree covering every base relation and installs it as
    /// the model's root
    fn optimize(&self, model: &mut dyn QueryModel<P, F>) -> FederationResult<()>;
}
