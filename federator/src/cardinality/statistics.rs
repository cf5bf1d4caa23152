/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::estimator::CardinalityEstimator;
use crate::error::FederationResult;
use crate::operators::{AccessPlan, Join, Operator, OperatorFold};
use crate::source_selection::StatisticsProvider;
use shared::terms::RDF_TYPE;
use shared::{FilterExpression, PatternTerms, Source, Term, TriplePattern};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Selectivity constants used where statistics say nothing
pub struct SelectivityConstants;

impl SelectivityConstants {
    pub const EQUALITY: f64 = 0.05;
    pub const INEQUALITY: f64 = 0.95;
    pub const RANGE: f64 = 0.25;
    pub const UNKNOWN: f64 = 1.0;
}

/// Cardinality estimation from VoID statistics, without remote calls
pub struct StatisticsEstimator {
    provider: Arc<dyn StatisticsProvider>,
}

/// Intermediate value of the estimation fold
struct Estimate {
    cardinality: f64,
    variables: BTreeSet<String>,
}

struct EstimationFold<'a> {
    provider: &'a dyn StatisticsProvider,
}

impl StatisticsEstimator {
    /// Creates a new estimator over the given statistics
    pub fn new(provider: Arc<dyn StatisticsProvider>) -> Self {
        Self { provider }
    }

    /// Estimated matches of `pattern` at one source
    pub fn pattern_cardinality(&self, source: &Source, pattern: &TriplePattern) -> f64 {
        pattern_cardinality(self.provider.as_ref(), source, pattern)
    }

    /// Estimates the selectivity of a filter
    pub fn filter_selectivity(filter: &FilterExpression) -> f64 {
        match filter {
            FilterExpression::Comparison(_, op, _) => match op.as_str() {
                "=" => SelectivityConstants::EQUALITY,
                "!=" => SelectivityConstants::INEQUALITY,
                ">" | "<" | ">=" | "<=" => SelectivityConstants::RANGE,
                _ => SelectivityConstants::UNKNOWN,
            },
            FilterExpression::And(left, right) => {
                Self::filter_selectivity(left) * Self::filter_selectivity(right)
            }
            FilterExpression::Or(left, right) => {
                let l = Self::filter_selectivity(left);
                let r = Self::filter_selectivity(right);
                l + r - l * r
            }
            FilterExpression::Not(inner) => 1.0 - Self::filter_selectivity(inner),
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

fn pattern_cardinality(provider: &dyn StatisticsProvider, source: &Source, pattern: &TriplePattern) -> f64 {
    let subject_bound = !pattern.subject().is_var();
    let object = pattern.object().as_constant();

    match pattern.predicate() {
        Term::Constant(predicate) if predicate == RDF_TYPE && object.is_some() => {
            let instances = object
                .map(|class| provider.type_cardinality(source, class))
                .unwrap_or(0) as f64;
            if subject_bound {
                instances.min(1.0)
            } else {
                instances
            }
        }
        Term::Constant(predicate) => {
            let mut cardinality = provider.predicate_cardinality(source, predicate) as f64;
            if subject_bound {
                cardinality = cardinality
                    / provider.distinct_subjects(source, Some(predicate.as_str())).max(1) as f64;
            }
            if object.is_some() {
                cardinality = cardinality
                    / provider.distinct_objects(source, Some(predicate.as_str())).max(1) as f64;
            }
            cardinality
        }
        Term::Variable(_) => {
            let size = provider.size(source);
            let mut cardinality = size as f64;
            if subject_bound {
                cardinality = ratio(size, provider.distinct_subjects(source, None));
            }
            if object.is_some() {
                cardinality /= provider.distinct_objects(source, None).max(1) as f64;
            }
            cardinality
        }
    }
}

impl OperatorFold<TriplePattern, FilterExpression> for EstimationFold<'_> {
    type Output = Estimate;

    fn fold_access_plan(&mut self, plan: &AccessPlan<TriplePattern, FilterExpression>) -> Estimate {
        let cardinality = plan
            .sources
            .iter()
            .map(|source| pattern_cardinality(self.provider, source, &plan.pattern))
            .sum();
        Estimate {
            cardinality,
            variables: plan.pattern.variables().into_iter().map(str::to_string).collect(),
        }
    }

    fn fold_join(
        &mut self,
        _join: &Join<TriplePattern, FilterExpression>,
        left: Estimate,
        right: Estimate,
    ) -> Estimate {
        let shared = left.variables.intersection(&right.variables).count();
        let product = left.cardinality * right.cardinality;
        let cardinality = if shared == 0 {
            product
        } else {
            // Each join variable divides by the larger input
            let larger = left.cardinality.max(right.cardinality).max(1.0);
            (product / larger.powi(shared as i32)).max(1.0)
        };

        let mut variables = left.variables;
        variables.extend(right.variables);
        Estimate {
            cardinality,
            variables,
        }
    }

    fn apply_filters(&mut self, mut result: Estimate, filters: &[FilterExpression]) -> Estimate {
        for filter in filters {
            result.cardinality *= StatisticsEstimator::filter_selectivity(filter);
        }
        result
    }
}

impl CardinalityEstimator<TriplePattern, FilterExpression> for StatisticsEstimator {
    fn estimate(&self, operator: &Operator<TriplePattern, FilterExpression>) -> FederationResult<f64> {
        let mut fold = EstimationFold {
            provider: self.provider.as_ref(),
        };
        Ok(operator.fold(&mut fold).cardinality)
    }
}
