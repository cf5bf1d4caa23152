/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

/// Converts cardinalities into comparable cost units
pub trait CostModel: Send + Sync {
    /// Cost of reading `cardinality` rows from a source
    fn scan_cost(&self, cardinality: f64) -> f64;

    /// Incremental cost of combining two inputs of the given sizes
    fn join_cost(&self, left_cardinality: f64, right_cardinality: f64) -> f64;
}

/// Cost estimation constants
pub struct CostConstants;

impl CostConstants {
    pub const COST_PER_ROW_SCAN: f64 = 1.0;
    pub const COST_PER_ROW_PAIR: f64 = 0.01;
}

/// Linear scans and a nested-loop shaped join
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleCostModel {
    pub cost_per_row_scan: f64,
    pub cost_per_row_pair: f64,
}

impl Default for SimpleCostModel {
    fn default() -> Self {
        Self {
            cost_per_row_scan: CostConstants::COST_PER_ROW_SCAN,
            cost_per_row_pair: CostConstants::COST_PER_ROW_PAIR,
        }
    }
}

impl CostModel for SimpleCostModel {
    fn scan_cost(&self, cardinality: f64) -> f64 {
        cardinality * self.cost_per_row_scan
    }

    fn join_cost(&self, left_cardinality: f64, right_cardinality: f64) -> f64 {
        self.cost_per_row_pair * left_cardinality * right_cardinality
    }
}
