/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod collectors;
pub mod operator;
pub mod render;
pub mod walker;

pub use collectors::{collect_filters, collect_patterns, collect_sources};
pub use operator::{AccessPlan, Join, JoinAlgorithm, JoinExecution, Operator};
pub use render::QueryRenderer;
pub use walker::{OperatorFold, OperatorVisitor};
