/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Join-order optimization for queries federated over several sources.
//!
//! Source selection maps every triple pattern to the sources able to answer
//! it, a [`optimizer::FederatedQueryModel`] turns the result into access
//! plans, and a greedy or dynamic-programming [`optimizer::Optimizer`]
//! combines them into one binary join tree, costed through a
//! [`cost::CostCalculator`].

pub mod adapter;
pub mod cardinality;
pub mod cost;
pub mod error;
pub mod operators;
pub mod optimizer;
pub mod source_selection;

pub use error::{FederationError, FederationResult};
