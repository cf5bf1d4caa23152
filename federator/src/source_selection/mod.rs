/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod selector;
pub mod statistics;

pub use selector::{SourceGroups, SourceSelector};
pub use statistics::{PredicateStatistics, SourceStatistics, StatisticsProvider, VoidStatistics};
