/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::operator::{AccessPlan, Operator};
use super::walker::OperatorVisitor;
use shared::Source;
use std::collections::BTreeSet;

/// Collects the patterns of all leaves, left to right
pub struct PatternCollector<P> {
    pub patterns: Vec<P>,
}

/// Collects every filter attached anywhere in the tree
pub struct FilterCollector<F> {
    pub filters: Vec<F>,
}

/// Collects the sources referenced by any leaf
#[derive(Default)]
pub struct SourceCollector {
    pub sources: BTreeSet<Source>,
}

impl<P> Default for PatternCollector<P> {
    fn default() -> Self {
        Self { patterns: Vec::new() }
    }
}

impl<F> Default for FilterCollector<F> {
    fn default() -> Self {
        Self { filters: Vec::new() }
    }
}

impl<P: Clone, F> OperatorVisitor<P, F> for PatternCollector<P> {
    fn visit_access_plan(&mut self, plan: &AccessPlan<P, F>) {
        self.patterns.push(plan.pattern.clone());
    }
}

impl<P, F: Clone> OperatorVisitor<P, F> for FilterCollector<F> {
    fn visit_access_plan(&mut self, plan: &AccessPlan<P, F>) {
        self.filters.extend(plan.filters.iter().cloned());
    }

    fn visit_filters(&mut self, filters: &[F]) {
        self.filters.extend(filters.iter().cloned());
    }
}

impl<P, F> OperatorVisitor<P, F> for SourceCollector {
    fn visit_access_plan(&mut self, plan: &AccessPlan<P, F>) {
        self.sources.extend(plan.sources.iter().cloned());
    }
}

pub fn collect_patterns<P: Clone, F>(operator: &Operator<P, F>) -> Vec<P> {
    let mut collector = PatternCollector::default();
    operator.accept(&mut collector);
    collector.patterns
}

pub fn collect_filters<P, F: Clone>(operator: &Operator<P, F>) -> Vec<F> {
    let mut collector = FilterCollector::default();
    operator.accept(&mut collector);
    collector.filters
}

pub fn collect_sources<P, F>(operator: &Operator<P, F>) -> BTreeSet<Source> {
    let mut collector = SourceCollector::default();
    operator.accept(&mut collector);
    collector.sources
}
