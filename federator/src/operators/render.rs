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
use crate::adapter::ModelAdapter;

/// Renders an operator subtree as the body of a query group.
///
/// Every call builds its own buffer, so one renderer can serve any number
/// of concurrent callers.
pub struct QueryRenderer<'a, P, F> {
    adapter: &'a dyn ModelAdapter<P, F>,
}

struct RenderContext<'a, P, F> {
    adapter: &'a dyn ModelAdapter<P, F>,
    buffer: String,
}

impl<P, F> OperatorVisitor<P, F> for RenderContext<'_, P, F> {
    fn visit_access_plan(&mut self, plan: &AccessPlan<P, F>) {
        self.push(self.adapter.pattern_to_query_fragment(&plan.pattern));
        for filter in &plan.filters {
            self.push(self.adapter.filter_to_query_fragment(filter));
        }
    }

    fn visit_filters(&mut self, filters: &[F]) {
        for filter in filters {
            self.push(self.adapter.filter_to_query_fragment(filter));
        }
    }
}

impl<P, F> RenderContext<'_, P, F> {
    fn push(&mut self, fragment: String) {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(&fragment);
    }
}

impl<'a, P, F> QueryRenderer<'a, P, F> {
    pub fn new(adapter: &'a dyn ModelAdapter<P, F>) -> Self {
        Self { adapter }
    }

    /// Patterns and filters of the subtree, without surrounding braces
    pub fn render_group(&self, operator: &Operator<P, F>) -> String {
        let mut context = RenderContext {
            adapter: self.adapter,
            buffer: String::new(),
        };
        operator.accept(&mut context);
        context.buffer
    }

    /// `SELECT DISTINCT * WHERE { ... }` over the subtree
    pub fn render_select_distinct(&self, operator: &Operator<P, F>) -> String {
        format!("SELECT DISTINCT * WHERE {{ {} }}", self.render_group(operator))
    }
}
