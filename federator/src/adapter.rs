/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::FederationResult;
use shared::{FilterExpression, PatternTerms, Source, Term, TriplePattern};

/// One position of a pattern signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignatureTerm {
    Constant(String),
    Variable(String),
}

/// Bridges the optimizer to a concrete pattern/filter representation
pub trait ModelAdapter<P, F>: Send + Sync {
    /// Renders a pattern as a query-language fragment
    fn pattern_to_query_fragment(&self, pattern: &P) -> String;

    /// Renders a filter as a query-language fragment
    fn filter_to_query_fragment(&self, filter: &F) -> String;

    /// Bound terms of a pattern, in position order
    fn pattern_constants(&self, pattern: &P) -> Vec<String>;

    /// Cache signature of a pattern. Adapters that expose variable
    /// positions let the cache tell `?x p ?x` from `?x p ?y`; the default
    /// signature holds the constants only.
    fn pattern_signature(&self, pattern: &P) -> Vec<SignatureTerm> {
        self.pattern_constants(pattern)
            .into_iter()
            .map(SignatureTerm::Constant)
            .collect()
    }
}

/// Answers count queries against one remote source
pub trait RemoteExecutor: Send + Sync {
    /// Number of result rows `query` yields at `source`
    fn result_row_count(&self, source: &Source, query: &str) -> FederationResult<u64>;
}

/// SPARQL rendering of [`TriplePattern`] and [`FilterExpression`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SparqlAdapter;

impl ModelAdapter<TriplePattern, FilterExpression> for SparqlAdapter {
    fn pattern_to_query_fragment(&self, pattern: &TriplePattern) -> String {
        format!("{} {} {} .", pattern.0, pattern.1, pattern.2)
    }

    fn filter_to_query_fragment(&self, filter: &FilterExpression) -> String {
        format!("FILTER({})", filter)
    }

    fn pattern_constants(&self, pattern: &TriplePattern) -> Vec<String> {
        pattern.constants().into_iter().map(str::to_string).collect()
    }

    fn pattern_signature(&self, pattern: &TriplePattern) -> Vec<SignatureTerm> {
        pattern
            .terms()
            .into_iter()
            .map(|term| match term {
                Term::Constant(value) => SignatureTerm::Constant(value.clone()),
                Term::Variable(name) => SignatureTerm::Variable(name.clone()),
            })
            .collect()
    }
}
