/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RDF_TYPE: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>";
pub const OWL_SAME_AS: &str = "<http://www.w3.org/2002/07/owl#sameAs>";

/// A position of a triple pattern. Constants keep their N-Triples surface
/// form (`<iri>` or `"literal"`), variables keep their leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(String),
    Constant(String),
}

pub type TriplePattern = (Term, Term, Term);

impl Term {
    pub fn variable(name: &str) -> Self {
        if name.starts_with('?') {
            Term::Variable(name.to_string())
        } else {
            Term::Variable(format!("?{}", name))
        }
    }

    pub fn iri(iri: &str) -> Self {
        if iri.starts_with('<') {
            Term::Constant(iri.to_string())
        } else {
            Term::Constant(format!("<{}>", iri))
        }
    }

    /// Plain literal, with `\` and `"` escaped as in N-Triples
    pub fn literal(value: &str) -> Self {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        Term::Constant(format!("\"{}\"", escaped))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Returns the bound value, or `None` for a variable
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Term::Constant(value) => Some(value),
            Term::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Constant(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) | Term::Constant(name) => f.write_str(name),
        }
    }
}

/// Accessors over the `(subject, predicate, object)` tuple
pub trait PatternTerms {
    fn subject(&self) -> &Term;
    fn predicate(&self) -> &Term;
    fn object(&self) -> &Term;

    fn terms(&self) -> [&Term; 3] {
        [self.subject(), self.predicate(), self.object()]
    }

    /// Variables in subject, predicate, object order, without duplicates
    fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::with_capacity(3);
        for term in self.terms() {
            if let Some(var) = term.as_variable() {
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
        }
        vars
    }

    /// Bound values in subject, predicate, object order
    fn constants(&self) -> Vec<&str> {
        self.terms()
            .into_iter()
            .filter_map(Term::as_constant)
            .collect()
    }

    fn bound_count(&self) -> usize {
        self.terms().iter().filter(|term| !term.is_var()).count()
    }
}

impl PatternTerms for TriplePattern {
    fn subject(&self) -> &Term {
        &self.0
    }

    fn predicate(&self) -> &Term {
        &self.1
    }

    fn object(&self) -> &Term {
        &self.2
    }
}
