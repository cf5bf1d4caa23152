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

/// FILTER expression attached to an access plan or a join
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterExpression {
    Comparison(String, String, String),
    And(Box<FilterExpression>, Box<FilterExpression>),
    Or(Box<FilterExpression>, Box<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    pub fn comparison(left: &str, operator: &str, right: &str) -> Self {
        FilterExpression::Comparison(left.to_string(), operator.to_string(), right.to_string())
    }

    /// Variables referenced anywhere in the expression, first occurrence order
    pub fn variables(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables<'a>(&'a self, vars: &mut Vec<&'a str>) {
        match self {
            FilterExpression::Comparison(left, _, right) => {
                for operand in [left, right] {
                    if operand.starts_with('?') && !vars.contains(&operand.as_str()) {
                        vars.push(operand);
                    }
                }
            }
            FilterExpression::And(left, right) | FilterExpression::Or(left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
            FilterExpression::Not(inner) => inner.collect_variables(vars),
        }
    }

    /// The comparison operator of the outermost comparison, if any
    pub fn operator(&self) -> Option<&str> {
        match self {
            FilterExpression::Comparison(_, op, _) => Some(op),
            _ => None,
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Comparison(left, op, right) => write!(f, "{} {} {}", left, op, right),
            FilterExpression::And(left, right) => write!(f, "({} && {})", left, right),
            FilterExpression::Or(left, right) => write!(f, "({} || {})", left, right),
            FilterExpression::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_variables() {
        let filter = FilterExpression::And(
            Box::new(FilterExpression::comparison("?age", ">", "30")),
            Box::new(FilterExpression::Not(Box::new(FilterExpression::comparison(
                "?name", "=", "?alias",
            )))),
        );
        assert_eq!(filter.variables(), vec!["?age", "?name", "?alias"]);
    }

    #[test]
    fn test_filter_display() {
        let filter = FilterExpression::Or(
            Box::new(FilterExpression::comparison("?x", "<", "5")),
            Box::new(FilterExpression::comparison("?x", ">", "10")),
        );
        assert_eq!(filter.to_string(), "(?x < 5 || ?x > 10)");
    }
}
