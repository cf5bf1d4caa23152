/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Traversal of operator trees.
//!
//! Two disciplines are offered:
//!
//! - [`OperatorVisitor`]: a collecting walk. A join hands its own filters to
//!   the visitor, then descends left, then right. Consumers accumulate into
//!   state they own.
//! - [`OperatorFold`]: a strict bottom-up fold. The left subtree is folded
//!   completely, then the right one, then both results are combined and the
//!   node's filters are applied to the combined value.

use super::operator::{AccessPlan, Join, Operator};

/// Collecting traversal over an operator tree
pub trait OperatorVisitor<P, F> {
    fn visit_access_plan(&mut self, plan: &AccessPlan<P, F>);

    /// Called with the filters attached to a join, before its children
    fn visit_filters(&mut self, _filters: &[F]) {}

    fn visit_join(&mut self, join: &Join<P, F>)
    where
        Self: Sized,
    {
        self.visit_filters(&join.filters);
        join.left.accept(self);
        join.right.accept(self);
    }
}

/// Bottom-up fold producing one value per tree
pub trait OperatorFold<P, F> {
    type Output;

    fn fold_access_plan(&mut self, plan: &AccessPlan<P, F>) -> Self::Output;

    /// Combines the already folded children of `join`
    fn fold_join(
        &mut self,
        join: &Join<P, F>,
        left: Self::Output,
        right: Self::Output,
    ) -> Self::Output;

    /// Applies the filters of a node to that node's combined result
    fn apply_filters(&mut self, result: Self::Output, _filters: &[F]) -> Self::Output {
        result
    }
}

enum Frame<'a, P, F> {
    Enter(&'a Operator<P, F>),
    Combine(&'a Join<P, F>),
}

impl<P, F> Operator<P, F> {
    /// Applies a collecting visitor to the whole tree
    pub fn accept<V: OperatorVisitor<P, F>>(&self, visitor: &mut V) {
        match self {
            Operator::AccessPlan(plan) => visitor.visit_access_plan(plan),
            Operator::Join(join) => visitor.visit_join(join),
        }
    }

    /// Folds the tree bottom-up with an explicit stack.
    ///
    /// # Panics
    ///
    /// Panics if the traversal does not end with exactly one value, which
    /// only happens for a malformed tree.
    pub fn fold<T: OperatorFold<P, F>>(&self, folder: &mut T) -> T::Output {
        let mut work: Vec<Frame<'_, P, F>> = vec![Frame::Enter(self)];
        let mut results: Vec<T::Output> = Vec::new();

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(Operator::AccessPlan(plan)) => {
                    let value = folder.fold_access_plan(plan);
                    results.push(folder.apply_filters(value, &plan.filters));
                }
                Frame::Enter(Operator::Join(join)) => {
                    // Popped in reverse: left completes before right starts
                    work.push(Frame::Combine(join));
                    work.push(Frame::Enter(join.right.as_ref()));
                    work.push(Frame::Enter(join.left.as_ref()));
                }
                Frame::Combine(join) => {
                    let right = results.pop();
                    let left = results.pop();
                    let (left, right) = match (left, right) {
                        (Some(left), Some(right)) => (left, right),
                        _ => panic!("malformed operator tree: join combined with fewer than two inputs"),
                    };
                    let value = folder.fold_join(join, left, right);
                    results.push(folder.apply_filters(value, &join.filters));
                }
            }
        }

        let remaining = results.len();
        match results.pop() {
            Some(value) if remaining == 1 => value,
            _ => panic!("malformed operator tree: fold ended with {} values", remaining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{JoinAlgorithm, JoinExecution};
    use shared::Source;
    use std::collections::BTreeSet;

    type TestOperator = Operator<&'static str, &'static str>;

    fn leaf(pattern: &'static str, filters: &[&'static str]) -> TestOperator {
        Operator::access_plan(pattern, BTreeSet::from([Source::new("s1")]))
            .with_filters(filters.iter().copied())
    }

    fn join(left: TestOperator, right: TestOperator, filters: &[&'static str]) -> TestOperator {
        Operator::join(left, right, JoinExecution::Local, JoinAlgorithm::HashJoin)
            .with_filters(filters.iter().copied())
    }

    /// Rebuilds the tree node by node
    struct IdentityFold;

    impl OperatorFold<&'static str, &'static str> for IdentityFold {
        type Output = TestOperator;

        fn fold_access_plan(&mut self, plan: &AccessPlan<&'static str, &'static str>) -> TestOperator {
            Operator::access_plan(plan.pattern, plan.sources.clone())
        }

        fn fold_join(
            &mut self,
            join: &Join<&'static str, &'static str>,
            left: TestOperator,
            right: TestOperator,
        ) -> TestOperator {
            Operator::join(left, right, join.execution, join.algorithm)
        }

        fn apply_filters(&mut self, result: TestOperator, filters: &[&'static str]) -> TestOperator {
            result.with_filters(filters.iter().copied())
        }
    }

    /// Records the order in which the fold touches nodes
    #[derive(Default)]
    struct TraceFold {
        events: Vec<String>,
        combines: usize,
    }

    impl OperatorFold<&'static str, &'static str> for TraceFold {
        type Output = String;

        fn fold_access_plan(&mut self, plan: &AccessPlan<&'static str, &'static str>) -> String {
            self.events.push(format!("leaf {}", plan.pattern));
            plan.pattern.to_string()
        }

        fn fold_join(
            &mut self,
            _join: &Join<&'static str, &'static str>,
            left: String,
            right: String,
        ) -> String {
            self.combines += 1;
            let combined = format!("({} {})", left, right);
            self.events.push(format!("join {}", combined));
            combined
        }

        fn apply_filters(&mut self, result: String, filters: &[&'static str]) -> String {
            for filter in filters {
                self.events.push(format!("filter {} on {}", filter, result));
            }
            result
        }
    }

    #[derive(Default)]
    struct PatternOrder(Vec<&'static str>, Vec<&'static str>);

    impl OperatorVisitor<&'static str, &'static str> for PatternOrder {
        fn visit_access_plan(&mut self, plan: &AccessPlan<&'static str, &'static str>) {
            self.0.push(plan.pattern);
        }

        fn visit_filters(&mut self, filters: &[&'static str]) {
            self.1.extend(filters.iter().copied());
        }
    }

    fn sample_tree() -> TestOperator {
        join(
            join(leaf("a", &["fa"]), leaf("b", &[]), &["fab"]),
            join(leaf("c", &[]), leaf("d", &["fd"]), &[]),
            &["root"],
        )
    }

    #[test]
    fn test_identity_fold_reproduces_tree() {
        let tree = sample_tree();
        assert_eq!(tree.fold(&mut IdentityFold), tree);

        let single = leaf("x", &["fx"]);
        assert_eq!(single.fold(&mut IdentityFold), single);
    }

    #[test]
    fn test_fold_is_left_then_right_then_filters() {
        let mut trace = TraceFold::default();
        let result = sample_tree().fold(&mut trace);

        assert_eq!(result, "((a b) (c d))");
        assert_eq!(trace.combines, 3);
        assert_eq!(
            trace.events,
            vec![
                "leaf a",
                "filter fa on a",
                "leaf b",
                "join (a b)",
                "filter fab on (a b)",
                "leaf c",
                "leaf d",
                "filter fd on d",
                "join (c d)",
                "join ((a b) (c d))",
                "filter root on ((a b) (c d))",
            ]
        );
    }

    #[test]
    fn test_visitor_sees_join_filters_before_children() {
        let mut order = PatternOrder::default();
        sample_tree().accept(&mut order);
        assert_eq!(order.0, vec!["a", "b", "c", "d"]);
        assert_eq!(order.1, vec!["root", "fab"]);
    }
}
