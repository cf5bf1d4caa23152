/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate federator;
use federator::adapter::RemoteExecutor;
use federator::operators::{collect_patterns, JoinExecution, Operator};
use federator::optimizer::{
    EstimatorKind, FederatedQueryModel, OptimizerConfig, OptimizerFactory, QueryModel, Strategy,
    MAX_DP_RELATIONS,
};
use federator::source_selection::{PredicateStatistics, SourceStatistics, VoidStatistics};
use federator::{FederationError, FederationResult};
use shared::parser::{parse_query_line, QueryLine};
use shared::{FilterExpression, Source, Term, TriplePattern};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    const EX: &str = "http://example.org/";

    fn predicate(name: &str) -> String {
        format!("<{}{}>", EX, name)
    }

    fn source(sizes: &[(&str, u64)]) -> SourceStatistics {
        let predicates: HashMap<String, PredicateStatistics> = sizes
            .iter()
            .map(|(name, triples)| {
                let stats = PredicateStatistics {
                    triples: *triples,
                    distinct_subjects: *triples,
                    distinct_objects: *triples,
                };
                (predicate(name), stats)
            })
            .collect();
        SourceStatistics {
            triples: sizes.iter().map(|(_, t)| t).sum(),
            distinct_subjects: 100,
            distinct_predicates: predicates.len() as u64,
            distinct_objects: 100,
            predicates,
            classes: HashMap::new(),
        }
    }

    fn pattern(s: &str, p: &str, o: &str) -> TriplePattern {
        (Term::variable(s), Term::iri(&format!("{}{}", EX, p)), Term::variable(o))
    }

    fn federation() -> Arc<VoidStatistics> {
        Arc::new(
            VoidStatistics::new()
                .with_source(Source::new("s1"), source(&[("a", 10), ("b", 1000), ("c", 50)]))
                .with_source(Source::new("s2"), source(&[("c", 70), ("d", 5), ("e", 300)])),
        )
    }

    fn config(strategy: Strategy) -> OptimizerConfig {
        OptimizerConfig {
            strategy,
            ..OptimizerConfig::default()
        }
    }

    /// Source selection, model construction and optimization in one go
    fn optimize(
        factory: &OptimizerFactory,
        patterns: &[TriplePattern],
        filters: &[FilterExpression],
    ) -> FederationResult<FederatedQueryModel> {
        let groups = factory.source_selector().select(patterns)?;
        let mut model = factory.query_model(&groups, filters)?;
        let optimizer = factory.create(model.base_relation_count())?;
        optimizer.optimize(&mut model)?;
        Ok(model)
    }

    fn root_cost(factory: &OptimizerFactory, model: &FederatedQueryModel) -> f64 {
        let root = model.root().expect("optimized model has a root");
        factory.cost_calculator().unwrap().cost(root).unwrap()
    }

    #[test]
    fn test_greedy_starts_with_cheapest_scan() {
        let factory = OptimizerFactory::new(config(Strategy::Greedy), federation());
        // B is listed first but A scans cheaper
        let b = pattern("y", "b", "z");
        let a = pattern("x", "a", "y");
        let model = optimize(&factory, &[b.clone(), a.clone()], &[]).unwrap();

        match model.root() {
            Some(Operator::Join(join)) => {
                assert_eq!(collect_patterns(&join.left), vec![a]);
                assert_eq!(collect_patterns(&join.right), vec![b]);
                assert_eq!(join.execution, JoinExecution::Remote);
            }
            other => panic!("expected a join root, got {:?}", other),
        }
        assert!((root_cost(&factory, &model) - 1110.0).abs() < 1e-9);
    }

    #[test]
    fn test_dynamic_programming_two_relations() {
        let factory = OptimizerFactory::new(config(Strategy::DynamicProgramming), federation());
        let model = optimize(&factory, &[pattern("x", "a", "y"), pattern("y", "b", "z")], &[]).unwrap();
        assert!((root_cost(&factory, &model) - 1110.0).abs() < 1e-9);
    }

    fn chain() -> Vec<TriplePattern> {
        vec![
            pattern("v0", "b", "v1"),
            pattern("v1", "c", "v2"),
            pattern("v2", "a", "v3"),
            pattern("v3", "e", "v4"),
            pattern("v4", "d", "v5"),
        ]
    }

    #[test]
    fn test_every_pattern_appears_once() {
        for strategy in [Strategy::Greedy, Strategy::DynamicProgramming] {
            let factory = OptimizerFactory::new(config(strategy), federation());
            let model = optimize(&factory, &chain(), &[]).unwrap();
            let root = model.root().unwrap();

            assert_eq!(root.leaf_count(), 5);
            assert_eq!(root.join_count(), 4);
            let found: BTreeSet<TriplePattern> = collect_patterns(root).into_iter().collect();
            let expected: BTreeSet<TriplePattern> = chain().into_iter().collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn test_duplicate_patterns_are_folded() {
        let factory = OptimizerFactory::new(config(Strategy::Greedy), federation());
        let mut patterns = chain();
        patterns.push(pattern("v0", "b", "v1"));
        let model = optimize(&factory, &patterns, &[]).unwrap();
        assert_eq!(model.root().unwrap().leaf_count(), 5);
    }

    #[test]
    fn test_disconnected_query_is_incomplete() {
        let patterns = [pattern("x", "a", "y"), pattern("p", "d", "q")];
        for strategy in [Strategy::Greedy, Strategy::DynamicProgramming] {
            let factory = OptimizerFactory::new(config(strategy), federation());
            let result = optimize(&factory, &patterns, &[]);
            assert!(matches!(result, Err(FederationError::PlanIncomplete { remaining: 1 })));
        }

        let cartesian = OptimizerFactory::new(
            OptimizerConfig {
                strategy: Strategy::Greedy,
                allow_cartesian: true,
                ..OptimizerConfig::default()
            },
            federation(),
        );
        let model = optimize(&cartesian, &patterns, &[]).unwrap();
        assert_eq!(model.root().unwrap().leaf_count(), 2);
    }

    #[test]
    fn test_auto_runs_exhaustive_search_at_its_ceiling() {
        let arms: Vec<String> = (0..MAX_DP_RELATIONS).map(|i| format!("p{}", i)).collect();
        let sizes: Vec<(&str, u64)> = arms
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), 10 * (i as u64 + 1)))
            .collect();
        let provider = Arc::new(VoidStatistics::new().with_source(Source::new("s1"), source(&sizes)));
        let factory = OptimizerFactory::new(
            OptimizerConfig {
                strategy: Strategy::Auto,
                dp_relation_limit: MAX_DP_RELATIONS,
                ..OptimizerConfig::default()
            },
            provider,
        );
        assert_eq!(factory.create(MAX_DP_RELATIONS).unwrap().name(), "dynamic-programming");

        let star: Vec<TriplePattern> = arms.iter().map(|name| pattern("x", name, &format!("o_{}", name))).collect();
        let model = optimize(&factory, &star, &[]).unwrap();
        let root = model.root().unwrap();
        assert_eq!(root.leaf_count(), MAX_DP_RELATIONS);
        assert_eq!(root.join_count(), MAX_DP_RELATIONS - 1);
    }

    #[test]
    fn test_unknown_predicate_has_no_sources() {
        let factory = OptimizerFactory::new(OptimizerConfig::default(), federation());
        let result = optimize(&factory, &[pattern("x", "zzz", "y")], &[]);
        assert!(matches!(result, Err(FederationError::NoSources { .. })));
    }

    #[test]
    fn test_parsed_query_with_filters() {
        let text = [
            "?x <http://example.org/a> ?y .",
            "?y <http://example.org/c> ?z .",
            "FILTER(?x != ?z)",
            "FILTER(?z > 5)",
        ];
        let mut patterns = Vec::new();
        let mut filters = Vec::new();
        for line in text {
            match parse_query_line(line).unwrap() {
                QueryLine::Pattern(pattern) => patterns.push(pattern),
                QueryLine::Filter(filter) => filters.push(filter),
            }
        }

        let factory = OptimizerFactory::new(OptimizerConfig::default(), federation());
        let model = optimize(&factory, &patterns, &filters).unwrap();
        let root = model.root().unwrap();

        assert_eq!(root.filters(), &filters[..1]);
        match root {
            Operator::Join(join) => {
                let leaf_filters: Vec<&FilterExpression> = join
                    .left
                    .filters()
                    .iter()
                    .chain(join.right.filters())
                    .collect();
                assert_eq!(leaf_filters, vec![&filters[1]]);
            }
            Operator::AccessPlan(_) => panic!("expected a join root"),
        }
    }

    /// Answers every count with the length of the query text
    #[derive(Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
    }

    impl RemoteExecutor for CountingExecutor {
        fn result_row_count(&self, _source: &Source, query: &str) -> FederationResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(query.len() as u64)
        }
    }

    #[test]
    fn test_exact_counting_with_statistics_fallback() {
        let executor = Arc::new(CountingExecutor::default());
        let factory = OptimizerFactory::new(
            OptimizerConfig {
                strategy: Strategy::Greedy,
                estimator: EstimatorKind::ExactCount,
                ..OptimizerConfig::default()
            },
            federation(),
        )
        .with_executor(executor.clone());

        // c lives at both sources, so joins with it cannot be counted remotely
        let model = optimize(&factory, &chain(), &[]).unwrap();
        assert_eq!(model.root().unwrap().leaf_count(), 5);
        assert!(executor.calls.load(Ordering::SeqCst) > 0);
    }
}
