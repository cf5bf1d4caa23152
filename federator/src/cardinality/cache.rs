/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Memoized cardinalities.
//!
//! Entries are keyed by the ordered signatures of the patterns in a subtree.
//! A signature lists the positions of one pattern: constants as written,
//! variables renumbered `?v0`, `?v1`, ... by first occurrence in the subtree,
//! so that renaming variables keeps the key while rewiring joins changes it.
//! Filters
//! are not part of the key: two subtrees with the same pattern sequence but
//! different filters share one entry. Within one optimization run every
//! pattern combination carries the same filters, so this holds there; callers
//! sharing a cache across runs with different filters must not rely on it.

use super::estimator::CardinalityEstimator;
use crate::adapter::{ModelAdapter, SignatureTerm};
use crate::error::FederationResult;
use crate::operators::{AccessPlan, Join, Operator, OperatorFold};
use log::trace;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ordered pattern signatures of a subtree
pub type CacheKey = Vec<Vec<String>>;

/// Hit and miss counters of a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    pub entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
}

/// Thread-safe cardinality store shared by all estimations of a run
pub struct CardinalityCache<P, F> {
    adapter: Arc<dyn ModelAdapter<P, F>>,
    entries: Mutex<FxHashMap<CacheKey, f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct SignatureFold<'a, P, F> {
    adapter: &'a dyn ModelAdapter<P, F>,
}

impl<P, F> OperatorFold<P, F> for SignatureFold<'_, P, F> {
    type Output = Vec<Vec<SignatureTerm>>;

    fn fold_access_plan(&mut self, plan: &AccessPlan<P, F>) -> Self::Output {
        vec![self.adapter.pattern_signature(&plan.pattern)]
    }

    fn fold_join(&mut self, _join: &Join<P, F>, mut left: Self::Output, right: Self::Output) -> Self::Output {
        left.extend(right);
        left
    }
}

fn canonical_key(signatures: Vec<Vec<SignatureTerm>>) -> CacheKey {
    let mut numbering: FxHashMap<String, usize> = FxHashMap::default();
    signatures
        .into_iter()
        .map(|signature| {
            signature
                .into_iter()
                .map(|term| match term {
                    SignatureTerm::Constant(value) => value,
                    SignatureTerm::Variable(name) => {
                        let next = numbering.len();
                        format!("?v{}", numbering.entry(name).or_insert(next))
                    }
                })
                .collect()
        })
        .collect()
}

impl<P, F> CardinalityCache<P, F> {
    pub fn new(adapter: Arc<dyn ModelAdapter<P, F>>) -> Self {
        Self {
            adapter,
            entries: Mutex::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Signature key of a subtree, collected left to right
    pub fn key(&self, operator: &Operator<P, F>) -> CacheKey {
        canonical_key(operator.fold(&mut SignatureFold {
            adapter: self.adapter.as_ref(),
        }))
    }

    pub fn get_card(&self, operator: &Operator<P, F>) -> Option<f64> {
        let key = self.key(operator);
        self.lookup(&key)
    }

    /// Stores `cardinality` for the subtree, replacing any earlier value
    pub fn set_card(&self, operator: &Operator<P, F>, cardinality: f64) {
        let key = self.key(operator);
        self.entries().insert(key, cardinality);
    }

    /// Keeps an existing entry and returns it, otherwise stores `cardinality`
    pub fn insert_if_absent(&self, key: CacheKey, cardinality: f64) -> f64 {
        *self.entries().entry(key).or_insert(cardinality)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            entries: self.len(),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<f64> {
        let value = self.entries().get(key).copied();
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    // Entries are plain numbers, a panic elsewhere cannot leave them half written
    fn entries(&self) -> MutexGuard<'_, FxHashMap<CacheKey, f64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Estimator answering from a [`CardinalityCache`] before delegating
pub struct CachedEstimator<P, F, E: ?Sized> {
    cache: Arc<CardinalityCache<P, F>>,
    inner: Arc<E>,
}

impl<P, F, E: ?Sized> CachedEstimator<P, F, E> {
    pub fn new(cache: Arc<CardinalityCache<P, F>>, inner: Arc<E>) -> Self {
        Self { cache, inner }
    }
}

impl<P, F, E> CardinalityEstimator<P, F> for CachedEstimator<P, F, E>
where
    E: CardinalityEstimator<P, F> + ?Sized,
{
    /// The lock is not held while the inner estimator runs. Two threads may
    /// compute the same key concurrently; the first stored value wins and is
    /// returned to both.
    fn estimate(&self, operator: &Operator<P, F>) -> FederationResult<f64> {
        let key = self.cache.key(operator);
        if let Some(cardinality) = self.cache.lookup(&key) {
            trace!("Cardinality cache hit for {:?}", key);
            return Ok(cardinality);
        }

        let cardinality = self.inner.estimate(operator)?;
        Ok(self.cache.insert_if_absent(key, cardinality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SparqlAdapter;
    use crate::operators::{JoinAlgorithm, JoinExecution};
    use shared::{FilterExpression, Source, Term, TriplePattern};
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicUsize;

    type Plan = Operator<TriplePattern, FilterExpression>;

    fn plan(predicate: &str) -> Plan {
        leaf("s", predicate, "o")
    }

    fn leaf(subject: &str, predicate: &str, object: &str) -> Plan {
        Operator::access_plan(
            (Term::variable(subject), Term::iri(predicate), Term::variable(object)),
            BTreeSet::from([Source::new("s1")]),
        )
    }

    fn join(left: Plan, right: Plan) -> Plan {
        Operator::join(left, right, JoinExecution::Local, JoinAlgorithm::HashJoin)
    }

    fn cache() -> Arc<CardinalityCache<TriplePattern, FilterExpression>> {
        Arc::new(CardinalityCache::new(Arc::new(SparqlAdapter)))
    }

    struct CountingEstimator {
        calls: AtomicUsize,
    }

    impl CardinalityEstimator<TriplePattern, FilterExpression> for CountingEstimator {
        fn estimate(&self, operator: &Plan) -> FederationResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(operator.leaf_count() as f64 * 10.0)
        }
    }

    #[test]
    fn test_key_lists_signatures_left_to_right() {
        let cache = cache();
        let tree = join(leaf("a", "http://ex.org/p", "b"), leaf("b", "http://ex.org/q", "c"));
        assert_eq!(
            cache.key(&tree),
            vec![
                vec!["?v0".to_string(), "<http://ex.org/p>".to_string(), "?v1".to_string()],
                vec!["?v1".to_string(), "<http://ex.org/q>".to_string(), "?v2".to_string()],
            ]
        );
    }

    #[test]
    fn test_renamed_variables_share_an_entry() {
        let cache = cache();
        cache.set_card(&join(leaf("a", "http://ex.org/p", "b"), leaf("b", "http://ex.org/q", "c")), 9.0);
        let renamed = join(leaf("x", "http://ex.org/p", "y"), leaf("y", "http://ex.org/q", "z"));
        assert_eq!(cache.get_card(&renamed), Some(9.0));
    }

    #[test]
    fn test_variable_wiring_is_part_of_the_key() {
        let cache = cache();
        cache.set_card(&leaf("x", "http://ex.org/knows", "x"), 3.0);
        assert_eq!(cache.get_card(&leaf("a", "http://ex.org/knows", "b")), None);

        let chained = join(leaf("a", "http://ex.org/knows", "b"), leaf("b", "http://ex.org/knows", "c"));
        let cartesian = join(leaf("a", "http://ex.org/knows", "b"), leaf("c", "http://ex.org/knows", "d"));
        cache.set_card(&chained, 1000.0);
        assert_eq!(cache.get_card(&cartesian), None);
    }

    #[test]
    fn test_cached_estimator_keeps_chain_and_cartesian_apart() {
        let inner = Arc::new(CountingEstimator {
            calls: AtomicUsize::new(0),
        });
        let estimator = CachedEstimator::new(cache(), inner.clone());
        let chained = join(leaf("a", "http://ex.org/knows", "b"), leaf("b", "http://ex.org/knows", "c"));
        let cartesian = join(leaf("a", "http://ex.org/knows", "b"), leaf("c", "http://ex.org/knows", "d"));

        estimator.estimate(&chained).unwrap();
        estimator.estimate(&cartesian).unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let cache = cache();
        let tree = join(plan("http://ex.org/a"), plan("http://ex.org/b"));
        cache.set_card(&tree, 42.5);
        assert_eq!(cache.get_card(&tree), Some(42.5));

        cache.set_card(&tree, 7.0);
        assert_eq!(cache.get_card(&tree), Some(7.0));
    }

    #[test]
    fn test_different_pattern_sequence_misses() {
        let cache = cache();
        cache.set_card(&join(plan("http://ex.org/a"), plan("http://ex.org/b")), 42.5);

        assert_eq!(cache.get_card(&join(plan("http://ex.org/b"), plan("http://ex.org/a"))), None);
        assert_eq!(cache.get_card(&plan("http://ex.org/a")), None);
        assert_eq!(cache.statistics().miss_count, 2);
    }

    #[test]
    fn test_filters_do_not_change_the_key() {
        let cache = cache();
        let filtered = plan("http://ex.org/a").with_filters([FilterExpression::comparison("?o", ">", "3")]);
        cache.set_card(&plan("http://ex.org/a"), 5.0);
        assert_eq!(cache.get_card(&filtered), Some(5.0));
    }

    #[test]
    fn test_cached_estimator_skips_work_on_hit() {
        let cache = cache();
        let inner = Arc::new(CountingEstimator {
            calls: AtomicUsize::new(0),
        });
        let estimator = CachedEstimator::new(cache.clone(), inner.clone());
        let tree = join(plan("http://ex.org/a"), plan("http://ex.org/b"));

        assert_eq!(estimator.estimate(&tree).unwrap(), 20.0);
        assert_eq!(estimator.estimate(&tree).unwrap(), 20.0);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        let stats = cache.statistics();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[test]
    fn test_parallel_estimation_shares_one_cache() {
        let cache = cache();
        let inner = Arc::new(CountingEstimator {
            calls: AtomicUsize::new(0),
        });
        let estimator = CachedEstimator::new(cache.clone(), inner);
        let a = plan("http://ex.org/a");
        let b = plan("http://ex.org/b");
        let operators = vec![&a, &b, &a, &b, &a];

        let results = crate::cardinality::estimate_all(&estimator, &operators);
        assert!(results.iter().all(|r| matches!(r, Ok(v) if *v == 10.0)));
        assert_eq!(cache.len(), 2);
    }
}
