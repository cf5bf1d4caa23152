/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use shared::terms::RDF_TYPE;
use shared::Source;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-source statistics consumed by source selection and estimation
pub trait StatisticsProvider: Send + Sync {
    /// All sources known to the provider
    fn sources(&self) -> Vec<Source>;

    /// Sources whose data could match the pattern positions that are bound
    fn find_sources(
        &self,
        subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
        handle_type: bool,
    ) -> BTreeSet<Source>;

    /// Number of triples held by the source
    fn size(&self, source: &Source) -> u64;

    fn distinct_predicates(&self, source: &Source) -> u64;

    /// Distinct subjects, of the whole source or of one predicate
    fn distinct_subjects(&self, source: &Source, predicate: Option<&str>) -> u64;

    /// Distinct objects, of the whole source or of one predicate
    fn distinct_objects(&self, source: &Source, predicate: Option<&str>) -> u64;

    /// Number of triples using `predicate`
    fn predicate_cardinality(&self, source: &Source, predicate: &str) -> u64;

    /// Number of instances of `class`
    fn type_cardinality(&self, source: &Source, class: &str) -> u64;
}

/// Triple count and distinct values of one predicate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateStatistics {
    pub triples: u64,
    pub distinct_subjects: u64,
    pub distinct_objects: u64,
}

/// VoID-style description of one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatistics {
    pub triples: u64,
    pub distinct_subjects: u64,
    pub distinct_predicates: u64,
    pub distinct_objects: u64,
    #[serde(default)]
    pub predicates: HashMap<String, PredicateStatistics>,
    #[serde(default)]
    pub classes: HashMap<String, u64>,
}

impl SourceStatistics {
    /// Builds statistics from the triples of a source, sampling large inputs
    pub fn gather<T>(triples: &[(T, T, T)]) -> Self
    where
        T: AsRef<str> + Sync,
    {
        let total_triples = triples.len() as u64;

        // Use sampling for large datasets instead of full scan
        let sample_size = triples.len().min(100_000);
        let step = if triples.len() > sample_size {
            triples.len() / sample_size
        } else {
            1
        };
        let sampled: Vec<&(T, T, T)> = triples.iter().step_by(step).take(sample_size).collect();

        let partial = sampled
            .par_iter()
            .fold(SampleCounts::default, |mut counts, (s, p, o)| {
                counts.add(s.as_ref(), p.as_ref(), o.as_ref());
                counts
            })
            .reduce(SampleCounts::default, SampleCounts::merge);

        // Scale up sampled statistics
        let scale = step as u64;
        let predicates = partial
            .predicates
            .into_iter()
            .map(|(predicate, counts)| {
                let stats = PredicateStatistics {
                    triples: counts.triples * scale,
                    distinct_subjects: counts.subjects.len() as u64 * scale,
                    distinct_objects: counts.objects.len() as u64 * scale,
                };
                (predicate, stats)
            })
            .collect::<HashMap<_, _>>();
        let classes = partial
            .classes
            .into_iter()
            .map(|(class, count)| (class, count * scale))
            .collect();

        Self {
            triples: total_triples,
            distinct_subjects: partial.subjects.len() as u64 * scale,
            distinct_predicates: predicates.len() as u64,
            distinct_objects: partial.objects.len() as u64 * scale,
            predicates,
            classes,
        }
    }
}

#[derive(Default)]
struct PredicateCounts {
    triples: u64,
    subjects: FxHashSet<String>,
    objects: FxHashSet<String>,
}

#[derive(Default)]
struct SampleCounts {
    subjects: FxHashSet<String>,
    objects: FxHashSet<String>,
    predicates: FxHashMap<String, PredicateCounts>,
    classes: FxHashMap<String, u64>,
}

impl SampleCounts {
    fn add(&mut self, subject: &str, predicate: &str, object: &str) {
        self.subjects.insert(subject.to_string());
        self.objects.insert(object.to_string());
        let entry = self.predicates.entry(predicate.to_string()).or_default();
        entry.triples += 1;
        entry.subjects.insert(subject.to_string());
        entry.objects.insert(object.to_string());
        if predicate == RDF_TYPE {
            *self.classes.entry(object.to_string()).or_insert(0) += 1;
        }
    }

    fn merge(mut self, other: SampleCounts) -> SampleCounts {
        self.subjects.extend(other.subjects);
        self.objects.extend(other.objects);
        for (predicate, counts) in other.predicates {
            let entry = self.predicates.entry(predicate).or_default();
            entry.triples += counts.triples;
            entry.subjects.extend(counts.subjects);
            entry.objects.extend(counts.objects);
        }
        for (class, count) in other.classes {
            *self.classes.entry(class).or_insert(0) += count;
        }
        self
    }
}

/// In-memory statistics provider over VoID descriptions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoidStatistics {
    sources: BTreeMap<Source, SourceStatistics>,
}

impl VoidStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Source, statistics: SourceStatistics) -> Self {
        self.insert(source, statistics);
        self
    }

    pub fn insert(&mut self, source: Source, statistics: SourceStatistics) {
        self.sources.insert(source, statistics);
    }

    pub fn get(&self, source: &Source) -> Option<&SourceStatistics> {
        self.sources.get(source)
    }

    fn predicate(&self, source: &Source, predicate: &str) -> Option<&PredicateStatistics> {
        self.get(source).and_then(|stats| stats.predicates.get(predicate))
    }
}

impl StatisticsProvider for VoidStatistics {
    fn sources(&self) -> Vec<Source> {
        self.sources.keys().cloned().collect()
    }

    /// VoID descriptions carry no subject or object index, so only the
    /// predicate (and the class of an `rdf:type` pattern) restrict the result.
    fn find_sources(
        &self,
        _subject: Option<&str>,
        predicate: Option<&str>,
        object: Option<&str>,
        handle_type: bool,
    ) -> BTreeSet<Source> {
        let predicate = match predicate {
            Some(predicate) => predicate,
            None => return self.sources.keys().cloned().collect(),
        };

        self.sources
            .iter()
            .filter(|(_, stats)| match object {
                Some(class) if handle_type && predicate == RDF_TYPE => {
                    stats.classes.contains_key(class)
                }
                _ => stats.predicates.contains_key(predicate),
            })
            .map(|(source, _)| source.clone())
            .collect()
    }

    fn size(&self, source: &Source) -> u64 {
        self.get(source).map(|stats| stats.triples).unwrap_or(0)
    }

    fn distinct_predicates(&self, source: &Source) -> u64 {
        self.get(source)
            .map(|stats| stats.distinct_predicates)
            .unwrap_or(0)
    }

    fn distinct_subjects(&self, source: &Source, predicate: Option<&str>) -> u64 {
        match predicate {
            Some(predicate) => self
                .predicate(source, predicate)
                .map(|stats| stats.distinct_subjects)
                .unwrap_or(0),
            None => self
                .get(source)
                .map(|stats| stats.distinct_subjects)
                .unwrap_or(0),
        }
    }

    fn distinct_objects(&self, source: &Source, predicate: Option<&str>) -> u64 {
        match predicate {
            Some(predicate) => self
                .predicate(source, predicate)
                .map(|stats| stats.distinct_objects)
                .unwrap_or(0),
            None => self
                .get(source)
                .map(|stats| stats.distinct_objects)
                .unwrap_or(0),
        }
    }

    fn predicate_cardinality(&self, source: &Source, predicate: &str) -> u64 {
        self.predicate(source, predicate)
            .map(|stats| stats.triples)
            .unwrap_or(0)
    }

    fn type_cardinality(&self, source: &Source, class: &str) -> u64 {
        self.get(source)
            .and_then(|stats| stats.classes.get(class))
            .copied()
            .unwrap_or(0)
    }
}
