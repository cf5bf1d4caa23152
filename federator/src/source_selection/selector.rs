/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::statistics::StatisticsProvider;
use crate::error::{FederationError, FederationResult};
use log::{debug, trace};
use shared::terms::OWL_SAME_AS;
use shared::{PatternTerms, Source, TriplePattern};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Patterns grouped by the exact set of sources able to answer them
pub type SourceGroups = BTreeMap<BTreeSet<Source>, Vec<TriplePattern>>;

/// Maps triple patterns to candidate sources
pub struct SourceSelector {
    provider: Arc<dyn StatisticsProvider>,
    handle_type: bool,
    handle_same_as: bool,
}

impl SourceSelector {
    /// Creates a new source selector
    pub fn new(provider: Arc<dyn StatisticsProvider>, handle_type: bool, handle_same_as: bool) -> Self {
        Self {
            provider,
            handle_type,
            handle_same_as,
        }
    }

    /// Candidate sources of a single pattern
    pub fn sources_for(&self, pattern: &TriplePattern) -> BTreeSet<Source> {
        // Equivalence links may live in any source
        if self.handle_same_as && pattern.predicate().as_constant() == Some(OWL_SAME_AS) {
            return self.provider.sources().into_iter().collect();
        }

        self.provider.find_sources(
            pattern.subject().as_constant(),
            pattern.predicate().as_constant(),
            pattern.object().as_constant(),
            self.handle_type,
        )
    }

    /// Partitions `patterns` by identical candidate source set.
    ///
    /// Every distinct input pattern lands in exactly one group. A pattern
    /// without any candidate source makes the query unanswerable and is
    /// reported as [`FederationError::NoSources`].
    pub fn select(&self, patterns: &[TriplePattern]) -> FederationResult<SourceGroups> {
        let mut groups: SourceGroups = BTreeMap::new();
        let mut seen: BTreeSet<&TriplePattern> = BTreeSet::new();

        for pattern in patterns {
            if !seen.insert(pattern) {
                debug!("Skipping repeated pattern {:?}", pattern);
                continue;
            }

            let sources = self.sources_for(pattern);
            if sources.is_empty() {
                return Err(FederationError::NoSources {
                    pattern: format!("{} {} {}", pattern.0, pattern.1, pattern.2),
                });
            }

            trace!("Pattern {:?} -> {} source(s)", pattern, sources.len());
            groups.entry(sources).or_default().push(pattern.clone());
        }

        debug!(
            "Source selection: {} pattern(s) in {} group(s)",
            seen.len(),
            groups.len()
        );
        Ok(groups)
    }
}
