/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Errors raised while selecting sources and ordering joins
#[derive(Error, Debug)]
pub enum FederationError {
    /// The requested operation cannot be applied to the given subtree
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A remote endpoint failed to answer a count query
    #[error("Remote execution failed at {source_name}: {message}")]
    Remote { source_name: String, message: String },

    /// No source can answer the pattern, so the query has no answer
    #[error("No source can answer pattern {pattern}")]
    NoSources { pattern: String },

    /// The optimizer could not combine every base relation into one tree
    #[error("Plan incomplete: {remaining} access plan(s) could not be joined")]
    PlanIncomplete { remaining: usize },

    /// The query holds no triple pattern
    #[error("Query has no triple patterns")]
    EmptyQuery,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pattern or filter text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FederationError {
    pub fn remote(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        FederationError::Remote {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether a statistics-based estimate may stand in for the failed one
    pub fn is_recoverable_estimate(&self) -> bool {
        matches!(
            self,
            FederationError::Unsupported(_) | FederationError::Remote { .. }
        )
    }
}

pub type FederationResult<T> = Result<T, FederationError>;
