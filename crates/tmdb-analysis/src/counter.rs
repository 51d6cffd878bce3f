//! Frequency counts over delimiter-separated text columns such as `genres`,
//! `director` and `cast`.

use crate::error::{AnalysisError, Result};
use crate::types::TokenCount;
use crate::utils::require_column;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Token frequencies, most frequent first.
///
/// Tokens with equal counts keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCounts {
    counts: Vec<TokenCount>,
}

impl TokenCounts {
    /// The `n` most frequent tokens (all of them if fewer exist).
    pub fn head(&self, n: usize) -> &[TokenCount] {
        &self.counts[..n.min(self.counts.len())]
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn get(&self, token: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.token == token)
            .map(|c| c.count)
    }

    pub fn counts(&self) -> &[TokenCount] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Counts tokens of a multi-value text column split on one delimiter.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalCounter {
    delimiter: char,
}

impl CategoricalCounter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Count every token in the non-null values of `column`.
    ///
    /// Splitting each value separately gives the same tokens as joining all
    /// values with the delimiter and splitting once. Empty tokens (`"a||b"`)
    /// are counted as the empty string.
    pub fn count(&self, df: &DataFrame, column: &str) -> Result<TokenCounts> {
        let series = require_column(df, column)?;
        let values = series.str().map_err(|_| {
            AnalysisError::coercion(
                column,
                "String",
                format!("token counting needs text, found {:?}", series.dtype()),
            )
        })?;

        let mut counts: Vec<TokenCount> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for value in values.into_iter().flatten() {
            for token in value.split(self.delimiter) {
                match position.get(token) {
                    Some(&index) => counts[index].count += 1,
                    None => {
                        position.insert(token.to_string(), counts.len());
                        counts.push(TokenCount {
                            token: token.to_string(),
                            count: 1,
                        });
                    }
                }
            }
        }

        // stable, so ties stay in first-seen order
        counts.sort_by(|a, b| b.count.cmp(&a.count));

        debug!(
            "Counted {} distinct token(s) in '{}'",
            counts.len(),
            column
        );
        Ok(TokenCounts { counts })
    }
}
