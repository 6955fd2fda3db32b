//! Filter, group and reduce.
//!
//! ```text
//! facts ──slice(filters)──> survivors ──group(dimensions)──> buckets ──reduce(measure)──> result
//! ```
//!
//! Buckets are created in the order their key is first seen while scanning the
//! surviving facts in stored order, and the result keeps that order. Nothing is
//! sorted here; charts and reports sort for themselves when they need to.

use super::store::CubeStore;
use super::types::{Fact, FilterSet, GroupKey, Measure, MeasureValue};
use crate::error::{CubeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Most grouping dimensions a single request may use.
pub const MAX_GROUPING_DIMENSIONS: usize = 3;

/// What to do with a fact that has no value for a filtered or grouped dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Abort the aggregation with [`CubeError::MissingKey`].
    #[default]
    Reject,
    /// Leave the fact out and count it in [`AggregationResult::excluded_facts`].
    Skip,
}

impl MissingKeyPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Skip => "skip",
        }
    }
}

impl std::str::FromStr for MissingKeyPolicy {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip" => Ok(Self::Skip),
            other => Err(CubeError::validation(format!(
                "unknown missing-key policy '{other}' (expected reject or skip)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateRequest {
    pub dimensions: Vec<String>,
    pub measure: Measure,
    pub missing_keys: MissingKeyPolicy,
}

impl AggregateRequest {
    pub fn new<I, S>(dimensions: I, measure: Measure) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            measure,
            missing_keys: MissingKeyPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    /// Checks the request against the store's catalog.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] when there are not 1 to 3 grouping
    /// dimensions, when one is repeated, or when one is not in the catalog.
    pub fn validate(&self, store: &CubeStore) -> Result<()> {
        let count = self.dimensions.len();
        if count == 0 || count > MAX_GROUPING_DIMENSIONS {
            return Err(CubeError::validation(format!(
                "choose 1 to {MAX_GROUPING_DIMENSIONS} dimensions (got {count})"
            )));
        }

        for (i, name) in self.dimensions.iter().enumerate() {
            if self.dimensions.iter().skip(i + 1).any(|other| other == name) {
                return Err(CubeError::validation(format!(
                    "dimension '{name}' is listed more than once"
                )));
            }
            if !store.dimensions().contains(name) {
                let known = store.dimensions().names().collect::<Vec<_>>().join(", ");
                return Err(CubeError::validation(format!(
                    "unknown dimension '{name}'; use dimension names such as {known}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub key: GroupKey,
    pub value: MeasureValue,
}

/// Tuple-keyed aggregation output in first-encounter order.
#[derive(Clone, Debug, Serialize)]
pub struct AggregationResult {
    pub dimensions: Vec<String>,
    pub measure: Measure,
    pub rows: Vec<ResultRow>,
    /// Facts that passed the filters and landed in a bucket.
    pub matched_facts: usize,
    /// Facts left out because a needed dimension value was missing.
    pub excluded_facts: usize,
    #[serde(skip)]
    index: HashMap<GroupKey, usize>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }

    pub fn get(&self, key: &GroupKey) -> Option<MeasureValue> {
        self.index
            .get(key)
            .and_then(|&i| self.rows.get(i))
            .map(|row| row.value)
    }

    /// Convenience lookup taking the key parts directly.
    pub fn value_of(&self, key: impl Into<GroupKey>) -> Option<MeasureValue> {
        self.get(&key.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.rows.iter().map(|row| &row.key)
    }
}

impl<'a> IntoIterator for &'a AggregationResult {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Running totals of one bucket.
#[derive(Default)]
struct Bucket {
    sum: f64,
    count: usize,
}

impl Bucket {
    fn reduce(&self, measure: Measure) -> MeasureValue {
        match measure {
            Measure::Sum => MeasureValue::Number(self.sum),
            Measure::Avg => MeasureValue::Number(self.sum / self.count as f64),
            Measure::Count => MeasureValue::Count(self.count),
        }
    }
}

enum Lookup<'a> {
    Found(&'a str),
    Missing(&'a str),
}

fn lookup<'a>(fact: &'a Fact, dimension: &'a str) -> Lookup<'a> {
    match fact.value(dimension) {
        Some(v) => Lookup::Found(v),
        None => Lookup::Missing(dimension),
    }
}

enum Slice<'a> {
    Match,
    NoMatch,
    Missing(&'a str),
}

fn slice<'a>(fact: &'a Fact, filters: &'a FilterSet) -> Slice<'a> {
    for (dimension, wanted) in filters.iter() {
        match lookup(fact, dimension) {
            Lookup::Found(v) if v == wanted => {}
            Lookup::Found(_) => return Slice::NoMatch,
            Lookup::Missing(d) => return Slice::Missing(d),
        }
    }
    Slice::Match
}

fn group_key(fact: &Fact, dimensions: &[String]) -> std::result::Result<GroupKey, String> {
    dimensions
        .iter()
        .map(|d| match lookup(fact, d) {
            Lookup::Found(v) => Ok(v.to_owned()),
            Lookup::Missing(d) => Err(d.to_owned()),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(GroupKey::new)
}

/// Returns the facts that satisfy the store's active filters, with their index.
///
/// # Errors
///
/// Under [`MissingKeyPolicy::Reject`], [`CubeError::MissingKey`] for the first
/// fact lacking a filtered dimension.
pub fn filter_facts<'a>(
    store: &'a CubeStore,
    policy: MissingKeyPolicy,
) -> Result<(Vec<(usize, &'a Fact)>, usize)> {
    let mut survivors = Vec::new();
    let mut excluded = 0;
    for (fact_index, fact) in store.facts().iter().enumerate() {
        match slice(fact, store.filters()) {
            Slice::Match => survivors.push((fact_index, fact)),
            Slice::NoMatch => {}
            Slice::Missing(dimension) => match policy {
                MissingKeyPolicy::Reject => {
                    return Err(CubeError::MissingKey {
                        fact_index,
                        dimension: dimension.to_owned(),
                    });
                }
                MissingKeyPolicy::Skip => excluded += 1,
            },
        }
    }
    Ok((survivors, excluded))
}

/// Runs the slice, group and reduce pipeline over the store's current state.
///
/// # Errors
///
/// - [`CubeError::Validation`] if the request fails [`AggregateRequest::validate`]
/// - [`CubeError::MissingKey`] under [`MissingKeyPolicy::Reject`]
/// - [`CubeError::EmptyResult`] when no fact survives
pub fn aggregate(store: &CubeStore, request: &AggregateRequest) -> Result<AggregationResult> {
    request.validate(store)?;

    let (survivors, mut excluded) = filter_facts(store, request.missing_keys)?;
    if survivors.is_empty() {
        tracing::debug!(filters = %store.filters().describe("="), "slice is empty");
        return Err(CubeError::EmptyResult);
    }

    let mut order: Vec<GroupKey> = Vec::new();
    let mut buckets: HashMap<GroupKey, Bucket> = HashMap::new();
    let mut matched = 0;

    for (fact_index, fact) in survivors {
        let key = match group_key(fact, &request.dimensions) {
            Ok(key) => key,
            Err(dimension) => match request.missing_keys {
                MissingKeyPolicy::Reject => {
                    return Err(CubeError::MissingKey {
                        fact_index,
                        dimension,
                    });
                }
                MissingKeyPolicy::Skip => {
                    excluded += 1;
                    continue;
                }
            },
        };

        let bucket = buckets.entry(key).or_insert_with_key(|k| {
            order.push(k.clone());
            Bucket::default()
        });
        bucket.sum += fact.measure;
        bucket.count += 1;
        matched += 1;
    }

    if matched == 0 {
        return Err(CubeError::EmptyResult);
    }
    if excluded > 0 {
        tracing::warn!(excluded, "facts without the requested dimensions were skipped");
    }

    let mut rows = Vec::with_capacity(order.len());
    let mut index = HashMap::with_capacity(order.len());
    for key in order {
        if let Some(bucket) = buckets.get(&key) {
            index.insert(key.clone(), rows.len());
            rows.push(ResultRow {
                value: bucket.reduce(request.measure),
                key,
            });
        }
    }

    tracing::info!(
        measure = %request.measure,
        dimensions = ?request.dimensions,
        groups = rows.len(),
        matched,
        "aggregation complete"
    );

    Ok(AggregationResult {
        dimensions: request.dimensions.clone(),
        measure: request.measure,
        rows,
        matched_facts: matched,
        excluded_facts: excluded,
        index,
    })
}

#[cfg(test)]
mod tests;
