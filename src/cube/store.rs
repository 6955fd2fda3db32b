use super::aggregate::{self, AggregateRequest, AggregationResult};
use super::sample;
use super::snapshot::CubeSnapshot;
use super::types::{Dimension, DimensionCatalog, Fact, FilterSet, Measure};
use crate::error::{CubeError, Result};
use rand::Rng;

/// Owned state of one cube session: the dimension catalog, the facts and the
/// active slice.
///
/// The store holds no logic beyond storage and mutation; it is passed by
/// reference to whoever needs it and has no interior locking.
#[derive(Clone, Debug, Default)]
pub struct CubeStore {
    dimensions: DimensionCatalog,
    facts: Vec<Fact>,
    filters: FilterSet,
}

impl CubeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> &DimensionCatalog {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// True when the cube has neither dimensions nor facts.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.facts.is_empty()
    }

    /// Registers a dimension or overwrites its value list.
    ///
    /// Existing facts are not revisited when a value list changes.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Validation`] for an empty name or an empty value list.
    pub fn add_dimension(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<bool> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CubeError::validation("dimension name must not be empty"));
        }
        if values.is_empty() {
            return Err(CubeError::validation(format!(
                "dimension '{name}' needs at least one value"
            )));
        }
        let replaced = self.dimensions.insert(name.clone(), values).is_some();
        tracing::debug!(dimension = %name, replaced, "dimension registered");
        Ok(replaced)
    }

    /// Appends a fact. Completeness against the catalog is the caller's job.
    pub fn add_fact<I, K, V>(&mut self, values: I, measure: f64)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.facts.push(Fact::new(values, measure));
    }

    pub fn push_fact(&mut self, fact: Fact) {
        self.facts.push(fact);
    }

    /// Replaces the active filter set wholesale.
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Replaces dimensions and facts with the snapshot's and drops all filters.
    pub fn load_snapshot(&mut self, snapshot: CubeSnapshot) {
        self.dimensions = snapshot.dimensions;
        self.facts = snapshot.facts;
        self.filters.clear();
        tracing::info!(
            dimensions = self.dimensions.len(),
            facts = self.facts.len(),
            "cube loaded"
        );
    }

    pub fn export_snapshot(&self) -> CubeSnapshot {
        CubeSnapshot {
            dimensions: self.dimensions.clone(),
            facts: self.facts.clone(),
        }
    }

    /// Replaces the cube with the demonstration catalog and random facts.
    ///
    /// Returns the number of facts generated.
    pub fn generate_sample_data(&mut self) -> usize {
        self.generate_sample_data_with(&mut rand::rng())
    }

    /// Same as [`Self::generate_sample_data`] with a caller-supplied generator.
    pub fn generate_sample_data_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.load_snapshot(sample::sample_cube(rng));
        self.facts.len()
    }

    /// Aggregates with the default missing-key policy.
    ///
    /// # Errors
    ///
    /// See [`aggregate::aggregate`].
    pub fn aggregate(&self, dimensions: &[&str], measure: Measure) -> Result<AggregationResult> {
        let request = AggregateRequest::new(dimensions.iter().copied(), measure);
        aggregate::aggregate(self, &request)
    }
}
