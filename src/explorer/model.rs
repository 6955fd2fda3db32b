use super::chart_data::{Chart, ViewAngles};
use crate::cube::{DimensionCatalog, Measure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter choice meaning "do not constrain this dimension".
pub const ALL_OPTION: &str = "ALL";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    DataEntry,
    Analysis,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Self::DataEntry => "❶ Data & Cube",
            Self::Analysis => "❷ Analysis & Report",
        }
    }
}

/// Form state of the explorer window. Persisted between sessions.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerModel {
    pub tab: Tab,

    // Dimension form
    pub dim_name_input: String,
    pub dim_values_input: String,

    // Fact form
    pub fact_selections: BTreeMap<String, String>,
    pub fact_value_input: String,

    // Slice & dice
    pub filter_selections: BTreeMap<String, String>,

    // Aggregation form
    pub agg_dims_input: String,
    pub measure: Measure,

    pub view: ViewAngles,
    pub status: String,
    #[serde(skip)]
    pub chart: Option<Chart>,
}

impl ExplorerModel {
    /// Brings the per-dimension pickers in line with the catalog.
    ///
    /// Fact pickers default to the first value of each dimension; filter
    /// pickers default to [`ALL_OPTION`]. Selections that are no longer valid
    /// are reset, and pickers for removed dimensions are dropped.
    pub fn sync_with_catalog(&mut self, catalog: &DimensionCatalog) {
        self.fact_selections.retain(|dim, _| catalog.contains(dim));
        self.filter_selections.retain(|dim, _| catalog.contains(dim));

        for dim in catalog {
            let first = dim.values.first().cloned().unwrap_or_default();
            let fact = self.fact_selections.entry(dim.name.clone()).or_default();
            if !dim.contains(fact) {
                *fact = first;
            }

            let filter = self
                .filter_selections
                .entry(dim.name.clone())
                .or_insert_with(|| ALL_OPTION.to_owned());
            if filter.as_str() != ALL_OPTION && !dim.contains(filter) {
                ALL_OPTION.clone_into(filter);
            }
        }
    }

    /// Clears filter pickers back to [`ALL_OPTION`], e.g. after the store dropped its filters.
    pub fn reset_filters(&mut self) {
        for value in self.filter_selections.values_mut() {
            ALL_OPTION.clone_into(value);
        }
    }
}
