use super::model::ALL_OPTION;
use crate::config::AppSettings;
use crate::cube::{
    AggregateRequest, AggregationResult, CubeStore, FilterSet, Measure, aggregate,
    read_snapshot, render_report, write_snapshot,
};
use crate::error::{CubeError, Result};
use crate::utils::{AuditEntry, push_audit_log, split_list};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;

/// Validated actions behind the explorer window.
///
/// Every action records itself in the activity log. Failures come back as
/// [`CubeError`] with the store untouched; successes return the message the
/// window shows on its status line.
#[derive(Default)]
pub struct CubeController {
    store: CubeStore,
    settings: AppSettings,
    activity_log: Vec<AuditEntry>,
}

impl CubeController {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            store: CubeStore::new(),
            settings,
            activity_log: Vec::new(),
        }
    }

    pub fn store(&self) -> &CubeStore {
        &self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }

    pub fn activity_log(&self) -> &[AuditEntry] {
        &self.activity_log
    }

    pub fn clear_activity_log(&mut self) {
        self.activity_log.clear();
    }

    pub fn log_action(&mut self, action: &str, details: &str) {
        push_audit_log(
            &mut self.activity_log,
            self.settings.activity_log_capacity,
            action,
            details,
        );
    }

    /// Records a failed action and hands the error back.
    fn fail<T>(&mut self, action: &str, err: CubeError) -> Result<T> {
        if err.is_user_error() {
            tracing::warn!("{action} rejected: {err}");
        } else {
            tracing::error!("{action} failed: {err}");
        }
        self.log_action(&format!("{action} failed"), &err.to_string());
        Err(err)
    }

    /// Registers a dimension from a name and a comma-separated value list.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] when the name or the value list is empty.
    pub fn add_dimension(&mut self, name: &str, values_csv: &str) -> Result<String> {
        let name = name.trim();
        let values = split_list(values_csv);
        if name.is_empty() || values.is_empty() {
            return self.fail(
                "Add dimension",
                CubeError::validation("Enter a dimension name and at least one value"),
            );
        }

        let details = format!("{name} = [{}]", values.join(", "));
        match self.store.add_dimension(name, values) {
            Ok(true) => {
                tracing::warn!("Dimension '{name}' already existed; values replaced");
                self.log_action("Dimension replaced", &details);
                Ok(format!("Dimension '{name}' already existed; its values were replaced"))
            }
            Ok(false) => {
                self.log_action("Dimension added", &details);
                Ok(format!("Dimension '{name}' added"))
            }
            Err(e) => self.fail("Add dimension", e),
        }
    }

    /// Appends a fact from per-dimension picks and a typed measure.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] when the cube has no dimensions, a dimension
    /// has no valid pick, or the measure is not a finite number.
    pub fn add_fact(
        &mut self,
        selections: &BTreeMap<String, String>,
        measure_input: &str,
    ) -> Result<String> {
        match self.validate_fact(selections, measure_input) {
            Ok((values, measure)) => {
                let details = values
                    .iter()
                    .map(|(d, v)| format!("{d}={v}"))
                    .chain(std::iter::once(format!("valor={measure}")))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.store.add_fact(values, measure);
                self.log_action("Fact added", &details);
                Ok(format!("Fact added ({} in cube)", self.store.facts().len()))
            }
            Err(e) => self.fail("Add fact", e),
        }
    }

    fn validate_fact(
        &self,
        selections: &BTreeMap<String, String>,
        measure_input: &str,
    ) -> Result<(Vec<(String, String)>, f64)> {
        let dimensions = self.store.dimensions();
        if dimensions.is_empty() {
            return Err(CubeError::validation("Create dimensions first"));
        }

        let measure: f64 = measure_input
            .trim()
            .parse()
            .map_err(|_| CubeError::validation(format!("'{measure_input}' is not a number")))?;
        if !measure.is_finite() {
            return Err(CubeError::validation("The measure must be a finite number"));
        }

        let mut values = Vec::with_capacity(dimensions.len());
        for dim in dimensions {
            match selections.get(&dim.name).map(|v| v.trim()) {
                Some(value) if dim.contains(value) => {
                    values.push((dim.name.clone(), value.to_owned()));
                }
                Some(value) if !value.is_empty() => {
                    return Err(CubeError::validation(format!(
                        "'{value}' is not a value of dimension '{}'",
                        dim.name
                    )));
                }
                _ => {
                    return Err(CubeError::validation(format!(
                        "Select a value for every dimension (missing '{}')",
                        dim.name
                    )));
                }
            }
        }
        Ok((values, measure))
    }

    /// Replaces the active slice. [`ALL_OPTION`] or a blank pick leaves a dimension open.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] when a pick names an unknown dimension.
    pub fn apply_filters(&mut self, selections: &BTreeMap<String, String>) -> Result<String> {
        let mut filters = FilterSet::new();
        for (dim, value) in selections {
            let value = value.trim();
            if value.is_empty() || value == ALL_OPTION {
                continue;
            }
            if !self.store.dimensions().contains(dim) {
                return self.fail(
                    "Apply filters",
                    CubeError::validation(format!("Unknown dimension '{dim}'")),
                );
            }
            filters.insert(dim.as_str(), value);
        }

        let message = if filters.is_empty() {
            "No filter applied; analysing all facts".to_owned()
        } else {
            format!("Active filters: {}", filters.describe(" = "))
        };
        tracing::info!("{message}");
        self.log_action("Filters updated", &message);
        self.store.set_filters(filters);
        Ok(message)
    }

    /// Rolls the filtered facts up by the comma-separated dimension names.
    ///
    /// On success the text report is appended to the activity log.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] for a bad dimension list,
    /// [`CubeError::EmptyResult`] when nothing matches, and
    /// [`CubeError::MissingKey`] under the reject policy.
    pub fn aggregate(&mut self, dims_csv: &str, measure: Measure) -> Result<AggregationResult> {
        let dims = split_list(dims_csv);
        if dims.is_empty() {
            return self.fail(
                "Aggregate",
                CubeError::validation("Choose 1 to 3 dimension names, e.g. PRODUTO, REGIÃO"),
            );
        }

        let request = AggregateRequest::new(dims, measure)
            .with_missing_keys(self.settings.missing_keys);
        match aggregate(&self.store, &request) {
            Ok(result) => {
                let report = render_report(&result, self.store.filters());
                self.log_action("Aggregation", &report);
                Ok(result)
            }
            Err(e) => self.fail("Aggregate", e),
        }
    }

    /// Writes the cube to `path`.
    ///
    /// # Errors
    ///
    /// [`CubeError::Validation`] when the cube has no dimensions or no facts;
    /// I/O failures otherwise.
    pub fn save_cube(&mut self, path: &Path) -> Result<String> {
        if self.store.dimensions().is_empty() || self.store.facts().is_empty() {
            return self.fail(
                "Save cube",
                CubeError::validation("No cube to save: add dimensions and facts first"),
            );
        }
        if let Err(e) = write_snapshot(path, &self.store.export_snapshot()) {
            return self.fail("Save cube", e);
        }

        self.settings.remember_cube(path);
        let message = format!("Cube saved: {}", file_label(path));
        self.log_action("Cube saved", &path.display().to_string());
        Ok(message)
    }

    /// Replaces the cube with the contents of `path` and clears the filters.
    ///
    /// # Errors
    ///
    /// I/O or snapshot errors; the current cube is kept in that case.
    pub fn load_cube(&mut self, path: &Path) -> Result<String> {
        let snapshot = match read_snapshot(path) {
            Ok(snapshot) => snapshot,
            Err(e) => return self.fail("Load cube", e),
        };
        self.store.load_snapshot(snapshot);

        self.settings.remember_cube(path);
        let message = format!(
            "Cube loaded: {}. Facts: {}",
            file_label(path),
            self.store.facts().len()
        );
        self.log_action("Cube loaded", &message);
        Ok(message)
    }

    /// Replaces the cube with freshly generated demonstration data.
    pub fn generate_sample(&mut self) -> String {
        self.generate_sample_with(&mut rand::rng())
    }

    pub fn generate_sample_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let generated = self.store.generate_sample_data_with(rng);
        let message = format!(
            "Sample data created: {} dimensions and {generated} facts",
            self.store.dimensions().len()
        );
        self.log_action("Sample generated", &message);
        message
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
