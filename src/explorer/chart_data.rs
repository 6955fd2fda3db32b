//! Chart layout derived from an aggregation result.
//!
//! One grouping dimension gives a bar chart, two give a heatmap and three a
//! rotatable scatter cloud. Everything here is plain data; painting lives in
//! `gui::charts`.

use crate::cube::{AggregationResult, FilterSet, Measure};
use std::collections::{BTreeMap, BTreeSet};

/// Guard added to the value range so a flat result does not divide by zero.
const RANGE_EPSILON: f64 = 1e-9;

/// Marker size bounds for scatter points, before scaling to the screen.
pub const POINT_SIZE_MIN: f64 = 100.0;
pub const POINT_SIZE_SPAN: f64 = 400.0;

/// `"SUM by A, B"`, followed by `"\n(Filters: D: v)"` when a slice is active.
pub fn chart_title(measure: Measure, dimensions: &[String], filters: &FilterSet) -> String {
    let mut title = format!("{} by {}", measure.label(), dimensions.join(", "));
    if !filters.is_empty() {
        title.push_str(&format!("\n(Filters: {})", filters.describe(": ")));
    }
    title
}

/// Maps `value` into `[0, 1]` relative to `min..=max`.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min + RANGE_EPSILON)
}

/// Whether text drawn over `rgb` (components in `0..=1`) should be dark.
pub fn text_is_dark(rgb: [f32; 3]) -> bool {
    let [r, g, b] = rgb;
    0.299 * r + 0.587 * g + 0.114 * b > 0.5
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Magma,
    Plasma,
}

const VIRIDIS: [[f32; 3]; 5] = [
    [0.267, 0.005, 0.329],
    [0.229, 0.322, 0.546],
    [0.128, 0.567, 0.551],
    [0.369, 0.789, 0.383],
    [0.993, 0.906, 0.144],
];

const MAGMA: [[f32; 3]; 5] = [
    [0.001, 0.000, 0.014],
    [0.316, 0.071, 0.485],
    [0.716, 0.215, 0.475],
    [0.987, 0.536, 0.382],
    [0.987, 0.991, 0.750],
];

const PLASMA: [[f32; 3]; 5] = [
    [0.050, 0.030, 0.528],
    [0.494, 0.012, 0.658],
    [0.798, 0.280, 0.470],
    [0.973, 0.585, 0.254],
    [0.940, 0.975, 0.131],
];

impl Colormap {
    /// RGB at position `t`, clamped to `[0, 1]`.
    pub fn sample(self, t: f64) -> [f32; 3] {
        let stops = match self {
            Self::Viridis => &VIRIDIS,
            Self::Magma => &MAGMA,
            Self::Plasma => &PLASMA,
        };
        let last = stops.len() - 1;
        let scaled = t.clamp(0.0, 1.0) as f32 * last as f32;
        let lower = (scaled.floor() as usize).min(last - 1);
        let frac = scaled - lower as f32;

        match (stops.get(lower), stops.get(lower + 1)) {
            (Some(&[ar, ag, ab]), Some(&[br, bg, bb])) => [
                ar + (br - ar) * frac,
                ag + (bg - ag) * frac,
                ab + (bb - ab) * frac,
            ],
            _ => [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarSeries {
    /// Colormap position of bar `index`, spread evenly across the series.
    pub fn color_position(&self, index: usize) -> f64 {
        if self.labels.len() < 2 {
            0.0
        } else {
            index as f64 / (self.labels.len() - 1) as f64
        }
    }
}

/// Dense grid over the first two grouping dimensions. Missing combinations are zero.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapGrid {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<f64>>,
    pub min: f64,
    pub max: f64,
}

impl HeatmapGrid {
    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    pub fn normalized(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPoint {
    /// Index of the point's value on each axis.
    pub position: [usize; 3],
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScatterCloud {
    pub axes: [Vec<String>; 3],
    pub points: Vec<ScatterPoint>,
    pub min: f64,
    pub max: f64,
}

impl ScatterCloud {
    pub fn normalized(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }

    /// Marker size in `[100, 500]`, growing with the value.
    pub fn point_size(&self, value: f64) -> f64 {
        POINT_SIZE_MIN + self.normalized(value) * POINT_SIZE_SPAN
    }

    /// Point position with every axis centred on zero and scaled into `[-0.5, 0.5]`.
    pub fn unit_position(&self, point: &ScatterPoint) -> [f64; 3] {
        let [px, py, pz] = point.position;
        let [ax, ay, az] = &self.axes;
        [
            centred(px, ax.len()),
            centred(py, ay.len()),
            centred(pz, az.len()),
        ]
    }
}

fn centred(index: usize, len: usize) -> f64 {
    let span = len.saturating_sub(1).max(1) as f64;
    (index as f64 - len.saturating_sub(1) as f64 / 2.0) / span
}

/// Camera angles for the scatter cloud, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewAngles {
    pub elevation: f32,
    pub azimuth: f32,
}

impl Default for ViewAngles {
    fn default() -> Self {
        Self {
            elevation: 20.0,
            azimuth: -60.0,
        }
    }
}

impl ViewAngles {
    /// Orthographic projection of `point` to `(screen_x, screen_y, depth)`.
    ///
    /// Screen y grows upwards; larger depth is closer to the viewer.
    pub fn project(self, point: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = point;
        let (sa, ca) = f64::from(self.azimuth).to_radians().sin_cos();
        let (se, ce) = f64::from(self.elevation).to_radians().sin_cos();
        let screen_x = -x * sa + y * ca;
        let screen_y = -x * se * ca - y * se * sa + z * ce;
        let depth = x * ce * ca + y * ce * sa + z * se;
        (screen_x, screen_y, depth)
    }

    /// Applies a mouse drag, keeping elevation within ±90°.
    pub fn rotate(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth = (self.azimuth + delta_azimuth + 180.0).rem_euclid(360.0) - 180.0;
        self.elevation = (self.elevation + delta_elevation).clamp(-90.0, 90.0);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChartData {
    Bar(BarSeries),
    Heatmap(HeatmapGrid),
    Scatter(ScatterCloud),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    pub title: String,
    pub dimensions: Vec<String>,
    pub measure: Measure,
    pub data: ChartData,
}

impl Chart {
    pub fn from_result(result: &AggregationResult, filters: &FilterSet) -> Self {
        let data = match result.dimensions.len() {
            1 => ChartData::Bar(bar_series(result)),
            2 => ChartData::Heatmap(heatmap_grid(result)),
            _ => ChartData::Scatter(scatter_cloud(result)),
        };
        Self {
            title: chart_title(result.measure, &result.dimensions, filters),
            dimensions: result.dimensions.clone(),
            measure: result.measure,
            data,
        }
    }

    pub fn axis_label(&self, axis: usize) -> &str {
        self.dimensions.get(axis).map_or("", String::as_str)
    }
}

fn bar_series(result: &AggregationResult) -> BarSeries {
    BarSeries {
        labels: result.keys().map(ToString::to_string).collect(),
        values: result.iter().map(|row| row.value.as_f64()).collect(),
    }
}

/// Sorted distinct values at `position` of the group keys, with their index.
fn axis_labels(result: &AggregationResult, position: usize) -> BTreeMap<String, usize> {
    let distinct: BTreeSet<&str> = result.keys().filter_map(|k| k.get(position)).collect();
    distinct
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v.to_owned(), i))
        .collect()
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn heatmap_grid(result: &AggregationResult) -> HeatmapGrid {
    let rows = axis_labels(result, 0);
    let columns = axis_labels(result, 1);
    let mut cells = vec![vec![0.0; columns.len()]; rows.len()];

    for row in result {
        let (Some(r), Some(c)) = (
            row.key.get(0).and_then(|v| rows.get(v)),
            row.key.get(1).and_then(|v| columns.get(v)),
        ) else {
            continue;
        };
        if let Some(cell) = cells.get_mut(*r).and_then(|line| line.get_mut(*c)) {
            *cell = row.value.as_f64();
        }
    }

    let (min, max) = value_range(cells.iter().flatten().copied());
    HeatmapGrid {
        rows: rows.into_keys().collect(),
        columns: columns.into_keys().collect(),
        cells,
        min,
        max,
    }
}

fn scatter_cloud(result: &AggregationResult) -> ScatterCloud {
    let axes = [
        axis_labels(result, 0),
        axis_labels(result, 1),
        axis_labels(result, 2),
    ];

    let points: Vec<ScatterPoint> = result
        .iter()
        .filter_map(|row| {
            let [a0, a1, a2] = &axes;
            Some(ScatterPoint {
                position: [
                    *a0.get(row.key.get(0)?)?,
                    *a1.get(row.key.get(1)?)?,
                    *a2.get(row.key.get(2)?)?,
                ],
                value: row.value.as_f64(),
            })
        })
        .collect();

    let (min, max) = value_range(points.iter().map(|p| p.value));
    ScatterCloud {
        axes: axes.map(|labels| labels.into_keys().collect()),
        points,
        min,
        max,
    }
}
