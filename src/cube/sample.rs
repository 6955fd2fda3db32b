//! Demonstration data seed: a small retail cube with three dimensions.

use super::snapshot::CubeSnapshot;
use super::types::{DimensionCatalog, Fact};
use rand::Rng;
use rand::seq::IndexedRandom as _;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Facts generated by every seed.
pub const SAMPLE_FACT_COUNT: usize = 75;

/// Closed interval the random measure is drawn from.
pub const SAMPLE_MEASURE_RANGE: RangeInclusive<f64> = 50.0..=500.0;

const SAMPLE_DIMENSIONS: [(&str, &[&str]); 3] = [
    ("PRODUTO", &["CAMISA", "CALÇA", "TENIS", "BERMUDA"]),
    ("REGIÃO", &["NORTE", "SUL", "LESTE", "OESTE", "CENTRO"]),
    ("MÊS", &["JAN", "FEV", "MAR", "ABR", "MAI"]),
];

pub fn sample_catalog() -> DimensionCatalog {
    SAMPLE_DIMENSIONS
        .iter()
        .map(|(name, values)| (*name, values.to_vec()))
        .collect()
}

/// Builds a fresh demonstration cube.
///
/// Every fact picks each dimension value uniformly and a measure uniformly
/// from [`SAMPLE_MEASURE_RANGE`], rounded to cents.
pub fn sample_cube<R: Rng + ?Sized>(rng: &mut R) -> CubeSnapshot {
    let dimensions = sample_catalog();
    let facts = (0..SAMPLE_FACT_COUNT)
        .map(|_| {
            let values: BTreeMap<String, String> = dimensions
                .iter()
                .filter_map(|dim| {
                    dim.values
                        .choose(rng)
                        .map(|value| (dim.name.clone(), value.clone()))
                })
                .collect();
            let measure = round_cents(rng.random_range(SAMPLE_MEASURE_RANGE));
            Fact { values, measure }
        })
        .collect();

    CubeSnapshot { dimensions, facts }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
