//! End-to-end cube workflows: load a fixture, slice, roll up, save and reload.

#![expect(clippy::unwrap_used)]

use cubelet::cube::{
    AggregateRequest, CubeStore, Measure, MissingKeyPolicy, aggregate, read_snapshot,
    render_report, write_snapshot,
};
use cubelet::error::CubeError;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use std::path::PathBuf;

fn fixture() -> CubeStore {
    let snapshot = read_snapshot(&PathBuf::from("testdata/shirts.json")).unwrap();
    let mut store = CubeStore::new();
    store.load_snapshot(snapshot);
    store
}

#[test]
fn test_fixture_rolls_up_by_product() {
    let store = fixture();
    assert_eq!(
        store.dimensions().names().collect::<Vec<_>>(),
        vec!["PRODUTO", "REGIÃO"]
    );

    let sum = store.aggregate(&["PRODUTO"], Measure::Sum).unwrap();
    assert_eq!(sum.value_of(["CAMISA"]).unwrap().as_f64(), 300.0);
    assert_eq!(sum.value_of(["CALÇA"]).unwrap().as_f64(), 50.0);

    let avg = store.aggregate(&["PRODUTO"], Measure::Avg).unwrap();
    assert_eq!(avg.value_of(["CAMISA"]).unwrap().as_f64(), 150.0);

    let count = store.aggregate(&["PRODUTO"], Measure::Count).unwrap();
    assert_eq!(count.value_of(["CAMISA"]).unwrap().as_f64(), 2.0);
    assert_eq!(count.value_of(["CALÇA"]).unwrap().as_f64(), 1.0);
}

#[test]
fn test_slice_then_drill_down() {
    let mut store = fixture();
    store.set_filters([("REGIÃO", "SUL")].into_iter().collect());

    let result = store
        .aggregate(&["REGIÃO", "PRODUTO"], Measure::Sum)
        .unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.value_of(["SUL", "CAMISA"]).unwrap().as_f64(), 200.0);
    assert!(result.value_of(["NORTE", "CAMISA"]).is_none());

    let report = render_report(&result, store.filters());
    assert!(report.contains("--- ACTIVE FILTERS: REGIÃO=SUL ---"));
    assert!(report.contains("(SUL, CAMISA): 200.00"));
}

#[test]
fn test_unsold_product_slice_is_empty() {
    let mut store = fixture();
    store.set_filters([("PRODUTO", "TENIS")].into_iter().collect());
    let err = store.aggregate(&["PRODUTO"], Measure::Sum).unwrap_err();
    assert!(matches!(err, CubeError::EmptyResult));
}

#[test]
fn test_save_and_reload_preserves_cube() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("copy.json");
    let store = fixture();

    write_snapshot(&path, &store.export_snapshot())?;
    let mut reloaded = CubeStore::new();
    reloaded.load_snapshot(read_snapshot(&path)?);

    assert_eq!(reloaded.dimensions(), store.dimensions());
    assert_eq!(reloaded.facts(), store.facts());
    Ok(())
}

#[test]
fn test_sample_cube_survives_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample.json");

    let mut store = CubeStore::new();
    store.generate_sample_data_with(&mut StdRng::seed_from_u64(42));
    write_snapshot(&path, &store.export_snapshot())?;

    let mut reloaded = CubeStore::new();
    reloaded.load_snapshot(read_snapshot(&path)?);
    let result = reloaded
        .aggregate(&["PRODUTO", "REGIÃO", "MÊS"], Measure::Count)
        .unwrap();
    let total: f64 = result.iter().map(|row| row.value.as_f64()).sum();
    assert_eq!(total, 75.0);
    Ok(())
}

#[test]
fn test_incomplete_facts_follow_policy() {
    let mut store = fixture();
    store.add_fact([("PRODUTO", "TENIS")], 80.0);

    let reject = AggregateRequest::new(["REGIÃO"], Measure::Sum);
    assert!(matches!(
        aggregate(&store, &reject),
        Err(CubeError::MissingKey { fact_index: 3, .. })
    ));

    let skip = reject.with_missing_keys(MissingKeyPolicy::Skip);
    let result = aggregate(&store, &skip).unwrap();
    assert_eq!(result.excluded_facts, 1);
    assert_eq!(result.matched_facts, 3);
}
