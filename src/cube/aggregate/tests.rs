#![expect(
    clippy::unwrap_used,
    clippy::panic,
    clippy::expect_used,
    clippy::indexing_slicing
)]
use super::*;
use crate::cube::types::Fact;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

fn shirts() -> CubeStore {
    let mut store = CubeStore::new();
    store
        .add_dimension("PRODUTO", vec!["CAMISA".to_owned(), "CALÇA".to_owned()])
        .unwrap();
    store.add_fact([("PRODUTO", "CAMISA")], 100.0);
    store.add_fact([("PRODUTO", "CAMISA")], 200.0);
    store.add_fact([("PRODUTO", "CALÇA")], 50.0);
    store
}

fn seeded(seed: u64) -> CubeStore {
    let mut store = CubeStore::new();
    store.generate_sample_data_with(&mut StdRng::seed_from_u64(seed));
    store
}

fn number(value: Option<MeasureValue>) -> f64 {
    value.expect("key present").as_f64()
}

#[test]
fn test_sum_by_single_dimension() -> anyhow::Result<()> {
    let result = shirts().aggregate(&["PRODUTO"], Measure::Sum)?;
    assert_eq!(result.len(), 2);
    assert_eq!(number(result.value_of(["CAMISA"])), 300.0);
    assert_eq!(number(result.value_of(["CALÇA"])), 50.0);
    Ok(())
}

#[test]
fn test_avg_by_single_dimension() -> anyhow::Result<()> {
    let result = shirts().aggregate(&["PRODUTO"], Measure::Avg)?;
    assert_eq!(number(result.value_of(["CAMISA"])), 150.0);
    assert_eq!(number(result.value_of(["CALÇA"])), 50.0);
    Ok(())
}

#[test]
fn test_count_is_an_integer() -> anyhow::Result<()> {
    let result = shirts().aggregate(&["PRODUTO"], Measure::Count)?;
    assert_eq!(result.value_of(["CAMISA"]), Some(MeasureValue::Count(2)));
    assert_eq!(result.value_of(["CALÇA"]), Some(MeasureValue::Count(1)));
    Ok(())
}

#[test]
fn test_keys_follow_first_encounter_order() -> anyhow::Result<()> {
    let mut store = CubeStore::new();
    store.add_dimension("L", vec!["a".to_owned(), "b".to_owned(), "c".to_owned()])?;
    for v in ["c", "a", "c", "b", "a"] {
        store.add_fact([("L", v)], 1.0);
    }

    let result = store.aggregate(&["L"], Measure::Count)?;
    let keys: Vec<String> = result.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
    Ok(())
}

#[test]
fn test_key_tuple_follows_request_order() -> anyhow::Result<()> {
    let mut store = CubeStore::new();
    store.add_dimension("A", vec!["a1".to_owned()])?;
    store.add_dimension("B", vec!["b1".to_owned()])?;
    store.add_fact([("A", "a1"), ("B", "b1")], 7.0);

    let result = store.aggregate(&["B", "A"], Measure::Sum)?;
    assert_eq!(result.rows[0].key.parts(), ["b1", "a1"]);
    assert_eq!(result.dimensions, vec!["B", "A"]);
    Ok(())
}

#[test]
fn test_filter_without_matches_is_empty_result() {
    let mut store = shirts();
    store.set_filters([("PRODUTO", "TENIS")].into_iter().collect());

    let err = store.aggregate(&["PRODUTO"], Measure::Sum).unwrap_err();
    assert!(matches!(err, CubeError::EmptyResult));
}

#[test]
fn test_empty_store_is_empty_result() {
    let mut store = CubeStore::new();
    store.add_dimension("A", vec!["x".to_owned()]).unwrap();
    let err = store.aggregate(&["A"], Measure::Count).unwrap_err();
    assert!(matches!(err, CubeError::EmptyResult));
}

#[test]
fn test_filter_restricts_groups() -> anyhow::Result<()> {
    let mut store = shirts();
    store.set_filters([("PRODUTO", "CALÇA")].into_iter().collect());

    let result = store.aggregate(&["PRODUTO"], Measure::Sum)?;
    assert_eq!(result.len(), 1);
    assert_eq!(number(result.value_of(["CALÇA"])), 50.0);
    assert_eq!(result.matched_facts, 1);
    Ok(())
}

#[test]
fn test_request_validation() {
    let store = shirts();
    let none: [&str; 0] = [];
    assert!(matches!(
        store.aggregate(&none, Measure::Sum),
        Err(CubeError::Validation(_))
    ));

    let mut wide = shirts();
    for name in ["B", "C", "D"] {
        wide.add_dimension(name, vec!["x".to_owned()]).unwrap();
    }
    assert!(matches!(
        wide.aggregate(&["PRODUTO", "B", "C", "D"], Measure::Sum),
        Err(CubeError::Validation(_))
    ));
    assert!(matches!(
        store.aggregate(&["PRODUTO", "PRODUTO"], Measure::Sum),
        Err(CubeError::Validation(_))
    ));

    let err = store.aggregate(&["1"], Measure::Sum).unwrap_err();
    assert!(err.to_string().contains("unknown dimension '1'"));
}

#[test]
fn test_missing_group_key_rejected_by_default() {
    let mut store = shirts();
    store.add_dimension("REGIÃO", vec!["SUL".to_owned()]).unwrap();
    // Older facts never got a REGIÃO value
    store.add_fact([("PRODUTO", "CAMISA"), ("REGIÃO", "SUL")], 10.0);

    let err = store.aggregate(&["REGIÃO"], Measure::Sum).unwrap_err();
    match err {
        CubeError::MissingKey {
            fact_index,
            dimension,
        } => {
            assert_eq!(fact_index, 0);
            assert_eq!(dimension, "REGIÃO");
        }
        other => panic!("expected MissingKey, got {other:?}"),
    }
}

#[test]
fn test_missing_group_key_skipped_on_request() -> anyhow::Result<()> {
    let mut store = shirts();
    store.add_dimension("REGIÃO", vec!["SUL".to_owned()])?;
    store.add_fact([("PRODUTO", "CAMISA"), ("REGIÃO", "SUL")], 10.0);

    let request = AggregateRequest::new(["REGIÃO"], Measure::Sum)
        .with_missing_keys(MissingKeyPolicy::Skip);
    let result = aggregate(&store, &request)?;

    assert_eq!(result.excluded_facts, 3);
    assert_eq!(result.matched_facts, 1);
    assert_eq!(number(result.value_of(["SUL"])), 10.0);
    Ok(())
}

#[test]
fn test_missing_filter_key_follows_policy() {
    let mut store = shirts();
    store.add_dimension("MÊS", vec!["JAN".to_owned()]).unwrap();
    store.push_fact(Fact::new([("PRODUTO", "CAMISA"), ("MÊS", "JAN")], 5.0));
    store.set_filters([("MÊS", "JAN")].into_iter().collect());

    let reject = AggregateRequest::new(["PRODUTO"], Measure::Sum);
    assert!(matches!(
        aggregate(&store, &reject),
        Err(CubeError::MissingKey { fact_index: 0, .. })
    ));

    let skip = reject.with_missing_keys(MissingKeyPolicy::Skip);
    let result = aggregate(&store, &skip).unwrap();
    assert_eq!(result.excluded_facts, 3);
    assert_eq!(number(result.value_of(["CAMISA"])), 5.0);
}

#[test]
fn test_everything_skipped_is_empty_result() {
    let mut store = CubeStore::new();
    store.add_dimension("A", vec!["x".to_owned()]).unwrap();
    store.add_fact([("OTHER", "y")], 1.0);

    let request =
        AggregateRequest::new(["A"], Measure::Sum).with_missing_keys(MissingKeyPolicy::Skip);
    assert!(matches!(
        aggregate(&store, &request),
        Err(CubeError::EmptyResult)
    ));
}

#[test]
fn test_counts_add_up_to_filtered_facts() -> anyhow::Result<()> {
    for seed in 0..20 {
        let mut store = seeded(seed);
        store.set_filters([("REGIÃO", "NORTE")].into_iter().collect());
        let expected = store
            .facts()
            .iter()
            .filter(|f| f.value("REGIÃO") == Some("NORTE"))
            .count();

        match store.aggregate(&["PRODUTO", "MÊS"], Measure::Count) {
            Ok(result) => {
                let total: f64 = result.iter().map(|r| r.value.as_f64()).sum();
                assert_eq!(total as usize, expected, "seed {seed}");
            }
            Err(CubeError::EmptyResult) => assert_eq!(expected, 0, "seed {seed}"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[test]
fn test_avg_is_sum_over_count() -> anyhow::Result<()> {
    let store = seeded(42);
    let dims = ["PRODUTO", "REGIÃO"];
    let sums = store.aggregate(&dims, Measure::Sum)?;
    let avgs = store.aggregate(&dims, Measure::Avg)?;
    let counts = store.aggregate(&dims, Measure::Count)?;

    assert_eq!(sums.len(), avgs.len());
    for row in &avgs {
        let sum = number(sums.get(&row.key));
        let count = number(counts.get(&row.key));
        assert!((row.value.as_f64() - sum / count).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_reapplying_filters_is_idempotent() -> anyhow::Result<()> {
    let mut store = seeded(7);
    let unfiltered = store.aggregate(&["PRODUTO"], Measure::Sum)?;
    assert_eq!(unfiltered.matched_facts, 75);

    let filters: FilterSet = [("MÊS", "FEV")].into_iter().collect();
    store.set_filters(filters.clone());
    let first = store.aggregate(&["PRODUTO"], Measure::Sum);
    store.set_filters(filters);
    let second = store.aggregate(&["PRODUTO"], Measure::Sum);

    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a.rows, b.rows),
        (Err(CubeError::EmptyResult), Err(CubeError::EmptyResult)) => {}
        other => panic!("filters gave different outcomes: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_three_dimensional_keys() -> anyhow::Result<()> {
    let store = seeded(3);
    let result = store.aggregate(&["PRODUTO", "REGIÃO", "MÊS"], Measure::Count)?;
    assert!(result.keys().all(|k| k.len() == 3));
    let total: usize = result
        .iter()
        .map(|r| match r.value {
            MeasureValue::Count(n) => n,
            MeasureValue::Number(_) => panic!("count must be integral"),
        })
        .sum();
    assert_eq!(total, 75);
    Ok(())
}
