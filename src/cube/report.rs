use super::aggregate::AggregationResult;
use super::types::FilterSet;

/// Plain-text rendering of a result, as shown in the activity log and by the CLI.
///
/// ```text
/// --- AGGREGATION RESULT: SUM by PRODUTO ---
/// CAMISA: 300.00
/// CALÇA : 50.00
/// ```
pub fn render_report(result: &AggregationResult, filters: &FilterSet) -> String {
    let mut txt = format!(
        "--- AGGREGATION RESULT: {} by {} ---\n",
        result.measure.label(),
        result.dimensions.join(", ")
    );
    if !filters.is_empty() {
        txt.push_str(&format!("--- ACTIVE FILTERS: {} ---\n", filters.describe("=")));
    }

    let keys: Vec<String> = result.keys().map(ToString::to_string).collect();
    let width = keys.iter().map(|k| k.chars().count()).max().unwrap_or(0);
    for (key, row) in keys.iter().zip(result.iter()) {
        txt.push_str(&format!("{key:<width$}: {}\n", row.value));
    }

    if result.excluded_facts > 0 {
        txt.push_str(&format!(
            "--- {} fact(s) skipped: missing dimension values ---\n",
            result.excluded_facts
        ));
    }
    txt
}
