use crate::error::CubeError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// DIMENSIONS

/// A named categorical axis and its allowed values, in the order they were given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub values: Vec<String>,
}

impl Dimension {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Insertion-ordered set of dimensions keyed by name.
///
/// Serializes as a JSON object whose key order matches the catalog order, so a
/// snapshot written by this crate reads back with the same dimension order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionCatalog {
    entries: Vec<Dimension>,
}

impl DimensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, or replaces its values in place when it already exists.
    ///
    /// Returns the previous value list on overwrite.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) -> Option<Vec<String>> {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|d| d.name == name) {
            return Some(std::mem::replace(&mut existing.values, values));
        }
        self.entries.push(Dimension { name, values });
        None
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|d| d.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a DimensionCatalog {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<N, V> FromIterator<(N, Vec<V>)> for DimensionCatalog
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<V>)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (name, values) in iter {
            catalog.insert(name, values.into_iter().map(Into::into).collect());
        }
        catalog
    }
}

impl Serialize for DimensionCatalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for dim in &self.entries {
            map.serialize_entry(&dim.name, &dim.values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DimensionCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = DimensionCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of dimension name to a list of values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut catalog = DimensionCatalog::new();
                while let Some((name, values)) = access.next_entry::<String, Vec<String>>()? {
                    catalog.insert(name, values);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

// FACTS

/// One observation: a value per dimension plus the measure.
///
/// The value map is deliberately schema-less so that snapshots referencing
/// unknown dimensions (or missing known ones) still load. Completeness is
/// checked by the presentation layer before a fact is added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
    #[serde(rename = "valor")]
    pub measure: f64,
}

impl Fact {
    pub fn new<I, K, V>(values: I, measure: f64) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            measure,
        }
    }

    /// Value for `dimension`, or `None` when the fact never recorded it.
    pub fn value(&self, dimension: &str) -> Option<&str> {
        self.values.get(dimension).map(String::as_str)
    }
}

// FILTERS

/// Equality constraints: dimension name to the single value it must take.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dimension: impl Into<String>, value: impl Into<String>) {
        self.0.insert(dimension.into(), value.into());
    }

    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.0.get(dimension).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(d, v)| (d.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// `"MÊS=JAN, PRODUTO=CAMISA"`, used in log lines and titles.
    pub fn describe(&self, separator: &str) -> String {
        self.iter()
            .map(|(d, v)| format!("{d}{separator}{v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// MEASURES

/// Reduction applied to every group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    #[default]
    Sum,
    Avg,
    Count,
}

impl Measure {
    pub const ALL: [Self; 3] = [Self::Sum, Self::Avg, Self::Count];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Count => "count",
        }
    }

    /// Upper-case label used in titles and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Count => "COUNT",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measure {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "avg" | "average" | "mean" => Ok(Self::Avg),
            "count" => Ok(Self::Count),
            other => Err(CubeError::validation(format!(
                "unknown measure '{other}' (expected sum, avg or count)"
            ))),
        }
    }
}

/// A reduced value: floating point for sum/avg, an integer for count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Number(f64),
    Count(usize),
}

impl MeasureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Count(n) => n as f64,
        }
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => f.write_str(&crate::utils::fmt_thousands(*v, 2)),
            Self::Count(n) => f.write_str(&crate::utils::fmt_thousands(*n as f64, 0)),
        }
    }
}

// GROUP KEYS

/// One value per grouping dimension, in the order the dimensions were requested.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.0.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for GroupKey {
    fn from(parts: Vec<String>) -> Self {
        Self(parts)
    }
}

impl<const N: usize> From<[&str; N]> for GroupKey {
    fn from(parts: [&str; N]) -> Self {
        Self(parts.iter().map(|p| (*p).to_owned()).collect())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => f.write_str(single),
            parts => write!(f, "({})", parts.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_catalog_overwrite_keeps_position() {
        let mut catalog = DimensionCatalog::new();
        catalog.insert("A", vec!["1".to_owned()]);
        catalog.insert("B", vec!["x".to_owned()]);
        let previous = catalog.insert("A", vec!["2".to_owned(), "3".to_owned()]);

        assert_eq!(previous, Some(vec!["1".to_owned()]));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(catalog.get("A").unwrap().values, vec!["2", "3"]);
    }

    #[test]
    fn test_catalog_json_preserves_order() {
        let json = r#"{"ZETA": ["z"], "ALPHA": ["a", "b"], "MID": ["m"]}"#;
        let catalog: DimensionCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["ZETA", "ALPHA", "MID"]
        );

        let back = serde_json::to_string(&catalog).unwrap();
        assert_eq!(back, r#"{"ZETA":["z"],"ALPHA":["a","b"],"MID":["m"]}"#);
    }

    #[test]
    fn test_fact_uses_valor_field() {
        let fact: Fact =
            serde_json::from_str(r#"{"PRODUTO": "CAMISA", "valor": 100}"#).unwrap();
        assert_eq!(fact.value("PRODUTO"), Some("CAMISA"));
        assert_eq!(fact.measure, 100.0);
        assert_eq!(fact.value("REGIÃO"), None);

        let json = serde_json::to_string(&fact).unwrap();
        assert_eq!(json, r#"{"PRODUTO":"CAMISA","valor":100.0}"#);
    }

    #[test]
    fn test_fact_without_valor_is_rejected() {
        let parsed = serde_json::from_str::<Fact>(r#"{"PRODUTO": "CAMISA"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_measure_parsing() {
        assert_eq!("SUM".parse::<Measure>().unwrap(), Measure::Sum);
        assert_eq!(" avg ".parse::<Measure>().unwrap(), Measure::Avg);
        assert_eq!("count".parse::<Measure>().unwrap(), Measure::Count);
        assert!("median".parse::<Measure>().is_err());
    }

    #[test]
    fn test_group_key_display() {
        assert_eq!(GroupKey::from(["CAMISA"]).to_string(), "CAMISA");
        assert_eq!(
            GroupKey::from(["CAMISA", "NORTE"]).to_string(),
            "(CAMISA, NORTE)"
        );
    }

    #[test]
    fn test_filter_describe() {
        let filters: FilterSet = [("MÊS", "JAN"), ("PRODUTO", "CAMISA")].into_iter().collect();
        assert_eq!(filters.describe("="), "MÊS=JAN, PRODUTO=CAMISA");
    }
}
