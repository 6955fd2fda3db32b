//! JSON snapshot of a cube.
//!
//! ```json
//! {
//!     "dimensions": { "PRODUTO": ["CAMISA", "CALÇA"] },
//!     "facts": [ { "PRODUTO": "CAMISA", "valor": 100.0 } ]
//! }
//! ```
//!
//! Facts are not checked against the catalog on load. Reading always parses
//! the whole file before anything is handed to a store, so a broken file can
//! never leave a cube half replaced.

use super::types::{DimensionCatalog, Fact};
use crate::error::{CubeError, Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CubeSnapshot {
    #[serde(default)]
    pub dimensions: DimensionCatalog,
    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl CubeSnapshot {
    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// [`CubeError::Snapshot`] when the text is not a valid snapshot.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty JSON with four-space indentation.
    ///
    /// # Errors
    ///
    /// [`CubeError::Snapshot`] if serialization fails (non-finite measures).
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| CubeError::Snapshot(e.to_string()))
    }
}

/// Reads and parses a snapshot file.
///
/// # Errors
///
/// I/O failures or an invalid snapshot, with the path in the message.
pub fn read_snapshot(path: &Path) -> Result<CubeSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    CubeSnapshot::from_json(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes a snapshot file, replacing any existing content.
///
/// # Errors
///
/// I/O failures, with the path in the message.
pub fn write_snapshot(path: &Path, snapshot: &CubeSnapshot) -> Result<()> {
    let json = snapshot.to_json()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    tracing::info!(path = %path.display(), facts = snapshot.facts.len(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, clippy::indexing_slicing)]
    use super::*;

    const SHIRTS: &str = r#"{
        "dimensions": {"PRODUTO": ["CAMISA", "CALÇA"], "REGIÃO": ["SUL"]},
        "facts": [
            {"PRODUTO": "CAMISA", "REGIÃO": "SUL", "valor": 100},
            {"PRODUTO": "CALÇA", "valor": 50.5},
            {"COR": "AZUL", "valor": 1}
        ]
    }"#;

    #[test]
    fn test_parse_keeps_unvalidated_facts() {
        let snapshot = CubeSnapshot::from_json(SHIRTS).unwrap();
        assert_eq!(snapshot.dimensions.len(), 2);
        assert_eq!(snapshot.facts.len(), 3);
        assert_eq!(snapshot.facts[1].value("REGIÃO"), None);
        assert_eq!(snapshot.facts[2].value("COR"), Some("AZUL"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = CubeSnapshot::from_json("{}").unwrap();
        assert!(snapshot.dimensions.is_empty());
        assert!(snapshot.facts.is_empty());
    }

    #[test]
    fn test_invalid_snapshot_is_reported() {
        let err = CubeSnapshot::from_json(r#"{"facts": [{"PRODUTO": "CAMISA"}]}"#).unwrap_err();
        assert!(matches!(err, CubeError::Snapshot(_)));
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let snapshot = CubeSnapshot::from_json(SHIRTS).unwrap();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\n    \"dimensions\": {"));
        assert_eq!(CubeSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cube.json");
        let snapshot = CubeSnapshot::from_json(SHIRTS).unwrap();

        write_snapshot(&path, &snapshot).unwrap();
        let back = read_snapshot(&path).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(
            back.dimensions.names().collect::<Vec<_>>(),
            vec!["PRODUTO", "REGIÃO"]
        );
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = read_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
