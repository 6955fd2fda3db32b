use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Formats `value` with `,` thousands separators and a fixed number of decimals.
///
/// `fmt_thousands(1234567.891, 2)` gives `"1,234,567.89"`.
pub fn fmt_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "—".to_owned();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Splits a comma-separated input field, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Local>,
    pub action: String,
    pub details: String,
}

/// Appends an entry to an activity log, dropping the oldest beyond `capacity`.
pub fn push_audit_log(log: &mut Vec<AuditEntry>, capacity: usize, action: &str, details: &str) {
    log.push(AuditEntry {
        timestamp: Local::now(),
        action: action.to_owned(),
        details: details.to_owned(),
    });
    if log.len() > capacity {
        let excess = log.len() - capacity;
        log.drain(0..excess);
    }
}

pub struct StandardPaths {
    pub base_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub cubes_dir: PathBuf,
}

/// Platform data locations, e.g. `~/.local/share/cubelet` on Linux.
///
/// Falls back to the working directory when the platform has no data dir.
pub fn standard_paths() -> StandardPaths {
    let base_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cubelet");
    StandardPaths {
        logs_dir: base_dir.join("logs"),
        cubes_dir: base_dir.join("cubes"),
        base_dir,
    }
}
