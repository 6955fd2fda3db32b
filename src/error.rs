//! Centralized error handling for cubelet.
//!
//! ## One enum for the library surface
//!
//! Every fallible operation of the cube model returns [`Result<T>`], whose
//! error side is [`CubeError`]. Callers can pattern match to tell a user
//! mistake apart from an empty slice or a broken snapshot:
//!
//! ```
//! use cubelet::error::CubeError;
//!
//! fn describe(err: &CubeError) -> &'static str {
//!     match err {
//!         CubeError::Validation(_) => "fix the input and try again",
//!         CubeError::EmptyResult => "nothing to plot",
//!         CubeError::MissingKey { .. } => "the cube contains incomplete facts",
//!         _ => "unexpected failure",
//!     }
//! }
//! ```
//!
//! ## The `From` Trait for Error Conversion
//!
//! `std::io::Error` and `serde_json::Error` convert automatically, so the `?`
//! operator works inside snapshot and config code:
//!
//! ```no_run
//! use cubelet::error::Result;
//!
//! fn read_raw(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`CubeError`]:
//!
//! ```no_run
//! use cubelet::error::ResultExt;
//!
//! fn load() -> cubelet::error::Result<String> {
//!     std::fs::read_to_string("cube.json").context("Failed to open cube")
//! }
//! ```
//!
//! ## GUI Integration
//!
//! The window only shows strings, so `From<CubeError> for String` exists to
//! let presentation code write `let msg: String = err.into();`.

use std::fmt;

/// Main error type for cube operations.
#[derive(Debug)]
pub enum CubeError {
    /// Malformed user input rejected before any state was touched
    Validation(String),

    /// No fact survived the active filters
    EmptyResult,

    /// A fact lacks a value for a dimension the aggregation needs
    MissingKey {
        /// Position of the fact in the store's fact list
        fact_index: usize,
        /// The dimension that could not be looked up
        dimension: String,
    },

    /// I/O errors (snapshot files, config files)
    Io(std::io::Error),

    /// Snapshot could not be parsed or serialized
    Snapshot(String),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Invalid input: {msg}"),
            Self::EmptyResult => {
                write!(f, "No facts match the current filters and dimensions")
            }
            Self::MissingKey {
                fact_index,
                dimension,
            } => write!(
                f,
                "Fact #{fact_index} has no value for dimension '{dimension}'"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Snapshot(msg) => write!(f, "Snapshot error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CubeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl CubeError {
    /// Shorthand used by every validating entry point.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for errors caused by the user's input rather than the cube itself.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::EmptyResult)
    }
}

impl From<std::io::Error> for CubeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(format!("JSON error: {err}"))
    }
}

impl From<anyhow::Error> for CubeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

// The window reports errors as plain strings
impl From<CubeError> for String {
    fn from(err: CubeError) -> Self {
        err.to_string()
    }
}

/// Result type alias for cube operations.
pub type Result<T> = std::result::Result<T, CubeError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CubeError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CubeError = e.into();
            CubeError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CubeError = e.into();
            CubeError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CubeError::validation("choose 1-3 dimensions");
        assert_eq!(err.to_string(), "Invalid input: choose 1-3 dimensions");
    }

    #[test]
    fn test_missing_key_display_names_fact_and_dimension() {
        let err = CubeError::MissingKey {
            fact_index: 4,
            dimension: "REGIÃO".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Fact #4 has no value for dimension 'REGIÃO'"
        );
    }

    #[test]
    fn test_error_conversion_to_string() {
        let s: String = CubeError::EmptyResult.into();
        assert_eq!(s, "No facts match the current filters and dimensions");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(CubeError::EmptyResult.is_user_error());
        assert!(CubeError::validation("x").is_user_error());
        assert!(!CubeError::Snapshot("bad".to_owned()).is_user_error());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "cube.json",
        ));

        let result: Result<()> = result.context("Failed to read cube");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read cube")
        );
    }
}
