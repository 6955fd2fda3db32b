//! # Cubelet - a small OLAP cube for the desktop
//!
//! Cubelet keeps a cube of categorical dimensions and numeric facts in
//! memory, slices it with equality filters and rolls it up by one to three
//! dimensions with `sum`, `avg` or `count`.
//!
//! ```
//! use cubelet::cube::{CubeStore, Measure};
//!
//! let mut store = CubeStore::new();
//! store.add_dimension("REGIÃO", vec!["SUL".into(), "NORTE".into()])?;
//! store.add_fact([("REGIÃO", "SUL")], 120.0);
//! store.add_fact([("REGIÃO", "SUL")], 80.0);
//!
//! let result = store.aggregate(&["REGIÃO"], Measure::Avg)?;
//! assert_eq!(result.value_of(["SUL"]).map(|v| v.as_f64()), Some(100.0));
//! # Ok::<(), cubelet::error::CubeError>(())
//! ```
//!
//! ## Modules
//!
//! - [`cube`]: store, aggregation engine, snapshots, sample data and reports
//! - [`explorer`]: controller, chart layout and the egui window
//! - [`config`]: persisted user settings
//! - [`error`]: the [`error::CubeError`] type
//! - [`logging`]: tracing setup with rolling log files

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod cube;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod theme;
pub mod utils;
