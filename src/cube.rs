//! # The in-memory cube
//!
//! A cube is a catalog of categorical dimensions plus a list of facts. Each
//! fact carries one value per dimension and a single numeric measure. The
//! aggregation engine slices the facts with equality filters, groups the
//! survivors by one to three dimensions and reduces every group with
//! sum, average or count.
//!
//! ```
//! use cubelet::cube::{CubeStore, Measure};
//!
//! let mut store = CubeStore::new();
//! store.add_dimension("PRODUTO", vec!["CAMISA".into(), "CALÇA".into()])?;
//! store.add_fact([("PRODUTO", "CAMISA")], 100.0);
//! store.add_fact([("PRODUTO", "CAMISA")], 200.0);
//! store.add_fact([("PRODUTO", "CALÇA")], 50.0);
//!
//! let result = store.aggregate(&["PRODUTO"], Measure::Sum)?;
//! assert_eq!(result.value_of(["CAMISA"]).map(|v| v.as_f64()), Some(300.0));
//! # Ok::<(), cubelet::error::CubeError>(())
//! ```
//!
//! ## Layout
//!
//! - [`types`]: dimensions, facts, filters and measures
//! - [`store`]: the owned, mutable [`CubeStore`]
//! - [`aggregate`]: filter, group and reduce
//! - [`sample`]: the demonstration data seed
//! - [`snapshot`]: JSON load/save
//! - [`report`]: plain-text rendering of a result

pub mod aggregate;
pub mod report;
pub mod sample;
pub mod snapshot;
pub mod store;
pub mod types;

pub use aggregate::{AggregateRequest, AggregationResult, MissingKeyPolicy, ResultRow, aggregate};
pub use report::render_report;
pub use snapshot::{CubeSnapshot, read_snapshot, write_snapshot};
pub use store::CubeStore;
pub use types::{Dimension, DimensionCatalog, Fact, FilterSet, GroupKey, Measure, MeasureValue};
