//! Interactive cube explorer.
//!
//! - [`model`]: form state persisted between sessions
//! - [`controller`]: validated actions over the [`crate::cube::CubeStore`]
//! - [`chart_data`]: chart layout for a result
//! - [`gui`]: the egui window

pub mod chart_data;
pub mod controller;
pub mod gui;
pub mod model;

pub use controller::CubeController;
pub use gui::App;
