//! # Cubelet entry point
//!
//! ```text
//! main()
//!   ├─> logging::init() (falls back to env_logger)
//!   ├─> parse CLI arguments (clap)
//!   ├─> command given: run it and exit
//!   └─> otherwise: open the explorer window (eframe)
//! ```
//!
//! ```bash
//! cubelet sample --output shop.json
//! cubelet aggregate --cube shop.json --by PRODUTO,REGIÃO --measure avg
//! cubelet            # launches the GUI
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cli;

use anyhow::Result;
use clap::Parser as _;
use cubelet::config::load_app_config;
use cubelet::explorer::App;
use eframe::egui;

fn main() -> Result<()> {
    if let Err(e) = cubelet::logging::init() {
        // File logging is optional; keep console output working
        env_logger::init();
        log::warn!("File logging unavailable: {e:#}");
    }

    let cli = cli::Cli::parse();
    if let Some(command) = cli.command {
        return cli::run_command(command);
    }

    let settings = load_app_config().settings;
    tracing::info!("Launching explorer window");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cubelet: Multidimensional Sales Analysis (OLAP)")
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "cubelet",
        native_options,
        Box::new(|cc| Ok(Box::new(App::new(cc, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
