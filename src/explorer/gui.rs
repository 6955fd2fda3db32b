//! Desktop window for building, slicing and charting a cube.
//!
//! Two tabs mirror the workflow: "Data & Cube" defines dimensions, appends
//! facts and manages files; "Analysis & Report" applies filters, aggregates
//! and shows the chart for the last result. The activity log sits in a
//! bottom panel shared by both tabs.

use super::chart_data::Chart;
use super::controller::CubeController;
use super::model::{ExplorerModel, Tab};
use crate::config::{AppConfig, AppSettings};
use crate::error::Result;
use eframe::egui;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};

mod charts;
mod controls;
mod log_panel;

pub use charts::render_chart;
pub use controls::{render_analysis_tab, render_data_entry_tab};
use log_panel::render_activity_log;

#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    pub model: ExplorerModel,
    #[serde(skip)]
    pub controller: CubeController,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        crate::theme::apply_cubelet_theme(&cc.egui_ctx);

        let restored = cc
            .storage
            .and_then(|storage| eframe::get_value::<Self>(storage, eframe::APP_KEY));
        let mut app = match restored {
            Some(app) => app,
            None => {
                let mut app = Self::default();
                app.model.measure = settings.default_measure;
                app
            }
        };
        app.controller = CubeController::new(settings);
        app.refresh_pickers();
        app
    }

    fn refresh_pickers(&mut self) {
        self.model
            .sync_with_catalog(self.controller.store().dimensions());
    }

    fn show_outcome(&mut self, outcome: Result<String>) -> bool {
        match outcome {
            Ok(message) => {
                self.model.status = message;
                true
            }
            Err(e) => {
                self.model.status = format!("❌ {e}");
                false
            }
        }
    }

    fn persist_settings(&self) {
        let config = AppConfig {
            settings: self.controller.settings().clone(),
        };
        if let Err(e) = crate::config::save_app_config(&config) {
            log::error!("Failed to save settings: {e:#}");
        }
    }

    pub fn add_dimension(&mut self) {
        let outcome = self
            .controller
            .add_dimension(&self.model.dim_name_input, &self.model.dim_values_input);
        if self.show_outcome(outcome) {
            self.model.dim_name_input.clear();
            self.model.dim_values_input.clear();
            self.refresh_pickers();
        }
    }

    pub fn add_fact(&mut self) {
        let outcome = self
            .controller
            .add_fact(&self.model.fact_selections, &self.model.fact_value_input);
        if self.show_outcome(outcome) {
            self.model.fact_value_input.clear();
        }
    }

    pub fn apply_filters(&mut self) {
        let outcome = self.controller.apply_filters(&self.model.filter_selections);
        if self.show_outcome(outcome) {
            self.model.status.push_str(". Now run the aggregation.");
        }
    }

    pub fn aggregate(&mut self) {
        match self
            .controller
            .aggregate(&self.model.agg_dims_input, self.model.measure)
        {
            Ok(result) => {
                self.model.status = format!(
                    "{} groups from {} facts",
                    result.len(),
                    result.matched_facts
                );
                self.model.chart = Some(Chart::from_result(
                    &result,
                    self.controller.store().filters(),
                ));
            }
            Err(e) => {
                self.model.status = format!("❌ {e}");
                self.model.chart = None;
            }
        }
    }

    pub fn generate_sample(&mut self) {
        self.model.status = self.controller.generate_sample();
        self.model.chart = None;
        self.model.reset_filters();
        self.refresh_pickers();
    }

    pub fn save_cube(&mut self) {
        let Some(path) = cube_dialog().set_file_name("cube.json").save_file()
        else {
            return;
        };
        let outcome = self.controller.save_cube(&path);
        if self.show_outcome(outcome) {
            self.persist_settings();
        }
    }

    pub fn load_cube(&mut self) {
        let Some(path) = cube_dialog().pick_file() else {
            return;
        };
        self.load_cube_from(&path);
    }

    pub fn load_cube_from(&mut self, path: &std::path::Path) {
        let outcome = self.controller.load_cube(path);
        if self.show_outcome(outcome) {
            self.model.chart = None;
            self.model.reset_filters();
            self.refresh_pickers();
            self.persist_settings();
        }
    }

    fn render_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("📂 Open Cube...").clicked() {
                        self.load_cube();
                        ui.close();
                    }
                    if ui.button("💾 Save Cube...").clicked() {
                        self.save_cube();
                        ui.close();
                    }
                    ui.menu_button("Recent", |ui| {
                        let recent = self.controller.settings().recent_cubes.clone();
                        if recent.is_empty() {
                            ui.label("No recent cubes");
                        }
                        for entry in recent {
                            if ui.button(entry.as_str()).clicked() {
                                self.load_cube_from(std::path::Path::new(&entry));
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        if self.model.status.is_empty() {
            return;
        }
        ui.label(
            egui::RichText::new(&self.model.status)
                .color(crate::theme::status_color(&self.model.status)),
        );
    }
}

fn cube_dialog() -> FileDialog {
    FileDialog::new()
        .add_filter("JSON", &["json"])
        .set_directory(crate::utils::standard_paths().cubes_dir)
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_menu(ctx);

        egui::TopBottomPanel::bottom("activity_log_pane")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                ui.add_space(crate::theme::SPACING_TINY);
                render_activity_log(&mut self.controller, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(
                    egui::RichText::new("Multidimensional Sales Analysis (OLAP)")
                        .size(24.0)
                        .strong(),
                );
            });
            ui.add_space(crate::theme::SPACING_SMALL);

            ui.horizontal(|ui| {
                for tab in [Tab::DataEntry, Tab::Analysis] {
                    ui.selectable_value(&mut self.model.tab, tab, tab.title());
                }
            });
            ui.separator();

            self.render_status(ui);
            ui.add_space(crate::theme::SPACING_TINY);

            match self.model.tab {
                Tab::DataEntry => render_data_entry_tab(self, ui),
                Tab::Analysis => render_analysis_tab(self, ui),
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}
