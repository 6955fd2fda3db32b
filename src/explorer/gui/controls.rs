use super::App;
use crate::cube::{DimensionCatalog, Measure};
use crate::explorer::model::ALL_OPTION;
use crate::theme::{ACCENT_COLOR, SPACING_MEDIUM, SPACING_SMALL, card_frame};
use eframe::egui;
use std::collections::BTreeMap;

fn section_title(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).strong().size(15.0).color(ACCENT_COLOR));
    ui.add_space(SPACING_SMALL);
}

fn accent_button(ui: &mut egui::Ui, text: &str) -> bool {
    ui.add_sized(
        [ui.available_width(), 28.0],
        egui::Button::new(egui::RichText::new(text).strong()),
    )
    .clicked()
}

fn entered(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}

/// One combo box per dimension, writing the pick into `selections`.
fn render_pickers(
    ui: &mut egui::Ui,
    id: &str,
    catalog: &DimensionCatalog,
    selections: &mut BTreeMap<String, String>,
    with_all: bool,
) {
    egui::Grid::new(id)
        .num_columns(2)
        .spacing([SPACING_MEDIUM, 6.0])
        .show(ui, |ui| {
            for dim in catalog {
                ui.label(format!("{}:", dim.name));
                let selected = selections.entry(dim.name.clone()).or_default();
                egui::ComboBox::from_id_salt(format!("{id}_{}", dim.name))
                    .selected_text(selected.as_str())
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        if with_all {
                            ui.selectable_value(selected, ALL_OPTION.to_owned(), ALL_OPTION);
                        }
                        for value in &dim.values {
                            ui.selectable_value(selected, value.clone(), value.as_str());
                        }
                    });
                ui.end_row();
            }
        });
}

pub fn render_data_entry_tab(app: &mut App, ui: &mut egui::Ui) {
    egui::ScrollArea::vertical()
        .id_salt("data_entry_scroll")
        .show(ui, |ui| {
            render_dimension_form(app, ui);
            ui.add_space(SPACING_SMALL);
            render_fact_form(app, ui);
            ui.add_space(SPACING_SMALL);
            render_cube_management(app, ui);
            ui.add_space(SPACING_SMALL);
            render_cube_summary(app, ui);
        });
}

fn render_dimension_form(app: &mut App, ui: &mut egui::Ui) {
    let mut submit = false;
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "1. Dimension Definition");
        egui::Grid::new("dimension_form")
            .num_columns(2)
            .spacing([SPACING_MEDIUM, 6.0])
            .show(ui, |ui| {
                ui.label("Dimension name:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.model.dim_name_input)
                        .hint_text("PRODUTO")
                        .desired_width(f32::INFINITY),
                );
                ui.end_row();

                ui.label("Values (comma separated):");
                let res = ui.add(
                    egui::TextEdit::singleline(&mut app.model.dim_values_input)
                        .hint_text("CAMISA, CALÇA, TENIS")
                        .desired_width(f32::INFINITY),
                );
                submit |= entered(ui, &res);
                ui.end_row();
            });
        ui.add_space(SPACING_SMALL);
        submit |= accent_button(ui, "➕ Add Dimension");
    });
    if submit {
        app.add_dimension();
    }
}

fn render_fact_form(app: &mut App, ui: &mut egui::Ui) {
    let mut submit = false;
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "2. Fact Entry (Sales Records)");

        let catalog = app.controller.store().dimensions();
        if catalog.is_empty() {
            ui.label(egui::RichText::new("Define at least one dimension first.").weak());
        } else {
            render_pickers(
                ui,
                "fact_pickers",
                catalog,
                &mut app.model.fact_selections,
                false,
            );
        }

        ui.add_space(SPACING_SMALL);
        ui.horizontal(|ui| {
            ui.label("Sale value (measure):");
            let res = ui.add(
                egui::TextEdit::singleline(&mut app.model.fact_value_input)
                    .hint_text("199.90")
                    .desired_width(160.0),
            );
            submit |= entered(ui, &res);
        });
        ui.add_space(SPACING_SMALL);
        submit |= accent_button(ui, "➕ Add Fact");
    });
    if submit {
        app.add_fact();
    }
}

#[derive(Clone, Copy)]
enum CubeAction {
    Save,
    Load,
    Sample,
}

fn render_cube_management(app: &mut App, ui: &mut egui::Ui) {
    let mut action = None;
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "3. Cube Management & Sample Data");
        ui.columns(3, |cols| {
            if let [save, load, sample] = cols {
                if accent_button(save, "💾 Save Cube") {
                    action = Some(CubeAction::Save);
                }
                if accent_button(load, "📂 Load Cube") {
                    action = Some(CubeAction::Load);
                }
                if accent_button(sample, "🌱 Generate Sample Data") {
                    action = Some(CubeAction::Sample);
                }
            }
        });
    });

    match action {
        Some(CubeAction::Save) => app.save_cube(),
        Some(CubeAction::Load) => app.load_cube(),
        Some(CubeAction::Sample) => app.generate_sample(),
        None => {}
    }
}

fn render_cube_summary(app: &App, ui: &mut egui::Ui) {
    let store = app.controller.store();
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(
            egui::RichText::new(format!(
                "Cube: {} dimension(s), {} fact(s)",
                store.dimensions().len(),
                store.facts().len()
            ))
            .strong(),
        );
        for dim in store.dimensions() {
            ui.label(format!("• {}: {}", dim.name, dim.values.join(", ")));
        }
    });
}

pub fn render_analysis_tab(app: &mut App, ui: &mut egui::Ui) {
    ui.columns(2, |cols| {
        if let [left, right] = cols {
            egui::ScrollArea::vertical()
                .id_salt("analysis_controls_scroll")
                .show(left, |ui| {
                    render_filter_form(app, ui);
                    ui.add_space(SPACING_SMALL);
                    render_aggregation_form(app, ui);
                });
            super::render_chart(app, right);
        }
    });
}

fn render_filter_form(app: &mut App, ui: &mut egui::Ui) {
    let mut submit = false;
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "4. Filter (Slice & Dice)");

        let catalog = app.controller.store().dimensions();
        if catalog.is_empty() {
            ui.label(egui::RichText::new("The cube has no dimensions yet.").weak());
        } else {
            render_pickers(
                ui,
                "filter_pickers",
                catalog,
                &mut app.model.filter_selections,
                true,
            );
        }

        let active = app.controller.store().filters();
        if !active.is_empty() {
            ui.add_space(SPACING_SMALL);
            ui.label(egui::RichText::new(format!("Active: {}", active.describe(" = "))).weak());
        }
        ui.add_space(SPACING_SMALL);
        submit = accent_button(ui, "🔄 Apply Filters");
    });
    if submit {
        app.apply_filters();
    }
}

fn render_aggregation_form(app: &mut App, ui: &mut egui::Ui) {
    let mut submit = false;
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        section_title(ui, "5. Aggregation & Chart");
        egui::Grid::new("aggregation_form")
            .num_columns(2)
            .spacing([SPACING_MEDIUM, 6.0])
            .show(ui, |ui| {
                ui.label("Dimensions (names, comma):").on_hover_text(
                    "1 to 3 dimension names, e.g. PRODUTO, REGIÃO. Order sets the chart axes.",
                );
                let res = ui.add(
                    egui::TextEdit::singleline(&mut app.model.agg_dims_input)
                        .hint_text("PRODUTO, REGIÃO")
                        .desired_width(f32::INFINITY),
                );
                submit |= entered(ui, &res);
                ui.end_row();

                ui.label("Measure:");
                egui::ComboBox::from_id_salt("measure_picker")
                    .selected_text(app.model.measure.as_str())
                    .show_ui(ui, |ui| {
                        for measure in Measure::ALL {
                            ui.selectable_value(&mut app.model.measure, measure, measure.as_str());
                        }
                    });
                ui.end_row();
            });
        ui.add_space(SPACING_SMALL);
        submit |= accent_button(ui, "📊 Aggregate & Plot");
    });
    if submit {
        app.aggregate();
    }
}
