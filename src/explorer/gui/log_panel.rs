use crate::explorer::controller::CubeController;
use eframe::egui;

pub fn render_activity_log(controller: &mut CubeController, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.heading("📜 Log & Aggregation Results");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("🗑 Clear").on_hover_text("Wipe history").clicked() {
                controller.clear_activity_log();
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("activity_log_grid")
                .num_columns(3)
                .spacing([15.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for entry in controller.activity_log() {
                        ui.label(entry.timestamp.format("[%H:%M:%S]").to_string());
                        ui.label(egui::RichText::new(&entry.action).strong());
                        ui.label(egui::RichText::new(&entry.details).monospace());
                        ui.end_row();
                    }
                });
        });
}
