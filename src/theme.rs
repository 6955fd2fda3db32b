use eframe::egui;
use egui::{Color32, CornerRadius, Margin, Stroke};

pub const ACCENT_COLOR: Color32 = Color32::from_rgb(38, 132, 200);

pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(102, 187, 106);
pub const ERROR_COLOR: Color32 = Color32::from_rgb(229, 83, 83);

// Spacing constants
pub const SPACING_TINY: f32 = 4.0;
pub const SPACING_SMALL: f32 = 8.0;
pub const SPACING_MEDIUM: f32 = 12.0;

pub const MARGIN_CARD: f32 = 15.0;

pub fn apply_cubelet_theme(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();

    visuals.widgets.active.bg_fill = ACCENT_COLOR;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(27, 104, 163);
    visuals.widgets.hovered.corner_radius = CornerRadius::same(6);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(45, 45, 48);
    visuals.widgets.inactive.corner_radius = CornerRadius::same(6);

    visuals.widgets.noninteractive.corner_radius = CornerRadius::same(6);

    visuals.selection.bg_fill = ACCENT_COLOR.linear_multiply(0.4);

    visuals.window_corner_radius = CornerRadius::same(12);
    visuals.faint_bg_color = Color32::from_rgb(35, 35, 38);
    visuals.extreme_bg_color = Color32::from_rgb(20, 20, 22);

    ctx.set_visuals(visuals);
}

pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .corner_radius(CornerRadius::same(10))
        .inner_margin(Margin::same(MARGIN_CARD as i8))
        .stroke(Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
}

/// Status line colour: red for messages that start with an error marker.
pub fn status_color(status: &str) -> Color32 {
    if status.starts_with("Error") || status.starts_with('❌') {
        ERROR_COLOR
    } else {
        SUCCESS_COLOR
    }
}
