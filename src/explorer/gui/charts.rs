use super::App;
use crate::explorer::chart_data::{
    BarSeries, Chart, ChartData, Colormap, HeatmapGrid, ScatterCloud, ViewAngles, text_is_dark,
};
use crate::theme::{SPACING_SMALL, card_frame};
use crate::utils::fmt_thousands;
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, vec2};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

fn to_color32(rgb: [f32; 3]) -> Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

fn contrast_text(rgb: [f32; 3]) -> Color32 {
    if text_is_dark(rgb) {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

pub fn render_chart(app: &mut App, ui: &mut egui::Ui) {
    card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        let Some(chart) = &app.model.chart else {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(
                    egui::RichText::new("📊 Run an aggregation to see its chart here.").weak(),
                );
            });
            return;
        };

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(&chart.title).strong().size(16.0));
        });
        ui.add_space(SPACING_SMALL);

        match &chart.data {
            ChartData::Bar(bars) => render_bar_chart(ui, chart, bars),
            ChartData::Heatmap(grid) => render_heatmap(ui, chart, grid),
            ChartData::Scatter(cloud) => {
                render_scatter(ui, chart, cloud, &mut app.model.view);
            }
        }
    });
}

fn render_bar_chart(ui: &mut egui::Ui, chart: &Chart, series: &BarSeries) {
    let bars: Vec<Bar> = series
        .labels
        .iter()
        .zip(&series.values)
        .enumerate()
        .map(|(i, (label, &value))| {
            let fill = to_color32(Colormap::Viridis.sample(series.color_position(i)));
            Bar::new(i as f64, value)
                .name(label)
                .width(0.7)
                .fill(fill)
                .stroke(Stroke::new(0.5, fill))
        })
        .collect();

    let labels = series.labels.clone();
    let measure = chart.measure;
    let bar_chart = BarChart::new(measure.label(), bars).element_formatter(Box::new(
        move |bar, _| format!("{}\n{}: {}", bar.name, measure.label(), fmt_thousands(bar.value, 2)),
    ));
    let annotations: Vec<Text> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            Text::new(
                "values",
                PlotPoint::new(i as f64, value),
                egui::RichText::new(fmt_thousands(value, 2))
                    .size(10.0)
                    .color(Color32::GRAY),
            )
            .anchor(Align2::CENTER_BOTTOM)
        })
        .collect();

    Plot::new("aggregation_bar_chart")
        .height(ui.available_height().max(320.0))
        .x_axis_label(chart.axis_label(0).to_owned())
        .y_axis_label(measure.label())
        .x_axis_formatter(move |mark, _range| {
            let rounded = mark.value.round();
            if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
                return String::new();
            }
            labels.get(rounded as usize).cloned().unwrap_or_default()
        })
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(bar_chart);
            for text in annotations {
                plot_ui.text(text);
            }
        });
}

/// Grid painted with row 0 at the bottom, a magma scale and a colour bar on the right.
fn render_heatmap(ui: &mut egui::Ui, chart: &Chart, grid: &HeatmapGrid) {
    let label_width = 110.0;
    let footer_height = 60.0;
    let legend_width = 70.0;
    let n_rows = grid.rows.len().max(1) as f32;
    let n_cols = grid.columns.len().max(1) as f32;

    let width = ui.available_width().max(320.0);
    let height = ui.available_height().max(320.0);
    let (rect, response) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    let plot = Rect::from_min_max(
        rect.min + vec2(label_width, 0.0),
        rect.max - vec2(legend_width, footer_height),
    );
    let cell = vec2(plot.width() / n_cols, plot.height() / n_rows);
    let cell_rect = |r: usize, c: usize| {
        Rect::from_min_size(
            Pos2::new(
                plot.min.x + c as f32 * cell.x,
                plot.max.y - (r as f32 + 1.0) * cell.y,
            ),
            cell,
        )
    };

    for (r, row_label) in grid.rows.iter().enumerate() {
        painter.text(
            Pos2::new(plot.min.x - 6.0, cell_rect(r, 0).center().y),
            Align2::RIGHT_CENTER,
            row_label,
            FontId::proportional(11.0),
            text_color,
        );
        for c in 0..grid.columns.len() {
            let value = grid.cell(r, c).unwrap_or(0.0);
            let rgb = Colormap::Magma.sample(grid.normalized(value));
            let target = cell_rect(r, c);
            painter.rect_filled(target.shrink(0.5), 0.0, to_color32(rgb));
            painter.text(
                target.center(),
                Align2::CENTER_CENTER,
                fmt_thousands(value, 0),
                FontId::proportional(12.0),
                contrast_text(rgb),
            );
            if let Some(pos) = response.hover_pos()
                && target.contains(pos)
            {
                let column = grid.columns.get(c).map_or("", String::as_str);
                response.clone().on_hover_text(format!(
                    "{row_label} × {column}: {}",
                    fmt_thousands(value, 2)
                ));
            }
        }
    }

    for (c, column_label) in grid.columns.iter().enumerate() {
        painter.text(
            Pos2::new(cell_rect(0, c).center().x, plot.max.y + 6.0),
            Align2::CENTER_TOP,
            column_label,
            FontId::proportional(11.0),
            text_color,
        );
    }

    painter.text(
        Pos2::new(plot.center().x, rect.max.y - 6.0),
        Align2::CENTER_BOTTOM,
        chart.axis_label(1),
        FontId::proportional(13.0),
        text_color,
    );
    painter.text(
        Pos2::new(rect.min.x + 4.0, plot.min.y),
        Align2::LEFT_TOP,
        chart.axis_label(0),
        FontId::proportional(13.0),
        text_color,
    );

    let legend = Rect::from_min_max(
        Pos2::new(plot.max.x + 14.0, plot.min.y),
        Pos2::new(plot.max.x + 30.0, plot.max.y),
    );
    render_colour_bar(
        &painter,
        legend,
        Colormap::Magma,
        (grid.min, grid.max),
        text_color,
    );
}

fn render_colour_bar(
    painter: &egui::Painter,
    rect: Rect,
    colormap: Colormap,
    (min, max): (f64, f64),
    text_color: Color32,
) {
    let steps = 48;
    let step_height = rect.height() / steps as f32;
    for i in 0..steps {
        let t = f64::from(i) / f64::from(steps - 1);
        let band = Rect::from_min_size(
            Pos2::new(rect.min.x, rect.max.y - (i as f32 + 1.0) * step_height),
            vec2(rect.width(), step_height + 0.5),
        );
        painter.rect_filled(band, 0.0, to_color32(colormap.sample(t)));
    }
    for (value, pos, anchor) in [
        (max, rect.right_top(), Align2::LEFT_TOP),
        (min, rect.right_bottom(), Align2::LEFT_BOTTOM),
    ] {
        painter.text(
            pos + vec2(4.0, 0.0),
            anchor,
            fmt_thousands(value, 0),
            FontId::proportional(10.0),
            text_color,
        );
    }
}

/// 3D cloud under an orthographic camera. Dragging rotates the view.
fn render_scatter(ui: &mut egui::Ui, chart: &Chart, cloud: &ScatterCloud, view: &mut ViewAngles) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                "Drag to rotate · elev {:.0}° azim {:.0}°",
                view.elevation, view.azimuth
            ))
            .weak()
            .small(),
        );
        if ui.small_button("Reset view").clicked() {
            *view = ViewAngles::default();
        }
    });

    let width = ui.available_width().max(320.0);
    let height = ui.available_height().max(360.0);
    let (rect, response) = ui.allocate_exact_size(vec2(width, height), Sense::drag());
    if response.dragged() {
        let delta = response.drag_delta();
        view.rotate(-delta.x * 0.5, delta.y * 0.5);
    }

    let angles = *view;
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let scale = f64::from(rect.width().min(rect.height())) * 0.75;
    let centre = rect.center();
    let to_screen = |p: [f64; 3]| {
        let (x, y, depth) = angles.project(p);
        (
            Pos2::new(
                centre.x + (x * scale) as f32,
                centre.y - (y * scale) as f32,
            ),
            depth,
        )
    };

    let origin = [-0.5, -0.5, -0.5];
    let axis_ends = [[0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, 0.5]];
    let axis_stroke = Stroke::new(1.0, ui.visuals().weak_text_color());
    for (axis, end) in axis_ends.iter().enumerate() {
        painter.line_segment([to_screen(origin).0, to_screen(*end).0], axis_stroke);
        painter.text(
            to_screen(end.map(|v| v * 1.15)).0,
            Align2::CENTER_CENTER,
            chart.axis_label(axis),
            FontId::proportional(12.0),
            text_color,
        );
    }
    render_scatter_ticks(&painter, cloud, &to_screen, text_color);

    let mut projected: Vec<(Pos2, f64, f64)> = cloud
        .points
        .iter()
        .map(|point| {
            let (pos, depth) = to_screen(cloud.unit_position(point));
            (pos, depth, point.value)
        })
        .collect();
    projected.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (pos, _, value) in projected {
        let fill = to_color32(Colormap::Plasma.sample(cloud.normalized(value)));
        let radius = (cloud.point_size(value).sqrt() / 2.0) as f32;
        painter.circle(
            pos,
            radius,
            fill.gamma_multiply(0.8),
            Stroke::new(0.5, Color32::WHITE),
        );
        painter.text(
            pos - vec2(0.0, radius + 2.0),
            Align2::CENTER_BOTTOM,
            fmt_thousands(value, 0),
            FontId::proportional(10.0),
            text_color,
        );
    }
}

fn render_scatter_ticks(
    painter: &egui::Painter,
    cloud: &ScatterCloud,
    to_screen: &dyn Fn([f64; 3]) -> (Pos2, f64),
    text_color: Color32,
) {
    for (axis, labels) in cloud.axes.iter().enumerate() {
        let count = labels.len();
        let span = count.saturating_sub(1).max(1) as f64;
        for (i, label) in labels.iter().enumerate() {
            let t = (i as f64 - count.saturating_sub(1) as f64 / 2.0) / span;
            let point = match axis {
                0 => [t, -0.5, -0.5],
                1 => [-0.5, t, -0.5],
                _ => [-0.5, -0.5, t],
            };
            painter.text(
                to_screen(point).0 + vec2(0.0, 10.0),
                Align2::CENTER_TOP,
                label,
                FontId::proportional(9.0),
                text_color,
            );
        }
    }
}
