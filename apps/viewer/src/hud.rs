//! The fixed performance overlay panel.
//!
//! Anchored top-left, refreshed from the once-per-second snapshot, and
//! non-interactive: it never intercepts pointer input.

use atrium_stats::StatsSnapshot;
use egui::{Align2, Color32, Context, RichText};

const PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(10, 10, 10, 217);
const VALUE_GREEN: Color32 = Color32::from_rgb(0, 255, 0);
const VALUE_GREEN_DIM: Color32 = Color32::from_rgba_premultiplied(0, 128, 0, 128);
const BACKEND_BLUE: Color32 = Color32::from_rgb(96, 165, 250);
const BACKEND_AMBER: Color32 = Color32::from_rgb(251, 191, 36);
const LABEL_GRAY: Color32 = Color32::from_rgba_premultiplied(153, 153, 153, 153);

/// Draw the overlay. `adapter_backend` is the live adapter's API name;
/// `modern` selects the accent color for the pipeline row.
pub fn draw(ctx: &Context, snapshot: Option<&StatsSnapshot>, adapter_backend: &str, modern: bool) {
    let stats = snapshot.copied().unwrap_or(StatsSnapshot {
        fps: 0,
        fps_min: 0,
        fps_max: 0,
        frame_time_ms: 0.0,
        cpu_time_ms: 0.0,
        draw_calls: 0,
        triangles: 0,
        geometries: 0,
        textures: 0,
        materials: 0,
    });

    egui::Area::new(egui::Id::new("stats_overlay"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(PANEL_FILL)
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    ui.set_width(220.0);

                    section(ui, "ENGINE PERFORMANCE");
                    stat_row(
                        ui,
                        "FPS MINIMAX",
                        format!("{} [{}-{}]", stats.fps, stats.fps_min, stats.fps_max),
                        VALUE_GREEN,
                    );
                    stat_row(
                        ui,
                        "FRAME TIME",
                        format!("{:.2}ms", stats.frame_time_ms),
                        VALUE_GREEN,
                    );
                    stat_row(
                        ui,
                        "CPU TIME",
                        format!("{:.2}ms", stats.cpu_time_ms),
                        VALUE_GREEN_DIM,
                    );
                    stat_row(
                        ui,
                        "GPU PIPELINE",
                        adapter_backend.to_uppercase(),
                        if modern { BACKEND_BLUE } else { BACKEND_AMBER },
                    );
                    stat_row(ui, "DRAW CALLS", stats.draw_calls.to_string(), VALUE_GREEN);
                    stat_row(ui, "TRIANGLES", group_thousands(stats.triangles), VALUE_GREEN);

                    ui.add_space(6.0);
                    ui.separator();
                    ui.add_space(2.0);

                    section(ui, "MEMORY & ASSETS");
                    stat_row(ui, "GEOMETRIES", stats.geometries.to_string(), VALUE_GREEN);
                    stat_row(ui, "TEXTURES", stats.textures.to_string(), VALUE_GREEN);
                    stat_row(ui, "MATERIALS", stats.materials.to_string(), VALUE_GREEN);
                });
        });
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.label(
        RichText::new(title)
            .monospace()
            .size(12.0)
            .strong()
            .color(Color32::WHITE),
    );
    ui.add_space(4.0);
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: String, color: Color32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).monospace().size(11.0).color(LABEL_GRAY));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(value)
                    .monospace()
                    .size(11.0)
                    .strong()
                    .color(color),
            );
        });
    });
}

/// Format an integer with thousands separators, e.g. 10000 -> "10,000".
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(123), "123");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(10_000), "10,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
