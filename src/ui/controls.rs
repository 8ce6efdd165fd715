//! Chart header: title, observation window size, parameter slider and status.

use eframe::egui;

use crate::app::LiveCountsApp;
use crate::format::{format_grouped, slider_to_k};
use crate::state::ChartKind;

/// Amber used for the inline fetch warning
const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 130, 0);

impl LiveCountsApp {
    /// Render the header row above a chart
    pub fn render_chart_header(&mut self, ui: &mut egui::Ui, kind: ChartKind) {
        let panel = self.panel_mut(kind);
        let window = panel.poll.state().latest_snapshot.positions_in_window;

        ui.horizontal(|ui| {
            ui.heading(&panel.settings.title);
            ui.label(
                egui::RichText::new(format!("{} positions in window", format_grouped(window)))
                    .color(egui::Color32::GRAY),
            );
        });

        let mut new_k = None;
        ui.horizontal(|ui| {
            ui.label("k =");
            let range = panel.settings.slider_min..=panel.settings.slider_max;
            let response = ui.add(
                egui::Slider::new(&mut panel.slider_value, range)
                    .step_by(1.0)
                    .show_value(false),
            );
            let readout = format_grouped(panel.poll.state().parameter_k as f64);
            ui.label(egui::RichText::new(readout).monospace());

            if response.changed() {
                let k = slider_to_k(panel.slider_value);
                if k != panel.poll.state().parameter_k {
                    new_k = Some(k);
                }
            }

            if let Some(error) = panel.poll.last_error() {
                ui.label(egui::RichText::new(format!("⚠ {}", error)).color(WARNING_COLOR))
                    .on_hover_text("Showing the last data received");
            }
        });

        if let Some(k) = new_k {
            self.set_parameter(kind, k);
        }
    }
}
