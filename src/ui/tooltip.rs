//! Hover tooltip overlay.

use eframe::egui;
use std::time::Instant;

use crate::app::LiveCountsApp;

impl LiveCountsApp {
    /// Draw the shared tooltip at its latched position and current opacity
    pub fn render_tooltip(&self, ctx: &egui::Context, now: Instant) {
        let opacity = self.tooltip.opacity(now);
        let state = self.tooltip.state();
        let Some(content) = state.content.as_ref() else {
            return;
        };
        if opacity <= 0.0 {
            return;
        }

        egui::Area::new(egui::Id::new("chart_tooltip"))
            .fixed_pos(egui::pos2(state.position.0, state.position.1))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new(&content.label).strong());
                    ui.label(content.detail());
                });
            });
    }
}
