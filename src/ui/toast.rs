//! Toast notifications for connection status and link errors.

use eframe::egui;
use std::time::{Duration, Instant};

use crate::app::{LiveCountsApp, TOAST_DURATION};
use crate::state::ToastType;

/// Final stretch of a toast's lifetime during which it fades out
const TOAST_FADE: Duration = Duration::from_millis(400);

const TOAST_MARGIN: f32 = 20.0;

/// Opacity of a toast `age` after it was raised; `None` once expired
pub fn toast_opacity(age: Duration) -> Option<f32> {
    if age >= TOAST_DURATION {
        return None;
    }
    let remaining = TOAST_DURATION - age;
    if remaining >= TOAST_FADE {
        Some(1.0)
    } else {
        Some(remaining.as_secs_f32() / TOAST_FADE.as_secs_f32())
    }
}

fn glyph(toast_type: ToastType) -> &'static str {
    match toast_type {
        ToastType::Info => "ℹ",
        ToastType::Warning => "⚠",
        ToastType::Error => "✖",
    }
}

fn rgb([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

impl LiveCountsApp {
    /// Draw the current toast in the bottom right corner; click dismisses it
    pub fn render_toast(&mut self, ctx: &egui::Context, now: Instant) {
        let Some((message, raised, toast_type)) = &self.toast_message else {
            return;
        };
        let Some(opacity) = toast_opacity(now.saturating_duration_since(*raised)) else {
            self.toast_message = None;
            return;
        };

        let text = format!("{}  {}", glyph(*toast_type), message);
        let fill = rgb(toast_type.color());
        let text_color = rgb(toast_type.text_color());

        let response = egui::Area::new(egui::Id::new("toast"))
            .anchor(
                egui::Align2::RIGHT_BOTTOM,
                egui::vec2(-TOAST_MARGIN, -TOAST_MARGIN),
            )
            .order(egui::Order::Foreground)
            .sense(egui::Sense::click())
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                egui::Frame::NONE
                    .fill(fill)
                    .corner_radius(6)
                    .inner_margin(egui::Margin::symmetric(14, 10))
                    .show(ui, |ui| {
                        ui.set_max_width(360.0);
                        ui.label(egui::RichText::new(text).color(text_color).size(14.0));
                    });
            })
            .response;

        if response.clicked() {
            self.toast_message = None;
        } else if opacity < 1.0 {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(TOAST_DURATION - TOAST_FADE);
        }
    }
}
