//! Chart canvas rendering.
//!
//! Bars are painted straight from the reconciler's elements at their current
//! animated appearance. Hover and click handling only produces a
//! [`ChartInteraction`]; the app turns that into tooltip events and link opens.

use eframe::egui;
use std::f32::consts::FRAC_PI_4;
use std::time::Instant;

use crate::app::{ChartPanel, LiveCountsApp};
use crate::format::format_grouped;
use crate::layout::{ChartLayout, ChartScales};
use crate::state::{
    ChartKind, Entry, ToastType, AXIS_TICK_COUNT, BAR_COLOR, BUCKET_Y_TICK_COUNT,
    FREQUENCY_BAR_HEIGHT, HOVER_FILL_OPACITY, IDLE_FILL_OPACITY, LINK_HOVER_COLOR,
};
use crate::tooltip::TooltipEvent;

/// Length of axis tick marks
const TICK_SIZE: f32 = 6.0;

/// Padding between a tick mark and its label
const TICK_PADDING: f32 = 3.0;

const AXIS_FONT_SIZE: f32 = 10.0;
const AXIS_LABEL_FONT_SIZE: f32 = 16.0;
const BAR_LABEL_FONT_SIZE: f32 = 13.0;

/// What the pointer did over a chart this frame
#[derive(Debug, Default)]
pub struct ChartInteraction {
    /// Bar under the pointer, with the pointer position
    pub hovered_bar: Option<(Entry, egui::Pos2)>,
    /// Frequency label link under the pointer
    pub hovered_link: Option<String>,
    /// Frequency label link clicked this frame
    pub clicked_link: Option<String>,
}

impl LiveCountsApp {
    /// Render one chart and process its pointer interaction
    pub fn render_chart(&mut self, ui: &mut egui::Ui, kind: ChartKind, now: Instant) {
        let width = ui.available_width();
        let panel = self.panel_mut(kind);
        panel.sync_viewport(width, now);
        let interaction = paint_chart(ui, panel, now);
        self.apply_interaction(kind, interaction, now);
    }

    /// Turn pointer state into tooltip messages and link opens
    pub fn apply_interaction(
        &mut self,
        kind: ChartKind,
        interaction: ChartInteraction,
        now: Instant,
    ) {
        let ChartInteraction {
            hovered_bar,
            hovered_link,
            clicked_link,
        } = interaction;

        let panel = self.panel_mut(kind);
        panel.hovered_link = hovered_link;

        let previous = panel.hovered.take();
        let current = hovered_bar.as_ref().map(|(entry, _)| entry.label.clone());
        panel.hovered = current.clone();

        if previous != current {
            if previous.is_some() {
                self.tooltip
                    .handle(TooltipEvent::HoverExit { chart: kind }, now);
            }
            if let Some((entry, pointer)) = hovered_bar {
                self.tooltip.handle(
                    TooltipEvent::HoverEnter {
                        chart: kind,
                        entry,
                        pointer: (pointer.x, pointer.y),
                    },
                    now,
                );
            }
        }

        if let Some(label) = clicked_link {
            let url = self.settings.link_for_label(&label);
            tracing::info!("Opening {}", url);
            if let Err(e) = open::that(&url) {
                tracing::error!("Failed to open {}: {}", url, e);
                self.show_toast(&format!("Could not open link: {}", e), ToastType::Error);
            }
        }
    }
}

/// Paint a chart's axes and bars; returns what the pointer did
fn paint_chart(ui: &mut egui::Ui, panel: &ChartPanel, now: Instant) -> ChartInteraction {
    let reconciler = panel.poll.reconciler();
    let layout = reconciler.layout();
    let (response, painter) =
        ui.allocate_painter(egui::vec2(layout.width, layout.height), egui::Sense::click());
    let canvas = response.rect;
    let (left, top) = layout.bars_origin();
    let origin = canvas.min + egui::vec2(left, top);
    let text_color = ui.visuals().text_color();

    match layout.kind {
        ChartKind::Frequency => paint_frequency_axis(
            &painter,
            layout,
            canvas,
            &panel.settings.value_axis_label,
            text_color,
        ),
        ChartKind::Bucket => paint_bucket_axes(&painter, layout, canvas, panel, text_color),
    }

    let mut interaction = ChartInteraction::default();
    let pointer = response.hover_pos();

    // Bars
    for element in reconciler.paint_order(now) {
        let appearance = element.appearance(now);
        let g = appearance.geometry;
        let rect = egui::Rect::from_min_size(
            origin + egui::vec2(g.x, g.y),
            egui::vec2(g.width, g.height),
        );
        let is_hovered =
            !element.is_exiting() && panel.hovered.as_deref() == Some(element.label());
        let emphasis = if is_hovered {
            HOVER_FILL_OPACITY
        } else {
            IDLE_FILL_OPACITY
        };
        painter.rect_filled(rect, 0.0, bar_fill(emphasis * appearance.opacity));
    }

    // Frequency labels are drawn over their bars as links
    if layout.kind == ChartKind::Frequency {
        for element in reconciler.paint_order(now) {
            let appearance = element.appearance(now);
            let g = appearance.geometry;
            let anchor = origin + egui::vec2(g.x, g.y + FREQUENCY_BAR_HEIGHT / 2.0);
            let is_link_hovered =
                !element.is_exiting() && panel.hovered_link.as_deref() == Some(element.label());
            let base = if is_link_hovered {
                let [red, green, blue] = LINK_HOVER_COLOR;
                egui::Color32::from_rgb(red, green, blue)
            } else {
                text_color
            };
            let color = base.gamma_multiply(appearance.opacity);
            let text_rect = painter.text(
                anchor,
                egui::Align2::LEFT_CENTER,
                element.label(),
                egui::FontId::proportional(BAR_LABEL_FONT_SIZE),
                color,
            );
            painter.line_segment(
                [text_rect.left_bottom(), text_rect.right_bottom()],
                egui::Stroke::new(1.0, color),
            );

            if !element.is_exiting() && pointer.is_some_and(|p| text_rect.contains(p)) {
                interaction.hovered_link = Some(element.label().to_string());
            }
        }
    }

    if let Some(p) = pointer {
        let local = p - origin;
        if let Some(element) = reconciler.hit_test(local.x, local.y, now) {
            interaction.hovered_bar = Some((element.entry().clone(), p));
        }
    }

    if interaction.hovered_link.is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        if response.clicked() {
            interaction.clicked_link = interaction.hovered_link.clone();
        }
    }

    interaction
}

fn bar_fill(opacity: f32) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(
        BAR_COLOR[0],
        BAR_COLOR[1],
        BAR_COLOR[2],
        (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Tick label text: integers grouped with commas, fractions as-is
fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format_grouped(value)
    } else {
        format!("{}", (value * 1e6).round() / 1e6)
    }
}

/// Top axis over the horizontal bars, plus its caption at the right edge
fn paint_frequency_axis(
    painter: &egui::Painter,
    layout: &ChartLayout,
    canvas: egui::Rect,
    caption: &str,
    color: egui::Color32,
) {
    let ChartScales::Frequency { x } = &layout.scales else {
        return;
    };
    let stroke = egui::Stroke::new(1.0, color);
    let axis_y = canvas.top() + layout.margins.top - 5.0;
    let axis_left = canvas.left() + layout.margins.left;

    painter.line_segment(
        [
            egui::pos2(axis_left, axis_y),
            egui::pos2(axis_left + layout.plot_width, axis_y),
        ],
        stroke,
    );
    for tick in x.ticks(AXIS_TICK_COUNT) {
        let tx = axis_left + x.map(tick);
        painter.line_segment([egui::pos2(tx, axis_y), egui::pos2(tx, axis_y - TICK_SIZE)], stroke);
        painter.text(
            egui::pos2(tx, axis_y - TICK_SIZE - TICK_PADDING),
            egui::Align2::CENTER_BOTTOM,
            format_tick(tick),
            egui::FontId::proportional(AXIS_FONT_SIZE),
            color,
        );
    }

    painter.text(
        egui::pos2(canvas.left() + layout.width, canvas.top() + layout.margins.top),
        egui::Align2::RIGHT_TOP,
        caption,
        egui::FontId::proportional(AXIS_LABEL_FONT_SIZE),
        color,
    );
}

/// Bottom band axis with slanted labels, left count axis, and both captions
fn paint_bucket_axes(
    painter: &egui::Painter,
    layout: &ChartLayout,
    canvas: egui::Rect,
    panel: &ChartPanel,
    color: egui::Color32,
) {
    let ChartScales::Bucket { x, y } = &layout.scales else {
        return;
    };
    let stroke = egui::Stroke::new(1.0, color);
    let plot_left = canvas.left() + layout.margins.left;
    let plot_top = canvas.top() + layout.margins.top;
    let baseline = plot_top + layout.plot_height;
    let font = egui::FontId::proportional(AXIS_FONT_SIZE);

    // Band axis
    painter.line_segment(
        [
            egui::pos2(plot_left, baseline),
            egui::pos2(plot_left + layout.plot_width, baseline),
        ],
        stroke,
    );
    let bandwidth = x.bandwidth();
    for (i, label) in x.domain().iter().enumerate() {
        let cx = plot_left + x.position_at(i) + bandwidth / 2.0;
        painter.line_segment(
            [egui::pos2(cx, baseline), egui::pos2(cx, baseline + TICK_SIZE)],
            stroke,
        );
        rotated_text_ending_at(
            painter,
            egui::pos2(cx - 7.0, baseline + TICK_SIZE + 3.0),
            label,
            font.clone(),
            color,
            -FRAC_PI_4,
        );
    }

    // Count axis
    let axis_x = plot_left - 5.0;
    painter.line_segment([egui::pos2(axis_x, plot_top), egui::pos2(axis_x, baseline)], stroke);
    for tick in y.ticks(BUCKET_Y_TICK_COUNT) {
        let ty = plot_top + y.map(tick);
        painter.line_segment([egui::pos2(axis_x - TICK_SIZE, ty), egui::pos2(axis_x, ty)], stroke);
        painter.text(
            egui::pos2(axis_x - TICK_SIZE - TICK_PADDING, ty),
            egui::Align2::RIGHT_CENTER,
            format_tick(tick),
            font.clone(),
            color,
        );
    }

    // Captions
    let caption_font = egui::FontId::proportional(AXIS_LABEL_FONT_SIZE);
    painter.text(
        egui::pos2(canvas.left() + layout.width, baseline - 15.0),
        egui::Align2::RIGHT_TOP,
        &panel.settings.label_axis_label,
        caption_font.clone(),
        color,
    );
    rotated_text_ending_at(
        painter,
        egui::pos2(plot_left + 2.0, plot_top),
        &panel.settings.value_axis_label,
        caption_font,
        color,
        -2.0 * FRAC_PI_4,
    );
}

/// Draw `text` rotated by `angle` radians so that it ends at `anchor`
fn rotated_text_ending_at(
    painter: &egui::Painter,
    anchor: egui::Pos2,
    text: &str,
    font: egui::FontId,
    color: egui::Color32,
    angle: f32,
) {
    if text.is_empty() {
        return;
    }
    let galley = painter.layout_no_wrap(text.to_string(), font, color);
    let direction = egui::vec2(angle.cos(), angle.sin());
    let pos = anchor - direction * galley.size().x;
    painter.add(egui::epaint::TextShape::new(pos, galley, color).with_angle(angle));
}
