//! Tests for the shared tooltip controller
//!
//! Tests cover:
//! - Show on hover-enter with latched content and position
//! - Fade in and out
//! - Ownership between the two charts

use std::time::{Duration, Instant};

use livecounts::state::{ChartKind, Entry};
use livecounts::tooltip::{TooltipController, TooltipEvent, TOOLTIP_OFFSET_Y, TOOLTIP_OPACITY};

const FADE: Duration = Duration::from_millis(50);

fn enter(chart: ChartKind, label: &str, count: f64) -> TooltipEvent {
    TooltipEvent::HoverEnter {
        chart,
        entry: Entry::new(label, count),
        pointer: (100.0, 200.0),
    }
}

#[test]
fn test_hover_enter_shows_entry() {
    let now = Instant::now();
    let mut tooltip = TooltipController::new(FADE);

    assert!(tooltip.handle(enter(ChartKind::Frequency, "rust", 42.0), now));

    let state = tooltip.state();
    assert!(state.visible);
    let content = state.content.as_ref().unwrap();
    assert_eq!(content.label, "rust");
    assert_eq!(content.detail(), "Approximate Count: 42");
    assert_eq!(state.position, (100.0, 200.0 - TOOLTIP_OFFSET_Y));
    assert_eq!(tooltip.owner(), Some(ChartKind::Frequency));
}

#[test]
fn test_fades_in_and_out() {
    let now = Instant::now();
    let mut tooltip = TooltipController::new(FADE);

    assert_eq!(tooltip.opacity(now), 0.0);
    tooltip.handle(enter(ChartKind::Bucket, "1 BTC", 3.0), now);
    assert!(tooltip.is_animating(now));
    assert_eq!(tooltip.opacity(now + FADE), TOOLTIP_OPACITY);
    assert!(!tooltip.is_animating(now + FADE));

    let later = now + FADE * 2;
    tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Bucket }, later);
    assert!(!tooltip.state().visible);
    assert_eq!(tooltip.opacity(later + FADE), 0.0);

    // Content stays latched while fading out
    assert_eq!(tooltip.state().content.as_ref().unwrap().label, "1 BTC");
}

#[test]
fn test_new_hover_replaces_content() {
    let now = Instant::now();
    let mut tooltip = TooltipController::new(FADE);

    tooltip.handle(enter(ChartKind::Frequency, "a", 1.0), now);
    tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Frequency }, now);
    tooltip.handle(enter(ChartKind::Frequency, "b", 2.0), now);

    assert!(tooltip.state().visible);
    assert_eq!(tooltip.state().content.as_ref().unwrap().label, "b");
}

#[test]
fn test_exit_from_other_chart_is_ignored() {
    let now = Instant::now();
    let mut tooltip = TooltipController::new(FADE);

    tooltip.handle(enter(ChartKind::Bucket, "5 BTC", 9.0), now);
    let handled = tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Frequency }, now);

    assert!(!handled);
    assert!(tooltip.state().visible);
    assert_eq!(tooltip.owner(), Some(ChartKind::Bucket));
    assert_eq!(tooltip.state().content.as_ref().unwrap().label, "5 BTC");
}

#[test]
fn test_hover_moves_between_charts() {
    let now = Instant::now();
    let mut tooltip = TooltipController::new(FADE);

    tooltip.handle(enter(ChartKind::Frequency, "rust", 1.0), now);
    tooltip.handle(enter(ChartKind::Bucket, "2 BTC", 4.0), now);
    assert_eq!(tooltip.owner(), Some(ChartKind::Bucket));

    // A late exit from the first chart leaves the second chart's tooltip alone
    assert!(!tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Frequency }, now));
    assert!(tooltip.state().visible);

    assert!(tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Bucket }, now));
    assert!(!tooltip.state().visible);
}

#[test]
fn test_exit_without_tooltip_is_noop() {
    let now = Instant::now();
    let mut tooltip = TooltipController::default();

    assert!(!tooltip.handle(TooltipEvent::HoverExit { chart: ChartKind::Frequency }, now));
    assert!(tooltip.state().content.is_none());
}
