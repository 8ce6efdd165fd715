//! Main application state and eframe::App implementation.

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

use crate::format::k_to_slider;
use crate::poll::{PollLoop, PollOutcome};
use crate::settings::{ChartSettings, Settings};
use crate::source::{HttpSource, SnapshotSource};
use crate::state::{ChartKind, ToastType};
use crate::tooltip::{TooltipController, TooltipEvent};

/// Viewport width assumed until the first frame measures the real one
const INITIAL_VIEWPORT_WIDTH: f32 = 800.0;

/// Width changes smaller than this do not trigger a re-layout
const RESIZE_EPSILON: f32 = 0.5;

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// One chart on the dashboard together with its UI-only state
pub struct ChartPanel {
    pub poll: PollLoop,
    pub settings: ChartSettings,
    /// Slider position, `k = 10^slider_value`
    pub slider_value: f64,
    /// Label of the bar under the pointer
    pub hovered: Option<String>,
    /// Label whose link text is under the pointer (frequency chart)
    pub hovered_link: Option<String>,
    /// True while the endpoint keeps failing
    pub failing: bool,
}

impl ChartPanel {
    pub fn new(poll: PollLoop, settings: ChartSettings) -> Self {
        let slider_value = k_to_slider(poll.state().parameter_k);
        Self {
            poll,
            settings,
            slider_value,
            hovered: None,
            hovered_link: None,
            failing: false,
        }
    }

    /// Re-layout without fetching when the available width changed
    pub fn sync_viewport(&mut self, width: f32, now: Instant) {
        if (self.poll.state().viewport_width - width).abs() > RESIZE_EPSILON {
            tracing::debug!("Resizing {} chart to {:.0}px", self.poll.kind(), width);
            if let Err(e) = self.poll.on_resize(width, now) {
                tracing::warn!("Re-layout of {} chart failed: {}", self.poll.kind(), e);
            }
        }
    }
}

/// Main application state
pub struct LiveCountsApp {
    pub(crate) settings: Settings,
    /// Where settings changes are written; `None` keeps them in memory
    pub(crate) settings_path: Option<PathBuf>,
    pub(crate) frequency: ChartPanel,
    pub(crate) bucket: ChartPanel,
    /// Single tooltip shared by both charts
    pub(crate) tooltip: TooltipController,
    /// Toast messages for user feedback
    pub(crate) toast_message: Option<(String, Instant, ToastType)>,
}

impl LiveCountsApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load();
        let frequency_source: Arc<dyn SnapshotSource> = Arc::new(HttpSource::new(
            &settings.server_url,
            &settings.frequency.endpoint,
            settings.request_timeout(),
        ));
        let bucket_source: Arc<dyn SnapshotSource> = Arc::new(HttpSource::new(
            &settings.server_url,
            &settings.bucket.endpoint,
            settings.request_timeout(),
        ));

        let mut app = Self::with_sources(settings, frequency_source, bucket_source);
        app.settings_path = Settings::get_settings_path();

        let ctx = cc.egui_ctx.clone();
        let waker: crate::poll::Waker = Arc::new(move || ctx.request_repaint());
        app.frequency.poll.set_waker(Arc::clone(&waker));
        app.bucket.poll.set_waker(waker);

        let now = Instant::now();
        app.frequency.poll.start(now);
        app.bucket.poll.start(now);

        app
    }

    /// Build the app around explicit data sources; polling is not started
    pub fn with_sources(
        settings: Settings,
        frequency_source: Arc<dyn SnapshotSource>,
        bucket_source: Arc<dyn SnapshotSource>,
    ) -> Self {
        let frequency = PollLoop::new(
            ChartKind::Frequency,
            frequency_source,
            &settings.poll_config(ChartKind::Frequency),
            INITIAL_VIEWPORT_WIDTH,
        );
        let bucket = PollLoop::new(
            ChartKind::Bucket,
            bucket_source,
            &settings.poll_config(ChartKind::Bucket),
            INITIAL_VIEWPORT_WIDTH,
        );

        Self {
            tooltip: TooltipController::new(settings.tooltip_fade()),
            frequency: ChartPanel::new(frequency, settings.frequency.clone()),
            bucket: ChartPanel::new(bucket, settings.bucket.clone()),
            settings,
            settings_path: None,
            toast_message: None,
        }
    }

    /// Persist settings changes to `path` from now on
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Change a chart's `k`, fetch right away and remember it for next launch
    pub fn set_parameter(&mut self, kind: ChartKind, k: u64) {
        tracing::info!("Setting {} chart parameter k={}", kind, k);
        let panel = self.panel_mut(kind);
        panel.poll.set_parameter(k);
        panel.settings.initial_k = k;
        self.settings.chart_mut(kind).initial_k = k;

        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save_to(path) {
                tracing::warn!("Failed to save settings: {:#}", e);
            }
        }
    }

    pub fn panel(&self, kind: ChartKind) -> &ChartPanel {
        match kind {
            ChartKind::Frequency => &self.frequency,
            ChartKind::Bucket => &self.bucket,
        }
    }

    pub fn panel_mut(&mut self, kind: ChartKind) -> &mut ChartPanel {
        match kind {
            ChartKind::Frequency => &mut self.frequency,
            ChartKind::Bucket => &mut self.bucket,
        }
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    /// Show a toast message
    pub fn show_toast(&mut self, message: &str, toast_type: ToastType) {
        self.toast_message = Some((message.to_string(), Instant::now(), toast_type));
    }

    /// Run timers and apply finished fetches for both charts
    pub fn poll_charts(&mut self, now: Instant) {
        for kind in ChartKind::iter() {
            let panel = self.panel_mut(kind);
            panel.poll.tick(now);
            let outcomes = panel.poll.poll_completions(now);
            for outcome in outcomes {
                self.handle_outcome(kind, outcome, now);
            }
        }
    }

    /// React to one applied, stale or failed fetch of `kind`
    pub fn handle_outcome(&mut self, kind: ChartKind, outcome: PollOutcome, now: Instant) {
        match outcome {
            PollOutcome::Applied(report) => {
                let panel = self.panel_mut(kind);
                let recovered = std::mem::replace(&mut panel.failing, false);

                // A bar that just exited can no longer be hovered
                let hovered_gone = panel
                    .hovered
                    .as_deref()
                    .is_some_and(|label| panel.poll.reconciler().element(label).is_none());
                if hovered_gone {
                    panel.hovered = None;
                    self.tooltip
                        .handle(TooltipEvent::HoverExit { chart: kind }, now);
                }

                if !report.malformed_labels.is_empty() {
                    tracing::warn!(
                        "{} malformed label(s) in {} chart",
                        report.malformed_labels.len(),
                        kind
                    );
                }
                if recovered {
                    let title = self.panel(kind).settings.title.clone();
                    self.show_toast(&format!("{}: connection restored", title), ToastType::Info);
                }
            }
            PollOutcome::Stale(_) => {}
            PollOutcome::Failed(error) => {
                let panel = self.panel_mut(kind);
                let first_failure = !std::mem::replace(&mut panel.failing, true);
                if first_failure {
                    let title = panel.settings.title.clone();
                    self.show_toast(&format!("{}: {}", title, error), ToastType::Warning);
                }
            }
        }
    }

    /// True while anything on screen is still moving
    fn is_animating(&self, now: Instant) -> bool {
        self.frequency.poll.is_animating(now)
            || self.bucket.poll.is_animating(now)
            || self.tooltip.is_animating(now)
    }

    /// Time until the earliest scheduled poll
    fn until_next_poll(&self, now: Instant) -> Option<Duration> {
        [self.frequency.poll.timer(), self.bucket.poll.timer()]
            .iter()
            .filter_map(|t| t.next_due())
            .min()
            .map(|due| due.saturating_duration_since(now))
    }
}

impl eframe::App for LiveCountsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Fire due polls and apply finished fetches
        self.poll_charts(now);

        ctx.set_visuals(egui::Visuals::light());

        // Toast notifications
        self.render_toast(ctx, now);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for kind in ChartKind::iter() {
                        self.render_chart_header(ui, kind);
                        self.render_chart(ui, kind, now);
                        ui.add_space(20.0);
                    }
                });
        });

        self.render_tooltip(ctx, now);

        // Keep animating, otherwise wake up for the next poll
        if self.is_animating(now) {
            ctx.request_repaint();
        } else if let Some(wait) = self.until_next_poll(now) {
            ctx.request_repaint_after(wait);
        }
    }
}
