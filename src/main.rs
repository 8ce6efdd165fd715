//! LiveCounts - live-updating bar charts of approximate counts
//!
//! Desktop dashboard that polls a counts server and animates the results as a
//! trending-labels chart and a value-bucket chart.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use livecounts::app::LiveCountsApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Configure native options
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 900.0])
            .with_min_inner_size([400.0, 300.0])
            .with_title("LiveCounts")
            .with_app_id("LiveCounts"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "LiveCounts",
        native_options,
        Box::new(|cc| Ok(Box::new(LiveCountsApp::new(cc)))),
    )
}
