//! User settings persistence.
//!
//! This module handles loading and saving the dashboard configuration:
//! server location, polling cadence, animation timings and per-chart options.

use anyhow::Context;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll::PollConfig;
use crate::state::ChartKind;

/// Options for one chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    /// Heading shown above the chart
    pub title: String,
    /// Endpoint path relative to the server URL
    pub endpoint: String,
    /// Parameter `k` used before the slider is touched
    pub initial_k: u64,
    /// Slider range as powers of ten
    pub slider_min: f64,
    pub slider_max: f64,
    /// Caption of the count axis
    pub value_axis_label: String,
    /// Caption of the label axis (bucket chart only)
    pub label_axis_label: String,
}

impl ChartSettings {
    pub fn default_for(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Frequency => Self {
                title: "Trending hashtags".to_string(),
                endpoint: "counts/trump".to_string(),
                initial_k: 10_000,
                slider_min: 1.0,
                slider_max: 6.0,
                value_axis_label: "Approximate count".to_string(),
                label_axis_label: String::new(),
            },
            ChartKind::Bucket => Self {
                title: "Bitcoin transaction values".to_string(),
                endpoint: "counts/bitcoin".to_string(),
                initial_k: 1_000,
                slider_min: 0.0,
                slider_max: 5.0,
                value_axis_label: "Transactions".to_string(),
                label_axis_label: "Value bucket".to_string(),
            },
        }
    }
}

/// User settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Base URL of the counts server
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on one fetch, from connect to the end of the body
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    #[serde(default = "default_tooltip_fade_ms")]
    pub tooltip_fade_ms: u64,
    /// Search URL opened when a frequency label is clicked; `{}` is replaced
    /// by the percent-encoded label
    #[serde(default = "default_label_link")]
    pub label_link: String,
    #[serde(
        default = "default_frequency_chart",
        deserialize_with = "deserialize_frequency_chart"
    )]
    pub frequency: ChartSettings,
    #[serde(
        default = "default_bucket_chart",
        deserialize_with = "deserialize_bucket_chart"
    )]
    pub bucket: ChartSettings,
}

fn default_version() -> u32 {
    1
}

fn default_server_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_transition_ms() -> u64 {
    250
}

fn default_tooltip_fade_ms() -> u64 {
    50
}

fn default_label_link() -> String {
    "https://twitter.com/search?q={}".to_string()
}

fn default_frequency_chart() -> ChartSettings {
    ChartSettings::default_for(ChartKind::Frequency)
}

fn default_bucket_chart() -> ChartSettings {
    ChartSettings::default_for(ChartKind::Bucket)
}

fn deserialize_frequency_chart<'de, D>(deserializer: D) -> Result<ChartSettings, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_chart(deserializer, ChartKind::Frequency)
}

fn deserialize_bucket_chart<'de, D>(deserializer: D) -> Result<ChartSettings, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_chart(deserializer, ChartKind::Bucket)
}

/// Overlay the fields present in the file onto the defaults of `kind`
fn deserialize_chart<'de, D>(deserializer: D, kind: ChartKind) -> Result<ChartSettings, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = serde_json::Value::deserialize(deserializer)?;
    let mut merged =
        serde_json::to_value(ChartSettings::default_for(kind)).map_err(D::Error::custom)?;
    match (&mut merged, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(fields)) => base.extend(fields),
        (_, other) => {
            return Err(D::Error::custom(format!(
                "{} chart settings must be an object, found {}",
                kind, other
            )))
        }
    }
    serde_json::from_value(merged).map_err(D::Error::custom)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            transition_ms: default_transition_ms(),
            tooltip_fade_ms: default_tooltip_fade_ms(),
            label_link: default_label_link(),
            frequency: default_frequency_chart(),
            bucket: default_bucket_chart(),
        }
    }
}

impl Settings {
    /// Get the config directory path for livecounts
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("LiveCounts"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|p| p.join("LiveCounts"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::config_dir().map(|p| p.join("livecounts"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            tracing::warn!("Could not determine config directory, using default settings");
            return Self::default();
        };

        match Self::load_or_init(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load settings from `path`; a missing file is created with the defaults
    pub fn load_or_init(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path)?;
            tracing::info!("Wrote default settings to {:?}", path);
            return Ok(settings);
        }

        let settings = Self::load_from(path)?;
        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {:?}", path))?;

        Ok(())
    }

    pub fn chart(&self, kind: ChartKind) -> &ChartSettings {
        match kind {
            ChartKind::Frequency => &self.frequency,
            ChartKind::Bucket => &self.bucket,
        }
    }

    pub fn chart_mut(&mut self, kind: ChartKind) -> &mut ChartSettings {
        match kind {
            ChartKind::Frequency => &mut self.frequency,
            ChartKind::Bucket => &mut self.bucket,
        }
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn tooltip_fade(&self) -> Duration {
        Duration::from_millis(self.tooltip_fade_ms)
    }

    /// Poll loop configuration for one chart
    pub fn poll_config(&self, kind: ChartKind) -> PollConfig {
        PollConfig {
            initial_k: self.chart(kind).initial_k,
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            transition: self.transition(),
        }
    }

    /// Search URL for a frequency label
    pub fn link_for_label(&self, label: &str) -> String {
        let encoded =
            percent_encoding::utf8_percent_encode(label, URI_COMPONENT).to_string();
        self.label_link.replace("{}", &encoded)
    }
}

/// Characters escaped when a label is embedded in a URL query component
const URI_COMPONENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');
