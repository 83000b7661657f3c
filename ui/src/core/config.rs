//! Runtime configuration.
//!
//! Defaults are compiled in. `STATLAB_API_BASE` (read at build time) points
//! web builds at a different service; without it the page's own origin is
//! used. Desktop builds then layer `config.json` from the platform config
//! directory on top, so keys set there win.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::downsample::DEFAULT_MAX_POINTS;
use super::trace::DEFAULT_WARMUP_FRACTION;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_VISIBLE_ENTRIES: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("couldn't parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the numeric service.
    pub api_base_url: String,
    /// Pause between a sweep selecting a value and the automatic re-run.
    pub sweep_settle_ms: u64,
    /// How long the "best value chosen" notice stays up.
    pub sweep_notice_ms: u64,
    pub trace_max_points: usize,
    pub warmup_fraction: f64,
    pub default_visible_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            sweep_settle_ms: 600,
            sweep_notice_ms: 5_000,
            trace_max_points: DEFAULT_MAX_POINTS,
            warmup_fraction: DEFAULT_WARMUP_FRACTION,
            default_visible_entries: DEFAULT_VISIBLE_ENTRIES,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config = Self::default()
            .with_service_base(option_env!("STATLAB_API_BASE"), super::platform::page_origin());

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(path) = Self::default_path().filter(|path| path.exists()) {
                match config.clone().overlaid_file(&path) {
                    Ok(loaded) => {
                        info!(path = %path.display(), "loaded configuration");
                        config = loaded;
                    }
                    Err(err) => {
                        warn!(path = %path.display(), %err, "ignoring unreadable configuration");
                    }
                }
            }
        }

        config.sanitized()
    }

    /// Point at the build-time override if there is one, else at the page origin.
    pub fn with_service_base(
        mut self,
        build_override: Option<&str>,
        origin: Option<String>,
    ) -> Self {
        match build_override.map(str::trim) {
            Some(base) if !base.is_empty() => self.api_base_url = base.to_string(),
            _ => {
                if let Some(origin) = origin {
                    self.api_base_url = origin;
                }
            }
        }
        self
    }

    /// Apply a JSON object on top of `self`. Keys the document leaves out keep
    /// their current values.
    pub fn overlaid(self, text: &str) -> Result<Self, ConfigError> {
        let mut merged = serde_json::to_value(&self)?;
        let overlay: serde_json::Value = serde_json::from_str(text)?;
        if let (Some(target), serde_json::Value::Object(fields)) = (merged.as_object_mut(), overlay)
        {
            target.extend(fields);
        }
        Ok(serde_json::from_value::<Self>(merged)?.sanitized())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn overlaid_file(self, path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        self.overlaid(&text)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "Statlab", "Statlab")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Pull out-of-range values back to something renderable.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = defaults.api_base_url;
        }
        if !self.warmup_fraction.is_finite() || !(0.0..=1.0).contains(&self.warmup_fraction) {
            self.warmup_fraction = defaults.warmup_fraction;
        }
        if self.trace_max_points < 2 {
            self.trace_max_points = defaults.trace_max_points;
        }
        if self.default_visible_entries == 0 {
            self.default_visible_entries = defaults.default_visible_entries;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::default().overlaid(r#"{ "sweep_settle_ms": 250 }"#).unwrap();
        assert_eq!(config.sweep_settle_ms, 250);
        assert_eq!(config.trace_max_points, DEFAULT_MAX_POINTS);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn out_of_range_values_are_repaired() {
        let config = AppConfig::default().overlaid(
            r#"{ "warmup_fraction": 4.0, "trace_max_points": 0, "api_base_url": " " }"#,
        )
        .unwrap();
        assert_eq!(config.warmup_fraction, DEFAULT_WARMUP_FRACTION);
        assert_eq!(config.trace_max_points, DEFAULT_MAX_POINTS);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "api_base_url": "http://stats.local:8080" }"#).unwrap();

        let config = AppConfig::default().overlaid_file(&path).unwrap();
        assert_eq!(config.api_base_url, "http://stats.local:8080");
    }

    #[test]
    fn build_override_beats_page_origin() {
        let config = AppConfig::default()
            .with_service_base(Some(" http://svc:9000 "), Some("http://page".into()));
        assert_eq!(config.api_base_url, "http://svc:9000");

        let config = AppConfig::default().with_service_base(Some(""), Some("http://page".into()));
        assert_eq!(config.api_base_url, "http://page");

        let config = AppConfig::default().with_service_base(None, None);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn config_file_wins_over_build_override() {
        let base = AppConfig::default().with_service_base(Some("http://svc:9000"), None);

        let from_file = base
            .clone()
            .overlaid(r#"{ "api_base_url": "http://stats.local:8080" }"#)
            .unwrap();
        assert_eq!(from_file.api_base_url, "http://stats.local:8080");

        let untouched = base.overlaid(r#"{ "sweep_settle_ms": 250 }"#).unwrap();
        assert_eq!(untouched.api_base_url, "http://svc:9000");
        assert_eq!(untouched.sweep_settle_ms, 250);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            AppConfig::default().overlaid_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
