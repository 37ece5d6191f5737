use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::dataset::DEFAULT_IDENTIFIER;
use crate::error::{ChartError, Result};
use crate::state::theme::Theme;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CLIMCOORDS_CONFIG";
pub const CONFIG_FILE: &str = "climcoords.json";

/// Options offered by the regeneration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub model_generations: Vec<String>,
    pub regions: Vec<String>,
    pub statistics: Vec<String>,
    pub variables: Vec<String>,
    pub seasons: Vec<String>,
}

impl Default for FormOptions {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            model_generations: list(&["cmip5", "cmip6"]),
            regions: list(&["global", "NHEX", "SHEX", "TROPICS"]),
            statistics: list(&["bias_xy", "rms_xy", "rms_xyt", "cor_xy", "std-obs_xy"]),
            variables: list(&["pr", "prw", "psl", "rlut", "rsut", "tas", "ts", "ua-200", "zg-500"]),
            seasons: list(&["ann", "djf", "mam", "jja", "son"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the regeneration server.
    pub server_url: String,
    /// Column holding the model id.
    pub identifier_column: String,
    /// Local path or URL loaded at startup.
    pub default_dataset: Option<String>,
    /// Height of the plot area in points.
    pub chart_height: f32,
    /// Symbol area in square points.
    pub symbol_size: f32,
    pub toast_seconds: f32,
    pub request_timeout_secs: u64,
    pub theme: Theme,
    pub form: FormOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            identifier_column: DEFAULT_IDENTIFIER.to_string(),
            default_dataset: None,
            chart_height: 420.0,
            symbol_size: 64.0,
            toast_seconds: 4.0,
            request_timeout_secs: 30,
            theme: Theme::default(),
            form: FormOptions::default(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs_f32(self.toast_seconds.max(0.5))
    }

    /// Read a config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig =
            serde_json::from_str(&text).map_err(|e| ChartError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.identifier_column.trim().is_empty() {
            return Err(ChartError::Config("identifier_column is empty".to_string()));
        }
        if !(self.chart_height.is_finite() && self.chart_height > 0.0) {
            return Err(ChartError::Config("chart_height must be positive".to_string()));
        }
        Ok(())
    }

    /// Locate and load the config, falling back to defaults.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config {:?}: {e}", path);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_files_fill_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server_url": "http://pmp:8000", "theme": "Dark"}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server_url, "http://pmp:8000");
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.identifier_column, "model_name");
        assert_eq!(config.form, FormOptions::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"chart_height": -5}}"#).unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ChartError::Config(_))
        ));
    }

    #[test]
    fn broken_or_missing_files_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(AppConfig::load_from(file.path()), AppConfig::default());

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            AppConfig::load_from(&dir.path().join("absent.json")),
            AppConfig::default()
        );
    }

    #[test]
    fn durations_have_floors() {
        let config = AppConfig {
            toast_seconds: 0.0,
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.toast_duration(), Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
