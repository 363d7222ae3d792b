//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::CANVAS_SIZE;
use crate::types::Page;

/// Environment variable overriding the full API base URL.
pub const API_URL_ENV: &str = "DIGITEYE_API_URL";

/// Top-level DigitEye configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawings: Option<DrawingsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Where the classification service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix the API routes are mounted under.
    #[serde(default = "default_api_path")]
    pub path: String,

    /// Request timeout. Unset means the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_api_path(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_api_path() -> String {
    "/api".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Brush radius in canvas pixels; the stroke width is twice this.
    #[serde(default = "default_brush_radius")]
    pub brush_radius: f32,
}

fn default_brush_radius() -> f32 {
    12.0
}

fn max_brush_radius() -> f32 {
    CANVAS_SIZE as f32 / 2.0
}

fn valid_brush_radius(radius: f32) -> bool {
    radius > 0.0 && radius <= max_brush_radius()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingsConfig {
    /// Default `limit` when listing drawings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    Page::DEFAULT_LIMIT
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "digiteye_client=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

/// Join a service origin and a route prefix without doubling slashes.
pub fn join_api_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::DigitEyeError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::DigitEyeError::Config(e.to_string()))?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// API base URL from the config file alone.
    pub fn configured_api_base(&self) -> String {
        let api = self.api.clone().unwrap_or_default();
        join_api_base(&api.base_url, &api.path)
    }

    /// API base URL, honouring the `DIGITEYE_API_URL` override.
    pub fn api_base(&self) -> String {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => self.configured_api_base(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api
            .as_ref()
            .and_then(|a| a.timeout_secs)
            .map(Duration::from_secs)
    }

    /// Configured brush radius, or the default when it is outside
    /// `(0, CANVAS_SIZE / 2]`.
    pub fn brush_radius(&self) -> f32 {
        let Some(canvas) = &self.canvas else {
            return default_brush_radius();
        };
        if valid_brush_radius(canvas.brush_radius) {
            canvas.brush_radius
        } else {
            warn!(
                radius = canvas.brush_radius,
                "Ignoring invalid canvas.brush_radius"
            );
            default_brush_radius()
        }
    }

    pub fn page_size(&self) -> u32 {
        self.drawings
            .as_ref()
            .map(|d| d.page_size)
            .unwrap_or_else(default_page_size)
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(api) = &self.api {
            if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
                errors.push(format!(
                    "api.base_url must start with http:// or https://, got '{}'",
                    api.base_url
                ));
            }
            if api.timeout_secs == Some(0) {
                errors.push("api.timeout_secs cannot be 0".to_string());
            }
        }

        if let Some(canvas) = &self.canvas {
            if !valid_brush_radius(canvas.brush_radius) {
                errors.push(format!(
                    "canvas.brush_radius must be in (0, {}], got {}",
                    max_brush_radius(),
                    canvas.brush_radius
                ));
            }
        }

        if self.page_size() == 0 {
            warnings.push("drawings.page_size is 0; listings will be empty".to_string());
        }

        if let Some(logging) = &self.logging {
            if logging.format != "plain" && logging.format != "json" {
                warnings.push(format!(
                    "Unknown logging.format '{}', falling back to plain",
                    logging.format
                ));
            }
        }

        (warnings, errors)
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Base directory for DigitEye data: `~/.digiteye/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".digiteye")
}
