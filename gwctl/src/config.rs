//! Console configuration.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The file path
//! defaults to `gwctl.yaml` and can be changed with `-f` or `GWCTL_CONFIG`.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `gwctl.yaml`)
//! 2. **Environment variables** - Variables prefixed with `GWCTL_` override YAML values
//!
//! Nested values use double underscores, e.g. `GWCTL_THRESHOLDS__SUCCESS_HEALTHY=99`.
//!
//! ## Example
//!
//! ```yaml
//! base_url: http://gateway.internal:8081/api
//! request_timeout: 10s
//! refresh_interval: 30s
//! monitoring_api: observation
//! thresholds:
//!   success_healthy: 99
//!   latency_degraded_ms: 1500
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::models::monitoring::{TimeRange, TimeWindow};
use crate::client::MonitoringApi;
use crate::errors::Error;
use crate::navigation::Menu;
use crate::status::SeverityThresholds;
use crate::view_model::ViewSettings;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "GWCTL_CONFIG", default_value = "gwctl.yaml")]
    pub config: String,

    /// Validate configuration and exit.
    #[arg(long)]
    pub validate: bool,

    /// View to open, overriding the persisted one
    #[arg(long)]
    pub menu: Option<Menu>,

    /// Render the view once and exit instead of following changes
    #[arg(long)]
    pub once: bool,
}

/// Main console configuration.
///
/// All fields have defaults, so an empty or missing file yields a console pointed at a local
/// gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the gateway admin API; routes such as `/admin/projects` are appended to it
    pub base_url: Url,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Period of the monitoring auto-refresh
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Longest wait for a view to be drawn before its data is loaded
    #[serde(with = "humantime_serde")]
    pub render_wait: Duration,
    /// Which monitoring routes the backend serves
    pub monitoring_api: MonitoringApi,
    pub thresholds: SeverityThresholds,
    /// Show the built-in demo data when list loads fail
    pub use_fallback_data: bool,
    /// Initial observation window of the monitoring view
    pub time_window: TimeWindow,
    /// Initial span of the monitoring charts
    pub time_range: TimeRange,
    /// File holding the last active view between runs
    pub state_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8081/api").expect("default base URL is valid"),
            request_timeout: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(60),
            render_wait: Duration::from_millis(500),
            monitoring_api: MonitoringApi::default(),
            thresholds: SeverityThresholds::default(),
            use_fallback_data: true,
            time_window: TimeWindow::default(),
            time_range: TimeRange::default(),
            state_file: None,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("GWCTL_").split("__").ignore(&["CONFIG"]))
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| Err(Error::Validation { message });

        if !matches!(self.base_url.scheme(), "http" | "https") {
            return invalid(format!(
                "Config validation: base_url must be an http(s) URL, got '{}'",
                self.base_url
            ));
        }

        for (name, value) in [
            ("request_timeout", self.request_timeout),
            ("refresh_interval", self.refresh_interval),
        ] {
            if value.is_zero() {
                return invalid(format!("Config validation: {name} must be greater than zero"));
            }
        }

        let t = &self.thresholds;
        let percent = 0.0..=100.0;
        if !percent.contains(&t.success_healthy) || !percent.contains(&t.success_degraded) {
            return invalid(
                "Config validation: success rate thresholds must be between 0 and 100".to_string(),
            );
        }
        if t.success_degraded > t.success_healthy {
            return invalid(format!(
                "Config validation: success_degraded ({}) cannot be greater than \
                 success_healthy ({})",
                t.success_degraded, t.success_healthy
            ));
        }
        if t.latency_healthy_ms < 0.0 || t.latency_healthy_ms > t.latency_degraded_ms {
            return invalid(format!(
                "Config validation: latency_healthy_ms ({}) must be between 0 and \
                 latency_degraded_ms ({})",
                t.latency_healthy_ms, t.latency_degraded_ms
            ));
        }

        Ok(())
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            refresh_interval: self.refresh_interval,
            render_wait: self.render_wait,
            thresholds: self.thresholds,
        }
    }
}
