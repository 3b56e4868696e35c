//! TOML configuration file support
//!
//! Every key is optional:
//!
//! ```toml
//! # heatup.toml
//! [estimator]
//! sample_count = 120
//! model = "exponential"
//! room_temperature_c = 22.0
//!
//! [session]
//! history_limit = 20
//! theme = "dark"
//! reveal_ms = 2000
//!
//! [[liquids]]
//! name = "Tea"
//! target_temperature_c = 80.0
//! aliases = ["Té"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::estimator::{DEFAULT_ROOM_TEMPERATURE_C, DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::models::{LiquidProfile, TrajectoryModel};
use crate::parse;
use crate::render::Theme;

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "heatup.toml";

const DEFAULT_REVEAL_MS: u64 = 3000;

/// Root configuration structure for heatup.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub estimator: EstimatorConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Extra liquids added to the built-in catalog.
    #[serde(default)]
    pub liquids: Vec<LiquidConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorConfig {
    /// Points per trajectory (2 to 10 000).
    pub sample_count: Option<usize>,

    /// "linear" or "exponential".
    pub model: Option<String>,

    /// Start temperature used in basic mode.
    pub room_temperature_c: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Entries kept in the session history.
    pub history_limit: Option<usize>,

    /// "light", "dark" or "plain".
    pub theme: Option<String>,

    /// Upper bound for the animated reveal, in milliseconds.
    pub reveal_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiquidConfig {
    pub name: String,
    pub target_temperature_c: f64,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Config with defaults filled in and values checked
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sample_count: usize,
    pub model: TrajectoryModel,
    pub room_temperature_c: f64,
    pub history_limit: usize,
    /// `None` picks a theme from the terminal, see [`Theme::detect`].
    pub theme: Option<Theme>,
    pub reveal: Duration,
    pub liquids: Vec<LiquidProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            model: TrajectoryModel::default(),
            room_temperature_c: DEFAULT_ROOM_TEMPERATURE_C,
            history_limit: DEFAULT_HISTORY_LIMIT,
            theme: None,
            reveal: Duration::from_millis(DEFAULT_REVEAL_MS),
            liquids: Vec::new(),
        }
    }
}

impl Settings {
    /// Configured theme, or the detected one
    pub fn theme(&self) -> Theme {
        self.theme.unwrap_or_else(Theme::detect)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply defaults and validate
    pub fn settings(&self) -> Result<Settings> {
        let defaults = Settings::default();

        let sample_count = self.estimator.sample_count.unwrap_or(defaults.sample_count);
        if !(2..=MAX_SAMPLE_COUNT).contains(&sample_count) {
            return Err(Error::InvalidConfig(format!(
                "estimator.sample_count must be between 2 and {}, got {}",
                MAX_SAMPLE_COUNT, sample_count
            )));
        }

        let room_temperature_c = self
            .estimator
            .room_temperature_c
            .unwrap_or(defaults.room_temperature_c);
        if !room_temperature_c.is_finite() {
            return Err(Error::InvalidConfig(
                "estimator.room_temperature_c must be a finite number".to_string(),
            ));
        }

        let model = match &self.estimator.model {
            Some(name) => parse::parse_model(name)?,
            None => defaults.model,
        };
        let theme = self
            .session
            .theme
            .as_deref()
            .map(parse::parse_theme)
            .transpose()?;

        let liquids = self
            .liquids
            .iter()
            .map(|l| LiquidProfile {
                name: l.name.clone(),
                target_temperature_c: l.target_temperature_c,
                aliases: l.aliases.clone(),
            })
            .collect();

        Ok(Settings {
            sample_count,
            model,
            room_temperature_c,
            history_limit: self.session.history_limit.unwrap_or(defaults.history_limit),
            theme,
            reveal: self
                .session
                .reveal_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal),
            liquids,
        })
    }
}

/// Load settings from `path`, or from ./heatup.toml if present, or defaults
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Config::from_file(path)?.settings(),
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                Config::from_file(local)?.settings()
            } else {
                Ok(Settings::default())
            }
        }
    }
}
