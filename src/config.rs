// config.rs

use crate::midi::{DEFAULT_CHANNEL, DEFAULT_MAX_BANKS, DEFAULT_MAX_PATTERNS};
use crate::pedal::PedalButton;
use crate::state::{DEFAULT_BPM, DEFAULT_MAX_BPM};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const TICKS_PER_BEAT: u64 = 24;

/// Patterns and banks are sent as 7-bit MIDI data bytes.
pub const MAX_ADDRESSABLE: u32 = 128;

/// Prefix of environment variables overriding config values, e.g. `DRUMBRUTE_CHANNEL`.
pub const ENV_PREFIX: &str = "DRUMBRUTE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("MIDI channel must be between 1 and 16, got {0}")]
    InvalidChannel(u8),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{name} must be at most {max}, got {value}")]
    TooLarge {
        name: &'static str,
        max: u32,
        value: u32,
    },
    #[error("change mode threshold must be a positive number of seconds, got {0}")]
    InvalidThreshold(f64),
    #[error("invalid mode button: {0}")]
    InvalidModeButton(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 1-based MIDI channel of the drum machine.
    pub channel: u8,
    pub max_patterns: u32,
    pub max_banks: u32,
    pub max_bpm: u32,
    /// Tempo used for patterns that have no stored tempo yet.
    pub default_bpm: u32,
    pub change_mode_threshold_secs: f64,
    pub mode_button: String,
    pub input_query: Option<String>,
    pub output_query: Option<String>,
    pub db_file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channel: DEFAULT_CHANNEL,
            max_patterns: DEFAULT_MAX_PATTERNS,
            max_banks: DEFAULT_MAX_BANKS,
            max_bpm: DEFAULT_MAX_BPM,
            default_bpm: DEFAULT_BPM,
            change_mode_threshold_secs: 3.0,
            mode_button: PedalButton::CPress.name().to_string(),
            input_query: Some("SINCO".to_string()),
            output_query: Some("Arturia".to_string()),
            db_file_path: None,
        }
    }
}

impl Config {
    /// Layers the optional file at `path` and then `DRUMBRUTE_*` environment
    /// variables over the defaults. Does not validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration file: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=16).contains(&self.channel) {
            return Err(ConfigError::InvalidChannel(self.channel));
        }
        if self.max_patterns == 0 {
            return Err(ConfigError::Zero("max_patterns"));
        }
        if self.max_banks == 0 {
            return Err(ConfigError::Zero("max_banks"));
        }
        for (name, value) in [
            ("max_patterns", self.max_patterns),
            ("max_banks", self.max_banks),
        ] {
            if value > MAX_ADDRESSABLE {
                return Err(ConfigError::TooLarge {
                    name,
                    max: MAX_ADDRESSABLE,
                    value,
                });
            }
        }
        if self.max_bpm == 0 {
            return Err(ConfigError::Zero("max_bpm"));
        }
        if !(self.change_mode_threshold_secs.is_finite() && self.change_mode_threshold_secs > 0.0)
        {
            return Err(ConfigError::InvalidThreshold(
                self.change_mode_threshold_secs,
            ));
        }
        self.mode_button()?;
        Ok(())
    }

    pub fn mode_button(&self) -> Result<PedalButton, ConfigError> {
        self.mode_button
            .parse()
            .map_err(ConfigError::InvalidModeButton)
    }

    pub fn change_mode_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.change_mode_threshold_secs.max(0.0))
    }

    /// Location of the state database: the configured path, else the user's
    /// local data directory, else the temp directory.
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_file_path {
            return path.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("drumbrute-pedal")
            .join("state.db")
    }
}
