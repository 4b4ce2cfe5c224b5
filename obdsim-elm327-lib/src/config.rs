use derive_more::{Display, Error};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::counter::DEFAULT_PULSE_THRESHOLD;
use crate::lexer::DEFAULT_MAX_LINE_LEN;
use crate::store::Placeholders;

/// Engine speed reported before the first pulse-threshold recompute
pub const DEFAULT_INITIAL_ENGINE_SPEED: f32 = 5400.0;

/// Shortest line bound that still fits a data request
pub const MIN_LINE_LEN: usize = 4;

/// Configurable log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(ConfigError::UnknownLogLevel {
                level: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display("max_line_len must be at least {}, got {actual}", MIN_LINE_LEN)]
    LineLimitTooSmall { actual: usize },
    #[display("pulse_threshold must be non-zero")]
    ZeroPulseThreshold,
    #[display("unknown log level '{level}'")]
    UnknownLogLevel { level: String },
}

/// Strings a client may parse to identify the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Reply to `AT@1`
    #[serde(default = "default_device_description")]
    pub device_description: String,
    /// Reply to `ATI`, and the banner after `ATZ`
    #[serde(default = "default_version")]
    pub version: String,
    /// Reply to `ATDPN`
    #[serde(default = "default_protocol_number")]
    pub protocol_number: String,
    /// Reply to `ATRV`
    #[serde(default = "default_voltage")]
    pub voltage: String,
}

fn default_device_description() -> String {
    "OBDSIM ELM327 SIMULATOR".to_string()
}

fn default_version() -> String {
    "ELM327 v1.5".to_string()
}

fn default_protocol_number() -> String {
    "6".to_string()
}

fn default_voltage() -> String {
    "12.6V".to_string()
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            device_description: default_device_description(),
            version: default_version(),
            protocol_number: default_protocol_number(),
            voltage: default_voltage(),
        }
    }
}

/// Everything the protocol engine needs to know at start-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub identity: Identity,
    /// Terminate replies with `\r\n` instead of a bare `\r`
    #[serde(default = "default_linefeeds")]
    pub linefeeds: bool,
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    #[serde(default = "default_pulse_threshold")]
    pub pulse_threshold: u32,
    #[serde(default = "default_initial_engine_speed")]
    pub initial_engine_speed: f32,
    #[serde(default)]
    pub placeholders: Placeholders,
    #[serde(default)]
    pub log_level: LogLevel,
}

const fn default_linefeeds() -> bool {
    true
}

const fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}

const fn default_pulse_threshold() -> u32 {
    DEFAULT_PULSE_THRESHOLD
}

const fn default_initial_engine_speed() -> f32 {
    DEFAULT_INITIAL_ENGINE_SPEED
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            linefeeds: default_linefeeds(),
            max_line_len: default_max_line_len(),
            pulse_threshold: default_pulse_threshold(),
            initial_engine_speed: default_initial_engine_speed(),
            placeholders: Placeholders::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SimulatorConfig {
    /// Check the values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_len < MIN_LINE_LEN {
            return Err(ConfigError::LineLimitTooSmall {
                actual: self.max_line_len,
            });
        }
        if self.pulse_threshold == 0 {
            return Err(ConfigError::ZeroPulseThreshold);
        }
        Ok(())
    }

    /// Reply line terminator
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        if self.linefeeds {
            "\r\n"
        } else {
            "\r"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SimulatorConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.line_ending(), "\r\n");
        assert_eq!(cfg.identity.version, "ELM327 v1.5");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let cfg: SimulatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, SimulatorConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let cfg: SimulatorConfig = serde_json::from_str(
            r#"{"linefeeds": false, "identity": {"version": "ELM327 v2.1"}, "log_level": "debug"}"#,
        )
        .unwrap();
        assert_eq!(cfg.line_ending(), "\r");
        assert_eq!(cfg.identity.version, "ELM327 v2.1");
        assert_eq!(cfg.identity.device_description, "OBDSIM ELM327 SIMULATOR");
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_validation() {
        let cfg = SimulatorConfig {
            max_line_len: 3,
            ..SimulatorConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::LineLimitTooSmall { actual: 3 }));

        let cfg = SimulatorConfig {
            pulse_threshold: 0,
            ..SimulatorConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPulseThreshold));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(LogLevel::Warn.as_level_filter(), LevelFilter::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
