//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TIERCACHE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_MEMORY_CAPACITY, DEFAULT_ROOT_DIR, DEFAULT_SWEEP_INTERVAL_SECS};

/// Cache configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TIERCACHE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding filesystem-tier records. Default: `./.cache`.
    pub root_dir: PathBuf,

    /// Count stores/fetches/misses from startup. Default: `false`.
    pub monitoring: bool,

    /// Max entries in the in-process memory tier. Default: `10_000`.
    pub memory_capacity: u64,

    /// Interval between background filesystem purges. Default: 60s.
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            monitoring: false,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl Config {
    const ENV_ROOT_DIR: &'static str = "TIERCACHE_ROOT_DIR";
    const ENV_MONITORING: &'static str = "TIERCACHE_MONITORING";
    const ENV_MEMORY_CAPACITY: &'static str = "TIERCACHE_MEMORY_CAPACITY";
    const ENV_SWEEP_INTERVAL_SECS: &'static str = "TIERCACHE_SWEEP_INTERVAL_SECS";

    /// Config rooted at `root_dir`, everything else default.
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let root_dir = Self::parse_path_from_env(Self::ENV_ROOT_DIR, defaults.root_dir);
        let monitoring = Self::parse_bool_from_env(Self::ENV_MONITORING, defaults.monitoring)?;
        let memory_capacity =
            Self::parse_u64_from_env(Self::ENV_MEMORY_CAPACITY, defaults.memory_capacity)?;
        let sweep_interval = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_SWEEP_INTERVAL_SECS,
            defaults.sweep_interval.as_secs(),
        )?);

        Ok(Self {
            root_dir,
            monitoring,
            memory_capacity,
            sweep_interval,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.exists() && !self.root_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.root_dir.clone(),
            });
        }

        if self.memory_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MEMORY_CAPACITY,
            });
        }

        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_SWEEP_INTERVAL_SECS,
            });
        }

        Ok(())
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool {
                    name: var_name,
                    value,
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(var_name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
