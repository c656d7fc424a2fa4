//! Shared configuration for cyberq tools.
//!
//! TOML device profiles, layered loading (defaults, file, `CYBERQ_`
//! environment), the already-configured check used at setup, and
//! translation to `cyberq_core::CoordinatorConfig`. The core crate never
//! reads files; everything it needs arrives through this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cyberq_core::config::{DEFAULT_PORT, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use cyberq_core::{CoordinatorConfig, SetupError};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no device configured")]
    NoProfile,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, DeviceProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

/// A named controller on the network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Hostname or IP address.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Override the default poll interval.
    pub poll_interval_secs: Option<u64>,

    /// Override the default request timeout.
    pub timeout_secs: Option<u64>,

    /// Recorded at setup so the same unit is not added twice.
    pub serial_number: Option<String>,
}

impl DeviceProfile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            poll_interval_secs: None,
            timeout_secs: None,
            serial_number: None,
        }
    }

    pub fn device_key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Profile management ──────────────────────────────────────────────

impl Config {
    /// Resolve a profile by name, falling back to the default profile, then
    /// to the only profile when exactly one exists.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &DeviceProfile), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfile);
        }
        if let Some(wanted) = name.or(self.default_profile.as_deref()) {
            if let Some((key, profile)) = self.profiles.get_key_value(wanted) {
                return Ok((key.as_str(), profile));
            }
            if name.is_some() {
                return Err(ConfigError::UnknownProfile {
                    name: wanted.into(),
                });
            }
        }
        let mut profiles = self.profiles.iter();
        match (profiles.next(), profiles.next()) {
            (Some((key, profile)), None) => Ok((key.as_str(), profile)),
            _ => Err(ConfigError::Validation {
                field: "profile".into(),
                reason: "several profiles exist; pass --profile or set default_profile".into(),
            }),
        }
    }

    /// Refuse a device that an existing profile already points at, either
    /// by address or by serial number.
    pub fn ensure_not_configured(
        &self,
        host: &str,
        port: u16,
        serial_number: Option<&str>,
    ) -> Result<(), SetupError> {
        let existing = self.profiles.iter().find(|(_, p)| {
            (p.host.eq_ignore_ascii_case(host) && p.port == port)
                || serial_number.is_some_and(|s| p.serial_number.as_deref() == Some(s))
        });
        match existing {
            Some((name, _)) => Err(SetupError::AlreadyConfigured(name.clone())),
            None => Ok(()),
        }
    }

    /// Insert a profile; the first profile added becomes the default.
    pub fn add_profile(&mut self, name: impl Into<String>, profile: DeviceProfile) {
        let name = name.into();
        let first = self.profiles.is_empty();
        self.profiles.insert(name.clone(), profile);
        if first {
            self.default_profile = Some(name);
        }
    }

    pub fn remove_profile(&mut self, name: &str) -> Result<DeviceProfile, ConfigError> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })?;
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = self.profiles.keys().next().cloned();
        }
        Ok(removed)
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::UnknownProfile { name: name.into() });
        }
        self.default_profile = Some(name.into());
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "cyberq", "cyberq").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cyberq");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, then apply `CYBERQ_` environment overrides.
///
/// Nested keys use a double underscore, e.g.
/// `CYBERQ_DEFAULTS__POLL_INTERVAL_SECS=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CYBERQ_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Runtime config ──────────────────────────────────────────────────

/// Build a `CoordinatorConfig` from a profile and the global defaults.
pub fn profile_to_coordinator_config(
    profile: &DeviceProfile,
    defaults: &Defaults,
) -> Result<CoordinatorConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() || host.contains('/') {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("expected a hostname or IP address, got '{}'", profile.host),
        });
    }
    if profile.port == 0 {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }

    let poll_secs = profile.poll_interval_secs.unwrap_or(defaults.poll_interval_secs);
    if poll_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval_secs".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let timeout_secs = profile.timeout_secs.unwrap_or(defaults.timeout_secs).max(1);

    Ok(CoordinatorConfig::new(host)
        .with_port(profile.port)
        .with_poll_interval(Duration::from_secs(poll_secs))
        .with_request_timeout(Duration::from_secs(timeout_secs)))
}
