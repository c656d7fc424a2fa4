//! Resolves global flags and saved profiles into runtime settings.

use std::time::Duration;

use clap::ValueEnum;

use cyberq_config::{Config, ConfigError, Defaults, DeviceProfile};
use cyberq_core::CoordinatorConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Output settings after flags, environment and config defaults are merged.
#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Presentation {
    pub fn resolve(global: &GlobalOpts, defaults: &Defaults) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);
        Self {
            format,
            color: crate::output::should_color(color),
            quiet: global.quiet,
        }
    }
}

/// The profile a command should target: `--host` wins over saved profiles,
/// and `--port` / `--interval` / `--timeout` override whichever is chosen.
pub fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, DeviceProfile), CliError> {
    let (name, mut profile) = if let Some(host) = &global.host {
        ("(command line)".to_owned(), DeviceProfile::new(host.clone()))
    } else {
        let (name, profile) = cfg
            .profile(global.profile.as_deref())
            .map_err(|e| profile_error(e, cfg))?;
        (name.to_owned(), profile.clone())
    };

    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(interval) = global.interval {
        profile.poll_interval_secs = Some(interval);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout_secs = Some(timeout);
    }
    Ok((name, profile))
}

/// Build a `CoordinatorConfig` for the targeted device.
pub fn coordinator_config(global: &GlobalOpts, cfg: &Config) -> Result<CoordinatorConfig, CliError> {
    let (name, profile) = resolve_profile(global, cfg)?;
    tracing::debug!(profile = %name, device = %profile.device_key(), "resolved device");
    Ok(cyberq_config::profile_to_coordinator_config(&profile, &cfg.defaults)?)
}

/// Request timeout for one-shot commands that bypass the coordinator.
pub fn request_timeout(profile: &DeviceProfile, defaults: &Defaults) -> Duration {
    Duration::from_secs(profile.timeout_secs.unwrap_or(defaults.timeout_secs).max(1))
}

fn profile_error(err: ConfigError, cfg: &Config) -> CliError {
    match err {
        ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        },
        other => other.into(),
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["cyberq"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn two_profiles() -> Config {
        let mut cfg = Config::default();
        cfg.add_profile("smoker", DeviceProfile::new("192.168.1.50"));
        cfg.add_profile("kamado", DeviceProfile::new("192.168.1.51"));
        cfg
    }

    #[test]
    fn host_flag_overrides_profiles() {
        let cfg = two_profiles();
        let (name, profile) =
            resolve_profile(&global(&["--host", "10.0.0.9", "--port", "8080"]), &cfg).unwrap();
        assert_eq!(name, "(command line)");
        assert_eq!(profile.device_key(), "10.0.0.9:8080");
    }

    #[test]
    fn default_profile_with_overrides() {
        let cfg = two_profiles();
        let config = coordinator_config(&global(&["--interval", "10"]), &cfg).unwrap();
        assert_eq!(config.host, "192.168.1.50");
        assert_eq!(config.poll_interval(), Duration::from_secs(10));

        let config = coordinator_config(&global(&["-p", "kamado"]), &cfg).unwrap();
        assert_eq!(config.host, "192.168.1.51");
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let err = resolve_profile(&global(&["-p", "grill"]), &two_profiles()).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "grill");
                assert_eq!(available, "kamado, smoker");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_profiles_is_no_config() {
        let err = resolve_profile(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn output_falls_back_to_config_defaults() {
        let defaults = Defaults {
            output: "json-compact".into(),
            color: "never".into(),
            ..Defaults::default()
        };
        let presentation = Presentation::resolve(&global(&[]), &defaults);
        assert_eq!(presentation.format, OutputFormat::JsonCompact);
        assert!(!presentation.color);

        let presentation = Presentation::resolve(&global(&["-o", "yaml"]), &defaults);
        assert_eq!(presentation.format, OutputFormat::Yaml);
    }
}
