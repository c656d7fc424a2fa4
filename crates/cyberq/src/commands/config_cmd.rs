//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use cyberq_config::{Config, DeviceProfile};
use cyberq_core::TransportConfig;

use crate::cli::{ConfigAddArgs, ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{Presentation, available_profiles, request_timeout};
use crate::error::CliError;
use crate::output;

use super::{probe, util};

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileEntry<'a> {
    name: &'a str,
    default: bool,
    #[serde(flatten)]
    profile: &'a DeviceProfile,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

fn profile_row(entry: &ProfileEntry<'_>) -> ProfileRow {
    ProfileRow {
        marker: if entry.default { "*" } else { "" },
        name: entry.name.to_owned(),
        host: entry.profile.host.clone(),
        port: entry.profile.port,
        interval: entry
            .profile
            .poll_interval_secs
            .map_or_else(|| "default".into(), |s| format!("{s}s")),
        serial: entry.profile.serial_number.clone().unwrap_or_default(),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn save(cfg: &Config) -> Result<(), CliError> {
    let path = cyberq_config::save_config(cfg)?;
    tracing::info!(path = %path.display(), "configuration saved");
    Ok(())
}

fn profile_from_flags(host: &str, global: &GlobalOpts) -> DeviceProfile {
    let mut profile = DeviceProfile::new(host.trim());
    if let Some(port) = global.port {
        profile.port = port;
    }
    profile.poll_interval_secs = global.interval;
    profile.timeout_secs = global.timeout;
    profile
}

/// Probe the device a new profile points at, refuse duplicates, and record
/// its serial number.
async fn verify_new_profile(
    cfg: &Config,
    profile: &mut DeviceProfile,
    out: Presentation,
) -> Result<(), CliError> {
    cfg.ensure_not_configured(&profile.host, profile.port, None)?;

    let transport = TransportConfig::with_timeout(request_timeout(profile, &cfg.defaults));
    let quiet = Presentation { quiet: true, ..out };
    let info = probe::handle(&profile.host, profile.port, &transport, quiet).await?;

    cfg.ensure_not_configured(&profile.host, profile.port, Some(&info.serial_number))?;
    eprintln!("   Found {} at {}", info.name(), profile.device_key());
    profile.serial_number = Some(info.serial_number);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: ConfigArgs,
    global: &GlobalOpts,
    mut cfg: Config,
    out: Presentation,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global, cfg, out).await,
        ConfigCommand::Add(add_args) => add(&add_args, global, &mut cfg, out).await,

        ConfigCommand::Remove { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }
            let prompt = format!("Remove profile '{name}'?");
            if !util::confirm("config remove", &prompt, global.yes)? {
                return Ok(());
            }
            cfg.remove_profile(&name)?;
            save(&cfg)?;
            output::print_output(&format!("Removed profile '{name}'"), out.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let rendered = match out.format {
                OutputFormat::Table | OutputFormat::Plain => {
                    let body = toml::to_string_pretty(&cfg)
                        .map_err(|e| CliError::Render(e.to_string()))?;
                    format!("# {}\n{body}", cyberq_config::config_path().display())
                }
                structured => output::render_structured(structured, &cfg)?,
            };
            output::print_output(rendered.trim_end(), out.quiet);
            Ok(())
        }

        ConfigCommand::List => {
            let entries: Vec<ProfileEntry<'_>> = cfg
                .profiles
                .iter()
                .map(|(name, profile)| ProfileEntry {
                    name,
                    default: cfg.default_profile.as_deref() == Some(name.as_str()),
                    profile,
                })
                .collect();
            let rendered =
                output::render_list(out.format, &entries, profile_row, |e| e.name.to_owned())?;
            output::print_output(&rendered, out.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            cfg.set_default(&name).map_err(|_| CliError::ProfileNotFound {
                name: name.clone(),
                available: available_profiles(&cfg),
            })?;
            save(&cfg)?;
            output::print_output(&format!("Default profile is now '{name}'"), out.quiet);
            Ok(())
        }
    }
}

async fn add(
    args: &ConfigAddArgs,
    global: &GlobalOpts,
    cfg: &mut Config,
    out: Presentation,
) -> Result<(), CliError> {
    if cfg.profiles.contains_key(&args.name) {
        return Err(CliError::AlreadyConfigured {
            profile: args.name.clone(),
        });
    }

    let mut profile = profile_from_flags(&args.address, global);
    // reject unusable host/port/interval before any network traffic
    cyberq_config::profile_to_coordinator_config(&profile, &cfg.defaults)?;

    if args.no_probe {
        cfg.ensure_not_configured(&profile.host, profile.port, None)?;
    } else {
        verify_new_profile(cfg, &mut profile, out).await?;
    }

    let summary = format!("Saved profile '{}' ({})", args.name, profile.device_key());
    cfg.add_profile(args.name.clone(), profile);
    save(cfg)?;
    output::print_output(&summary, out.quiet);
    Ok(())
}

async fn init(global: &GlobalOpts, mut cfg: Config, out: Presentation) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "interactive".into(),
            reason: "config init needs a terminal; use `cyberq config add <name> <host>`".into(),
        });
    }

    eprintln!("CyberQ configuration wizard");
    eprintln!("   Config path: {}\n", cyberq_config::config_path().display());

    let host: String = Input::new()
        .with_prompt("Device hostname or IP address")
        .interact_text()
        .map_err(util::prompt_err)?;
    let port: u16 = Input::new()
        .with_prompt("HTTP port")
        .default(global.port.unwrap_or(cyberq_core::config::DEFAULT_PORT))
        .interact_text()
        .map_err(util::prompt_err)?;
    let interval: u64 = Input::new()
        .with_prompt("Poll interval (seconds)")
        .default(global.interval.unwrap_or(cfg.defaults.poll_interval_secs))
        .interact_text()
        .map_err(util::prompt_err)?;

    let mut profile = profile_from_flags(&host, global);
    profile.port = port;
    profile.poll_interval_secs = Some(interval);
    cyberq_config::profile_to_coordinator_config(&profile, &cfg.defaults)?;
    verify_new_profile(&cfg, &mut profile, out).await?;

    let suggested = profile
        .serial_number
        .as_deref()
        .map_or_else(|| "cyberq".to_owned(), |s| format!("cyberq-{}", s.to_lowercase()));
    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(suggested)
        .validate_with(|input: &String| -> Result<(), String> {
            if cfg.profiles.contains_key(input) {
                Err(format!("profile '{input}' already exists"))
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(util::prompt_err)?;

    cfg.add_profile(name.clone(), profile);
    if cfg.default_profile.as_deref() != Some(name.as_str()) {
        cfg.set_default(&name)?;
    }
    save(&cfg)?;
    eprintln!("\n   Saved profile '{name}'. Try: cyberq status");
    Ok(())
}
