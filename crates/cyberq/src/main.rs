mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cyberq_core::{Coordinator, TransportConfig};

use crate::cli::{Cli, Command};
use crate::config::Presentation;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Shell completions need neither config nor a device
    if let Command::Completions(args) = &cli.command {
        use clap::CommandFactory;

        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "cyberq", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = cyberq_config::load_config()?;
    let out = Presentation::resolve(&cli.global, &cfg.defaults);

    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global, cfg, out).await,

        Command::Probe(args) => {
            let (host, mut profile) = match args.host {
                Some(host) => {
                    let mut profile = cyberq_config::DeviceProfile::new(host.clone());
                    profile.timeout_secs = cli.global.timeout;
                    (host, profile)
                }
                None => {
                    let (_, profile) = config::resolve_profile(&cli.global, &cfg)?;
                    (profile.host.clone(), profile)
                }
            };
            if let Some(port) = cli.global.port {
                profile.port = port;
            }
            let transport =
                TransportConfig::with_timeout(config::request_timeout(&profile, &cfg.defaults));
            commands::probe::handle(&host, profile.port, &transport, out).await?;
            Ok(())
        }

        // Everything else talks to the device through a coordinator
        cmd => {
            let coordinator_config = config::coordinator_config(&cli.global, &cfg)?;
            let coordinator = Coordinator::new(coordinator_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &coordinator, out).await
        }
    }
}
