mod auth;
mod cli;
mod commands;
mod config;
mod logging;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, OutputFormat};
use output::print_error;
use wavefront_core::{Connection, WavefrontClient};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when a failure was already reported as a result record.
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let profile = &cli.profile;
    let timeout = Duration::from_secs(cli.timeout);
    let format = resolve_format(cli.format, profile);

    match &cli.command {
        Commands::Alert(args) => {
            let (connection, client) = connect(&cli, timeout)?;
            commands::alert::get(&client, &connection, &args.alert_id, format).await?;
        }
        Commands::Source(args) => {
            let (connection, client) = connect(&cli, timeout)?;
            commands::source::apply(&client, &connection, args, format).await?;
        }
        Commands::Tags(args) => {
            let (connection, client) = connect(&cli, timeout)?;
            commands::tags::apply(&client, &connection, args, format).await?;
        }
        Commands::Event(args) => {
            let (connection, client) = connect(&cli, timeout)?;
            commands::event::run(&client, &connection, &args.command, format).await?;
        }
        Commands::Run(args) => {
            let defaults =
                config::resolve_endpoint(&cli.endpoint, profile).map(|endpoint| {
                    commands::run::Defaults {
                        endpoint,
                        token: config::resolve_token(&cli.token, profile).ok(),
                    }
                });
            return commands::run::run(args, defaults, timeout).await;
        }
        Commands::Login(args) => {
            let endpoint = config::resolve_endpoint(&cli.endpoint, profile)?;
            commands::auth::login(&endpoint, &args.api_token, profile)?;
        }
        Commands::Logout => {
            commands::auth::logout(profile)?;
        }
        Commands::Whoami => {
            commands::auth::whoami(profile)?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Endpoint".cyan(),
                    cfg.endpoint.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("json")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "endpoint" => cfg.endpoint = Some(set_args.value.clone()),
                    "format" => {
                        set_args
                            .value
                            .parse::<OutputFormat>()
                            .map_err(|e| anyhow::anyhow!("Invalid format: {e}"))?;
                        cfg.format = Some(set_args.value.clone());
                    }
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: endpoint, format")
                    }
                }
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(true)
}

/// `--format` wins over the profile's stored format.
fn resolve_format(cli_format: Option<OutputFormat>, profile: &str) -> OutputFormat {
    cli_format
        .or_else(|| {
            config::load_profile(profile)
                .ok()?
                .format?
                .parse::<OutputFormat>()
                .ok()
        })
        .unwrap_or_default()
}

fn connect(cli: &Cli, timeout: Duration) -> Result<(Connection, WavefrontClient)> {
    let connection = config::resolve_connection(&cli.endpoint, &cli.token, &cli.profile)?;
    let client = WavefrontClient::with_timeout(&connection, timeout)?;
    tracing::debug!(endpoint = %client.base_url(), profile = %cli.profile, "connected");
    Ok((connection, client))
}
