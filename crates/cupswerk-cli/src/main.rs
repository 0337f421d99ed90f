// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cupswerk — command line front end.
//
// Entry point. Loads the config, initialises logging, and runs one
// subcommand against the native print subsystem.
//
// Exit codes: 0 success, 1 enumeration/config/input failure, 2 job not queued.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cupswerk_core::config::{ClientConfig, default_config_path};
use cupswerk_core::error::{CupsPhase, CupswerkError};
use cupswerk_core::human_errors::{Severity, humanize_error};

use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "cupswerk", version, about = "List CUPS destinations and submit print jobs")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/cupswerk/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let config = match ClientConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ClientConfig::default().log_filter);
            report(&e);
            return ExitCode::from(1);
        }
    };
    init_logging(&config.log_filter);

    let subsystem = cupswerk_bridge::native_subsystem();
    tracing::debug!(backend = subsystem.backend_name(), "cupswerk starting");

    let mut stdout = std::io::stdout().lock();
    match commands::run(cli.command, &config, subsystem.as_ref(), &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the configured filter.
fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

fn exit_code(err: &CupswerkError) -> u8 {
    match err {
        CupswerkError::Cups(e) => match e.phase() {
            CupsPhase::CreateJob
            | CupsPhase::StartDocument
            | CupsPhase::WriteData
            | CupsPhase::FinishDocument => 2,
            CupsPhase::EnumerateDestinations | CupsPhase::NoDefaultDestination => 1,
        },
        _ => 1,
    }
}

fn report(err: &CupswerkError) {
    eprint!("{}", render_report(err));
}

/// The text shown on stderr for a failed command.
fn render_report(err: &CupswerkError) -> String {
    let human = humanize_error(err);
    let mut lines = Vec::new();
    if let CupswerkError::Cups(e) = err {
        if exit_code(err) == 2 {
            lines.push("Job was not queued.".to_string());
        }
        lines.push(format!("Error during {}: {} [{}]", e.phase(), e.message(), e.status()));
    } else {
        lines.push(format!("Error: {err}"));
    }
    lines.push(human.message);
    lines.push(human.suggestion);
    match human.severity {
        Severity::Transient if human.retriable => {
            lines.push("This is usually temporary; running the command again may work.".to_string());
        }
        Severity::Permanent => {
            lines.push("Running the command again will not help.".to_string());
        }
        _ if human.retriable => lines.push("Running the command again may work.".to_string()),
        _ => {}
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
