// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Output goes to the given writer so the
// commands can be exercised against the in-memory subsystem.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tracing::{debug, info};

use cupswerk_bridge::PrintSubsystem;
use cupswerk_core::config::ClientConfig;
use cupswerk_core::error::{CupswerkError, Result};
use cupswerk_core::types::{Destination, DocumentFormat};
use cupswerk_print::{DestinationDirectory, JobSubmitter};

/// Payload printed when no file is given.
pub const TEST_PAGE: &str = "This was printed from cupswerk.\n";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all destinations with their options.
    List {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the default destination.
    Default,
    /// Print a file, or a test line when no file is given.
    Print(PrintArgs),
}

#[derive(Debug, Args)]
pub struct PrintArgs {
    /// Destination as NAME or NAME/INSTANCE (default: configured, then server default).
    #[arg(short, long)]
    pub dest: Option<String>,
    /// Job name.
    #[arg(short, long)]
    pub title: Option<String>,
    /// Document format: text, pdf or postscript (default: from file extension).
    #[arg(short, long)]
    pub format: Option<DocumentFormat>,
    /// Job option, repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
    /// File to print.
    pub file: Option<PathBuf>,
}

pub fn run(
    command: Command,
    config: &ClientConfig,
    subsystem: &dyn PrintSubsystem,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::List { json } => list(subsystem, json, out),
        Command::Default => show_default(subsystem, out),
        Command::Print(args) => print(args, config, subsystem, out),
    }
}

fn list(subsystem: &dyn PrintSubsystem, json: bool, out: &mut dyn Write) -> Result<()> {
    let destinations = DestinationDirectory::new(subsystem).list_all()?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&destinations)?)?;
        return Ok(());
    }

    if destinations.is_empty() {
        writeln!(out, "No printers found.")?;
    }
    for destination in &destinations {
        let marker = if destination.is_default() { " (default)" } else { "" };
        writeln!(out, "Printer: {destination}{marker}")?;
        for (key, value) in destination.options() {
            writeln!(out, "  {key}={value}")?;
        }
    }
    Ok(())
}

fn show_default(subsystem: &dyn PrintSubsystem, out: &mut dyn Write) -> Result<()> {
    let destination = DestinationDirectory::new(subsystem).get_default()?;
    writeln!(out, "Default printer: {destination}")?;
    Ok(())
}

fn print(
    args: PrintArgs,
    config: &ClientConfig,
    subsystem: &dyn PrintSubsystem,
    out: &mut dyn Write,
) -> Result<()> {
    let target = args.dest.as_deref().or(config.destination.as_deref());
    let mut destination = select_destination(subsystem, target)?;

    config.apply_options(&mut destination);
    for option in &args.options {
        let (key, value) = parse_option(option)?;
        destination.set_option(key, value);
    }

    let (data, format, title) = match &args.file {
        Some(path) => {
            let data = std::fs::read(path)?;
            let format = args
                .format
                .or_else(|| infer_format(path))
                .unwrap_or(config.format);
            let title = args
                .title
                .clone()
                .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| config.job_name.clone());
            (data, format, title)
        }
        None => (
            TEST_PAGE.as_bytes().to_vec(),
            args.format.unwrap_or(DocumentFormat::Text),
            args.title.clone().unwrap_or_else(|| config.job_name.clone()),
        ),
    };

    debug!(destination = %destination, %format, bytes = data.len(), "submitting");
    let job_id = JobSubmitter::new(subsystem).print(&destination, &title, &data, format)?;
    info!(%job_id, destination = %destination, "queued");
    writeln!(out, "Printing queued successfully on {destination} (job {job_id}).")?;
    Ok(())
}

/// The destination addressed by `target`, or the server default.
fn select_destination(subsystem: &dyn PrintSubsystem, target: Option<&str>) -> Result<Destination> {
    let directory = DestinationDirectory::new(subsystem);
    match target {
        Some(target) => directory
            .find(target)?
            .ok_or_else(|| CupswerkError::DestinationNotFound(target.to_string())),
        None => Ok(directory.get_default()?),
    }
}

/// Split `key=value`. The key must be non-empty; the value may be empty.
pub fn parse_option(option: &str) -> Result<(&str, &str)> {
    match option.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CupswerkError::InvalidOption(option.to_string())),
    }
}

fn infer_format(path: &Path) -> Option<DocumentFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupswerk_bridge::mock::{MockStep, MockSubsystem, NativeCall};
    use cupswerk_core::error::CupsPhase;
    use cupswerk_core::types::IppStatus;

    fn host() -> MockSubsystem {
        MockSubsystem::new()
            .with_destination("printerA", None, true, &[("copies", "1")])
            .with_destination("printerB", Some("draft"), false, &[("copies", "1")])
    }

    fn print_args() -> PrintArgs {
        PrintArgs {
            dest: None,
            title: None,
            format: None,
            options: Vec::new(),
            file: None,
        }
    }

    fn run_to_string(command: Command, config: &ClientConfig, mock: &MockSubsystem) -> Result<String> {
        let mut out = Vec::new();
        run(command, config, mock, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    fn created_job(mock: &MockSubsystem) -> (String, String, Vec<(String, String)>) {
        mock.calls()
            .into_iter()
            .find_map(|call| match call {
                NativeCall::CreateJob {
                    destination,
                    title,
                    options,
                } => Some((destination, title, options)),
                _ => None,
            })
            .expect("create job call")
    }

    #[test]
    fn parse_option_accepts_key_value() {
        assert_eq!(parse_option("copies=2").expect("parse"), ("copies", "2"));
        assert_eq!(parse_option("job-sheets=").expect("parse"), ("job-sheets", ""));
        assert!(parse_option("copies").is_err());
        assert!(parse_option("=2").is_err());
    }

    #[test]
    fn list_marks_the_default() {
        let output = run_to_string(Command::List { json: false }, &ClientConfig::default(), &host())
            .expect("list");
        assert!(output.contains("Printer: printerA (default)"));
        assert!(output.contains("Printer: printerB/draft\n"));
        assert!(output.contains("  copies=1"));
    }

    #[test]
    fn list_json_is_parseable() {
        let output = run_to_string(Command::List { json: true }, &ClientConfig::default(), &host())
            .expect("list");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value[1]["instance"], "draft");
        assert_eq!(value[0]["is_default"], true);
    }

    #[test]
    fn list_surfaces_enumeration_failure() {
        let mock = MockSubsystem::new().failing_at(
            MockStep::GetDests,
            IppStatus::ERROR_SERVICE_UNAVAILABLE,
            "Scheduler is not running",
        );
        let err = run_to_string(Command::List { json: false }, &ClientConfig::default(), &mock)
            .unwrap_err();
        assert!(matches!(
            err,
            CupswerkError::Cups(ref e) if e.phase() == CupsPhase::EnumerateDestinations
        ));
    }

    #[test]
    fn print_without_file_sends_test_page_to_default() {
        let mock = host();
        let output =
            run_to_string(Command::Print(print_args()), &ClientConfig::default(), &mock).expect("print");

        assert!(output.contains("queued successfully on printerA"));
        assert_eq!(mock.written_data(), TEST_PAGE.as_bytes());
        let (destination, title, _) = created_job(&mock);
        assert_eq!(destination, "printerA");
        assert_eq!(title, "cupswerk");
    }

    #[test]
    fn print_file_to_named_instance_with_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.7").expect("write");

        let mut config = ClientConfig::default();
        config.options.insert("media".into(), "iso_a4_210x297mm".into());

        let mock = host();
        let mut args = print_args();
        args.dest = Some("printerB/draft".into());
        args.options = vec!["copies=2".into()];
        args.file = Some(path);

        run_to_string(Command::Print(args), &config, &mock).expect("print");

        let (destination, title, options) = created_job(&mock);
        assert_eq!(destination, "printerB/draft");
        assert_eq!(title, "invoice.pdf");
        assert_eq!(
            options,
            vec![
                ("copies".to_string(), "2".to_string()),
                ("media".to_string(), "iso_a4_210x297mm".to_string()),
            ]
        );
        assert!(mock.calls().iter().any(|call| matches!(
            call,
            NativeCall::StartDocument { format, .. } if format == "application/pdf"
        )));
    }

    #[test]
    fn unknown_destination_is_reported() {
        let mut args = print_args();
        args.dest = Some("printerZ".into());

        let err = run_to_string(Command::Print(args), &ClientConfig::default(), &host()).unwrap_err();
        assert!(matches!(err, CupswerkError::DestinationNotFound(ref t) if t == "printerZ"));
    }

    #[test]
    fn failed_write_reports_phase_and_cancels() {
        let mock = host().with_next_job_id(5).failing_at(
            MockStep::WriteData,
            IppStatus::ERROR_INTERNAL,
            "Broken pipe",
        );

        let err = run_to_string(Command::Print(print_args()), &ClientConfig::default(), &mock)
            .unwrap_err();

        assert!(matches!(err, CupswerkError::Cups(ref e) if e.phase() == CupsPhase::WriteData));
        assert_eq!(mock.cancelled_jobs(), vec![5]);
    }
}
