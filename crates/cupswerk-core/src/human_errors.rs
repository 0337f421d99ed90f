// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language explanations for errors shown on the command line.
//
// The phase tells us where the protocol stopped; the IPP status narrows down
// why. Nothing here is retried automatically, `retriable` only says whether
// running the same command again is worth a try.

use crate::error::{CupsError, CupsPhase, CupswerkError};
use crate::types::IppStatus;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Server busy or unreachable, likely to clear up by itself.
    Transient,
    /// User must do something (configure a printer, fix an option, log in).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `CupswerkError` into a `HumanError`.
pub fn humanize_error(err: &CupswerkError) -> HumanError {
    match err {
        CupswerkError::Cups(cups) => humanize_cups_error(cups),

        CupswerkError::DestinationNotFound(target) => HumanError::new(
            "That printer doesn't exist.",
            format!("Run `cupswerk list` to see the available printers. (Looked for: {target})"),
            false,
            Severity::ActionRequired,
        ),

        CupswerkError::UnknownFormat(format) => HumanError::new(
            "That document format isn't supported.",
            format!("Use text, pdf or postscript. (Got: {format})"),
            false,
            Severity::Permanent,
        ),

        CupswerkError::InvalidOption(option) => HumanError::new(
            "A print option couldn't be understood.",
            format!("Write options as key=value, for example copies=2. (Got: {option})"),
            false,
            Severity::ActionRequired,
        ),

        CupswerkError::Config(detail) => HumanError::new(
            "The configuration file couldn't be read.",
            format!("Fix or remove the file and try again. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        CupswerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "Check the path and try again.",
                false,
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "You don't have permission to read that file.",
                "Check the file permissions.",
                false,
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, check the disk.",
                true,
                Severity::Transient,
            ),
        },

        CupswerkError::Serialization(_) => HumanError::new(
            "Cupswerk had an internal data problem.",
            "Try again. If this keeps happening, please report it.",
            true,
            Severity::Transient,
        ),
    }
}

/// Explain a failed CUPS operation.
pub fn humanize_cups_error(err: &CupsError) -> HumanError {
    if err.phase() == CupsPhase::NoDefaultDestination {
        return HumanError::new(
            "No default printer is set.",
            "Pick a printer with --dest, or set one with `lpoptions -d <printer>`.",
            false,
            Severity::ActionRequired,
        );
    }

    match err.status() {
        IppStatus::ERROR_SERVICE_UNAVAILABLE => HumanError::new(
            "The print service isn't available.",
            "Make sure the CUPS scheduler is running, then try again.",
            true,
            Severity::Transient,
        ),
        IppStatus::ERROR_NOT_AUTHENTICATED | IppStatus::ERROR_FORBIDDEN => HumanError::new(
            "The print server refused the request.",
            "You may need to log in or be allowed to use this printer.",
            false,
            Severity::ActionRequired,
        ),
        IppStatus::ERROR_NOT_FOUND => HumanError::new(
            "The print server doesn't know that printer.",
            "Run `cupswerk list` to see the available printers.",
            false,
            Severity::ActionRequired,
        ),
        IppStatus::ERROR_DOCUMENT_FORMAT_NOT_SUPPORTED => HumanError::new(
            "The printer doesn't understand this file type.",
            "Try converting the document to PDF first.",
            false,
            Severity::Permanent,
        ),
        IppStatus::ERROR_BAD_REQUEST => HumanError::new(
            "The print request was rejected.",
            format!("Check the job name and print options. ({})", err.message()),
            false,
            Severity::ActionRequired,
        ),
        _ => humanize_by_phase(err),
    }
}

fn humanize_by_phase(err: &CupsError) -> HumanError {
    let detail = err.message();
    match err.phase() {
        CupsPhase::EnumerateDestinations => HumanError::new(
            "We couldn't get the list of printers.",
            format!("Check that CUPS is running and reachable. (Detail: {detail})"),
            true,
            Severity::Transient,
        ),
        CupsPhase::CreateJob => HumanError::new(
            "The printer didn't accept a new job.",
            format!("The queue may be stopped or rejecting jobs. (Detail: {detail})"),
            true,
            Severity::Transient,
        ),
        CupsPhase::StartDocument | CupsPhase::WriteData | CupsPhase::FinishDocument => {
            HumanError::new(
                "Sending the document failed, so the job was cancelled.",
                format!("Try again. (Detail: {detail})"),
                true,
                Severity::Transient,
            )
        }
        CupsPhase::NoDefaultDestination => HumanError::new(
            "No default printer is set.",
            "Pick a printer with --dest.",
            false,
            Severity::ActionRequired,
        ),
    }
}
