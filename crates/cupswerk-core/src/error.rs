// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for Cupswerk.
//
// `CupsError` is the typed result of a failed CUPS operation: it records which
// phase of the protocol failed, together with the status and message that
// libcups left in its global last-error state. `CupswerkError` wraps it for
// everything above the protocol layer (config, I/O, command line).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::IppStatus;

/// Message carried by [`CupsPhase::NoDefaultDestination`] errors.
pub const NO_DEFAULT_DESTINATION_MESSAGE: &str = "No default printer configured";

/// The protocol step that produced a [`CupsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CupsPhase {
    EnumerateDestinations,
    NoDefaultDestination,
    CreateJob,
    StartDocument,
    WriteData,
    FinishDocument,
}

impl CupsPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnumerateDestinations => "enumerate-destinations",
            Self::NoDefaultDestination => "no-default-destination",
            Self::CreateJob => "create-job",
            Self::StartDocument => "start-document",
            Self::WriteData => "write-data",
            Self::FinishDocument => "finish-document",
        }
    }
}

impl std::fmt::Display for CupsPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed CUPS operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase}: {message}")]
pub struct CupsError {
    phase: CupsPhase,
    status: IppStatus,
    message: String,
}

impl CupsError {
    /// Error for a failed native call. `status` and `message` must be read
    /// from `cupsLastError()`/`cupsLastErrorString()` before any other CUPS
    /// call is made.
    pub fn native(phase: CupsPhase, status: IppStatus, message: impl Into<String>) -> Self {
        Self {
            phase,
            status,
            message: message.into(),
        }
    }

    /// Enumeration succeeded but no destination is flagged as default.
    /// Not a native failure, so the status is `IppStatus::OK`.
    pub fn no_default_destination() -> Self {
        Self {
            phase: CupsPhase::NoDefaultDestination,
            status: IppStatus::OK,
            message: NO_DEFAULT_DESTINATION_MESSAGE.to_string(),
        }
    }

    pub fn phase(&self) -> CupsPhase {
        self.phase
    }

    pub fn status(&self) -> IppStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Alias for results of CUPS protocol operations.
pub type CupsResult<T> = std::result::Result<T, CupsError>;

/// Top-level error type for Cupswerk.
#[derive(Debug, Error)]
pub enum CupswerkError {
    #[error(transparent)]
    Cups(#[from] CupsError),

    #[error("destination not found: {0}")]
    DestinationNotFound(String),

    #[error("unknown document format: {0}")]
    UnknownFormat(String),

    #[error("invalid option '{0}', expected key=value")]
    InvalidOption(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CupswerkError>;
