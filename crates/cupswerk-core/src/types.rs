// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: destinations, document formats and the raw native status
// codes reported by the CUPS API.

use std::collections::BTreeMap;
use std::ffi::CStr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CupswerkError;

/// Job identifier assigned by the print server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub i32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IPP status code (`ipp_status_t`) as reported by `cupsLastError()` and
/// `cupsFinishDocument()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IppStatus(pub i32);

impl IppStatus {
    pub const OK: Self = Self(0x0000);
    pub const ERROR_BAD_REQUEST: Self = Self(0x0400);
    pub const ERROR_FORBIDDEN: Self = Self(0x0401);
    pub const ERROR_NOT_AUTHENTICATED: Self = Self(0x0402);
    pub const ERROR_NOT_FOUND: Self = Self(0x0406);
    pub const ERROR_DOCUMENT_FORMAT_NOT_SUPPORTED: Self = Self(0x040A);
    pub const ERROR_INTERNAL: Self = Self(0x0500);
    pub const ERROR_SERVICE_UNAVAILABLE: Self = Self(0x0503);
    /// `IPP_STATUS_ERROR_CUPS_INVALID`, used by libcups for local failures.
    pub const ERROR_CUPS_INVALID: Self = Self(-1);

    /// Short IPP keyword for well-known codes.
    pub fn keyword(&self) -> Option<&'static str> {
        match *self {
            Self::OK => Some("successful-ok"),
            Self::ERROR_BAD_REQUEST => Some("client-error-bad-request"),
            Self::ERROR_FORBIDDEN => Some("client-error-forbidden"),
            Self::ERROR_NOT_AUTHENTICATED => Some("client-error-not-authenticated"),
            Self::ERROR_NOT_FOUND => Some("client-error-not-found"),
            Self::ERROR_DOCUMENT_FORMAT_NOT_SUPPORTED => {
                Some("client-error-document-format-not-supported")
            }
            Self::ERROR_INTERNAL => Some("server-error-internal-error"),
            Self::ERROR_SERVICE_UNAVAILABLE => Some("server-error-service-unavailable"),
            _ => None,
        }
    }
}

impl std::fmt::Display for IppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.keyword() {
            Some(keyword) => write!(f, "{keyword} ({:#06x})", self.0),
            None if self.0 < 0 => write!(f, "{}", self.0),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}

/// HTTP status code (`http_status_t`) returned by the streaming document
/// calls. Those calls report success as `CONTINUE`, not `OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatus(pub i32);

impl HttpStatus {
    pub const ERROR: Self = Self(-1);
    pub const CONTINUE: Self = Self(100);
    pub const BAD_REQUEST: Self = Self(400);
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

/// Document formats a job can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Text,
    Pdf,
    PostScript,
}

impl DocumentFormat {
    /// MIME type handed to `cupsStartDocument` (`CUPS_FORMAT_*`).
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Pdf => "application/pdf",
            Self::PostScript => "application/postscript",
        }
    }

    /// Same as [`mime_type`](Self::mime_type), NUL-terminated for FFI.
    pub fn native_format(&self) -> &'static CStr {
        match self {
            Self::Text => c"text/plain",
            Self::Pdf => c"application/pdf",
            Self::PostScript => c"application/postscript",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "ps" | "eps" => Some(Self::PostScript),
            _ => None,
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = CupswerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" | "text/plain" => Ok(Self::Text),
            "pdf" | "application/pdf" => Ok(Self::Pdf),
            "postscript" | "ps" | "application/postscript" => Ok(Self::PostScript),
            _ => Err(CupswerkError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A print destination (CUPS printer or printer instance).
///
/// Destinations are produced by enumerating the print subsystem. Identity is
/// fixed once created; the option map may be overridden before printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    name: String,
    instance: String,
    is_default: bool,
    options: BTreeMap<String, String>,
}

impl Destination {
    /// Build a destination from enumerated values. An empty `instance` means
    /// the destination is the printer itself.
    ///
    /// Destinations come from `DestinationDirectory`; outside of it this is
    /// only meant for constructing fixtures in tests.
    #[doc(hidden)]
    pub fn new(
        name: impl Into<String>,
        instance: impl Into<String>,
        is_default: bool,
        options: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
            is_default,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance name, empty when this is the base printer.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Insert or replace an option value.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    /// Identifier used to address this destination: `name`, or
    /// `name/instance` for a non-empty instance.
    pub fn target_id(&self) -> String {
        if self.instance.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.name, self.instance)
        }
    }

    /// Whether `target` (`name` or `name/instance`) addresses this destination.
    pub fn matches(&self, target: &str) -> bool {
        match target.split_once('/') {
            Some((name, instance)) => self.name == name && self.instance == instance,
            None => self.name == target && self.instance.is_empty(),
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.instance.is_empty() {
            write!(f, "/{}", self.instance)?;
        }
        Ok(())
    }
}
