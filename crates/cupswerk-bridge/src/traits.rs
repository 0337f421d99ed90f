// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions for the native print subsystem.
//
// The traits keep the shape of the libcups calls: counts, job ids and status
// codes come back raw, and each call site decides what counts as failure.

use std::borrow::Cow;
use std::ffi::{CStr, CString};

use cupswerk_core::error::{CupsError, CupsPhase};
use cupswerk_core::types::{HttpStatus, IppStatus};

/// One destination record borrowed from a [`DestArray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDest<'a> {
    pub name: Cow<'a, str>,
    /// `None` when the native field is NULL.
    pub instance: Option<Cow<'a, str>>,
    /// Native integer flag, non-zero for the default destination.
    pub is_default: i32,
    pub options: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

/// Destination array returned by `cupsGetDests`.
///
/// Owns the native allocation; dropping the value releases it.
pub trait DestArray {
    /// Raw count as returned by the native call. Negative means failure.
    fn count(&self) -> i32;

    /// Record at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<RawDest<'_>>;
}

/// A job option ready to cross the FFI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOption {
    pub name: CString,
    pub value: CString,
}

/// The native print subsystem (libcups or a stand-in).
///
/// All calls are blocking. Implementations keep libcups' global last-error
/// semantics: `last_error` and `last_error_string` describe the most recent
/// call only.
pub trait PrintSubsystem {
    /// Human-readable backend name.
    fn backend_name(&self) -> &str;

    /// `cupsGetDests`.
    fn get_dests(&self) -> Box<dyn DestArray + '_>;

    /// `cupsCreateJob`. Returns the job id.
    fn create_job(&self, destination: &CStr, title: &CStr, options: &[JobOption]) -> i32;

    /// `cupsStartDocument`.
    fn start_document(
        &self,
        destination: &CStr,
        job_id: i32,
        doc_name: &CStr,
        format: &CStr,
        last_document: bool,
    ) -> HttpStatus;

    /// `cupsWriteRequestData`.
    fn write_request_data(&self, data: &[u8]) -> HttpStatus;

    /// `cupsFinishDocument`.
    fn finish_document(&self, destination: &CStr) -> IppStatus;

    /// `cupsCancelJob`. Returns whether the server accepted the request.
    fn cancel_job(&self, destination: &CStr, job_id: i32) -> bool;

    /// `cupsLastError`.
    fn last_error(&self) -> IppStatus;

    /// `cupsLastErrorString`.
    fn last_error_string(&self) -> String;

    /// Build a [`CupsError`] for `phase` from the current last-error state.
    /// Call this directly after the failing call.
    fn capture_error(&self, phase: CupsPhase) -> CupsError {
        let status = self.last_error();
        let message = self.last_error_string();
        CupsError::native(phase, status, message)
    }
}
