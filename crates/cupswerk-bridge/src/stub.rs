// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub subsystem for builds without libcups.
//
// Every call fails the way libcups fails when the scheduler is unreachable,
// with a last-error message that says why.

use std::ffi::CStr;

use cupswerk_core::types::{HttpStatus, IppStatus};

use crate::traits::*;

/// Last-error message reported by [`StubSubsystem`].
pub const STUB_MESSAGE: &str = "CUPS support not compiled in";

/// Subsystem returned when the `cups` feature is disabled.
#[derive(Debug, Default)]
pub struct StubSubsystem;

struct NoDests;

impl DestArray for NoDests {
    fn count(&self) -> i32 {
        -1
    }

    fn get(&self, _index: usize) -> Option<RawDest<'_>> {
        None
    }
}

impl PrintSubsystem for StubSubsystem {
    fn backend_name(&self) -> &str {
        "stub"
    }

    fn get_dests(&self) -> Box<dyn DestArray + '_> {
        tracing::warn!("PrintSubsystem::get_dests called on stub subsystem");
        Box::new(NoDests)
    }

    fn create_job(&self, _destination: &CStr, _title: &CStr, _options: &[JobOption]) -> i32 {
        tracing::warn!("PrintSubsystem::create_job called on stub subsystem");
        -1
    }

    fn start_document(
        &self,
        _destination: &CStr,
        _job_id: i32,
        _doc_name: &CStr,
        _format: &CStr,
        _last_document: bool,
    ) -> HttpStatus {
        HttpStatus::ERROR
    }

    fn write_request_data(&self, _data: &[u8]) -> HttpStatus {
        HttpStatus::ERROR
    }

    fn finish_document(&self, _destination: &CStr) -> IppStatus {
        IppStatus::ERROR_SERVICE_UNAVAILABLE
    }

    fn cancel_job(&self, _destination: &CStr, _job_id: i32) -> bool {
        false
    }

    fn last_error(&self) -> IppStatus {
        IppStatus::ERROR_SERVICE_UNAVAILABLE
    }

    fn last_error_string(&self) -> String {
        STUB_MESSAGE.to_string()
    }
}
