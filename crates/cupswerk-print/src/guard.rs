// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scoped job cancellation.

use std::ffi::CStr;

use tracing::{error, warn};

use cupswerk_bridge::PrintSubsystem;

/// Cancels a server-side job on drop unless dismissed.
///
/// Armed as soon as `cupsCreateJob` returns a job id, dismissed only once the
/// document has been finished. Job ids `<= 0` are never cancelled: CUPS reads
/// job id 0 as "every job on this destination".
#[must_use = "dropping the guard immediately cancels the job"]
pub struct JobGuard<'a> {
    subsystem: &'a dyn PrintSubsystem,
    destination: &'a CStr,
    job_id: i32,
    armed: bool,
}

impl<'a> JobGuard<'a> {
    pub fn arm(subsystem: &'a dyn PrintSubsystem, destination: &'a CStr, job_id: i32) -> Self {
        Self {
            subsystem,
            destination,
            job_id,
            armed: true,
        }
    }

    pub fn job_id(&self) -> i32 {
        self.job_id
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Keep the job. Dropping the guard afterwards does nothing.
    pub fn dismiss(mut self) {
        self.armed = false;
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.armed || self.job_id <= 0 {
            return;
        }
        warn!(
            job_id = self.job_id,
            destination = %self.destination.to_string_lossy(),
            "cancelling unfinished job"
        );
        if !self.subsystem.cancel_job(self.destination, self.job_id) {
            error!(
                job_id = self.job_id,
                detail = %self.subsystem.last_error_string(),
                "cupsCancelJob failed"
            );
        }
    }
}
