// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job submission.
//
// A job is submitted in four native steps:
//   1. cupsCreateJob        — job id, negative on failure
//   2. cupsStartDocument    — HTTP_CONTINUE on success
//   3. cupsWriteRequestData — HTTP_CONTINUE on success
//   4. cupsFinishDocument   — IPP_STATUS_OK on success
//
// Once step 1 succeeds a `JobGuard` owns the job and cancels it on any early
// return, so a failed submission never leaves a job behind on the server.

use std::ffi::CString;

use tracing::{debug, error, info, instrument};

use cupswerk_bridge::{JobOption, PrintSubsystem};
use cupswerk_core::error::{CupsError, CupsPhase, CupsResult};
use cupswerk_core::types::{Destination, DocumentFormat, HttpStatus, IppStatus, JobId};

use crate::guard::JobGuard;

/// Name of the single document inside each job.
const DOCUMENT_NAME: &std::ffi::CStr = c"doc";

/// Submits single-document jobs to a destination.
pub struct JobSubmitter<'s> {
    subsystem: &'s dyn PrintSubsystem,
}

impl<'s> JobSubmitter<'s> {
    pub fn new(subsystem: &'s dyn PrintSubsystem) -> Self {
        Self { subsystem }
    }

    /// Print `data` on `destination` as one job containing one document.
    ///
    /// The destination's current options are sent with the job unchanged.
    /// Returns the server's job id once the job is queued; on error no job is
    /// left on the server.
    #[instrument(
        skip(self, destination, data),
        fields(destination = %destination, bytes = data.len(), format = %format)
    )]
    pub fn print(
        &self,
        destination: &Destination,
        job_name: &str,
        data: &[u8],
        format: DocumentFormat,
    ) -> CupsResult<JobId> {
        let target = to_cstring(destination.target_id(), "destination name")?;
        let title = to_cstring(job_name, "job name")?;
        let options = destination
            .options()
            .iter()
            .map(|(key, value)| {
                Ok(JobOption {
                    name: to_cstring(key.as_str(), "option name")?,
                    value: to_cstring(value.as_str(), "option value")?,
                })
            })
            .collect::<CupsResult<Vec<_>>>()?;
        check_option_count(options.len())?;

        let job_id = self.subsystem.create_job(&target, &title, &options);
        if job_id < 0 {
            return Err(self.fail(CupsPhase::CreateJob));
        }
        let guard = JobGuard::arm(self.subsystem, &target, job_id);
        debug!(job_id, "job created");

        let status = self.subsystem.start_document(
            &target,
            job_id,
            DOCUMENT_NAME,
            format.native_format(),
            true,
        );
        if status != HttpStatus::CONTINUE {
            return Err(self.fail(CupsPhase::StartDocument));
        }

        if self.subsystem.write_request_data(data) != HttpStatus::CONTINUE {
            return Err(self.fail(CupsPhase::WriteData));
        }

        if self.subsystem.finish_document(&target) != IppStatus::OK {
            return Err(self.fail(CupsPhase::FinishDocument));
        }

        guard.dismiss();
        info!(job_id, "job queued");
        Ok(JobId(job_id))
    }

    /// Sample the last error for `phase`. Must run before any other native
    /// call, including the guard's cancel.
    fn fail(&self, phase: CupsPhase) -> CupsError {
        let err = self.subsystem.capture_error(phase);
        error!(%phase, status = %err.status(), detail = err.message(), "print job failed");
        err
    }
}

/// Strings with an interior NUL cannot be passed to libcups. This is reported
/// as a rejected job before anything is created on the server.
fn to_cstring(value: impl Into<Vec<u8>>, what: &str) -> CupsResult<CString> {
    CString::new(value).map_err(|e| {
        CupsError::native(
            CupsPhase::CreateJob,
            IppStatus::ERROR_BAD_REQUEST,
            format!("{what} contains a NUL byte at position {}", e.nul_position()),
        )
    })
}

/// `cupsCreateJob` takes the option count as a C `int`.
fn check_option_count(len: usize) -> CupsResult<i32> {
    i32::try_from(len).map_err(|_| {
        CupsError::native(
            CupsPhase::CreateJob,
            IppStatus::ERROR_BAD_REQUEST,
            format!("{len} job options exceed the native limit of {}", i32::MAX),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use cupswerk_bridge::mock::{MockStep, MockSubsystem, NativeCall};

    fn printer_a() -> Destination {
        Destination::new(
            "printerA",
            "",
            true,
            BTreeMap::from([("copies".to_string(), "1".to_string())]),
        )
    }

    #[test]
    fn successful_job_runs_all_four_steps() {
        let mock = MockSubsystem::new().with_next_job_id(12);

        let job_id = JobSubmitter::new(&mock)
            .print(&printer_a(), "report", b"hello", DocumentFormat::Text)
            .expect("print");

        assert_eq!(job_id, JobId(12));
        assert_eq!(
            mock.calls(),
            vec![
                NativeCall::CreateJob {
                    destination: "printerA".into(),
                    title: "report".into(),
                    options: vec![("copies".into(), "1".into())],
                },
                NativeCall::StartDocument {
                    destination: "printerA".into(),
                    job_id: 12,
                    doc_name: "doc".into(),
                    format: "text/plain".into(),
                    last_document: true,
                },
                NativeCall::WriteRequestData { len: 5 },
                NativeCall::FinishDocument {
                    destination: "printerA".into(),
                },
            ]
        );
        assert!(mock.cancelled_jobs().is_empty());
        assert_eq!(mock.active_jobs(), vec![12]);
        assert_eq!(mock.written_data(), b"hello");
    }

    #[test]
    fn instance_is_part_of_the_target() {
        let mock = MockSubsystem::new();
        let draft = Destination::new("printerB", "draft", false, BTreeMap::new());

        JobSubmitter::new(&mock)
            .print(&draft, "job", b"%PDF-1.7", DocumentFormat::Pdf)
            .expect("print");

        let calls = mock.calls();
        assert!(matches!(
            &calls[0],
            NativeCall::CreateJob { destination, options, .. }
                if destination == "printerB/draft" && options.is_empty()
        ));
        assert!(matches!(
            &calls[1],
            NativeCall::StartDocument { format, .. } if format == "application/pdf"
        ));
    }

    #[test]
    fn overridden_options_are_sent() {
        let mock = MockSubsystem::new();
        let mut dest = printer_a();
        dest.set_option("copies", "3");
        dest.set_option("sides", "two-sided-long-edge");

        JobSubmitter::new(&mock)
            .print(&dest, "job", b"x", DocumentFormat::PostScript)
            .expect("print");

        match &mock.calls()[0] {
            NativeCall::CreateJob { options, .. } => assert_eq!(
                options,
                &vec![
                    ("copies".to_string(), "3".to_string()),
                    ("sides".to_string(), "two-sided-long-edge".to_string()),
                ]
            ),
            other => panic!("unexpected first call: {other:?}"),
        }
    }

    #[test]
    fn create_job_failure_leaves_nothing_to_cancel() {
        let mock = MockSubsystem::new().failing_at(
            MockStep::CreateJob,
            IppStatus::ERROR_NOT_FOUND,
            "The printer or class does not exist.",
        );

        let err = JobSubmitter::new(&mock)
            .print(&printer_a(), "job", b"hello", DocumentFormat::Text)
            .unwrap_err();

        assert_eq!(err.phase(), CupsPhase::CreateJob);
        assert_eq!(err.status(), IppStatus::ERROR_NOT_FOUND);
        assert_eq!(err.message(), "The printer or class does not exist.");
        assert!(mock.cancelled_jobs().is_empty());
        assert!(!mock
            .calls()
            .iter()
            .any(|c| matches!(c, NativeCall::StartDocument { .. })));
    }

    fn assert_failure_cancels_once(step: MockStep, phase: CupsPhase) {
        let mock = MockSubsystem::new().with_next_job_id(99).failing_at(
            step,
            IppStatus::ERROR_INTERNAL,
            "Internal server error",
        );

        let err = JobSubmitter::new(&mock)
            .print(&printer_a(), "job", b"hello", DocumentFormat::Text)
            .unwrap_err();

        assert_eq!(err.phase(), phase);
        assert_eq!(err.status(), IppStatus::ERROR_INTERNAL);
        assert_eq!(err.message(), "Internal server error");
        assert_eq!(mock.cancelled_jobs(), vec![99]);
        assert!(mock.active_jobs().is_empty());

        // The error is sampled before the cancel request overwrites it.
        let calls = mock.calls();
        let n = calls.len();
        assert_eq!(
            &calls[n - 3..],
            &[
                NativeCall::LastError,
                NativeCall::LastErrorString,
                NativeCall::CancelJob {
                    destination: "printerA".into(),
                    job_id: 99,
                },
            ]
        );
    }

    #[test]
    fn start_document_failure_cancels_job() {
        assert_failure_cancels_once(MockStep::StartDocument, CupsPhase::StartDocument);
    }

    #[test]
    fn write_failure_cancels_job() {
        assert_failure_cancels_once(MockStep::WriteData, CupsPhase::WriteData);
    }

    #[test]
    fn finish_failure_cancels_job() {
        assert_failure_cancels_once(MockStep::FinishDocument, CupsPhase::FinishDocument);
    }

    #[test]
    fn nul_in_job_name_is_rejected_before_any_native_call() {
        let mock = MockSubsystem::new();

        let err = JobSubmitter::new(&mock)
            .print(&printer_a(), "bad\0name", b"hello", DocumentFormat::Text)
            .unwrap_err();

        assert_eq!(err.phase(), CupsPhase::CreateJob);
        assert_eq!(err.status(), IppStatus::ERROR_BAD_REQUEST);
        assert!(err.message().contains("job name"));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn option_count_must_fit_a_c_int() {
        assert_eq!(check_option_count(0).ok(), Some(0));
        assert_eq!(check_option_count(2).ok(), Some(2));

        let too_many = usize::try_from(i32::MAX).expect("usize holds i32::MAX") + 1;
        let err = check_option_count(too_many).unwrap_err();
        assert_eq!(err.phase(), CupsPhase::CreateJob);
        assert_eq!(err.status(), IppStatus::ERROR_BAD_REQUEST);
        assert!(err.message().contains("native limit"));
    }

    #[test]
    fn nul_in_option_value_is_rejected() {
        let mock = MockSubsystem::new();
        let mut dest = printer_a();
        dest.set_option("media", "a4\0");

        let err = JobSubmitter::new(&mock)
            .print(&dest, "job", b"hello", DocumentFormat::Text)
            .unwrap_err();

        assert_eq!(err.phase(), CupsPhase::CreateJob);
        assert!(err.message().contains("option value"));
        assert!(mock.calls().is_empty());
    }
}
