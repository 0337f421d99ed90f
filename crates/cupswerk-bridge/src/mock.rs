// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory print subsystem for tests and benchmarks.
//
// `MockSubsystem` behaves like a scheduler with a fixed set of destinations.
// Any step of the job protocol can be scripted to fail with a given IPP status
// and message, and every native call is recorded so tests can assert on the
// exact sequence (including array releases and job cancellation).

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::ffi::CStr;

use cupswerk_core::types::{HttpStatus, IppStatus};

use crate::traits::*;

/// A native call observed by [`MockSubsystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    GetDests,
    FreeDests {
        count: i32,
    },
    CreateJob {
        destination: String,
        title: String,
        options: Vec<(String, String)>,
    },
    StartDocument {
        destination: String,
        job_id: i32,
        doc_name: String,
        format: String,
        last_document: bool,
    },
    WriteRequestData {
        len: usize,
    },
    FinishDocument {
        destination: String,
    },
    CancelJob {
        destination: String,
        job_id: i32,
    },
    LastError,
    LastErrorString,
}

/// Protocol steps that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStep {
    GetDests,
    CreateJob,
    StartDocument,
    WriteData,
    FinishDocument,
}

#[derive(Debug, Clone)]
struct MockDest {
    name: String,
    instance: Option<String>,
    is_default: i32,
    options: Vec<(String, String)>,
}

#[derive(Debug)]
struct MockState {
    destinations: Vec<MockDest>,
    failures: HashMap<MockStep, (IppStatus, String)>,
    next_job_id: i32,
    reported_count: Option<i32>,
    last_error: (IppStatus, String),
    calls: Vec<NativeCall>,
    active_jobs: BTreeSet<i32>,
    written: Vec<u8>,
}

/// Scriptable stand-in for libcups.
#[derive(Debug)]
pub struct MockSubsystem {
    state: RefCell<MockState>,
}

impl Default for MockSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubsystem {
    /// A scheduler with no destinations that accepts every job.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockState {
                destinations: Vec::new(),
                failures: HashMap::new(),
                next_job_id: 1,
                reported_count: None,
                last_error: (IppStatus::OK, "successful-ok".to_string()),
                calls: Vec::new(),
                active_jobs: BTreeSet::new(),
                written: Vec::new(),
            }),
        }
    }

    /// Add a destination. `instance` of `None` mirrors a NULL native field.
    pub fn with_destination(
        self,
        name: &str,
        instance: Option<&str>,
        is_default: bool,
        options: &[(&str, &str)],
    ) -> Self {
        self.state.borrow_mut().destinations.push(MockDest {
            name: name.to_string(),
            instance: instance.map(str::to_string),
            is_default: i32::from(is_default),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    /// Make `step` fail with the given last-error state.
    pub fn failing_at(self, step: MockStep, status: IppStatus, message: &str) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert(step, (status, message.to_string()));
        self
    }

    /// Job id handed out by the next successful `create_job`.
    pub fn with_next_job_id(self, job_id: i32) -> Self {
        self.state.borrow_mut().next_job_id = job_id;
        self
    }

    /// Report `count` from `get_dests` regardless of how many records exist,
    /// as a corrupted native array would.
    pub fn with_reported_count(self, count: i32) -> Self {
        self.state.borrow_mut().reported_count = Some(count);
        self
    }

    /// Every native call so far, in order.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.borrow().calls.clone()
    }

    /// Forget recorded calls, written data and active jobs. Destinations and
    /// scripted failures are kept.
    pub fn reset_history(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.clear();
        state.written.clear();
        state.active_jobs.clear();
    }

    /// Number of `cupsFreeDests` calls.
    pub fn free_count(&self) -> usize {
        self.count_calls(|call| matches!(call, NativeCall::FreeDests { .. }))
    }

    /// Job ids passed to `cupsCancelJob`, in order.
    pub fn cancelled_jobs(&self) -> Vec<i32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                NativeCall::CancelJob { job_id, .. } => Some(*job_id),
                _ => None,
            })
            .collect()
    }

    /// Jobs created and not cancelled.
    pub fn active_jobs(&self) -> Vec<i32> {
        self.state.borrow().active_jobs.iter().copied().collect()
    }

    /// Bytes received through `write_request_data`.
    pub fn written_data(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    fn count_calls(&self, pred: impl Fn(&NativeCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: NativeCall) {
        self.state.borrow_mut().calls.push(call);
    }

    /// Apply a scripted failure for `step`, updating last-error state either
    /// way. Returns `true` when the step fails.
    fn step_fails(&self, step: MockStep) -> bool {
        let mut state = self.state.borrow_mut();
        match state.failures.get(&step).cloned() {
            Some(failure) => {
                state.last_error = failure;
                true
            }
            None => {
                state.last_error = (IppStatus::OK, "successful-ok".to_string());
                false
            }
        }
    }
}

fn lossy(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

struct MockDests<'a> {
    owner: &'a MockSubsystem,
    records: Vec<MockDest>,
    count: i32,
}

impl DestArray for MockDests<'_> {
    fn count(&self) -> i32 {
        self.count
    }

    fn get(&self, index: usize) -> Option<RawDest<'_>> {
        let dest = self.records.get(index)?;
        Some(RawDest {
            name: Cow::Borrowed(dest.name.as_str()),
            instance: dest.instance.as_deref().map(Cow::Borrowed),
            is_default: dest.is_default,
            options: dest
                .options
                .iter()
                .map(|(k, v)| (Cow::Borrowed(k.as_str()), Cow::Borrowed(v.as_str())))
                .collect(),
        })
    }
}

impl Drop for MockDests<'_> {
    fn drop(&mut self) {
        if self.count > 0 {
            self.owner.record(NativeCall::FreeDests { count: self.count });
        }
    }
}

impl PrintSubsystem for MockSubsystem {
    fn backend_name(&self) -> &str {
        "mock"
    }

    fn get_dests(&self) -> Box<dyn DestArray + '_> {
        self.record(NativeCall::GetDests);
        if self.step_fails(MockStep::GetDests) {
            return Box::new(MockDests {
                owner: self,
                records: Vec::new(),
                count: -1,
            });
        }
        let (records, reported) = {
            let state = self.state.borrow();
            (state.destinations.clone(), state.reported_count)
        };
        let count = reported.unwrap_or_else(|| i32::try_from(records.len()).unwrap_or(i32::MAX));
        Box::new(MockDests {
            owner: self,
            records,
            count,
        })
    }

    fn create_job(&self, destination: &CStr, title: &CStr, options: &[JobOption]) -> i32 {
        self.record(NativeCall::CreateJob {
            destination: lossy(destination),
            title: lossy(title),
            options: options
                .iter()
                .map(|o| (lossy(&o.name), lossy(&o.value)))
                .collect(),
        });
        if self.step_fails(MockStep::CreateJob) {
            return -1;
        }
        let mut state = self.state.borrow_mut();
        let job_id = state.next_job_id;
        state.next_job_id += 1;
        state.active_jobs.insert(job_id);
        job_id
    }

    fn start_document(
        &self,
        destination: &CStr,
        job_id: i32,
        doc_name: &CStr,
        format: &CStr,
        last_document: bool,
    ) -> HttpStatus {
        self.record(NativeCall::StartDocument {
            destination: lossy(destination),
            job_id,
            doc_name: lossy(doc_name),
            format: lossy(format),
            last_document,
        });
        if self.step_fails(MockStep::StartDocument) {
            HttpStatus::BAD_REQUEST
        } else {
            HttpStatus::CONTINUE
        }
    }

    fn write_request_data(&self, data: &[u8]) -> HttpStatus {
        self.record(NativeCall::WriteRequestData { len: data.len() });
        if self.step_fails(MockStep::WriteData) {
            return HttpStatus::ERROR;
        }
        self.state.borrow_mut().written.extend_from_slice(data);
        HttpStatus::CONTINUE
    }

    fn finish_document(&self, destination: &CStr) -> IppStatus {
        self.record(NativeCall::FinishDocument {
            destination: lossy(destination),
        });
        if self.step_fails(MockStep::FinishDocument) {
            self.state.borrow().last_error.0
        } else {
            IppStatus::OK
        }
    }

    fn cancel_job(&self, destination: &CStr, job_id: i32) -> bool {
        self.record(NativeCall::CancelJob {
            destination: lossy(destination),
            job_id,
        });
        let mut state = self.state.borrow_mut();
        // Cancelling overwrites last-error state, like any other request.
        state.last_error = (IppStatus::OK, "successful-ok".to_string());
        state.active_jobs.remove(&job_id)
    }

    fn last_error(&self) -> IppStatus {
        self.record(NativeCall::LastError);
        self.state.borrow().last_error.0
    }

    fn last_error_string(&self) -> String {
        self.record(NativeCall::LastErrorString);
        self.state.borrow().last_error.1.clone()
    }
}
