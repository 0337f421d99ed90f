// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// libcups bridge.
//
// Requires libcups at link time (feature `cups`). Every request goes through
// `CUPS_HTTP_DEFAULT`, i.e. the per-thread default connection that libcups
// opens to the configured scheduler.
//
// ## Unsafe code
//
// 1. **Destination array** (`CupsDests`): `cupsGetDests` hands out an array of
//    `count` records. It is read only while `CupsDests` is alive and freed
//    once in `Drop` with the same count.
// 2. **C strings**: every `*const c_char` read from libcups is checked for
//    NULL and copied or borrowed for no longer than its owner lives.
// 3. **Option array**: `cupsCreateJob` takes `cups_option_t *` (non-const).
//    libcups neither modifies nor retains the strings after the call returns,
//    so pointers into our `CString`s are passed for the duration of the call.

use std::borrow::Cow;
use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

use tracing::{debug, warn};

use cupswerk_core::types::{HttpStatus, IppStatus};

use crate::traits::*;

// ---------------------------------------------------------------------------
// libcups FFI
// ---------------------------------------------------------------------------

/// `cups_option_t`.
#[repr(C)]
struct CupsOption {
    name: *mut c_char,
    value: *mut c_char,
}

/// `cups_dest_t`.
#[repr(C)]
struct CupsDest {
    name: *mut c_char,
    instance: *mut c_char,
    is_default: c_int,
    num_options: c_int,
    options: *mut CupsOption,
}

/// `CUPS_HTTP_DEFAULT`.
const CUPS_HTTP_DEFAULT: *mut c_void = ptr::null_mut();

#[link(name = "cups")]
unsafe extern "C" {
    fn cupsGetDests(dests: *mut *mut CupsDest) -> c_int;
    fn cupsFreeDests(num_dests: c_int, dests: *mut CupsDest);
    fn cupsCreateJob(
        http: *mut c_void,
        name: *const c_char,
        title: *const c_char,
        num_options: c_int,
        options: *mut CupsOption,
    ) -> c_int;
    fn cupsStartDocument(
        http: *mut c_void,
        name: *const c_char,
        job_id: c_int,
        docname: *const c_char,
        format: *const c_char,
        last_document: c_int,
    ) -> c_int;
    fn cupsWriteRequestData(http: *mut c_void, buffer: *const c_char, length: usize) -> c_int;
    fn cupsFinishDocument(http: *mut c_void, name: *const c_char) -> c_int;
    fn cupsCancelJob(name: *const c_char, job_id: c_int) -> c_int;
    fn cupsLastError() -> c_int;
    fn cupsLastErrorString() -> *const c_char;
}

/// Borrow a C string from libcups, or `None` for NULL.
///
/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string valid for `'a`.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per the caller's contract.
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
    }
}

// ---------------------------------------------------------------------------
// Destination array
// ---------------------------------------------------------------------------

/// Destination array owned by libcups until dropped.
struct CupsDests {
    dests: *mut CupsDest,
    count: c_int,
}

impl DestArray for CupsDests {
    fn count(&self) -> i32 {
        self.count
    }

    fn get(&self, index: usize) -> Option<RawDest<'_>> {
        if self.dests.is_null() || index >= usize::try_from(self.count).unwrap_or(0) {
            return None;
        }

        // SAFETY: index < count and the array lives as long as `self`.
        let dest = unsafe { &*self.dests.add(index) };
        // SAFETY: libcups always sets `name`; the strings live as long as the array.
        let name = unsafe { borrow_str(dest.name) }.unwrap_or_default();
        // SAFETY: as above, `instance` may be NULL.
        let instance = unsafe { borrow_str(dest.instance) };

        let num_options = usize::try_from(dest.num_options).unwrap_or(0);
        let options = if dest.options.is_null() || num_options == 0 {
            Vec::new()
        } else {
            // SAFETY: `options` points to `num_options` records owned by the array.
            let records = unsafe { std::slice::from_raw_parts(dest.options, num_options) };
            records
                .iter()
                .map(|option| {
                    // SAFETY: option strings are owned by the array.
                    let key = unsafe { borrow_str(option.name) }.unwrap_or_default();
                    // SAFETY: as above.
                    let value = unsafe { borrow_str(option.value) }.unwrap_or_default();
                    (key, value)
                })
                .collect()
        };

        Some(RawDest {
            name,
            instance,
            is_default: dest.is_default,
            options,
        })
    }
}

impl Drop for CupsDests {
    fn drop(&mut self) {
        if !self.dests.is_null() {
            debug!(count = self.count, "cupsFreeDests");
            // SAFETY: pointer and count come from the same cupsGetDests call
            // and are freed exactly once here.
            unsafe { cupsFreeDests(self.count.max(0), self.dests) };
        }
    }
}

// ---------------------------------------------------------------------------
// Subsystem
// ---------------------------------------------------------------------------

/// Print subsystem backed by the system's libcups.
#[derive(Debug, Default)]
pub struct CupsSubsystem;

impl CupsSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl PrintSubsystem for CupsSubsystem {
    fn backend_name(&self) -> &str {
        "libcups"
    }

    fn get_dests(&self) -> Box<dyn DestArray + '_> {
        let mut dests: *mut CupsDest = ptr::null_mut();
        // SAFETY: `dests` is a valid out-pointer.
        let count = unsafe { cupsGetDests(&mut dests) };
        Box::new(CupsDests { dests, count })
    }

    fn create_job(&self, destination: &CStr, title: &CStr, options: &[JobOption]) -> i32 {
        let mut native_options: Vec<CupsOption> = options
            .iter()
            .map(|option| CupsOption {
                name: option.name.as_ptr().cast_mut(),
                value: option.value.as_ptr().cast_mut(),
            })
            .collect();
        // `JobSubmitter` rejects oversize option maps before reaching here.
        let Ok(num_options) = c_int::try_from(native_options.len()) else {
            warn!(count = native_options.len(), "too many job options");
            return -1;
        };
        let options_ptr = if native_options.is_empty() {
            ptr::null_mut()
        } else {
            native_options.as_mut_ptr()
        };

        // SAFETY: all strings are NUL-terminated and outlive the call; see
        // the module notes on the option array.
        unsafe {
            cupsCreateJob(
                CUPS_HTTP_DEFAULT,
                destination.as_ptr(),
                title.as_ptr(),
                num_options,
                options_ptr,
            )
        }
    }

    fn start_document(
        &self,
        destination: &CStr,
        job_id: i32,
        doc_name: &CStr,
        format: &CStr,
        last_document: bool,
    ) -> HttpStatus {
        // SAFETY: all strings are NUL-terminated and outlive the call.
        let status = unsafe {
            cupsStartDocument(
                CUPS_HTTP_DEFAULT,
                destination.as_ptr(),
                job_id,
                doc_name.as_ptr(),
                format.as_ptr(),
                c_int::from(last_document),
            )
        };
        HttpStatus(status)
    }

    fn write_request_data(&self, data: &[u8]) -> HttpStatus {
        // SAFETY: `data` is valid for `data.len()` bytes for the whole call.
        let status = unsafe {
            cupsWriteRequestData(CUPS_HTTP_DEFAULT, data.as_ptr().cast::<c_char>(), data.len())
        };
        HttpStatus(status)
    }

    fn finish_document(&self, destination: &CStr) -> IppStatus {
        // SAFETY: `destination` is NUL-terminated and outlives the call.
        IppStatus(unsafe { cupsFinishDocument(CUPS_HTTP_DEFAULT, destination.as_ptr()) })
    }

    fn cancel_job(&self, destination: &CStr, job_id: i32) -> bool {
        // SAFETY: `destination` is NUL-terminated and outlives the call.
        unsafe { cupsCancelJob(destination.as_ptr(), job_id) != 0 }
    }

    fn last_error(&self) -> IppStatus {
        // SAFETY: reads libcups' per-thread error state.
        IppStatus(unsafe { cupsLastError() })
    }

    fn last_error_string(&self) -> String {
        // SAFETY: the returned string lives in libcups' per-thread state and
        // is copied before any other call can replace it.
        unsafe { borrow_str(cupsLastErrorString()) }
            .map(Cow::into_owned)
            .unwrap_or_default()
    }
}
