// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cupswerk — Native print subsystem abstraction.
//
// Defines the traits the destination directory and job submitter are written
// against, plus the implementations: libcups (feature `cups`), a stub for
// builds without libcups, and an in-memory double (feature `mock`).

pub mod traits;

#[cfg(feature = "cups")]
pub mod cups;

#[cfg(not(feature = "cups"))]
pub mod stub;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use traits::{DestArray, JobOption, PrintSubsystem, RawDest};

/// The print subsystem this build talks to.
pub fn native_subsystem() -> Box<dyn PrintSubsystem> {
    #[cfg(feature = "cups")]
    {
        Box::new(cups::CupsSubsystem::new())
    }
    #[cfg(not(feature = "cups"))]
    {
        Box::new(stub::StubSubsystem)
    }
}
