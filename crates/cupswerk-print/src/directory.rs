// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Destination directory.
//
// Enumerates CUPS destinations and copies them into owned `Destination`
// values. The native array is released when the `DestArray` goes out of
// scope, on every return path.

use std::collections::BTreeMap;

use tracing::{debug, error, instrument};

use cupswerk_bridge::{PrintSubsystem, RawDest};
use cupswerk_core::error::{CupsError, CupsPhase, CupsResult};
use cupswerk_core::types::{Destination, IppStatus};

/// Read-only view of the destinations known to the print subsystem.
pub struct DestinationDirectory<'s> {
    subsystem: &'s dyn PrintSubsystem,
}

impl<'s> DestinationDirectory<'s> {
    pub fn new(subsystem: &'s dyn PrintSubsystem) -> Self {
        Self { subsystem }
    }

    /// All destinations, in the order the subsystem reports them.
    ///
    /// A negative native count is an `EnumerateDestinations` error. A count
    /// of zero is not an error: a host without printers yields an empty list.
    /// A record missing below the reported count fails the whole listing.
    #[instrument(skip(self), fields(backend = self.subsystem.backend_name()))]
    pub fn list_all(&self) -> CupsResult<Vec<Destination>> {
        let dests = self.subsystem.get_dests();
        let count = dests.count();

        if count < 0 {
            let err = self.subsystem.capture_error(CupsPhase::EnumerateDestinations);
            error!(status = %err.status(), detail = err.message(), "cupsGetDests failed");
            return Err(err);
        }

        let len = usize::try_from(count).unwrap_or_default();
        let mut destinations = Vec::with_capacity(len);
        for index in 0..len {
            let Some(raw) = dests.get(index) else {
                error!(index, count, "destination record missing");
                return Err(CupsError::native(
                    CupsPhase::EnumerateDestinations,
                    IppStatus::ERROR_INTERNAL,
                    format!("destination record {index} of {count} is missing"),
                ));
            };
            destinations.push(copy_destination(raw));
        }

        debug!(count = destinations.len(), "enumerated destinations");
        Ok(destinations)
    }

    /// The destination flagged as default.
    ///
    /// If several are flagged, the first in enumeration order wins.
    #[instrument(skip(self))]
    pub fn get_default(&self) -> CupsResult<Destination> {
        let destination = self
            .list_all()?
            .into_iter()
            .find(Destination::is_default)
            .ok_or_else(CupsError::no_default_destination)?;

        debug!(destination = %destination, "default destination");
        Ok(destination)
    }

    /// The destination addressed by `target` (`name` or `name/instance`).
    #[instrument(skip(self))]
    pub fn find(&self, target: &str) -> CupsResult<Option<Destination>> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|destination| destination.matches(target)))
    }
}

/// Copy a native record into an owned destination.
fn copy_destination(raw: RawDest<'_>) -> Destination {
    let options: BTreeMap<String, String> = raw
        .options
        .into_iter()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    Destination::new(
        raw.name.into_owned(),
        raw.instance.map(|i| i.into_owned()).unwrap_or_default(),
        raw.is_default != 0,
        options,
    )
}
