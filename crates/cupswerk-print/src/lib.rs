// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cupswerk Print — destination enumeration and job submission on top of the
// native print subsystem defined in `cupswerk-bridge`.

pub mod directory;
pub mod guard;
pub mod submitter;

pub use directory::DestinationDirectory;
pub use guard::JobGuard;
pub use submitter::JobSubmitter;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use cupswerk_bridge::mock::{MockStep, MockSubsystem};
    use cupswerk_core::types::{DocumentFormat, IppStatus};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf-8 logs")
    }

    #[test]
    fn list_default_and_print() {
        let mock = MockSubsystem::new()
            .with_destination("printerA", None, true, &[("copies", "1")])
            .with_destination("printerB", Some("draft"), false, &[("copies", "1")]);
        let directory = DestinationDirectory::new(&mock);

        let all = directory.list_all().expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].target_id(), "printerA");
        assert_eq!(all[1].target_id(), "printerB/draft");
        assert!(all.iter().all(|d| d.option("copies") == Some("1")));

        let default = directory.get_default().expect("default");
        assert_eq!(default.name(), "printerA");

        let job_id = JobSubmitter::new(&mock)
            .print(&default, "test", b"hello", DocumentFormat::Text)
            .expect("print");

        assert!(mock.cancelled_jobs().is_empty());
        assert_eq!(mock.active_jobs(), vec![job_id.0]);
    }

    #[test]
    fn failure_logs_carry_native_text_as_detail() {
        let logs = captured_logs(|| {
            let down = MockSubsystem::new().failing_at(
                MockStep::GetDests,
                IppStatus::ERROR_SERVICE_UNAVAILABLE,
                "Scheduler is not running",
            );
            let _ = DestinationDirectory::new(&down).list_all();

            let broken = MockSubsystem::new()
                .with_destination("printerA", None, true, &[])
                .failing_at(MockStep::WriteData, IppStatus::ERROR_INTERNAL, "Broken pipe");
            let default = DestinationDirectory::new(&broken).get_default().expect("default");
            let _ = JobSubmitter::new(&broken).print(&default, "test", b"x", DocumentFormat::Text);
        });

        assert!(logs.contains("cupsGetDests failed"));
        assert!(logs.contains(r#"detail="Scheduler is not running""#));
        assert!(logs.contains("print job failed"));
        assert!(logs.contains(r#"detail="Broken pipe""#));
    }
}
