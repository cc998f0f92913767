//! Per-thread capture of `log` records, for asserting on warnings in tests.

use std::cell::RefCell;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the capture logger for the process and clear this thread's
/// records. Call at the top of a test, before the code under test logs.
pub fn capture() {
    INSTALLED.get_or_init(|| {
        if log::set_logger(&CaptureLogger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Warnings logged on this thread since the last [`capture`].
pub fn warnings() -> Vec<String> {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
