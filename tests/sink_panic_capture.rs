//! A panicking sink on the exception logger while the hook is installed
//!
//! Installing the hook is global, so this lives in its own test binary.

use rust_log_router::capture::UncaughtCapture;
use rust_log_router::prelude::*;
use std::sync::Arc;

/// Panics on every record except hook reports
struct Exploding;

impl Sink for Exploding {
    fn write(&self, record: &LogRecord) -> Result<()> {
        if !record.message.starts_with("Uncaught panic") {
            panic!("sink exploded");
        }
        Ok(())
    }
    fn flush(&self) -> Result<()> {
        Ok(())
    }
    fn min_level(&self) -> Level {
        Level::DEBUG
    }
    fn format(&self) -> OutputFormat {
        OutputFormat::Full
    }
    fn name(&self) -> &str {
        "exploding"
    }
}

#[test]
fn test_sink_panic_is_not_reported_by_hook() {
    let exceptions_sink = Arc::new(MemorySink::new("exceptions", Level::DEBUG));
    let exceptions = Logger::builder()
        .sink(Exploding)
        .shared_sink(exceptions_sink.clone())
        .build()
        .unwrap();
    UncaughtCapture::new(exceptions.clone(), Logger::default())
        .install()
        .unwrap();

    exceptions.error("any record");

    // the fan-out caught and counted it; the hook stayed out
    assert_eq!(exceptions_sink.messages(), vec!["any record"]);
    assert_eq!(exceptions.metrics().failed_count(), 1);

    // a panic outside a sink write is still reported
    let caught = std::panic::catch_unwind(|| -> u8 { panic!("handler failed") });
    assert!(caught.is_err());
    assert_eq!(
        exceptions_sink.messages(),
        vec!["any record", "Uncaught panic: handler failed"]
    );
    assert_eq!(exceptions.metrics().failed_count(), 1);
}
