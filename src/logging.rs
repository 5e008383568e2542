//! Log sink plumbing.
//!
//! The registry reports progress as plain text lines through a [`LogSink`].
//! The default sink forwards each line to `tracing`; tests and embedders can
//! swap in their own closure.

use tracing_subscriber::EnvFilter;

/// A function accepting one human-readable progress line.
pub type LogSink = Box<dyn Fn(&str) + Send + Sync>;

/// Sink that forwards every line to `tracing` at INFO level.
pub fn tracing_sink() -> LogSink {
    Box::new(|line: &str| tracing::info!(target: "modreg", "{}", line))
}

/// Sink that discards everything.
pub fn null_sink() -> LogSink {
    Box::new(|_: &str| {})
}

/// Install a global `tracing` subscriber honoring `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_custom_closure_is_a_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let sink: LogSink = Box::new(move |l: &str| captured.lock().unwrap().push(l.to_string()));
        sink("one");
        sink("two");
        assert_eq!(*lines.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_builtin_sinks_do_not_panic_without_subscriber() {
        tracing_sink()("hello");
        null_sink()("hello");
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
