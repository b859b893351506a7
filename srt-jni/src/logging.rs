//! The bridge's own diagnostics
//!
//! A `tracing` subscriber is installed once per process. On Android its
//! output goes to logcat through [`AndroidSink`](srt_bridge::log::AndroidSink),
//! elsewhere to stdout. libsrt's records take a separate path, see
//! [`srt_bridge::log`].

use srt_bridge::{LogPriority, LogSink};
use std::io::{self, Write};
use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Tag the bridge's own events are written under
pub const BRIDGE_TAG: &str = "srt-bridge";

/// Collects one formatted event and hands it to a [`LogSink`] when dropped
pub struct SinkWriter<'a, S: LogSink> {
    sink: &'a S,
    priority: LogPriority,
    buf: Vec<u8>,
}

impl<S: LogSink> Write for SinkWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: LogSink> Drop for SinkWriter<'_, S> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let message = String::from_utf8_lossy(&self.buf);
        self.sink
            .write(self.priority, BRIDGE_TAG, message.trim_end());
    }
}

/// [`MakeWriter`] over a [`LogSink`], one sink record per event
#[derive(Debug, Default)]
pub struct SinkMakeWriter<S> {
    sink: S,
}

impl<S: LogSink> SinkMakeWriter<S> {
    pub fn new(sink: S) -> Self {
        SinkMakeWriter { sink }
    }

    fn writer(&self, priority: LogPriority) -> SinkWriter<'_, S> {
        SinkWriter {
            sink: &self.sink,
            priority,
            buf: Vec::new(),
        }
    }
}

impl<'a, S: LogSink + 'a> MakeWriter<'a> for SinkMakeWriter<S> {
    type Writer = SinkWriter<'a, S>;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(LogPriority::Info)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(LogPriority::from_tracing(meta.level()))
    }
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the process-wide subscriber
///
/// Another library in the process may already own the global subscriber, in
/// which case this one is dropped.
pub fn init_tracing(default_filter: &str) {
    #[cfg(target_os = "android")]
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .with_writer(SinkMakeWriter::new(srt_bridge::log::AndroidSink))
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .try_init();

    #[cfg(not(target_os = "android"))]
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(default_filter))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Keeping the existing tracing subscriber");
    }
}
