//! SRT log adapter
//!
//! libsrt reports through a single C callback, called from its own threads.
//! The callback maps the syslog-style level to a platform priority, formats
//! `<file>@<line>:<area> <message>` and hands the record to the installed
//! [`LogSink`] under the tag `libsrt`. It never calls into the managed runtime.

use srt_sys::consts::loglevel::{LOG_CRIT, LOG_DEBUG, LOG_ERR, LOG_NOTICE, LOG_WARNING};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

/// Tag every SRT record is emitted under
pub const LOG_TAG: &str = "libsrt";

/// Platform log priorities (Android `android_LogPriority` values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum LogPriority {
    Unknown = 0,
    Default = 1,
    Verbose = 2,
    Debug = 3,
    Info = 4,
    Warn = 5,
    Error = 6,
    Fatal = 7,
    Silent = 8,
}

impl LogPriority {
    /// Priority for an SRT level, `None` for levels SRT does not define
    pub fn from_srt_level(level: c_int) -> Option<Self> {
        match level {
            LOG_CRIT => Some(LogPriority::Fatal),
            LOG_ERR => Some(LogPriority::Error),
            LOG_WARNING => Some(LogPriority::Warn),
            LOG_NOTICE => Some(LogPriority::Info),
            LOG_DEBUG => Some(LogPriority::Debug),
            _ => None,
        }
    }

    /// Like [`Self::from_srt_level`], reporting and tolerating unknown levels
    pub fn map_srt_level(level: c_int) -> Self {
        Self::from_srt_level(level).unwrap_or_else(|| {
            tracing::error!("Unknown log level {}", level);
            LogPriority::Unknown
        })
    }

    /// Priority for a `tracing` event written to the platform log
    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => LogPriority::Error,
            tracing::Level::WARN => LogPriority::Warn,
            tracing::Level::INFO => LogPriority::Info,
            tracing::Level::DEBUG => LogPriority::Debug,
            tracing::Level::TRACE => LogPriority::Verbose,
        }
    }
}

/// One record as handed over by libsrt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub level: c_int,
    pub file: &'a str,
    pub line: c_int,
    pub area: &'a str,
    pub message: &'a str,
}

impl LogRecord<'_> {
    pub fn payload(&self) -> String {
        format!("{}@{}:{} {}", self.file, self.line, self.area, self.message)
    }
}

/// Destination for SRT records
pub trait LogSink: Send + Sync {
    fn write(&self, priority: LogPriority, tag: &str, message: &str);
}

/// Forwards records as `tracing` events with target `libsrt`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, priority: LogPriority, tag: &str, message: &str) {
        match priority {
            LogPriority::Fatal | LogPriority::Error => {
                tracing::error!(target: "libsrt", tag, "{}", message)
            }
            LogPriority::Warn => tracing::warn!(target: "libsrt", tag, "{}", message),
            LogPriority::Debug => tracing::debug!(target: "libsrt", tag, "{}", message),
            LogPriority::Verbose => tracing::trace!(target: "libsrt", tag, "{}", message),
            LogPriority::Silent => {}
            LogPriority::Info | LogPriority::Default | LogPriority::Unknown => {
                tracing::info!(target: "libsrt", tag, "{}", message)
            }
        }
    }
}

#[cfg(target_os = "android")]
pub use android::AndroidSink;

#[cfg(target_os = "android")]
mod android {
    use super::{LogPriority, LogSink};
    use std::ffi::CString;
    use std::os::raw::{c_char, c_int};

    #[link(name = "log")]
    extern "C" {
        fn __android_log_write(prio: c_int, tag: *const c_char, text: *const c_char) -> c_int;
    }

    fn c_string(s: &str) -> CString {
        CString::new(s.replace('\0', "")).unwrap_or_default()
    }

    /// Writes to logcat through liblog
    #[derive(Debug, Default, Clone, Copy)]
    pub struct AndroidSink;

    impl LogSink for AndroidSink {
        fn write(&self, priority: LogPriority, tag: &str, message: &str) {
            let tag = c_string(tag);
            let text = c_string(message);
            // SAFETY: both strings are NUL-terminated and outlive the call.
            unsafe {
                __android_log_write(priority as c_int, tag.as_ptr(), text.as_ptr());
            }
        }
    }
}

/// The platform's log facility
pub fn platform_sink() -> Box<dyn LogSink> {
    #[cfg(target_os = "android")]
    {
        Box::new(AndroidSink)
    }

    #[cfg(not(target_os = "android"))]
    {
        Box::new(TracingSink)
    }
}

static SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

/// Install the sink used by [`srt_log_handler`]
///
/// Only the first installation takes effect; returns whether this one did.
pub fn install_sink(sink: Box<dyn LogSink>) -> bool {
    SINK.set(sink).is_ok()
}

fn sink() -> &'static dyn LogSink {
    SINK.get_or_init(platform_sink).as_ref()
}

/// Deliver one record to `sink`
pub fn route(sink: &dyn LogSink, record: &LogRecord<'_>) {
    let priority = LogPriority::map_srt_level(record.level);
    sink.write(priority, LOG_TAG, &record.payload());
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// `SRT_LOG_HANDLER_FN` installed by `start_up`
///
/// # Safety
///
/// Called by libsrt with NUL-terminated (or null) strings it owns for the
/// duration of the call.
pub unsafe extern "C" fn srt_log_handler(
    _opaque: *mut c_void,
    level: c_int,
    file: *const c_char,
    line: c_int,
    area: *const c_char,
    message: *const c_char,
) {
    let file = borrow_str(file);
    let area = borrow_str(area);
    let message = borrow_str(message);
    let record = LogRecord {
        level,
        file: &file,
        line,
        area: &area,
        message: &message,
    };

    // SRT threads must never see an unwind.
    let _ = panic::catch_unwind(AssertUnwindSafe(|| route(sink(), &record)));
}
