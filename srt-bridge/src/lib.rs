//! SRT marshaling bridge
//!
//! Runtime-agnostic core of the managed-runtime bridge to libsrt: value
//! translators, per-call scratch management, the [`Bridge`] entry points and
//! the log adapter. The JVM-facing glue lives in `srt-jni`.

pub mod bridge;
pub mod error;
pub mod log;
pub mod scratch;
pub mod translate;

pub use bridge::{Accepted, Bridge, GETSOCKOPT_CAPACITY};
pub use error::{TranslateError, INVALID_ARGUMENT};
pub use log::{LogPriority, LogRecord, LogSink, TracingSink, LOG_TAG};
pub use translate::{
    AddressFamily, EpollEvent, EpollFlag, EpollOpt, ErrorKind, KmState, ManagedSocketAddress,
    ManagedValue, MsgCtrl, OptionKind, OptionValue, SockOpt, SockStatus, Transtype,
};
