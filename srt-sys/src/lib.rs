//! libsrt native surface
//!
//! This crate describes the C side of the bridge: constants and records from
//! `srt.h` (statistics included), scratch storage for address out-parameters,
//! the [`SrtApi`] trait every SRT call goes through, and [`SrtLibrary`], which
//! loads libsrt at run time.

pub mod api;
pub mod consts;
pub mod library;
pub mod stats;
pub mod types;

pub use api::SrtApi;
pub use consts::{SrtSocket, SRT_ERROR, SRT_INVALID_SOCK};
pub use library::{default_library_names, LoadError, SrtLibrary};
pub use stats::{SrtTraceBStats, StatValue};
pub use types::{SockAddrBuf, SrtEpollEvent, SrtLogHandler, SrtMsgCtrl};
