//! Value translators between managed and native representations
//!
//! Every translator is pure: the same managed input always yields the same
//! native value. Failures surface as [`TranslateError`](crate::TranslateError)
//! and stop the entry point before SRT is called.

pub mod address;
pub mod enums;
pub mod epoll;
pub mod msgctrl;
pub mod value;

pub use address::ManagedSocketAddress;
pub use enums::{
    AddressFamily, EpollFlag, EpollOpt, ErrorKind, KmState, SockOpt, SockStatus, Transtype,
};
pub use epoll::EpollEvent;
pub use msgctrl::MsgCtrl;
pub use value::{ManagedValue, OptionKind, OptionValue};
