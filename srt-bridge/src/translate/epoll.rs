//! Epoll event sets and flags
//!
//! Managed code passes lists of enum constants; SRT takes bit masks.

use super::enums::{EpollFlag, EpollOpt};
use crate::error::TranslateError;
use srt_sys::SrtEpollEvent;
use std::os::raw::c_int;

/// Event bits for a list of `EpollOpt` names; an empty list is no events
pub fn events_mask<S: AsRef<str>>(names: &[S]) -> Result<c_int, TranslateError> {
    names.iter().try_fold(0, |mask, name| {
        Ok(mask | EpollOpt::parse(name.as_ref())?.as_native())
    })
}

/// Every `EpollOpt` whose bit is set in `mask`
pub fn events_from_mask(mask: c_int) -> Vec<EpollOpt> {
    EpollOpt::ALL
        .iter()
        .copied()
        .filter(|opt| mask & opt.as_native() != 0)
        .collect()
}

pub fn flags_mask<S: AsRef<str>>(names: &[S]) -> Result<i32, TranslateError> {
    names.iter().try_fold(0, |mask, name| {
        Ok(mask | EpollFlag::parse(name.as_ref())?.as_native())
    })
}

/// `CLEAR_ALL` alone when no flag is set
pub fn flags_from_mask(mask: i32) -> Vec<EpollFlag> {
    if mask == 0 {
        return vec![EpollFlag::ClearAll];
    }
    EpollFlag::ALL
        .iter()
        .copied()
        .filter(|flag| *flag != EpollFlag::ClearAll && mask & flag.as_native() != 0)
        .collect()
}

/// One ready socket reported by `srt_epoll_uwait`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpollEvent {
    pub socket: srt_sys::SrtSocket,
    pub events: Vec<EpollOpt>,
}

impl From<&SrtEpollEvent> for EpollEvent {
    fn from(native: &SrtEpollEvent) -> Self {
        EpollEvent {
            socket: native.fd,
            events: events_from_mask(native.events),
        }
    }
}
