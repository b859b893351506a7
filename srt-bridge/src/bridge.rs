//! Entry points
//!
//! One method per SRT operation. Each translates its managed inputs, makes
//! exactly one SRT call and translates the result back. Native scratch lives
//! in [`Scratch`] values owned by the method, so it is released on every
//! path. A translator failure returns its negative status without touching
//! SRT, which leaves SRT's last-error state as it was.

use crate::error::TranslateError;
use crate::log::srt_log_handler;
use crate::scratch::Scratch;
use crate::translate::address::{self, ManagedSocketAddress};
use crate::translate::epoll::{self, EpollEvent};
use crate::translate::{
    AddressFamily, EpollFlag, ErrorKind, ManagedValue, MsgCtrl, OptionKind, OptionValue, SockOpt,
    SockStatus,
};
use srt_sys::consts::epoll::SRT_EPOLL_QUERY_FLAGS;
use srt_sys::{SockAddrBuf, SrtApi, SrtEpollEvent, SrtSocket, SrtTraceBStats, SRT_INVALID_SOCK};
use std::ffi::CString;
use std::net::SocketAddr;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Size of the buffer handed to `srt_getsockopt`
///
/// Large enough for the longest string option (a 512-byte stream ID).
pub const GETSOCKOPT_CAPACITY: usize = 1024;

/// Result of [`Bridge::accept`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    /// New socket, or `SRT_INVALID_SOCK` on failure
    pub handle: SrtSocket,
    /// Peer address; `None` on failure or when SRT reports none
    pub peer: Option<SocketAddr>,
}

/// Marshaling layer over a libsrt implementation
pub struct Bridge {
    api: Arc<dyn SrtApi>,
    log_installed: AtomicBool,
    initialized: AtomicBool,
}

fn reject<T>(op: &str, err: &TranslateError, fallback: T) -> T {
    tracing::error!("{}: {}", op, err);
    fallback
}

impl Bridge {
    pub fn new(api: Arc<dyn SrtApi>) -> Self {
        Bridge {
            api,
            log_installed: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &Arc<dyn SrtApi> {
        &self.api
    }

    /// Whether `start_up` succeeded more recently than `clean_up`
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Whether the SRT log callback has been installed
    pub fn is_log_installed(&self) -> bool {
        self.log_installed.load(Ordering::Acquire)
    }

    // Library initialization

    /// Installs the log callback (first call only), then `srt_startup`
    pub fn start_up(&self) -> c_int {
        if !self.log_installed.swap(true, Ordering::AcqRel) {
            self.api.setloghandler(Some(srt_log_handler));
        }

        let res = self.api.startup();
        if res >= 0 {
            self.initialized.store(true, Ordering::Release);
        }
        res
    }

    pub fn clean_up(&self) -> c_int {
        let res = self.api.cleanup();
        if res >= 0 {
            self.initialized.store(false, Ordering::Release);
        }
        res
    }

    pub fn set_log_level(&self, level: c_int) {
        self.api.setloglevel(level);
    }

    // Creating and configuring sockets

    pub fn socket(&self, family: &str, ty: c_int, protocol: c_int) -> SrtSocket {
        match AddressFamily::parse(family) {
            Ok(af) => self.api.socket(af.as_native(), ty, protocol),
            Err(e) => reject("Bad value for address family", &e, e.status()),
        }
    }

    pub fn create_socket(&self) -> SrtSocket {
        self.api.create_socket()
    }

    pub fn bind(&self, u: SrtSocket, addr: &ManagedSocketAddress) -> c_int {
        match address::to_native(addr) {
            Ok(sa) => {
                let sa = Scratch::new(sa);
                self.api.bind(u, &sa)
            }
            Err(e) => reject("Bad address for bind", &e, e.status()),
        }
    }

    pub fn get_sock_state(&self, u: SrtSocket) -> SockStatus {
        SockStatus::from_native_lossy(self.api.getsockstate(u))
    }

    pub fn close(&self, u: SrtSocket) -> c_int {
        self.api.close(u)
    }

    // Connecting

    pub fn listen(&self, u: SrtSocket, backlog: c_int) -> c_int {
        self.api.listen(u, backlog)
    }

    pub fn accept(&self, u: SrtSocket) -> Accepted {
        let mut sa = Scratch::new(SockAddrBuf::new());
        let handle = self.api.accept(u, &mut sa);
        let peer = if handle == SRT_INVALID_SOCK {
            None
        } else {
            address::from_native(&sa)
        };

        Accepted { handle, peer }
    }

    pub fn connect(&self, u: SrtSocket, addr: &ManagedSocketAddress) -> c_int {
        match address::to_native(addr) {
            Ok(sa) => {
                let sa = Scratch::new(sa);
                self.api.connect(u, &sa)
            }
            Err(e) => reject("Bad address for connect", &e, e.status()),
        }
    }

    pub fn rendezvous(
        &self,
        u: SrtSocket,
        local: &ManagedSocketAddress,
        remote: &ManagedSocketAddress,
    ) -> c_int {
        let translated = address::to_native(local).and_then(|local| {
            let family = local.as_socket().map(|l| AddressFamily::of(&l.ip()));
            let remote = address::to_native_as(remote, family)?;
            if local.family() != remote.family() {
                return Err(TranslateError::FamilyMismatch);
            }
            Ok((local, remote))
        });

        match translated {
            Ok((local, remote)) => {
                let local = Scratch::new(local);
                let remote = Scratch::new(remote);
                self.api.rendezvous(u, &local, &remote)
            }
            Err(e) => reject("Bad address for rendezvous", &e, e.status()),
        }
    }

    pub fn get_sock_name(&self, u: SrtSocket) -> Option<SocketAddr> {
        let mut sa = Scratch::new(SockAddrBuf::new());
        if self.api.getsockname(u, &mut sa) < 0 {
            return None;
        }
        address::from_native(&sa)
    }

    pub fn get_peer_name(&self, u: SrtSocket) -> Option<SocketAddr> {
        let mut sa = Scratch::new(SockAddrBuf::new());
        if self.api.getpeername(u, &mut sa) < 0 {
            return None;
        }
        address::from_native(&sa)
    }

    // Options and properties

    /// `level` is passed through; SRT ignores it
    pub fn set_sockopt(
        &self,
        u: SrtSocket,
        level: c_int,
        opt: &str,
        value: ManagedValue,
    ) -> c_int {
        let opt = match SockOpt::parse(opt) {
            Ok(opt) => opt,
            Err(e) => return reject("Bad value for SRT option", &e, e.status()),
        };
        let value = match OptionValue::from_managed(value) {
            Ok(value) => value,
            Err(e) => return reject("Bad value for SRT option value", &e, e.status()),
        };

        let payload = Scratch::new(value.encode(opt));
        self.api.setsockopt(u, level, opt.as_native(), &payload)
    }

    /// `None` when the option is unknown or SRT fails
    pub fn get_sockopt(&self, u: SrtSocket, level: c_int, opt: &str) -> Option<ManagedValue> {
        let opt = match SockOpt::parse(opt) {
            Ok(opt) => opt,
            Err(e) => return reject("Bad value for SRT option", &e, None),
        };

        let mut buf = Scratch::new(vec![0u8; GETSOCKOPT_CAPACITY]);
        let mut len = GETSOCKOPT_CAPACITY as c_int;
        if self.api.getsockopt(u, level, opt.as_native(), &mut buf, &mut len) < 0 {
            return None;
        }

        let len = (len.max(0) as usize).min(buf.len());
        OptionKind::of(opt).decode(&buf[..len])
    }

    pub fn get_reject_reason(&self, u: SrtSocket) -> c_int {
        self.api.getrejectreason(u)
    }

    pub fn set_reject_reason(&self, u: SrtSocket, reason: c_int) -> c_int {
        self.api.setrejectreason(u, reason)
    }

    pub fn connection_time(&self, u: SrtSocket) -> i64 {
        self.api.connection_time(u)
    }

    /// Trace statistics, `None` when SRT fails
    pub fn bstats(&self, u: SrtSocket, clear: bool) -> Option<SrtTraceBStats> {
        let mut perf = Scratch::new(SrtTraceBStats::default());
        if self.api.bstats(u, &mut perf, clear) < 0 {
            return None;
        }
        Some(*perf)
    }

    pub fn bistats(
        &self,
        u: SrtSocket,
        clear: bool,
        instantaneous: bool,
    ) -> Option<SrtTraceBStats> {
        let mut perf = Scratch::new(SrtTraceBStats::default());
        if self.api.bistats(u, &mut perf, clear, instantaneous) < 0 {
            return None;
        }
        Some(*perf)
    }

    // Transmission

    pub fn send(&self, u: SrtSocket, buf: &[u8]) -> c_int {
        self.api.send(u, buf)
    }

    pub fn send_msg(&self, u: SrtSocket, buf: &[u8], ttl: c_int, in_order: bool) -> c_int {
        self.api.sendmsg(u, buf, ttl, in_order)
    }

    /// Fields SRT updates are copied back into `ctrl`
    pub fn send_msg2(&self, u: SrtSocket, buf: &[u8], ctrl: Option<&mut MsgCtrl>) -> c_int {
        match ctrl {
            Some(ctrl) => {
                let mut native = Scratch::new(ctrl.to_native());
                let res = self.api.sendmsg2(u, buf, Some(&mut *native));
                ctrl.update_from_native(&native);
                res
            }
            None => self.api.sendmsg2(u, buf, None),
        }
    }

    /// Payload of at most `len` bytes, `None` unless SRT returned data
    pub fn recv(&self, u: SrtSocket, len: c_int) -> Option<Vec<u8>> {
        let mut buf = self.recv_buffer(len)?;
        let res = self.api.recv(u, &mut buf);
        received(&buf, res)
    }

    pub fn recv_msg2(
        &self,
        u: SrtSocket,
        len: c_int,
        ctrl: Option<&mut MsgCtrl>,
    ) -> Option<Vec<u8>> {
        let mut buf = self.recv_buffer(len)?;
        let res = match ctrl {
            Some(ctrl) => {
                let mut native = Scratch::new(ctrl.to_native());
                let res = self.api.recvmsg2(u, &mut buf, Some(&mut *native));
                ctrl.update_from_native(&native);
                res
            }
            None => self.api.recvmsg2(u, &mut buf, None),
        };
        received(&buf, res)
    }

    fn recv_buffer(&self, len: c_int) -> Option<Scratch<Vec<u8>>> {
        match usize::try_from(len) {
            Ok(len) => Some(Scratch::new(vec![0u8; len])),
            Err(_) => {
                let err = TranslateError::NegativeLength(len);
                reject("Bad receive length", &err, None)
            }
        }
    }

    /// Bytes sent, or a negative status
    pub fn send_file(
        &self,
        u: SrtSocket,
        path: &str,
        offset: i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        match file_path(path) {
            Ok(path) => {
                let mut offset = offset;
                self.api.sendfile(u, &path, &mut offset, size, block)
            }
            Err(e) => reject("Bad path for send_file", &e, i64::from(e.status())),
        }
    }

    /// Bytes received, or a negative status
    pub fn recv_file(
        &self,
        u: SrtSocket,
        path: &str,
        offset: i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        match file_path(path) {
            Ok(path) => {
                let mut offset = offset;
                self.api.recvfile(u, &path, &mut offset, size, block)
            }
            Err(e) => reject("Bad path for recv_file", &e, i64::from(e.status())),
        }
    }

    // Epoll

    pub fn epoll_create(&self) -> c_int {
        self.api.epoll_create()
    }

    /// Subscribe `u` to the named events; an empty list subscribes to none
    pub fn epoll_add_usock<S: AsRef<str>>(
        &self,
        eid: c_int,
        u: SrtSocket,
        events: &[S],
    ) -> c_int {
        match epoll::events_mask(events) {
            Ok(mask) => self.api.epoll_add_usock(eid, u, mask),
            Err(e) => reject("Bad value for epoll event", &e, e.status()),
        }
    }

    pub fn epoll_update_usock<S: AsRef<str>>(
        &self,
        eid: c_int,
        u: SrtSocket,
        events: &[S],
    ) -> c_int {
        match epoll::events_mask(events) {
            Ok(mask) => self.api.epoll_update_usock(eid, u, mask),
            Err(e) => reject("Bad value for epoll event", &e, e.status()),
        }
    }

    pub fn epoll_remove_usock(&self, eid: c_int, u: SrtSocket) -> c_int {
        self.api.epoll_remove_usock(eid, u)
    }

    /// Wait on the given read and write sets
    ///
    /// Returns SRT's result: the number of ready sockets, or a negative
    /// status on timeout or failure.
    pub fn epoll_wait(
        &self,
        eid: c_int,
        read: &[SrtSocket],
        write: &[SrtSocket],
        timeout_ms: i64,
    ) -> c_int {
        let mut readfds = Scratch::new(read.to_vec());
        let mut writefds = Scratch::new(write.to_vec());
        let mut rnum = readfds.len() as c_int;
        let mut wnum = writefds.len() as c_int;
        self.api.epoll_wait(
            eid,
            &mut readfds,
            &mut rnum,
            &mut writefds,
            &mut wnum,
            timeout_ms,
        )
    }

    /// Wait for at most `capacity` ready sockets
    ///
    /// The ready list is empty unless SRT reports a positive count.
    pub fn epoll_uwait(
        &self,
        eid: c_int,
        capacity: usize,
        timeout_ms: i64,
    ) -> (c_int, Vec<EpollEvent>) {
        let mut fds = Scratch::new(vec![SrtEpollEvent::default(); capacity]);
        let res = self.api.epoll_uwait(eid, &mut fds, timeout_ms);
        let ready = usize::try_from(res).unwrap_or(0).min(fds.len());
        (res, fds[..ready].iter().map(EpollEvent::from).collect())
    }

    /// Replace the flags, returning the previous ones
    pub fn epoll_set_flags<S: AsRef<str>>(
        &self,
        eid: c_int,
        flags: &[S],
    ) -> Option<Vec<EpollFlag>> {
        let mask = match epoll::flags_mask(flags) {
            Ok(mask) => mask,
            Err(e) => return reject("Bad value for epoll flag", &e, None),
        };
        let previous = self.api.epoll_set(eid, mask);
        (previous >= 0).then(|| epoll::flags_from_mask(previous))
    }

    pub fn epoll_get_flags(&self, eid: c_int) -> Option<Vec<EpollFlag>> {
        let flags = self.api.epoll_set(eid, SRT_EPOLL_QUERY_FLAGS);
        (flags >= 0).then(|| epoll::flags_from_mask(flags))
    }

    pub fn epoll_release(&self, eid: c_int) -> c_int {
        self.api.epoll_release(eid)
    }

    // Errors

    pub fn get_last_error_str(&self) -> String {
        self.api.getlasterror_str()
    }

    pub fn get_last_error(&self) -> ErrorKind {
        ErrorKind::from_native_lossy(self.api.getlasterror())
    }

    /// Description of a managed error kind
    pub fn str_error(&self, kind: &str) -> Result<String, TranslateError> {
        let kind = ErrorKind::parse(kind)?;
        Ok(self.api.strerror(kind.as_native()))
    }

    pub fn clear_last_error(&self) {
        self.api.clearlasterror();
    }
}

fn received(buf: &[u8], res: c_int) -> Option<Vec<u8>> {
    let n = usize::try_from(res).ok().filter(|&n| n > 0)?;
    Some(buf[..n.min(buf.len())].to_vec())
}

fn file_path(path: &str) -> Result<Scratch<CString>, TranslateError> {
    CString::new(path)
        .map(Scratch::new)
        .map_err(|_| TranslateError::InteriorNul)
}
