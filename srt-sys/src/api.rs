//! The native SRT call surface
//!
//! Every libsrt function the bridge uses goes through [`SrtApi`]. Arguments
//! are already in native form: the trait performs no translation, it only
//! hides raw pointers behind borrowed slices and scratch types.

use crate::consts::SrtSocket;
use crate::stats::SrtTraceBStats;
use crate::types::{SockAddrBuf, SrtEpollEvent, SrtLogHandler, SrtMsgCtrl};
use socket2::SockAddr;
use std::ffi::CStr;
use std::os::raw::c_int;

/// libsrt, one method per C function
pub trait SrtApi: Send + Sync {
    /// `srt_startup`
    fn startup(&self) -> c_int;

    /// `srt_cleanup`
    fn cleanup(&self) -> c_int;

    /// `srt_socket`
    fn socket(&self, af: c_int, ty: c_int, protocol: c_int) -> SrtSocket;

    /// `srt_create_socket`
    fn create_socket(&self) -> SrtSocket;

    /// `srt_bind`
    fn bind(&self, u: SrtSocket, addr: &SockAddr) -> c_int;

    /// `srt_listen`
    fn listen(&self, u: SrtSocket, backlog: c_int) -> c_int;

    /// `srt_accept`; `addr` receives the peer address and its length
    fn accept(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> SrtSocket;

    /// `srt_connect`
    fn connect(&self, u: SrtSocket, addr: &SockAddr) -> c_int;

    /// `srt_rendezvous`
    fn rendezvous(&self, u: SrtSocket, local: &SockAddr, remote: &SockAddr) -> c_int;

    /// `srt_close`
    fn close(&self, u: SrtSocket) -> c_int;

    /// `srt_getsockstate`
    fn getsockstate(&self, u: SrtSocket) -> c_int;

    /// `srt_getsockname`
    fn getsockname(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> c_int;

    /// `srt_getpeername`
    fn getpeername(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> c_int;

    /// `srt_setsockopt`; `value` is the encoded option payload
    fn setsockopt(&self, u: SrtSocket, level: c_int, opt: c_int, value: &[u8]) -> c_int;

    /// `srt_getsockopt`; `len` carries the buffer size in and the value size out
    fn getsockopt(
        &self,
        u: SrtSocket,
        level: c_int,
        opt: c_int,
        value: &mut [u8],
        len: &mut c_int,
    ) -> c_int;

    /// `srt_send`
    fn send(&self, u: SrtSocket, buf: &[u8]) -> c_int;

    /// `srt_sendmsg`
    fn sendmsg(&self, u: SrtSocket, buf: &[u8], ttl: c_int, inorder: bool) -> c_int;

    /// `srt_sendmsg2`
    fn sendmsg2(&self, u: SrtSocket, buf: &[u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int;

    /// `srt_recv`
    fn recv(&self, u: SrtSocket, buf: &mut [u8]) -> c_int;

    /// `srt_recvmsg2`
    fn recvmsg2(&self, u: SrtSocket, buf: &mut [u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int;

    /// `srt_sendfile`; `offset` is updated in place
    fn sendfile(&self, u: SrtSocket, path: &CStr, offset: &mut i64, size: i64, block: c_int)
        -> i64;

    /// `srt_recvfile`; `offset` is updated in place
    fn recvfile(&self, u: SrtSocket, path: &CStr, offset: &mut i64, size: i64, block: c_int)
        -> i64;

    /// `srt_getlasterror_str`
    fn getlasterror_str(&self) -> String;

    /// `srt_getlasterror(NULL)`
    fn getlasterror(&self) -> c_int;

    /// `srt_strerror(code, 0)`
    fn strerror(&self, code: c_int) -> String;

    /// `srt_clearlasterror`
    fn clearlasterror(&self);

    /// `srt_getrejectreason`
    fn getrejectreason(&self, u: SrtSocket) -> c_int;

    /// `srt_setrejectreason`
    fn setrejectreason(&self, u: SrtSocket, reason: c_int) -> c_int;

    /// `srt_connection_time`
    fn connection_time(&self, u: SrtSocket) -> i64;

    /// `srt_bstats`
    fn bstats(&self, u: SrtSocket, perf: &mut SrtTraceBStats, clear: bool) -> c_int;

    /// `srt_bistats`
    fn bistats(
        &self,
        u: SrtSocket,
        perf: &mut SrtTraceBStats,
        clear: bool,
        instantaneous: bool,
    ) -> c_int;

    /// `srt_epoll_create`
    fn epoll_create(&self) -> c_int;

    /// `srt_epoll_add_usock` with the event bits in `events`
    fn epoll_add_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int;

    /// `srt_epoll_update_usock`
    fn epoll_update_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int;

    /// `srt_epoll_remove_usock`
    fn epoll_remove_usock(&self, eid: c_int, u: SrtSocket) -> c_int;

    /// `srt_epoll_wait` over SRT sockets only
    ///
    /// The slices are the in/out socket sets; `rnum`/`wnum` carry their
    /// capacity in and the ready count out. An empty set is passed as null.
    fn epoll_wait(
        &self,
        eid: c_int,
        readfds: &mut [SrtSocket],
        rnum: &mut c_int,
        writefds: &mut [SrtSocket],
        wnum: &mut c_int,
        timeout_ms: i64,
    ) -> c_int;

    /// `srt_epoll_uwait`; `fds` receives the ready sockets
    fn epoll_uwait(&self, eid: c_int, fds: &mut [SrtEpollEvent], timeout_ms: i64) -> c_int;

    /// `srt_epoll_set`; returns the previous flags
    fn epoll_set(&self, eid: c_int, flags: i32) -> i32;

    /// `srt_epoll_release`
    fn epoll_release(&self, eid: c_int) -> c_int;

    /// `srt_setloglevel`
    fn setloglevel(&self, level: c_int);

    /// `srt_setloghandler(NULL, handler)`
    fn setloghandler(&self, handler: Option<SrtLogHandler>);
}
