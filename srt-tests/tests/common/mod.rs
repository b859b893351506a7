//! Recording stand-in for libsrt
//!
//! `MockSrt` implements `SrtApi` without any native code. Every call is
//! recorded together with the number of scratch values alive at that moment,
//! so tests can check both that SRT was (or was not) reached and that scratch
//! is released afterwards.

#![allow(dead_code)]

pub mod heap;

use parking_lot::Mutex;
use socket2::SockAddr;
use srt_bridge::{scratch, Bridge, MsgCtrl};
use srt_sys::consts::errno;
use srt_sys::{
    SockAddrBuf, SrtApi, SrtEpollEvent, SrtLogHandler, SrtMsgCtrl, SrtSocket, SrtTraceBStats,
    SRT_ERROR,
};
use std::collections::HashMap;
use std::ffi::CStr;
use std::net::SocketAddr;
use std::os::raw::c_int;
use std::sync::Arc;

/// One recorded SRT call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: &'static str,
    /// Scratch values alive on the calling thread during the call
    pub scratch: usize,
}

#[derive(Debug)]
pub struct MockState {
    pub calls: Vec<Call>,
    /// Value `srt_getlasterror` reports
    pub last_error: c_int,
    /// Every call fails with `SRT_ERROR` and sets `last_error`
    pub failing: bool,
    pub next_socket: SrtSocket,
    pub status: c_int,
    pub log_handlers: usize,
    pub log_level: Option<c_int>,

    pub bound: Vec<SocketAddr>,
    pub connected: Vec<SocketAddr>,
    pub rendezvous: Vec<(SocketAddr, SocketAddr)>,
    /// Peer reported by accept; `None` reports a zero length
    pub peer: Option<SocketAddr>,
    pub local: Option<SocketAddr>,

    /// `(opt, payload)` pairs passed to setsockopt
    pub options: Vec<(c_int, Vec<u8>)>,
    /// Values getsockopt answers with
    pub option_values: HashMap<c_int, Vec<u8>>,

    pub sent: Vec<Vec<u8>>,
    pub sent_msg: Vec<(Vec<u8>, c_int, bool)>,
    /// Control record seen by the last sendmsg2/recvmsg2
    pub ctrl_in: Option<MsgCtrl>,
    /// Message number SRT assigns on sendmsg2/recvmsg2
    pub assigned_msgno: i32,
    /// Buffer length offered to the last recv
    pub recv_capacity: Option<usize>,
    /// Bytes the next recv delivers
    pub inbound: Vec<u8>,

    pub files: Vec<(String, i64, i64, c_int)>,
    pub reject_reason: c_int,

    /// Record `bstats`/`bistats` copy out
    pub stats: SrtTraceBStats,
    /// `(clear, instantaneous)` per stats call
    pub stats_args: Vec<(bool, bool)>,

    pub next_eid: c_int,
    /// `(eid, socket, events)` per add/update, in call order
    pub subscriptions: Vec<(c_int, SrtSocket, c_int)>,
    pub removed: Vec<(c_int, SrtSocket)>,
    pub released: Vec<c_int>,
    pub epoll_flags: i32,
    /// Sockets the next uwait reports
    pub ready: Vec<SrtEpollEvent>,
    /// Read and write sets seen by the last epoll_wait
    pub wait_sets: Option<(Vec<SrtSocket>, Vec<SrtSocket>)>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            calls: Vec::new(),
            last_error: errno::SRT_SUCCESS,
            failing: false,
            next_socket: 1000,
            status: srt_sys::consts::sockstatus::SRTS_INIT,
            log_handlers: 0,
            log_level: None,
            bound: Vec::new(),
            connected: Vec::new(),
            rendezvous: Vec::new(),
            peer: None,
            local: None,
            options: Vec::new(),
            option_values: HashMap::new(),
            sent: Vec::new(),
            sent_msg: Vec::new(),
            ctrl_in: None,
            assigned_msgno: 7,
            recv_capacity: None,
            inbound: Vec::new(),
            files: Vec::new(),
            reject_reason: 0,
            stats: SrtTraceBStats::default(),
            stats_args: Vec::new(),
            next_eid: 0,
            subscriptions: Vec::new(),
            removed: Vec::new(),
            released: Vec::new(),
            epoll_flags: 0,
            ready: Vec::new(),
            wait_sets: None,
        }
    }
}

#[derive(Default)]
pub struct MockSrt {
    pub state: Mutex<MockState>,
}

impl MockSrt {
    pub fn new() -> Arc<Self> {
        Arc::new(MockSrt::default())
    }

    /// Names of the calls made so far
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.iter().map(|c| c.name).collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn fail_with(&self, code: c_int) {
        let mut state = self.state.lock();
        state.failing = true;
        state.last_error = code;
    }

    fn record(&self, name: &'static str) -> bool {
        let mut state = self.state.lock();
        state.calls.push(Call {
            name,
            scratch: scratch::outstanding(),
        });
        !state.failing
    }
}

fn socket_addr(addr: &SockAddr) -> SocketAddr {
    addr.as_socket().expect("mock only sees inet addresses")
}

fn status<T: From<i8>>(ok: bool, value: T) -> T {
    if ok {
        value
    } else {
        T::from(SRT_ERROR as i8)
    }
}

impl SrtApi for MockSrt {
    fn startup(&self) -> c_int {
        let ok = self.record("startup");
        status(ok, 0)
    }

    fn cleanup(&self) -> c_int {
        let ok = self.record("cleanup");
        status(ok, 0)
    }

    fn socket(&self, af: c_int, _ty: c_int, _protocol: c_int) -> SrtSocket {
        let ok = self.record("socket");
        if !ok || (af != libc::AF_INET && af != libc::AF_INET6) {
            return SRT_ERROR;
        }
        self.create_socket_inner()
    }

    fn create_socket(&self) -> SrtSocket {
        let ok = self.record("create_socket");
        status(ok, self.create_socket_inner())
    }

    fn bind(&self, _u: SrtSocket, addr: &SockAddr) -> c_int {
        let ok = self.record("bind");
        if ok {
            self.state.lock().bound.push(socket_addr(addr));
        }
        status(ok, 0)
    }

    fn listen(&self, _u: SrtSocket, _backlog: c_int) -> c_int {
        let ok = self.record("listen");
        status(ok, 0)
    }

    fn accept(&self, _u: SrtSocket, addr: &mut SockAddrBuf) -> SrtSocket {
        let ok = self.record("accept");
        if !ok {
            return SRT_ERROR;
        }
        let peer = self.state.lock().peer;
        match peer {
            Some(peer) => addr.fill(&SockAddr::from(peer)),
            None => *addr.len_mut() = 0,
        }
        self.create_socket_inner()
    }

    fn connect(&self, _u: SrtSocket, addr: &SockAddr) -> c_int {
        let ok = self.record("connect");
        if ok {
            self.state.lock().connected.push(socket_addr(addr));
        }
        status(ok, 0)
    }

    fn rendezvous(&self, _u: SrtSocket, local: &SockAddr, remote: &SockAddr) -> c_int {
        let ok = self.record("rendezvous");
        if ok {
            self.state
                .lock()
                .rendezvous
                .push((socket_addr(local), socket_addr(remote)));
        }
        status(ok, 0)
    }

    fn close(&self, _u: SrtSocket) -> c_int {
        let ok = self.record("close");
        status(ok, 0)
    }

    fn getsockstate(&self, _u: SrtSocket) -> c_int {
        self.record("getsockstate");
        self.state.lock().status
    }

    fn getsockname(&self, _u: SrtSocket, addr: &mut SockAddrBuf) -> c_int {
        let ok = self.record("getsockname");
        let local = self.state.lock().local;
        match (ok, local) {
            (true, Some(local)) => {
                addr.fill(&SockAddr::from(local));
                0
            }
            _ => SRT_ERROR,
        }
    }

    fn getpeername(&self, _u: SrtSocket, addr: &mut SockAddrBuf) -> c_int {
        let ok = self.record("getpeername");
        let peer = self.state.lock().peer;
        match (ok, peer) {
            (true, Some(peer)) => {
                addr.fill(&SockAddr::from(peer));
                0
            }
            _ => SRT_ERROR,
        }
    }

    fn setsockopt(&self, _u: SrtSocket, _level: c_int, opt: c_int, value: &[u8]) -> c_int {
        let ok = self.record("setsockopt");
        if ok {
            self.state.lock().options.push((opt, value.to_vec()));
        }
        status(ok, 0)
    }

    fn getsockopt(
        &self,
        _u: SrtSocket,
        _level: c_int,
        opt: c_int,
        value: &mut [u8],
        len: &mut c_int,
    ) -> c_int {
        let ok = self.record("getsockopt");
        let stored = self.state.lock().option_values.get(&opt).cloned();
        match (ok, stored) {
            (true, Some(stored)) => {
                let n = stored.len().min(value.len()).min(*len as usize);
                value[..n].copy_from_slice(&stored[..n]);
                *len = n as c_int;
                0
            }
            _ => SRT_ERROR,
        }
    }

    fn send(&self, _u: SrtSocket, buf: &[u8]) -> c_int {
        let ok = self.record("send");
        if ok {
            self.state.lock().sent.push(buf.to_vec());
        }
        status(ok, buf.len() as c_int)
    }

    fn sendmsg(&self, _u: SrtSocket, buf: &[u8], ttl: c_int, inorder: bool) -> c_int {
        let ok = self.record("sendmsg");
        if ok {
            self.state.lock().sent_msg.push((buf.to_vec(), ttl, inorder));
        }
        status(ok, buf.len() as c_int)
    }

    fn sendmsg2(&self, _u: SrtSocket, buf: &[u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int {
        let ok = self.record("sendmsg2");
        let mut state = self.state.lock();
        if let Some(ctrl) = ctrl {
            state.ctrl_in = Some(MsgCtrl::from(&*ctrl));
            if ok {
                ctrl.msgno = state.assigned_msgno;
            }
        }
        if ok {
            state.sent.push(buf.to_vec());
        }
        status(ok, buf.len() as c_int)
    }

    fn recv(&self, _u: SrtSocket, buf: &mut [u8]) -> c_int {
        let ok = self.record("recv");
        self.deliver(ok, buf)
    }

    fn recvmsg2(&self, _u: SrtSocket, buf: &mut [u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int {
        let ok = self.record("recvmsg2");
        if let Some(ctrl) = ctrl {
            let mut state = self.state.lock();
            state.ctrl_in = Some(MsgCtrl::from(&*ctrl));
            if ok {
                ctrl.msgno = state.assigned_msgno;
                ctrl.boundary = 3;
            }
        }
        self.deliver(ok, buf)
    }

    fn sendfile(
        &self,
        _u: SrtSocket,
        path: &CStr,
        offset: &mut i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        self.file("sendfile", path, offset, size, block)
    }

    fn recvfile(
        &self,
        _u: SrtSocket,
        path: &CStr,
        offset: &mut i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        self.file("recvfile", path, offset, size, block)
    }

    fn getlasterror_str(&self) -> String {
        self.record("getlasterror_str");
        let code = self.state.lock().last_error;
        format!("mock error {}", code)
    }

    fn getlasterror(&self) -> c_int {
        self.record("getlasterror");
        self.state.lock().last_error
    }

    fn strerror(&self, code: c_int) -> String {
        self.record("strerror");
        format!("mock error {}", code)
    }

    fn clearlasterror(&self) {
        self.record("clearlasterror");
        self.state.lock().last_error = errno::SRT_SUCCESS;
    }

    fn getrejectreason(&self, _u: SrtSocket) -> c_int {
        self.record("getrejectreason");
        self.state.lock().reject_reason
    }

    fn setrejectreason(&self, _u: SrtSocket, reason: c_int) -> c_int {
        let ok = self.record("setrejectreason");
        if ok {
            self.state.lock().reject_reason = reason;
        }
        status(ok, 0)
    }

    fn connection_time(&self, _u: SrtSocket) -> i64 {
        let ok = self.record("connection_time");
        status(ok, 1_500_000)
    }

    fn bstats(&self, _u: SrtSocket, perf: &mut SrtTraceBStats, clear: bool) -> c_int {
        self.stats_into("bstats", perf, clear, false)
    }

    fn bistats(
        &self,
        _u: SrtSocket,
        perf: &mut SrtTraceBStats,
        clear: bool,
        instantaneous: bool,
    ) -> c_int {
        self.stats_into("bistats", perf, clear, instantaneous)
    }

    fn epoll_create(&self) -> c_int {
        let ok = self.record("epoll_create");
        if !ok {
            return SRT_ERROR;
        }
        let mut state = self.state.lock();
        state.next_eid += 1;
        state.next_eid
    }

    fn epoll_add_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int {
        let ok = self.record("epoll_add_usock");
        if ok {
            self.state.lock().subscriptions.push((eid, u, events));
        }
        status(ok, 0)
    }

    fn epoll_update_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int {
        let ok = self.record("epoll_update_usock");
        if ok {
            self.state.lock().subscriptions.push((eid, u, events));
        }
        status(ok, 0)
    }

    fn epoll_remove_usock(&self, eid: c_int, u: SrtSocket) -> c_int {
        let ok = self.record("epoll_remove_usock");
        if ok {
            self.state.lock().removed.push((eid, u));
        }
        status(ok, 0)
    }

    fn epoll_wait(
        &self,
        _eid: c_int,
        readfds: &mut [SrtSocket],
        rnum: &mut c_int,
        writefds: &mut [SrtSocket],
        wnum: &mut c_int,
        _timeout_ms: i64,
    ) -> c_int {
        let ok = self.record("epoll_wait");
        let mut state = self.state.lock();
        state.wait_sets = Some((readfds.to_vec(), writefds.to_vec()));
        if !ok {
            return SRT_ERROR;
        }
        // Everything offered is ready
        *rnum + *wnum
    }

    fn epoll_uwait(&self, _eid: c_int, fds: &mut [SrtEpollEvent], _timeout_ms: i64) -> c_int {
        let ok = self.record("epoll_uwait");
        if !ok {
            return SRT_ERROR;
        }
        let state = self.state.lock();
        let n = state.ready.len().min(fds.len());
        fds[..n].copy_from_slice(&state.ready[..n]);
        // uwait reports the total ready count, which may exceed the capacity
        state.ready.len() as c_int
    }

    fn epoll_set(&self, _eid: c_int, flags: i32) -> i32 {
        let ok = self.record("epoll_set");
        if !ok {
            return SRT_ERROR;
        }
        let mut state = self.state.lock();
        let previous = state.epoll_flags;
        if flags >= 0 {
            state.epoll_flags = flags;
        }
        previous
    }

    fn epoll_release(&self, eid: c_int) -> c_int {
        let ok = self.record("epoll_release");
        if ok {
            self.state.lock().released.push(eid);
        }
        status(ok, 0)
    }

    fn setloglevel(&self, level: c_int) {
        self.record("setloglevel");
        self.state.lock().log_level = Some(level);
    }

    fn setloghandler(&self, _handler: Option<SrtLogHandler>) {
        self.record("setloghandler");
        self.state.lock().log_handlers += 1;
    }
}

impl MockSrt {
    fn create_socket_inner(&self) -> SrtSocket {
        let mut state = self.state.lock();
        state.next_socket += 1;
        state.next_socket
    }

    fn stats_into(
        &self,
        name: &'static str,
        perf: &mut SrtTraceBStats,
        clear: bool,
        instantaneous: bool,
    ) -> c_int {
        let ok = self.record(name);
        let mut state = self.state.lock();
        state.stats_args.push((clear, instantaneous));
        if !ok {
            return SRT_ERROR;
        }
        *perf = state.stats;
        0
    }

    fn deliver(&self, ok: bool, buf: &mut [u8]) -> c_int {
        let mut state = self.state.lock();
        state.recv_capacity = Some(buf.len());
        if !ok {
            return SRT_ERROR;
        }
        let n = state.inbound.len().min(buf.len());
        buf[..n].copy_from_slice(&state.inbound[..n]);
        state.inbound.drain(..n);
        n as c_int
    }

    fn file(
        &self,
        name: &'static str,
        path: &CStr,
        offset: &mut i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        let ok = self.record(name);
        if !ok {
            return i64::from(SRT_ERROR);
        }
        let path = path.to_string_lossy().into_owned();
        self.state.lock().files.push((path, *offset, size, block));
        *offset += size;
        size
    }
}

/// A bridge over a fresh mock
pub fn bridge() -> (Bridge, Arc<MockSrt>) {
    let mock = MockSrt::new();
    (Bridge::new(mock.clone()), mock)
}
