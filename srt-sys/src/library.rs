//! Run-time loading of libsrt
//!
//! libsrt is opened with `libloading` and every symbol the bridge needs is
//! resolved once, up front. A library missing any symbol is rejected.

use crate::api::SrtApi;
use crate::consts::SrtSocket;
use crate::stats::SrtTraceBStats;
use crate::types::{SockAddrBuf, SrtEpollEvent, SrtLogHandler, SrtMsgCtrl};
use libloading::Library;
use socket2::SockAddr;
use std::ffi::{CStr, OsStr};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr;
use thiserror::Error;

/// Library loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("libsrt not found (tried: {0})")]
    LibraryNotFound(String),

    #[error("Failed to load {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Symbol '{0}' not found in libsrt")]
    SymbolNotFound(&'static str),
}

/// Platform file names tried when no explicit path is configured
pub fn default_library_names() -> Vec<String> {
    let mut names = vec![libloading::library_filename("srt")
        .to_string_lossy()
        .into_owned()];

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        names.push("libsrt.so.1.5".to_string());
        names.push("libsrt.so.1.4".to_string());
        names.push("libsrt.so.1".to_string());
    }

    #[cfg(target_os = "macos")]
    {
        names.push("/usr/local/lib/libsrt.dylib".to_string());
        names.push("/opt/homebrew/lib/libsrt.dylib".to_string());
    }

    names
}

macro_rules! srt_functions {
    ($($name:ident: fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        struct SrtFunctions {
            $($name: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*
        }

        impl SrtFunctions {
            /// # Safety
            ///
            /// The declared signatures must match the library's exports.
            unsafe fn resolve(lib: &Library) -> Result<Self, LoadError> {
                Ok(SrtFunctions {
                    $($name: *lib
                        .get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                            concat!(stringify!($name), "\0").as_bytes(),
                        )
                        .map_err(|_| LoadError::SymbolNotFound(stringify!($name)))?,)*
                })
            }
        }
    };
}

srt_functions! {
    srt_startup: fn() -> c_int;
    srt_cleanup: fn() -> c_int;
    srt_socket: fn(c_int, c_int, c_int) -> SrtSocket;
    srt_create_socket: fn() -> SrtSocket;
    srt_bind: fn(SrtSocket, *const libc::sockaddr, c_int) -> c_int;
    srt_listen: fn(SrtSocket, c_int) -> c_int;
    srt_accept: fn(SrtSocket, *mut libc::sockaddr, *mut c_int) -> SrtSocket;
    srt_connect: fn(SrtSocket, *const libc::sockaddr, c_int) -> c_int;
    srt_rendezvous: fn(SrtSocket, *const libc::sockaddr, c_int, *const libc::sockaddr, c_int) -> c_int;
    srt_close: fn(SrtSocket) -> c_int;
    srt_getsockstate: fn(SrtSocket) -> c_int;
    srt_getsockname: fn(SrtSocket, *mut libc::sockaddr, *mut c_int) -> c_int;
    srt_getpeername: fn(SrtSocket, *mut libc::sockaddr, *mut c_int) -> c_int;
    srt_setsockopt: fn(SrtSocket, c_int, c_int, *const c_void, c_int) -> c_int;
    srt_getsockopt: fn(SrtSocket, c_int, c_int, *mut c_void, *mut c_int) -> c_int;
    srt_send: fn(SrtSocket, *const c_char, c_int) -> c_int;
    srt_sendmsg: fn(SrtSocket, *const c_char, c_int, c_int, c_int) -> c_int;
    srt_sendmsg2: fn(SrtSocket, *const c_char, c_int, *mut SrtMsgCtrl) -> c_int;
    srt_recv: fn(SrtSocket, *mut c_char, c_int) -> c_int;
    srt_recvmsg2: fn(SrtSocket, *mut c_char, c_int, *mut SrtMsgCtrl) -> c_int;
    srt_sendfile: fn(SrtSocket, *const c_char, *mut i64, i64, c_int) -> i64;
    srt_recvfile: fn(SrtSocket, *const c_char, *mut i64, i64, c_int) -> i64;
    srt_getlasterror_str: fn() -> *const c_char;
    srt_getlasterror: fn(*mut c_int) -> c_int;
    srt_strerror: fn(c_int, c_int) -> *const c_char;
    srt_clearlasterror: fn();
    srt_getrejectreason: fn(SrtSocket) -> c_int;
    srt_setrejectreason: fn(SrtSocket, c_int) -> c_int;
    srt_connection_time: fn(SrtSocket) -> i64;
    srt_setloglevel: fn(c_int);
    srt_setloghandler: fn(*mut c_void, Option<SrtLogHandler>);
    srt_bstats: fn(SrtSocket, *mut SrtTraceBStats, c_int) -> c_int;
    srt_bistats: fn(SrtSocket, *mut SrtTraceBStats, c_int, c_int) -> c_int;
    srt_epoll_create: fn() -> c_int;
    srt_epoll_add_usock: fn(c_int, SrtSocket, *const c_int) -> c_int;
    srt_epoll_update_usock: fn(c_int, SrtSocket, *const c_int) -> c_int;
    srt_epoll_remove_usock: fn(c_int, SrtSocket) -> c_int;
    srt_epoll_wait: fn(
        c_int,
        *mut SrtSocket,
        *mut c_int,
        *mut SrtSocket,
        *mut c_int,
        i64,
        *mut c_int,
        *mut c_int,
        *mut c_int,
        *mut c_int
    ) -> c_int;
    srt_epoll_uwait: fn(c_int, *mut SrtEpollEvent, c_int, i64) -> c_int;
    srt_epoll_set: fn(c_int, i32) -> i32;
    srt_epoll_release: fn(c_int) -> c_int;
}

/// A loaded libsrt
///
/// The function table is only valid while `_library` is alive; both are
/// dropped together.
pub struct SrtLibrary {
    fns: SrtFunctions,
    _library: Library,
}

impl SrtLibrary {
    /// Open libsrt from `path`, or from the platform default names
    pub fn load(path: Option<&Path>) -> Result<Self, LoadError> {
        match path {
            Some(path) => Self::open([path.as_os_str()]),
            None => Self::open(default_library_names()),
        }
    }

    /// Open the first loadable candidate, trying each in order
    pub fn open<I, S>(candidates: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut tried = Vec::new();
        let mut last_failure = None;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let shown = candidate.to_string_lossy().into_owned();
            // SAFETY: opening libsrt runs its static initialisers only.
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    tracing::debug!("Opened {}", shown);
                    return Self::from_library(library);
                }
                Err(e) => {
                    tracing::trace!("Cannot open {}: {}", shown, e);
                    last_failure = Some(LoadError::LoadFailed {
                        path: shown.clone(),
                        reason: e.to_string(),
                    });
                    tried.push(shown);
                }
            }
        }

        match last_failure {
            Some(failure) if tried.len() == 1 => Err(failure),
            _ => Err(LoadError::LibraryNotFound(tried.join(", "))),
        }
    }

    fn from_library(library: Library) -> Result<Self, LoadError> {
        // SAFETY: signatures above are transcribed from srt.h.
        let fns = unsafe { SrtFunctions::resolve(&library)? };
        Ok(SrtLibrary {
            fns,
            _library: library,
        })
    }
}

/// Copy a C string owned by libsrt
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn owned_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn buf_len(len: usize) -> c_int {
    len.min(c_int::MAX as usize) as c_int
}

impl SrtApi for SrtLibrary {
    fn startup(&self) -> c_int {
        unsafe { (self.fns.srt_startup)() }
    }

    fn cleanup(&self) -> c_int {
        unsafe { (self.fns.srt_cleanup)() }
    }

    fn socket(&self, af: c_int, ty: c_int, protocol: c_int) -> SrtSocket {
        unsafe { (self.fns.srt_socket)(af, ty, protocol) }
    }

    fn create_socket(&self) -> SrtSocket {
        unsafe { (self.fns.srt_create_socket)() }
    }

    fn bind(&self, u: SrtSocket, addr: &SockAddr) -> c_int {
        unsafe { (self.fns.srt_bind)(u, addr.as_ptr().cast(), addr.len() as c_int) }
    }

    fn listen(&self, u: SrtSocket, backlog: c_int) -> c_int {
        unsafe { (self.fns.srt_listen)(u, backlog) }
    }

    fn accept(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> SrtSocket {
        let name = addr.as_mut_ptr();
        unsafe { (self.fns.srt_accept)(u, name, addr.len_mut()) }
    }

    fn connect(&self, u: SrtSocket, addr: &SockAddr) -> c_int {
        unsafe { (self.fns.srt_connect)(u, addr.as_ptr().cast(), addr.len() as c_int) }
    }

    fn rendezvous(&self, u: SrtSocket, local: &SockAddr, remote: &SockAddr) -> c_int {
        unsafe {
            (self.fns.srt_rendezvous)(
                u,
                local.as_ptr().cast(),
                local.len() as c_int,
                remote.as_ptr().cast(),
                remote.len() as c_int,
            )
        }
    }

    fn close(&self, u: SrtSocket) -> c_int {
        unsafe { (self.fns.srt_close)(u) }
    }

    fn getsockstate(&self, u: SrtSocket) -> c_int {
        unsafe { (self.fns.srt_getsockstate)(u) }
    }

    fn getsockname(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> c_int {
        let name = addr.as_mut_ptr();
        unsafe { (self.fns.srt_getsockname)(u, name, addr.len_mut()) }
    }

    fn getpeername(&self, u: SrtSocket, addr: &mut SockAddrBuf) -> c_int {
        let name = addr.as_mut_ptr();
        unsafe { (self.fns.srt_getpeername)(u, name, addr.len_mut()) }
    }

    fn setsockopt(&self, u: SrtSocket, level: c_int, opt: c_int, value: &[u8]) -> c_int {
        unsafe {
            (self.fns.srt_setsockopt)(u, level, opt, value.as_ptr().cast(), buf_len(value.len()))
        }
    }

    fn getsockopt(
        &self,
        u: SrtSocket,
        level: c_int,
        opt: c_int,
        value: &mut [u8],
        len: &mut c_int,
    ) -> c_int {
        *len = (*len).min(buf_len(value.len()));
        unsafe { (self.fns.srt_getsockopt)(u, level, opt, value.as_mut_ptr().cast(), len) }
    }

    fn send(&self, u: SrtSocket, buf: &[u8]) -> c_int {
        unsafe { (self.fns.srt_send)(u, buf.as_ptr().cast(), buf_len(buf.len())) }
    }

    fn sendmsg(&self, u: SrtSocket, buf: &[u8], ttl: c_int, inorder: bool) -> c_int {
        unsafe {
            (self.fns.srt_sendmsg)(
                u,
                buf.as_ptr().cast(),
                buf_len(buf.len()),
                ttl,
                c_int::from(inorder),
            )
        }
    }

    fn sendmsg2(&self, u: SrtSocket, buf: &[u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int {
        let ctrl = ctrl.map_or(ptr::null_mut(), |c| c as *mut SrtMsgCtrl);
        unsafe { (self.fns.srt_sendmsg2)(u, buf.as_ptr().cast(), buf_len(buf.len()), ctrl) }
    }

    fn recv(&self, u: SrtSocket, buf: &mut [u8]) -> c_int {
        unsafe { (self.fns.srt_recv)(u, buf.as_mut_ptr().cast(), buf_len(buf.len())) }
    }

    fn recvmsg2(&self, u: SrtSocket, buf: &mut [u8], ctrl: Option<&mut SrtMsgCtrl>) -> c_int {
        let ctrl = ctrl.map_or(ptr::null_mut(), |c| c as *mut SrtMsgCtrl);
        unsafe { (self.fns.srt_recvmsg2)(u, buf.as_mut_ptr().cast(), buf_len(buf.len()), ctrl) }
    }

    fn sendfile(
        &self,
        u: SrtSocket,
        path: &CStr,
        offset: &mut i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        unsafe { (self.fns.srt_sendfile)(u, path.as_ptr(), offset, size, block) }
    }

    fn recvfile(
        &self,
        u: SrtSocket,
        path: &CStr,
        offset: &mut i64,
        size: i64,
        block: c_int,
    ) -> i64 {
        unsafe { (self.fns.srt_recvfile)(u, path.as_ptr(), offset, size, block) }
    }

    fn getlasterror_str(&self) -> String {
        unsafe { owned_string((self.fns.srt_getlasterror_str)()) }
    }

    fn getlasterror(&self) -> c_int {
        unsafe { (self.fns.srt_getlasterror)(ptr::null_mut()) }
    }

    fn strerror(&self, code: c_int) -> String {
        unsafe { owned_string((self.fns.srt_strerror)(code, 0)) }
    }

    fn clearlasterror(&self) {
        unsafe { (self.fns.srt_clearlasterror)() }
    }

    fn getrejectreason(&self, u: SrtSocket) -> c_int {
        unsafe { (self.fns.srt_getrejectreason)(u) }
    }

    fn setrejectreason(&self, u: SrtSocket, reason: c_int) -> c_int {
        unsafe { (self.fns.srt_setrejectreason)(u, reason) }
    }

    fn connection_time(&self, u: SrtSocket) -> i64 {
        unsafe { (self.fns.srt_connection_time)(u) }
    }

    fn setloglevel(&self, level: c_int) {
        unsafe { (self.fns.srt_setloglevel)(level) }
    }

    fn setloghandler(&self, handler: Option<SrtLogHandler>) {
        unsafe { (self.fns.srt_setloghandler)(ptr::null_mut(), handler) }
    }

    fn bstats(&self, u: SrtSocket, perf: &mut SrtTraceBStats, clear: bool) -> c_int {
        unsafe { (self.fns.srt_bstats)(u, perf, c_int::from(clear)) }
    }

    fn bistats(
        &self,
        u: SrtSocket,
        perf: &mut SrtTraceBStats,
        clear: bool,
        instantaneous: bool,
    ) -> c_int {
        unsafe {
            (self.fns.srt_bistats)(u, perf, c_int::from(clear), c_int::from(instantaneous))
        }
    }

    fn epoll_create(&self) -> c_int {
        unsafe { (self.fns.srt_epoll_create)() }
    }

    fn epoll_add_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int {
        unsafe { (self.fns.srt_epoll_add_usock)(eid, u, &events) }
    }

    fn epoll_update_usock(&self, eid: c_int, u: SrtSocket, events: c_int) -> c_int {
        unsafe { (self.fns.srt_epoll_update_usock)(eid, u, &events) }
    }

    fn epoll_remove_usock(&self, eid: c_int, u: SrtSocket) -> c_int {
        unsafe { (self.fns.srt_epoll_remove_usock)(eid, u) }
    }

    fn epoll_wait(
        &self,
        eid: c_int,
        readfds: &mut [SrtSocket],
        rnum: &mut c_int,
        writefds: &mut [SrtSocket],
        wnum: &mut c_int,
        timeout_ms: i64,
    ) -> c_int {
        let (readfds, rnum) = socket_set(readfds, rnum);
        let (writefds, wnum) = socket_set(writefds, wnum);
        unsafe {
            (self.fns.srt_epoll_wait)(
                eid,
                readfds,
                rnum,
                writefds,
                wnum,
                timeout_ms,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        }
    }

    fn epoll_uwait(&self, eid: c_int, fds: &mut [SrtEpollEvent], timeout_ms: i64) -> c_int {
        unsafe { (self.fns.srt_epoll_uwait)(eid, fds.as_mut_ptr(), buf_len(fds.len()), timeout_ms) }
    }

    fn epoll_set(&self, eid: c_int, flags: i32) -> i32 {
        unsafe { (self.fns.srt_epoll_set)(eid, flags) }
    }

    fn epoll_release(&self, eid: c_int) -> c_int {
        unsafe { (self.fns.srt_epoll_release)(eid) }
    }
}

/// Pointers for one `srt_epoll_wait` socket set; empty sets go as null
fn socket_set(fds: &mut [SrtSocket], num: &mut c_int) -> (*mut SrtSocket, *mut c_int) {
    if fds.is_empty() {
        return (ptr::null_mut(), ptr::null_mut());
    }
    *num = (*num).min(buf_len(fds.len()));
    (fds.as_mut_ptr(), num)
}
