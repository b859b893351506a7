//! `#[repr(C)]` records and scratch storage shared with libsrt

use crate::consts::{SRT_MSGNO_NONE, SRT_MSGTTL_INF, SRT_SEQNO_NONE};
use socket2::SockAddr;
use std::mem;
use std::net::SocketAddr;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

/// `SRT_LOG_HANDLER_FN`
pub type SrtLogHandler = unsafe extern "C" fn(
    opaque: *mut c_void,
    level: c_int,
    file: *const c_char,
    line: c_int,
    area: *const c_char,
    message: *const c_char,
);

/// `SRT_MSGCTRL`
///
/// Layout must match `struct SRT_MsgCtrl_` in `srt.h`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrtMsgCtrl {
    /// Left for future use
    pub flags: c_int,
    /// Time to live in milliseconds, -1 for infinite
    pub msgttl: c_int,
    /// Deliver in order (message mode)
    pub inorder: c_int,
    /// Packet boundary (receiver only)
    pub boundary: c_int,
    /// Source time in microseconds
    pub srctime: i64,
    /// Sequence number of the first packet
    pub pktseq: i32,
    /// Message number
    pub msgno: i32,
    /// Group data array (unused by the bridge)
    pub grpdata: *mut c_void,
    /// Group data array size
    pub grpdata_size: usize,
}

impl Default for SrtMsgCtrl {
    /// Same values as libsrt's `srt_msgctrl_default`
    fn default() -> Self {
        SrtMsgCtrl {
            flags: 0,
            msgttl: SRT_MSGTTL_INF,
            inorder: 0,
            boundary: 0,
            srctime: 0,
            pktseq: SRT_SEQNO_NONE,
            msgno: SRT_MSGNO_NONE,
            grpdata: ptr::null_mut(),
            grpdata_size: 0,
        }
    }
}

/// `SRT_EPOLL_EVENT`, one entry of the `srt_epoll_uwait` result set
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SrtEpollEvent {
    pub fd: crate::consts::SrtSocket,
    pub events: c_int,
}

/// Out-parameter storage for calls that report a peer or local address
///
/// Holds a `sockaddr_storage` plus the in/out length SRT expects. The length
/// starts at the storage capacity and is overwritten by the callee.
pub struct SockAddrBuf {
    storage: libc::sockaddr_storage,
    len: c_int,
}

impl SockAddrBuf {
    /// Create zeroed storage with the length set to full capacity
    pub fn new() -> Self {
        SockAddrBuf {
            // SAFETY: sockaddr_storage is plain old data; all-zero is valid.
            storage: unsafe { mem::zeroed() },
            len: Self::capacity(),
        }
    }

    /// Size of the underlying `sockaddr_storage`
    pub fn capacity() -> c_int {
        mem::size_of::<libc::sockaddr_storage>() as c_int
    }

    /// Pointer handed to SRT as `struct sockaddr*`
    pub fn as_mut_ptr(&mut self) -> *mut libc::sockaddr {
        (&mut self.storage as *mut libc::sockaddr_storage).cast()
    }

    /// In/out length handed to SRT as `int*`
    pub fn len_mut(&mut self) -> &mut c_int {
        &mut self.len
    }

    /// Length reported by the last call
    pub fn len(&self) -> c_int {
        self.len
    }

    /// True when the callee reported no address
    pub fn is_empty(&self) -> bool {
        self.len <= 0
    }

    /// Store `addr` as if a native call had written it
    pub fn fill(&mut self, addr: &SockAddr) {
        let len = (addr.len() as usize).min(Self::capacity() as usize);
        // SAFETY: both regions are valid for `len` bytes and do not overlap.
        unsafe {
            ptr::copy_nonoverlapping(
                addr.as_ptr().cast::<u8>(),
                (&mut self.storage as *mut libc::sockaddr_storage).cast::<u8>(),
                len,
            );
        }
        self.len = len as c_int;
    }

    /// Decode the stored address
    ///
    /// `None` for an unknown family or a length too short for the family.
    pub fn to_socket_addr(&self) -> Option<SocketAddr> {
        if self.is_empty() {
            return None;
        }
        let len = self.len.min(Self::capacity()) as libc::socklen_t;
        // SAFETY: storage is initialised (zeroed, then possibly written by SRT)
        // and `len` never exceeds its size.
        let addr = unsafe { SockAddr::new(self.storage, len) };
        let needed = match c_int::from(addr.family()) {
            libc::AF_INET => mem::size_of::<libc::sockaddr_in>(),
            libc::AF_INET6 => mem::size_of::<libc::sockaddr_in6>(),
            _ => return None,
        };
        if (len as usize) < needed {
            return None;
        }
        addr.as_socket()
    }
}

impl Default for SockAddrBuf {
    fn default() -> Self {
        Self::new()
    }
}
