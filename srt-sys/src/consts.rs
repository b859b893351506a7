//! libsrt C constants
//!
//! Values mirror `srt.h` and `logging_api.h` of libsrt 1.4/1.5.

use std::os::raw::c_int;

/// Native socket handle (`SRTSOCKET`)
pub type SrtSocket = c_int;

/// Returned by socket-creating calls on failure
pub const SRT_INVALID_SOCK: SrtSocket = -1;

/// Generic failure return of SRT calls
pub const SRT_ERROR: c_int = -1;

/// Address families accepted by `srt_socket`
pub const AF_INET: c_int = libc::AF_INET;
pub const AF_INET6: c_int = libc::AF_INET6;

/// `SRT_SOCKSTATUS`
pub mod sockstatus {
    use std::os::raw::c_int;

    pub const SRTS_INIT: c_int = 1;
    pub const SRTS_OPENED: c_int = 2;
    pub const SRTS_LISTENING: c_int = 3;
    pub const SRTS_CONNECTING: c_int = 4;
    pub const SRTS_CONNECTED: c_int = 5;
    pub const SRTS_BROKEN: c_int = 6;
    pub const SRTS_CLOSING: c_int = 7;
    pub const SRTS_CLOSED: c_int = 8;
    pub const SRTS_NONEXIST: c_int = 9;
}

/// `SRT_SOCKOPT`
pub mod sockopt {
    use std::os::raw::c_int;

    pub const SRTO_MSS: c_int = 0;
    pub const SRTO_SNDSYN: c_int = 1;
    pub const SRTO_RCVSYN: c_int = 2;
    pub const SRTO_ISN: c_int = 3;
    pub const SRTO_FC: c_int = 4;
    pub const SRTO_SNDBUF: c_int = 5;
    pub const SRTO_RCVBUF: c_int = 6;
    pub const SRTO_LINGER: c_int = 7;
    pub const SRTO_UDP_SNDBUF: c_int = 8;
    pub const SRTO_UDP_RCVBUF: c_int = 9;
    pub const SRTO_RENDEZVOUS: c_int = 12;
    pub const SRTO_SNDTIMEO: c_int = 13;
    pub const SRTO_RCVTIMEO: c_int = 14;
    pub const SRTO_REUSEADDR: c_int = 15;
    pub const SRTO_MAXBW: c_int = 16;
    pub const SRTO_STATE: c_int = 17;
    pub const SRTO_EVENT: c_int = 18;
    pub const SRTO_SNDDATA: c_int = 19;
    pub const SRTO_RCVDATA: c_int = 20;
    pub const SRTO_SENDER: c_int = 21;
    pub const SRTO_TSBPDMODE: c_int = 22;
    pub const SRTO_LATENCY: c_int = 23;
    pub const SRTO_INPUTBW: c_int = 24;
    pub const SRTO_OHEADBW: c_int = 25;
    pub const SRTO_PASSPHRASE: c_int = 26;
    pub const SRTO_PBKEYLEN: c_int = 27;
    pub const SRTO_KMSTATE: c_int = 28;
    pub const SRTO_IPTTL: c_int = 29;
    pub const SRTO_IPTOS: c_int = 30;
    pub const SRTO_TLPKTDROP: c_int = 31;
    pub const SRTO_SNDDROPDELAY: c_int = 32;
    pub const SRTO_NAKREPORT: c_int = 33;
    pub const SRTO_VERSION: c_int = 34;
    pub const SRTO_PEERVERSION: c_int = 35;
    pub const SRTO_CONNTIMEO: c_int = 36;
    pub const SRTO_DRIFTTRACER: c_int = 37;
    pub const SRTO_MININPUTBW: c_int = 38;
    pub const SRTO_SNDKMSTATE: c_int = 40;
    pub const SRTO_RCVKMSTATE: c_int = 41;
    pub const SRTO_LOSSMAXTTL: c_int = 42;
    pub const SRTO_RCVLATENCY: c_int = 43;
    pub const SRTO_PEERLATENCY: c_int = 44;
    pub const SRTO_MINVERSION: c_int = 45;
    pub const SRTO_STREAMID: c_int = 46;
    pub const SRTO_CONGESTION: c_int = 47;
    pub const SRTO_MESSAGEAPI: c_int = 48;
    pub const SRTO_PAYLOADSIZE: c_int = 49;
    pub const SRTO_TRANSTYPE: c_int = 50;
    pub const SRTO_KMREFRESHRATE: c_int = 51;
    pub const SRTO_KMPREANNOUNCE: c_int = 52;
    pub const SRTO_ENFORCEDENCRYPTION: c_int = 53;
    pub const SRTO_IPV6ONLY: c_int = 54;
    pub const SRTO_PEERIDLETIMEO: c_int = 55;
    pub const SRTO_BINDTODEVICE: c_int = 56;
    pub const SRTO_GROUPCONNECT: c_int = 57;
    pub const SRTO_GROUPMINSTABLETIMEO: c_int = 58;
    pub const SRTO_GROUPTYPE: c_int = 59;
    pub const SRTO_PACKETFILTER: c_int = 60;
    pub const SRTO_RETRANSMITALGO: c_int = 61;
}

/// `SRT_TRANSTYPE`
pub mod transtype {
    use std::os::raw::c_int;

    pub const SRTT_LIVE: c_int = 0;
    pub const SRTT_FILE: c_int = 1;
    pub const SRTT_INVALID: c_int = 2;
}

/// `SRT_KM_STATE`
pub mod kmstate {
    use std::os::raw::c_int;

    pub const SRT_KM_S_UNSECURED: c_int = 0;
    pub const SRT_KM_S_SECURING: c_int = 1;
    pub const SRT_KM_S_SECURED: c_int = 2;
    pub const SRT_KM_S_NOSECRET: c_int = 3;
    pub const SRT_KM_S_BADSECRET: c_int = 4;
}

/// `SRT_ERRNO`
pub mod errno {
    use std::os::raw::c_int;

    pub const SRT_EUNKNOWN: c_int = -1;
    pub const SRT_SUCCESS: c_int = 0;

    pub const SRT_ECONNSETUP: c_int = 1000;
    pub const SRT_ENOSERVER: c_int = 1001;
    pub const SRT_ECONNREJ: c_int = 1002;
    pub const SRT_ESOCKFAIL: c_int = 1003;
    pub const SRT_ESECFAIL: c_int = 1004;
    pub const SRT_ESCLOSED: c_int = 1005;

    pub const SRT_ECONNFAIL: c_int = 2000;
    pub const SRT_ECONNLOST: c_int = 2001;
    pub const SRT_ENOCONN: c_int = 2002;

    pub const SRT_ERESOURCE: c_int = 3000;
    pub const SRT_ETHREAD: c_int = 3001;
    pub const SRT_ENOBUF: c_int = 3002;
    pub const SRT_ESYSOBJ: c_int = 3003;

    pub const SRT_EFILE: c_int = 4000;
    pub const SRT_EINVRDOFF: c_int = 4001;
    pub const SRT_ERDPERM: c_int = 4002;
    pub const SRT_EINVWROFF: c_int = 4003;
    pub const SRT_EWRPERM: c_int = 4004;

    pub const SRT_EINVOP: c_int = 5000;
    pub const SRT_EBOUNDSOCK: c_int = 5001;
    pub const SRT_ECONNSOCK: c_int = 5002;
    pub const SRT_EINVPARAM: c_int = 5003;
    pub const SRT_EINVSOCK: c_int = 5004;
    pub const SRT_EUNBOUNDSOCK: c_int = 5005;
    pub const SRT_ENOLISTEN: c_int = 5006;
    pub const SRT_ERDVNOSERV: c_int = 5007;
    pub const SRT_ERDVUNBOUND: c_int = 5008;
    pub const SRT_EINVALMSGAPI: c_int = 5009;
    pub const SRT_EINVALBUFFERAPI: c_int = 5010;
    pub const SRT_EDUPLISTEN: c_int = 5011;
    pub const SRT_ELARGEMSG: c_int = 5012;
    pub const SRT_EINVPOLLID: c_int = 5013;
    pub const SRT_EPOLLEMPTY: c_int = 5014;
    pub const SRT_EBINDCONFLICT: c_int = 5015;

    pub const SRT_EASYNCFAIL: c_int = 6000;
    pub const SRT_EASYNCSND: c_int = 6001;
    pub const SRT_EASYNCRCV: c_int = 6002;
    pub const SRT_ETIMEOUT: c_int = 6003;
    pub const SRT_ECONGEST: c_int = 6004;

    pub const SRT_EPEERERR: c_int = 7000;
}

/// `SRT_EPOLL_OPT` event bits and `srt_epoll_set` flags
pub mod epoll {
    use std::os::raw::c_int;

    pub const SRT_EPOLL_OPT_NONE: c_int = 0x0;
    pub const SRT_EPOLL_IN: c_int = 0x1;
    pub const SRT_EPOLL_OUT: c_int = 0x4;
    pub const SRT_EPOLL_ERR: c_int = 0x8;
    pub const SRT_EPOLL_UPDATE: c_int = 0x10;
    /// Edge-triggered (bit 31)
    pub const SRT_EPOLL_ET: c_int = i32::MIN;

    pub const SRT_EPOLL_CLEAR_ALL: i32 = 0;
    pub const SRT_EPOLL_ENABLE_EMPTY: i32 = 1;
    pub const SRT_EPOLL_ENABLE_OUTPUTCHECK: i32 = 2;

    /// Passed to `srt_epoll_set` to read the flags without changing them
    pub const SRT_EPOLL_QUERY_FLAGS: i32 = -1;
}

/// Syslog-style levels used by `srt_setloglevel` and the log handler
pub mod loglevel {
    use std::os::raw::c_int;

    pub const LOG_CRIT: c_int = 2;
    pub const LOG_ERR: c_int = 3;
    pub const LOG_WARNING: c_int = 4;
    pub const LOG_NOTICE: c_int = 5;
    pub const LOG_DEBUG: c_int = 7;
}

/// Message TTL meaning "never drop"
pub const SRT_MSGTTL_INF: c_int = -1;

/// Sequence number not yet assigned
pub const SRT_SEQNO_NONE: i32 = -1;

/// Message number not yet assigned
pub const SRT_MSGNO_NONE: i32 = -1;
