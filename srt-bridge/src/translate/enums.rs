//! Managed enumerations and their native values
//!
//! Managed enum constants are identified by name (`Enum.name()` on the JVM
//! side). Each table maps that name to the libsrt constant.

use crate::error::TranslateError;
use srt_sys::consts::{
    epoll::*, errno::*, kmstate::*, sockopt::*, sockstatus::*, transtype::*,
};
use srt_sys::consts::{AF_INET, AF_INET6};
use std::net::IpAddr;
use std::os::raw::c_int;

macro_rules! managed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($variant:ident = $managed:literal => $native:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Every declared constant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// What the constant names, used in translator errors
            pub const KIND: &'static str = $kind;

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($managed => Some($name::$variant),)*
                    _ => None,
                }
            }

            /// Like [`Self::from_name`], failing with a translator error
            pub fn parse(name: &str) -> Result<Self, TranslateError> {
                Self::from_name(name).ok_or_else(|| TranslateError::UnknownConstant {
                    kind: $kind,
                    name: name.to_string(),
                })
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $managed,)*
                }
            }

            pub fn from_native(value: c_int) -> Option<Self> {
                $(if value == $native {
                    return Some($name::$variant);
                })*
                None
            }

            pub fn as_native(self) -> c_int {
                match self {
                    $($name::$variant => $native,)*
                }
            }
        }
    };
}

managed_enum! {
    /// `java.net.StandardProtocolFamily`
    pub enum AddressFamily ("address family") {
        Inet = "INET" => AF_INET,
        Inet6 = "INET6" => AF_INET6,
    }
}

impl AddressFamily {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::Inet,
            IpAddr::V6(_) => AddressFamily::Inet6,
        }
    }
}

managed_enum! {
    /// `SRT_SOCKSTATUS`
    pub enum SockStatus ("socket status") {
        Init = "INIT" => SRTS_INIT,
        Opened = "OPENED" => SRTS_OPENED,
        Listening = "LISTENING" => SRTS_LISTENING,
        Connecting = "CONNECTING" => SRTS_CONNECTING,
        Connected = "CONNECTED" => SRTS_CONNECTED,
        Broken = "BROKEN" => SRTS_BROKEN,
        Closing = "CLOSING" => SRTS_CLOSING,
        Closed = "CLOSED" => SRTS_CLOSED,
        NonExist = "NONEXIST" => SRTS_NONEXIST,
    }
}

impl SockStatus {
    /// Total over every integer SRT can hand back
    ///
    /// Values outside `SRT_SOCKSTATUS` are reported as `NONEXIST`.
    pub fn from_native_lossy(value: c_int) -> Self {
        Self::from_native(value).unwrap_or_else(|| {
            tracing::warn!("Unexpected socket status {}", value);
            SockStatus::NonExist
        })
    }
}

managed_enum! {
    /// `SRT_SOCKOPT`
    pub enum SockOpt ("socket option") {
        Mss = "MSS" => SRTO_MSS,
        SndSyn = "SNDSYN" => SRTO_SNDSYN,
        RcvSyn = "RCVSYN" => SRTO_RCVSYN,
        Isn = "ISN" => SRTO_ISN,
        Fc = "FC" => SRTO_FC,
        SndBuf = "SNDBUF" => SRTO_SNDBUF,
        RcvBuf = "RCVBUF" => SRTO_RCVBUF,
        Linger = "LINGER" => SRTO_LINGER,
        UdpSndBuf = "UDP_SNDBUF" => SRTO_UDP_SNDBUF,
        UdpRcvBuf = "UDP_RCVBUF" => SRTO_UDP_RCVBUF,
        Rendezvous = "RENDEZVOUS" => SRTO_RENDEZVOUS,
        SndTimeo = "SNDTIMEO" => SRTO_SNDTIMEO,
        RcvTimeo = "RCVTIMEO" => SRTO_RCVTIMEO,
        ReuseAddr = "REUSEADDR" => SRTO_REUSEADDR,
        MaxBw = "MAXBW" => SRTO_MAXBW,
        State = "STATE" => SRTO_STATE,
        Event = "EVENT" => SRTO_EVENT,
        SndData = "SNDDATA" => SRTO_SNDDATA,
        RcvData = "RCVDATA" => SRTO_RCVDATA,
        Sender = "SENDER" => SRTO_SENDER,
        TsbpdMode = "TSBPDMODE" => SRTO_TSBPDMODE,
        Latency = "LATENCY" => SRTO_LATENCY,
        InputBw = "INPUTBW" => SRTO_INPUTBW,
        OheadBw = "OHEADBW" => SRTO_OHEADBW,
        Passphrase = "PASSPHRASE" => SRTO_PASSPHRASE,
        PbKeyLen = "PBKEYLEN" => SRTO_PBKEYLEN,
        KmState = "KMSTATE" => SRTO_KMSTATE,
        IpTtl = "IPTTL" => SRTO_IPTTL,
        IpTos = "IPTOS" => SRTO_IPTOS,
        TlPktDrop = "TLPKTDROP" => SRTO_TLPKTDROP,
        SndDropDelay = "SNDDROPDELAY" => SRTO_SNDDROPDELAY,
        NakReport = "NAKREPORT" => SRTO_NAKREPORT,
        Version = "VERSION" => SRTO_VERSION,
        PeerVersion = "PEERVERSION" => SRTO_PEERVERSION,
        ConnTimeo = "CONNTIMEO" => SRTO_CONNTIMEO,
        DriftTracer = "DRIFTTRACER" => SRTO_DRIFTTRACER,
        MinInputBw = "MININPUTBW" => SRTO_MININPUTBW,
        SndKmState = "SNDKMSTATE" => SRTO_SNDKMSTATE,
        RcvKmState = "RCVKMSTATE" => SRTO_RCVKMSTATE,
        LossMaxTtl = "LOSSMAXTTL" => SRTO_LOSSMAXTTL,
        RcvLatency = "RCVLATENCY" => SRTO_RCVLATENCY,
        PeerLatency = "PEERLATENCY" => SRTO_PEERLATENCY,
        MinVersion = "MINVERSION" => SRTO_MINVERSION,
        StreamId = "STREAMID" => SRTO_STREAMID,
        Congestion = "CONGESTION" => SRTO_CONGESTION,
        MessageApi = "MESSAGEAPI" => SRTO_MESSAGEAPI,
        PayloadSize = "PAYLOADSIZE" => SRTO_PAYLOADSIZE,
        TransType = "TRANSTYPE" => SRTO_TRANSTYPE,
        KmRefreshRate = "KMREFRESHRATE" => SRTO_KMREFRESHRATE,
        KmPreAnnounce = "KMPREANNOUNCE" => SRTO_KMPREANNOUNCE,
        EnforcedEncryption = "ENFORCEDENCRYPTION" => SRTO_ENFORCEDENCRYPTION,
        Ipv6Only = "IPV6ONLY" => SRTO_IPV6ONLY,
        PeerIdleTimeo = "PEERIDLETIMEO" => SRTO_PEERIDLETIMEO,
        BindToDevice = "BINDTODEVICE" => SRTO_BINDTODEVICE,
        GroupConnect = "GROUPCONNECT" => SRTO_GROUPCONNECT,
        GroupMinStableTimeo = "GROUPMINSTABLETIMEO" => SRTO_GROUPMINSTABLETIMEO,
        GroupType = "GROUPTYPE" => SRTO_GROUPTYPE,
        PacketFilter = "PACKETFILTER" => SRTO_PACKETFILTER,
        RetransmitAlgo = "RETRANSMITALGO" => SRTO_RETRANSMITALGO,
    }
}

managed_enum! {
    /// `SRT_ERRNO`
    pub enum ErrorKind ("error type") {
        Unknown = "EUNKNOWN" => SRT_EUNKNOWN,
        Success = "SUCCESS" => SRT_SUCCESS,
        ConnSetup = "ECONNSETUP" => SRT_ECONNSETUP,
        NoServer = "ENOSERVER" => SRT_ENOSERVER,
        ConnRej = "ECONNREJ" => SRT_ECONNREJ,
        SockFail = "ESOCKFAIL" => SRT_ESOCKFAIL,
        SecFail = "ESECFAIL" => SRT_ESECFAIL,
        SClosed = "ESCLOSED" => SRT_ESCLOSED,
        ConnFail = "ECONNFAIL" => SRT_ECONNFAIL,
        ConnLost = "ECONNLOST" => SRT_ECONNLOST,
        NoConn = "ENOCONN" => SRT_ENOCONN,
        Resource = "ERESOURCE" => SRT_ERESOURCE,
        Thread = "ETHREAD" => SRT_ETHREAD,
        NoBuf = "ENOBUF" => SRT_ENOBUF,
        SysObj = "ESYSOBJ" => SRT_ESYSOBJ,
        File = "EFILE" => SRT_EFILE,
        InvRdOff = "EINVRDOFF" => SRT_EINVRDOFF,
        RdPerm = "ERDPERM" => SRT_ERDPERM,
        InvWrOff = "EINVWROFF" => SRT_EINVWROFF,
        WrPerm = "EWRPERM" => SRT_EWRPERM,
        InvOp = "EINVOP" => SRT_EINVOP,
        BoundSock = "EBOUNDSOCK" => SRT_EBOUNDSOCK,
        ConnSock = "ECONNSOCK" => SRT_ECONNSOCK,
        InvParam = "EINVPARAM" => SRT_EINVPARAM,
        InvSock = "EINVSOCK" => SRT_EINVSOCK,
        UnboundSock = "EUNBOUNDSOCK" => SRT_EUNBOUNDSOCK,
        NoListen = "ENOLISTEN" => SRT_ENOLISTEN,
        RdvNoServ = "ERDVNOSERV" => SRT_ERDVNOSERV,
        RdvUnbound = "ERDVUNBOUND" => SRT_ERDVUNBOUND,
        InvalMsgApi = "EINVALMSGAPI" => SRT_EINVALMSGAPI,
        InvalBufferApi = "EINVALBUFFERAPI" => SRT_EINVALBUFFERAPI,
        DupListen = "EDUPLISTEN" => SRT_EDUPLISTEN,
        LargeMsg = "ELARGEMSG" => SRT_ELARGEMSG,
        InvPollId = "EINVPOLLID" => SRT_EINVPOLLID,
        PollEmpty = "EPOLLEMPTY" => SRT_EPOLLEMPTY,
        BindConflict = "EBINDCONFLICT" => SRT_EBINDCONFLICT,
        AsyncFail = "EASYNCFAIL" => SRT_EASYNCFAIL,
        AsyncSnd = "EASYNCSND" => SRT_EASYNCSND,
        AsyncRcv = "EASYNCRCV" => SRT_EASYNCRCV,
        Timeout = "ETIMEOUT" => SRT_ETIMEOUT,
        Congest = "ECONGEST" => SRT_ECONGEST,
        PeerErr = "EPEERERR" => SRT_EPEERERR,
    }
}

impl ErrorKind {
    /// Codes libsrt may add later surface as `EUNKNOWN`
    pub fn from_native_lossy(value: c_int) -> Self {
        Self::from_native(value).unwrap_or(ErrorKind::Unknown)
    }

    pub fn is_success(self) -> bool {
        self == ErrorKind::Success
    }
}

managed_enum! {
    /// `SRT_TRANSTYPE`
    pub enum Transtype ("transtype") {
        Live = "LIVE" => SRTT_LIVE,
        File = "FILE" => SRTT_FILE,
        Invalid = "INVALID" => SRTT_INVALID,
    }
}

managed_enum! {
    /// `SRT_KM_STATE`
    pub enum KmState ("key material state") {
        Unsecured = "KM_S_UNSECURED" => SRT_KM_S_UNSECURED,
        Securing = "KM_S_SECURING" => SRT_KM_S_SECURING,
        Secured = "KM_S_SECURED" => SRT_KM_S_SECURED,
        NoSecret = "KM_S_NOSECRET" => SRT_KM_S_NOSECRET,
        BadSecret = "KM_S_BADSECRET" => SRT_KM_S_BADSECRET,
    }
}

managed_enum! {
    /// `SRT_EPOLL_OPT` event bits
    pub enum EpollOpt ("epoll option") {
        In = "IN" => SRT_EPOLL_IN,
        Out = "OUT" => SRT_EPOLL_OUT,
        Err = "ERR" => SRT_EPOLL_ERR,
        Update = "UPDATE" => SRT_EPOLL_UPDATE,
        Et = "ET" => SRT_EPOLL_ET,
    }
}

managed_enum! {
    /// `srt_epoll_set` flags
    pub enum EpollFlag ("epoll flag") {
        ClearAll = "CLEAR_ALL" => SRT_EPOLL_CLEAR_ALL,
        EnableEmpty = "ENABLE_EMPTY" => SRT_EPOLL_ENABLE_EMPTY,
        EnableOutputCheck = "ENABLE_OUTPUTCHECK" => SRT_EPOLL_ENABLE_OUTPUTCHECK,
    }
}

/// Simple name of the managed enum class carrying [`Transtype`] constants
pub const TRANSTYPE_TYPE: &str = "Transtype";

/// Simple name of the managed enum class carrying [`KmState`] constants
pub const KMSTATE_TYPE: &str = "KMState";
