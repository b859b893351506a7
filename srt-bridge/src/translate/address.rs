//! Socket addresses
//!
//! A managed `InetSocketAddress` usually carries the address the managed
//! runtime already resolved, and that address is used as is. Only unresolved
//! addresses fall back to the host string: literals are parsed directly,
//! names go through the system resolver and the candidate is chosen by
//! family.

use super::enums::AddressFamily;
use crate::error::TranslateError;
use socket2::SockAddr;
use srt_sys::SockAddrBuf;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

/// The parts of an `InetSocketAddress` the bridge reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSocketAddress {
    pub host: String,
    /// Raw address from `getAddress()`, `None` when unresolved
    pub ip: Option<IpAddr>,
    pub port: i32,
}

impl ManagedSocketAddress {
    /// An unresolved address; `host` is a literal or a name
    pub fn new(host: impl Into<String>, port: i32) -> Self {
        ManagedSocketAddress {
            host: host.into(),
            ip: None,
            port,
        }
    }

    /// An address the managed runtime already resolved
    pub fn resolved(host: impl Into<String>, ip: IpAddr, port: i32) -> Self {
        ManagedSocketAddress {
            host: host.into(),
            ip: Some(ip),
            port,
        }
    }
}

impl From<SocketAddr> for ManagedSocketAddress {
    fn from(addr: SocketAddr) -> Self {
        ManagedSocketAddress::resolved(
            addr.ip().to_string(),
            addr.ip(),
            i32::from(addr.port()),
        )
    }
}

/// Address from the raw bytes of `InetAddress.getAddress()`
pub fn ip_from_octets(raw: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(raw) {
        return Some(IpAddr::from(v4));
    }
    <[u8; 16]>::try_from(raw).ok().map(IpAddr::from)
}

/// Pick a resolver candidate
///
/// With a family, only candidates of that family qualify. Without one, the
/// first IPv4 candidate wins, then the first candidate of any family.
pub fn pick(
    candidates: impl IntoIterator<Item = SocketAddr>,
    family: Option<AddressFamily>,
) -> Option<SocketAddr> {
    let candidates: Vec<SocketAddr> = candidates.into_iter().collect();
    let of = |f: AddressFamily| {
        candidates
            .iter()
            .copied()
            .find(|c| AddressFamily::of(&c.ip()) == f)
    };
    match family {
        Some(f) => of(f),
        None => of(AddressFamily::Inet).or_else(|| candidates.first().copied()),
    }
}

/// Resolve a managed address, preferring IPv4 for names
pub fn resolve(addr: &ManagedSocketAddress) -> Result<SocketAddr, TranslateError> {
    resolve_as(addr, None)
}

/// Resolve a managed address; names only resolve to `family` when given
pub fn resolve_as(
    addr: &ManagedSocketAddress,
    family: Option<AddressFamily>,
) -> Result<SocketAddr, TranslateError> {
    let port = u16::try_from(addr.port).map_err(|_| TranslateError::InvalidPort(addr.port))?;
    if let Some(ip) = addr.ip {
        return Ok(SocketAddr::new(ip, port));
    }

    let host = addr.host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let unresolvable = || TranslateError::Unresolvable {
        host: addr.host.clone(),
        port,
    };
    let candidates = (host, port).to_socket_addrs().map_err(|e| {
        tracing::debug!("Resolving {} failed: {}", host, e);
        unresolvable()
    })?;
    pick(candidates, family).ok_or_else(unresolvable)
}

/// Managed address to native `sockaddr`
pub fn to_native(addr: &ManagedSocketAddress) -> Result<SockAddr, TranslateError> {
    resolve(addr).map(SockAddr::from)
}

pub fn to_native_as(
    addr: &ManagedSocketAddress,
    family: Option<AddressFamily>,
) -> Result<SockAddr, TranslateError> {
    resolve_as(addr, family).map(SockAddr::from)
}

/// Native `sockaddr` (as filled in by SRT) to a socket address
///
/// A zero length, as reported by a failed `srt_accept`, yields `None`.
pub fn from_native(buf: &SockAddrBuf) -> Option<SocketAddr> {
    buf.to_socket_addr()
}
