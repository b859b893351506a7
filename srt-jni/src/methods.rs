//! Native method bodies
//!
//! One function per managed method, generic over the [`Heap`] it reads
//! arguments from and builds results on. Each reads its managed arguments,
//! hands them to the [`Bridge`] and builds the managed result. [`guard`]
//! turns a failure or a panic into the method's fallback.

use crate::error::Result;
use crate::heap::{Heap, ManagedEnum};
use srt_bridge::{Bridge, EpollFlag};
use srt_sys::SrtSocket;
use std::os::raw::c_int;
use std::panic::{self, AssertUnwindSafe};

/// Run `f`, yielding `fallback` if it fails or panics
///
/// The bridge never raises into the JVM, so a managed exception left pending
/// by a failed JNI call is cleared on both paths.
pub fn guard<H: Heap, T>(
    heap: &mut H,
    method: &'static str,
    fallback: T,
    f: impl FnOnce(&mut H) -> Result<T>,
) -> T {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *heap)));
    let failure = match outcome {
        Ok(Ok(value)) => return value,
        Ok(Err(e)) => e.to_string(),
        Err(_) => "panicked".to_string(),
    };
    tracing::error!("{}: {}", method, failure);
    if heap.clear_exception() {
        tracing::debug!("{}: cleared pending exception", method);
    }
    fallback
}

// Creating and configuring sockets

pub fn socket<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    family: &H::Ref,
    ty: c_int,
    protocol: c_int,
) -> Result<c_int> {
    let family = heap.enum_name(family)?;
    Ok(bridge.socket(&family, ty, protocol))
}

pub fn bind<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref, addr: &H::Ref) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    let addr = heap.socket_address(addr)?;
    Ok(bridge.bind(u, &addr))
}

pub fn sock_state<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    let status = bridge.get_sock_state(u);
    heap.enum_constant(ManagedEnum::SockStatus, status.name())
}

pub fn close<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    Ok(bridge.close(u))
}

// Connecting

pub fn listen<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    backlog: c_int,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    Ok(bridge.listen(u, backlog))
}

/// `Pair(Socket, InetSocketAddress?)`
pub fn accept<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    let accepted = bridge.accept(u);

    let socket = heap.new_socket(accepted.handle)?;
    let peer = match accepted.peer {
        Some(peer) => heap.new_socket_address(peer)?,
        None => heap.null(),
    };
    heap.new_pair(&socket, &peer)
}

pub fn connect<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    addr: &H::Ref,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    let addr = heap.socket_address(addr)?;
    Ok(bridge.connect(u, &addr))
}

pub fn rendezvous<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    local: &H::Ref,
    remote: &H::Ref,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    let local = heap.socket_address(local)?;
    let remote = heap.socket_address(remote)?;
    Ok(bridge.rendezvous(u, &local, &remote))
}

pub fn sock_name<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    match bridge.get_sock_name(u) {
        Some(addr) => heap.new_socket_address(addr),
        None => Ok(heap.null()),
    }
}

pub fn peer_name<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    match bridge.get_peer_name(u) {
        Some(addr) => heap.new_socket_address(addr),
        None => Ok(heap.null()),
    }
}

// Options and properties

pub fn set_sock_opt<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    level: c_int,
    opt: &H::Ref,
    value: &H::Ref,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    let opt = heap.enum_name(opt)?;
    let value = heap.managed_value(value)?;
    Ok(bridge.set_sockopt(u, level, &opt, value))
}

pub fn get_sock_opt<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    level: c_int,
    opt: &H::Ref,
) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    let opt = heap.enum_name(opt)?;
    match bridge.get_sockopt(u, level, &opt) {
        Some(value) => heap.new_managed_value(&value),
        None => Ok(heap.null()),
    }
}

pub fn reject_reason<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    Ok(bridge.get_reject_reason(u))
}

pub fn set_reject_reason<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    reason: c_int,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    Ok(bridge.set_reject_reason(u, reason))
}

pub fn connection_time<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<i64> {
    let u = heap.socket_handle(this)?;
    Ok(bridge.connection_time(u))
}

/// Null when SRT fails
pub fn bstats<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    clear: bool,
) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    match bridge.bstats(u, clear) {
        Some(stats) => heap.new_stats(&stats),
        None => Ok(heap.null()),
    }
}

pub fn bistats<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    clear: bool,
    instantaneous: bool,
) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    match bridge.bistats(u, clear, instantaneous) {
        Some(stats) => heap.new_stats(&stats),
        None => Ok(heap.null()),
    }
}

// Transmission

pub fn send<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref, buf: &H::Ref) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    heap.with_pinned(buf, |bytes| bridge.send(u, bytes))
}

pub fn send_msg<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    buf: &H::Ref,
    ttl: c_int,
    in_order: bool,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    heap.with_pinned(buf, |bytes| bridge.send_msg(u, bytes, ttl, in_order))
}

/// The control object is written back once the payload is unpinned
pub fn send_msg2<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    buf: &H::Ref,
    ctrl: &H::Ref,
) -> Result<c_int> {
    let u = heap.socket_handle(this)?;
    let mut msg = heap.msgctrl(ctrl)?;
    let res = heap.with_pinned(buf, |bytes| bridge.send_msg2(u, bytes, msg.as_mut()))?;

    if let Some(msg) = &msg {
        heap.write_msgctrl(ctrl, msg)?;
    }
    Ok(res)
}

pub fn recv<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref, len: c_int) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    match bridge.recv(u, len) {
        Some(data) => heap.new_byte_array(&data),
        None => Ok(heap.null()),
    }
}

pub fn recv_msg2<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    len: c_int,
    ctrl: &H::Ref,
) -> Result<H::Ref> {
    let u = heap.socket_handle(this)?;
    let mut msg = heap.msgctrl(ctrl)?;
    let data = bridge.recv_msg2(u, len, msg.as_mut());

    if let Some(msg) = &msg {
        heap.write_msgctrl(ctrl, msg)?;
    }
    match data {
        Some(data) => heap.new_byte_array(&data),
        None => Ok(heap.null()),
    }
}

pub fn send_file<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    path: &H::Ref,
    offset: i64,
    size: i64,
    block: c_int,
) -> Result<i64> {
    let u = heap.socket_handle(this)?;
    let path = heap.string(path)?;
    Ok(bridge.send_file(u, &path, offset, size, block))
}

pub fn recv_file<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    path: &H::Ref,
    offset: i64,
    size: i64,
    block: c_int,
) -> Result<i64> {
    let u = heap.socket_handle(this)?;
    let path = heap.string(path)?;
    Ok(bridge.recv_file(u, &path, offset, size, block))
}

// Errors

pub fn last_error_str<H: Heap>(heap: &mut H, bridge: &Bridge) -> Result<H::Ref> {
    let message = bridge.get_last_error_str();
    heap.new_string(&message)
}

pub fn last_error<H: Heap>(heap: &mut H, bridge: &Bridge) -> Result<H::Ref> {
    let kind = bridge.get_last_error();
    heap.enum_constant(ManagedEnum::ErrorType, kind.name())
}

/// Description of the error kind `this`
pub fn str_error<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let kind = heap.enum_name(this)?;
    let message = bridge.str_error(&kind)?;
    heap.new_string(&message)
}

// Epoll

fn enum_names<H: Heap>(heap: &mut H, list: &H::Ref) -> Result<Vec<String>> {
    let items = heap.list(list)?;
    items.iter().map(|item| heap.enum_name(item)).collect()
}

fn socket_handles<H: Heap>(heap: &mut H, list: &H::Ref) -> Result<Vec<SrtSocket>> {
    let items = heap.list(list)?;
    items.iter().map(|item| heap.socket_handle(item)).collect()
}

fn constants<H: Heap>(heap: &mut H, kind: ManagedEnum, names: &[&str]) -> Result<H::Ref> {
    let items = names
        .iter()
        .map(|name| heap.enum_constant(kind, name))
        .collect::<Result<Vec<_>>>()?;
    heap.new_list(&items)
}

fn flag_list<H: Heap>(heap: &mut H, flags: Option<Vec<EpollFlag>>) -> Result<H::Ref> {
    match flags {
        Some(flags) => {
            let names: Vec<&str> = flags.into_iter().map(EpollFlag::name).collect();
            constants(heap, ManagedEnum::EpollFlag, &names)
        }
        None => Ok(heap.null()),
    }
}

pub fn epoll_create<H: Heap>(_heap: &mut H, bridge: &Bridge) -> Result<c_int> {
    Ok(bridge.epoll_create())
}

/// Whether the wrapper holds a poll id; SRT is not consulted
pub fn epoll_is_valid<H: Heap>(heap: &mut H, this: &H::Ref) -> Result<bool> {
    Ok(heap.epoll_id(this)? >= 0)
}

pub fn epoll_add_usock<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    socket: &H::Ref,
    events: &H::Ref,
) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let u = heap.socket_handle(socket)?;
    let events = enum_names(heap, events)?;
    Ok(bridge.epoll_add_usock(eid, u, &events))
}

pub fn epoll_update_usock<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    socket: &H::Ref,
    events: &H::Ref,
) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let u = heap.socket_handle(socket)?;
    let events = enum_names(heap, events)?;
    Ok(bridge.epoll_update_usock(eid, u, &events))
}

pub fn epoll_remove_usock<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    socket: &H::Ref,
) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let u = heap.socket_handle(socket)?;
    Ok(bridge.epoll_remove_usock(eid, u))
}

/// Ready count only; the managed lists are left as passed
pub fn epoll_wait<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    read: &H::Ref,
    write: &H::Ref,
    timeout_ms: i64,
) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let read = socket_handles(heap, read)?;
    let write = socket_handles(heap, write)?;
    Ok(bridge.epoll_wait(eid, &read, &write, timeout_ms))
}

/// The list's size bounds the ready sockets; they are written into its
/// leading entries
pub fn epoll_uwait<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    fds: &H::Ref,
    timeout_ms: i64,
) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let slots = heap.list(fds)?;
    let (res, ready) = bridge.epoll_uwait(eid, slots.len(), timeout_ms);

    for (slot, event) in slots.iter().zip(&ready) {
        let socket = heap.new_socket(event.socket)?;
        let names: Vec<&str> = event.events.iter().map(|opt| opt.name()).collect();
        let events = constants(heap, ManagedEnum::EpollOpt, &names)?;
        heap.set_epoll_event(slot, &socket, &events)?;
    }
    Ok(res)
}

/// Previous flags, null when SRT fails
pub fn epoll_set_flags<H: Heap>(
    heap: &mut H,
    bridge: &Bridge,
    this: &H::Ref,
    flags: &H::Ref,
) -> Result<H::Ref> {
    let eid = heap.epoll_id(this)?;
    let flags = enum_names(heap, flags)?;
    let previous = bridge.epoll_set_flags(eid, &flags);
    flag_list(heap, previous)
}

pub fn epoll_get_flags<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<H::Ref> {
    let eid = heap.epoll_id(this)?;
    let flags = bridge.epoll_get_flags(eid);
    flag_list(heap, flags)
}

/// A released wrapper no longer reports itself valid
pub fn epoll_release<H: Heap>(heap: &mut H, bridge: &Bridge, this: &H::Ref) -> Result<c_int> {
    let eid = heap.epoll_id(this)?;
    let res = bridge.epoll_release(eid);
    if res == 0 {
        heap.set_epoll_id(this, -1)?;
    }
    Ok(res)
}
