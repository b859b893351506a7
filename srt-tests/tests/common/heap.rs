//! In-memory stand-in for the managed heap
//!
//! `FakeHeap` implements `Heap` over an arena of plain values. It records
//! every operation in order, tracks how many arrays are pinned, and can be
//! told to fail (leaving an exception pending) or panic on a named
//! operation.

use jni::errors::Error as JniError;
use srt_bridge::{ManagedSocketAddress, ManagedValue, MsgCtrl};
use srt_jni::error::Result;
use srt_jni::{GlueError, Heap, ManagedEnum};
use srt_sys::{SrtSocket, SrtTraceBStats};
use std::net::SocketAddr;
use std::os::raw::c_int;

/// Index into the arena; 0 is null
pub type ObjRef = usize;

pub const NULL: ObjRef = 0;

#[derive(Debug, Clone, PartialEq)]
pub enum Obj {
    Socket(SrtSocket),
    Epoll(c_int),
    Str(String),
    Constant { kind: ManagedEnum, name: String },
    /// An `InetSocketAddress` passed in by managed code
    Address(ManagedSocketAddress),
    /// An `InetSocketAddress` built by a native method
    NewAddress(SocketAddr),
    Value(ManagedValue),
    Ctrl(MsgCtrl),
    Pair(ObjRef, ObjRef),
    Bytes(Vec<u8>),
    List(Vec<ObjRef>),
    Event { socket: ObjRef, events: ObjRef },
    Stats(SrtTraceBStats),
}

#[derive(Debug, Default)]
pub struct FakeHeap {
    objects: Vec<Obj>,
    /// Operations in call order
    pub log: Vec<&'static str>,
    pub pinned: usize,
    /// Pinned arrays at each msgctrl writeback
    pub pinned_at_writeback: Vec<usize>,
    pub pending_exception: bool,
    throw_on: Option<&'static str>,
    panic_on: Option<&'static str>,
}

impl FakeHeap {
    pub fn new() -> Self {
        FakeHeap::default()
    }

    pub fn alloc(&mut self, obj: Obj) -> ObjRef {
        self.objects.push(obj);
        self.objects.len()
    }

    pub fn get(&self, r: ObjRef) -> Option<&Obj> {
        r.checked_sub(1).and_then(|i| self.objects.get(i))
    }

    pub fn constant(&mut self, kind: ManagedEnum, name: &str) -> ObjRef {
        self.alloc(Obj::Constant {
            kind,
            name: name.to_string(),
        })
    }

    pub fn list_of(&mut self, items: Vec<ObjRef>) -> ObjRef {
        self.alloc(Obj::List(items))
    }

    /// Names of the constants in list `r`
    pub fn constant_names(&self, r: ObjRef) -> Vec<String> {
        let Some(Obj::List(items)) = self.get(r) else {
            panic!("{} is not a list", r);
        };
        items
            .iter()
            .map(|item| match self.get(*item) {
                Some(Obj::Constant { name, .. }) => name.clone(),
                other => panic!("not a constant: {:?}", other),
            })
            .collect()
    }

    /// The named operation fails as a thrown managed exception would
    pub fn throw_on(&mut self, op: &'static str) {
        self.throw_on = Some(op);
    }

    /// The named operation panics with an exception pending
    pub fn panic_on(&mut self, op: &'static str) {
        self.panic_on = Some(op);
    }

    fn enter(&mut self, op: &'static str) -> Result<()> {
        self.log.push(op);
        if self.panic_on == Some(op) {
            self.pending_exception = true;
            panic!("{} blew up", op);
        }
        if self.throw_on == Some(op) {
            self.pending_exception = true;
            return Err(GlueError::Jni(JniError::JavaException));
        }
        Ok(())
    }

    fn obj(&self, r: ObjRef, what: &'static str) -> Result<&Obj> {
        self.get(r).ok_or(GlueError::Null(what))
    }

    fn set(&mut self, r: ObjRef, obj: Obj) -> Result<()> {
        let slot = r
            .checked_sub(1)
            .and_then(|i| self.objects.get_mut(i))
            .ok_or(GlueError::Null("object"))?;
        *slot = obj;
        Ok(())
    }
}

fn wrong(what: &'static str) -> GlueError {
    GlueError::UnsupportedValue(what.to_string())
}

impl Heap for FakeHeap {
    type Ref = ObjRef;

    fn null(&self) -> ObjRef {
        NULL
    }

    fn is_null(&self, obj: &ObjRef) -> bool {
        *obj == NULL
    }

    fn clear_exception(&mut self) -> bool {
        std::mem::take(&mut self.pending_exception)
    }

    fn socket_handle(&mut self, socket: &ObjRef) -> Result<SrtSocket> {
        self.enter("socket_handle")?;
        match self.obj(*socket, "socket")? {
            Obj::Socket(u) => Ok(*u),
            _ => Err(wrong("socket")),
        }
    }

    fn new_socket(&mut self, handle: SrtSocket) -> Result<ObjRef> {
        self.enter("new_socket")?;
        Ok(self.alloc(Obj::Socket(handle)))
    }

    fn epoll_id(&mut self, epoll: &ObjRef) -> Result<c_int> {
        self.enter("epoll_id")?;
        match self.obj(*epoll, "epoll")? {
            Obj::Epoll(eid) => Ok(*eid),
            _ => Err(wrong("epoll")),
        }
    }

    fn set_epoll_id(&mut self, epoll: &ObjRef, eid: c_int) -> Result<()> {
        self.enter("set_epoll_id")?;
        self.set(*epoll, Obj::Epoll(eid))
    }

    fn string(&mut self, value: &ObjRef) -> Result<String> {
        self.enter("string")?;
        match self.obj(*value, "string")? {
            Obj::Str(s) => Ok(s.clone()),
            _ => Err(wrong("string")),
        }
    }

    fn new_string(&mut self, value: &str) -> Result<ObjRef> {
        self.enter("new_string")?;
        Ok(self.alloc(Obj::Str(value.to_string())))
    }

    fn enum_name(&mut self, value: &ObjRef) -> Result<String> {
        self.enter("enum_name")?;
        match self.obj(*value, "enum")? {
            Obj::Constant { name, .. } => Ok(name.clone()),
            _ => Err(wrong("enum")),
        }
    }

    fn enum_constant(&mut self, kind: ManagedEnum, name: &str) -> Result<ObjRef> {
        self.enter("enum_constant")?;
        Ok(self.constant(kind, name))
    }

    fn socket_address(&mut self, addr: &ObjRef) -> Result<ManagedSocketAddress> {
        self.enter("socket_address")?;
        match self.obj(*addr, "socket address")? {
            Obj::Address(addr) => Ok(addr.clone()),
            _ => Err(wrong("socket address")),
        }
    }

    fn new_socket_address(&mut self, addr: SocketAddr) -> Result<ObjRef> {
        self.enter("new_socket_address")?;
        Ok(self.alloc(Obj::NewAddress(addr)))
    }

    fn managed_value(&mut self, value: &ObjRef) -> Result<ManagedValue> {
        self.enter("managed_value")?;
        if *value == NULL {
            return Ok(ManagedValue::Null);
        }
        match self.obj(*value, "value")? {
            Obj::Value(v) => Ok(v.clone()),
            _ => Err(wrong("value")),
        }
    }

    fn new_managed_value(&mut self, value: &ManagedValue) -> Result<ObjRef> {
        self.enter("new_managed_value")?;
        Ok(self.alloc(Obj::Value(value.clone())))
    }

    fn msgctrl(&mut self, ctrl: &ObjRef) -> Result<Option<MsgCtrl>> {
        self.enter("msgctrl")?;
        if *ctrl == NULL {
            return Ok(None);
        }
        match self.obj(*ctrl, "msgctrl")? {
            Obj::Ctrl(c) => Ok(Some(*c)),
            _ => Err(wrong("msgctrl")),
        }
    }

    fn write_msgctrl(&mut self, obj: &ObjRef, ctrl: &MsgCtrl) -> Result<()> {
        self.enter("write_msgctrl")?;
        self.pinned_at_writeback.push(self.pinned);
        self.set(*obj, Obj::Ctrl(*ctrl))
    }

    fn new_pair(&mut self, first: &ObjRef, second: &ObjRef) -> Result<ObjRef> {
        self.enter("new_pair")?;
        Ok(self.alloc(Obj::Pair(*first, *second)))
    }

    fn with_pinned<T>(&mut self, array: &ObjRef, f: impl FnOnce(&[u8]) -> T) -> Result<T> {
        self.enter("pin")?;
        let bytes = match self.obj(*array, "byte array")? {
            Obj::Bytes(bytes) => bytes.clone(),
            _ => return Err(wrong("byte array")),
        };
        self.pinned += 1;
        let result = f(&bytes);
        self.pinned -= 1;
        self.log.push("unpin");
        Ok(result)
    }

    fn new_byte_array(&mut self, bytes: &[u8]) -> Result<ObjRef> {
        self.enter("new_byte_array")?;
        Ok(self.alloc(Obj::Bytes(bytes.to_vec())))
    }

    fn list(&mut self, list: &ObjRef) -> Result<Vec<ObjRef>> {
        self.enter("list")?;
        match self.obj(*list, "list")? {
            Obj::List(items) => Ok(items.clone()),
            _ => Err(wrong("list")),
        }
    }

    fn new_list(&mut self, items: &[ObjRef]) -> Result<ObjRef> {
        self.enter("new_list")?;
        Ok(self.alloc(Obj::List(items.to_vec())))
    }

    fn set_epoll_event(&mut self, event: &ObjRef, socket: &ObjRef, events: &ObjRef) -> Result<()> {
        self.enter("set_epoll_event")?;
        self.set(
            *event,
            Obj::Event {
                socket: *socket,
                events: *events,
            },
        )
    }

    fn new_stats(&mut self, stats: &SrtTraceBStats) -> Result<ObjRef> {
        self.enter("new_stats")?;
        Ok(self.alloc(Obj::Stats(*stats)))
    }
}
