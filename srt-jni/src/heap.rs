//! The managed heap, as the native methods see it
//!
//! [`Heap`] is every JVM object operation a native method performs: reading
//! fields, building results, pinning arrays. [`JniHeap`] implements it over a
//! [`JNIEnv`]; the native methods in [`methods`](crate::methods) only ever go
//! through the trait. None of these operations touch SRT.

use crate::config::ClassNames;
use crate::error::{GlueError, Result};
use jni::objects::{JByteArray, JObject, JString, JValue, ReleaseMode};
use jni::sys::jint;
use jni::JNIEnv;
use srt_bridge::translate::address::ip_from_octets;
use srt_bridge::{ManagedSocketAddress, ManagedValue, MsgCtrl};
use srt_sys::{SrtSocket, SrtTraceBStats, StatValue};
use std::net::{IpAddr, SocketAddr};
use std::os::raw::c_int;

/// Managed enum classes whose constants native methods return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedEnum {
    SockStatus,
    ErrorType,
    EpollOpt,
    EpollFlag,
}

impl ManagedEnum {
    pub fn class(self, classes: &ClassNames) -> &str {
        match self {
            ManagedEnum::SockStatus => &classes.sock_status,
            ManagedEnum::ErrorType => &classes.error_type,
            ManagedEnum::EpollOpt => &classes.epoll_opt,
            ManagedEnum::EpollFlag => &classes.epoll_flag,
        }
    }
}

/// Object operations available to a native method
///
/// `Ref` is a reference to a managed object, possibly null. Accessors that
/// need a non-null object fail with [`GlueError::Null`].
pub trait Heap {
    type Ref;

    fn null(&self) -> Self::Ref;

    fn is_null(&self, obj: &Self::Ref) -> bool;

    /// Drop a pending managed exception; true if one was pending
    fn clear_exception(&mut self) -> bool;

    /// Handle held by a managed socket wrapper
    fn socket_handle(&mut self, socket: &Self::Ref) -> Result<SrtSocket>;

    /// New managed socket wrapper around `handle`
    fn new_socket(&mut self, handle: SrtSocket) -> Result<Self::Ref>;

    /// Poll id held by a managed epoll wrapper
    fn epoll_id(&mut self, epoll: &Self::Ref) -> Result<c_int>;

    fn set_epoll_id(&mut self, epoll: &Self::Ref, eid: c_int) -> Result<()>;

    fn string(&mut self, value: &Self::Ref) -> Result<String>;

    fn new_string(&mut self, value: &str) -> Result<Self::Ref>;

    /// Constant name of a managed enum value
    fn enum_name(&mut self, value: &Self::Ref) -> Result<String>;

    fn enum_constant(&mut self, kind: ManagedEnum, name: &str) -> Result<Self::Ref>;

    fn socket_address(&mut self, addr: &Self::Ref) -> Result<ManagedSocketAddress>;

    fn new_socket_address(&mut self, addr: SocketAddr) -> Result<Self::Ref>;

    /// An option value with its runtime type made explicit
    fn managed_value(&mut self, value: &Self::Ref) -> Result<ManagedValue>;

    fn new_managed_value(&mut self, value: &ManagedValue) -> Result<Self::Ref>;

    /// `None` for a null message control object
    fn msgctrl(&mut self, ctrl: &Self::Ref) -> Result<Option<MsgCtrl>>;

    fn write_msgctrl(&mut self, obj: &Self::Ref, ctrl: &MsgCtrl) -> Result<()>;

    fn new_pair(&mut self, first: &Self::Ref, second: &Self::Ref) -> Result<Self::Ref>;

    /// Run `f` over the contents of a managed byte array
    ///
    /// The elements stay pinned only while `f` runs.
    fn with_pinned<T>(&mut self, array: &Self::Ref, f: impl FnOnce(&[u8]) -> T) -> Result<T>;

    fn new_byte_array(&mut self, bytes: &[u8]) -> Result<Self::Ref>;

    /// Elements of a `java.util.List`
    fn list(&mut self, list: &Self::Ref) -> Result<Vec<Self::Ref>>;

    fn new_list(&mut self, items: &[Self::Ref]) -> Result<Self::Ref>;

    /// Fill in an `EpollEvent` record
    fn set_epoll_event(
        &mut self,
        event: &Self::Ref,
        socket: &Self::Ref,
        events: &Self::Ref,
    ) -> Result<()>;

    fn new_stats(&mut self, stats: &SrtTraceBStats) -> Result<Self::Ref>;
}

const STRING_SIG: &str = "()Ljava/lang/String;";
const CLASS_SIG: &str = "()Ljava/lang/Class;";
const LIST_SIG: &str = "Ljava/util/List;";

/// Constructor descriptor for a stats record, one argument per counter
pub fn stats_descriptor(values: &[(&str, StatValue)]) -> String {
    let mut sig = String::with_capacity(values.len() + 3);
    sig.push('(');
    for (_, value) in values {
        sig.push(match value {
            StatValue::Int(_) => 'I',
            StatValue::Long(_) => 'J',
            StatValue::Double(_) => 'D',
        });
    }
    sig.push_str(")V");
    sig
}

/// [`Heap`] over a live JNI environment
pub struct JniHeap<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    classes: &'a ClassNames,
}

impl<'a, 'local> JniHeap<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, classes: &'a ClassNames) -> Self {
        JniHeap { env, classes }
    }

    fn java_string(&mut self, value: &JObject) -> Result<String> {
        if value.is_null() {
            return Err(GlueError::Null("string"));
        }
        let value = <&JString>::from(value);
        Ok(self.env.get_string(value)?.into())
    }

    fn call_string(&mut self, obj: &JObject, method: &'static str) -> Result<String> {
        let value = self.env.call_method(obj, method, STRING_SIG, &[])?.l()?;
        if value.is_null() {
            return Err(GlueError::Null(method));
        }
        self.java_string(&value)
    }

    fn static_constant(&mut self, class: &str, name: &str) -> Result<JObject<'local>> {
        let sig = format!("L{};", class);
        Ok(self.env.get_static_field(class, name, sig)?.l()?)
    }

    fn boxed(&mut self, class: &str, sig: &str, value: JValue) -> Result<JObject<'local>> {
        Ok(self
            .env
            .call_static_method(class, "valueOf", sig, &[value])?
            .l()?)
    }
}

impl<'a, 'local> Heap for JniHeap<'a, 'local> {
    type Ref = JObject<'local>;

    fn null(&self) -> JObject<'local> {
        JObject::null()
    }

    fn is_null(&self, obj: &JObject<'local>) -> bool {
        obj.is_null()
    }

    fn clear_exception(&mut self) -> bool {
        if !self.env.exception_check().unwrap_or(false) {
            return false;
        }
        let _ = self.env.exception_clear();
        true
    }

    fn socket_handle(&mut self, socket: &JObject<'local>) -> Result<SrtSocket> {
        if socket.is_null() {
            return Err(GlueError::Null("socket"));
        }
        Ok(self.env.get_field(socket, "srtsocket", "I")?.i()?)
    }

    fn new_socket(&mut self, handle: SrtSocket) -> Result<JObject<'local>> {
        Ok(self
            .env
            .new_object(self.classes.socket.as_str(), "(I)V", &[JValue::Int(handle)])?)
    }

    fn epoll_id(&mut self, epoll: &JObject<'local>) -> Result<c_int> {
        if epoll.is_null() {
            return Err(GlueError::Null("epoll"));
        }
        Ok(self.env.get_field(epoll, "eid", "I")?.i()?)
    }

    fn set_epoll_id(&mut self, epoll: &JObject<'local>, eid: c_int) -> Result<()> {
        Ok(self.env.set_field(epoll, "eid", "I", JValue::Int(eid))?)
    }

    fn string(&mut self, value: &JObject<'local>) -> Result<String> {
        self.java_string(value)
    }

    fn new_string(&mut self, value: &str) -> Result<JObject<'local>> {
        Ok(JObject::from(self.env.new_string(value)?))
    }

    fn enum_name(&mut self, value: &JObject<'local>) -> Result<String> {
        if value.is_null() {
            return Err(GlueError::Null("enum"));
        }
        self.call_string(value, "name")
    }

    fn enum_constant(&mut self, kind: ManagedEnum, name: &str) -> Result<JObject<'local>> {
        let classes = self.classes;
        self.static_constant(kind.class(classes), name)
    }

    fn socket_address(&mut self, addr: &JObject<'local>) -> Result<ManagedSocketAddress> {
        if addr.is_null() {
            return Err(GlueError::Null("socket address"));
        }
        let host = self.call_string(addr, "getHostString")?;
        let port = self.env.call_method(addr, "getPort", "()I", &[])?.i()?;

        let inet = self
            .env
            .call_method(addr, "getAddress", "()Ljava/net/InetAddress;", &[])?
            .l()?;
        if inet.is_null() {
            return Ok(ManagedSocketAddress::new(host, port));
        }
        let raw = JByteArray::from(self.env.call_method(&inet, "getAddress", "()[B", &[])?.l()?);
        let raw = self.env.convert_byte_array(&raw)?;
        Ok(match ip_from_octets(&raw) {
            Some(ip) => ManagedSocketAddress::resolved(host, ip, port),
            None => ManagedSocketAddress::new(host, port),
        })
    }

    /// Numeric host, so the JVM resolves nothing
    fn new_socket_address(&mut self, addr: SocketAddr) -> Result<JObject<'local>> {
        let octets = match addr.ip() {
            IpAddr::V4(ip) => ip.octets().to_vec(),
            IpAddr::V6(ip) => ip.octets().to_vec(),
        };
        let raw = self.env.byte_array_from_slice(&octets)?;
        let inet = self
            .env
            .call_static_method(
                "java/net/InetAddress",
                "getByAddress",
                "([B)Ljava/net/InetAddress;",
                &[JValue::Object(&*raw)],
            )?
            .l()?;

        Ok(self.env.new_object(
            self.classes.inet_socket_address.as_str(),
            "(Ljava/net/InetAddress;I)V",
            &[JValue::Object(&inet), JValue::Int(jint::from(addr.port()))],
        )?)
    }

    fn managed_value(&mut self, value: &JObject<'local>) -> Result<ManagedValue> {
        if value.is_null() {
            return Ok(ManagedValue::Null);
        }

        let env = &mut *self.env;
        if env.is_instance_of(value, "java/lang/Boolean")? {
            let v = env.call_method(value, "booleanValue", "()Z", &[])?.z()?;
            return Ok(ManagedValue::Bool(v));
        }
        if env.is_instance_of(value, "java/lang/Integer")? {
            let v = env.call_method(value, "intValue", "()I", &[])?.i()?;
            return Ok(ManagedValue::Int(v));
        }
        if env.is_instance_of(value, "java/lang/Long")? {
            let v = env.call_method(value, "longValue", "()J", &[])?.j()?;
            return Ok(ManagedValue::Long(v));
        }
        if env.is_instance_of(value, "[B")? {
            let array = <&JByteArray>::from(value);
            return Ok(ManagedValue::Bytes(env.convert_byte_array(array)?));
        }
        if env.is_instance_of(value, "java/lang/String")? {
            return Ok(ManagedValue::String(self.java_string(value)?));
        }
        if env.is_instance_of(value, "java/lang/Enum")? {
            let class = env
                .call_method(value, "getDeclaringClass", CLASS_SIG, &[])?
                .l()?;
            let type_name = self.call_string(&class, "getSimpleName")?;
            let constant = self.enum_name(value)?;
            return Ok(ManagedValue::Enum {
                type_name,
                constant,
            });
        }

        let class = env.call_method(value, "getClass", CLASS_SIG, &[])?.l()?;
        Ok(ManagedValue::Other(self.call_string(&class, "getName")?))
    }

    fn new_managed_value(&mut self, value: &ManagedValue) -> Result<JObject<'local>> {
        let obj = match value {
            ManagedValue::Null => JObject::null(),
            ManagedValue::Bool(v) => self.boxed(
                "java/lang/Boolean",
                "(Z)Ljava/lang/Boolean;",
                JValue::Bool(u8::from(*v)),
            )?,
            ManagedValue::Int(v) => {
                self.boxed("java/lang/Integer", "(I)Ljava/lang/Integer;", JValue::Int(*v))?
            }
            ManagedValue::Long(v) => {
                self.boxed("java/lang/Long", "(J)Ljava/lang/Long;", JValue::Long(*v))?
            }
            ManagedValue::Bytes(v) => self.new_byte_array(v)?,
            ManagedValue::String(v) => self.new_string(v)?,
            ManagedValue::Enum {
                type_name,
                constant,
            } => {
                let classes = self.classes;
                let class = classes
                    .enum_class(type_name)
                    .ok_or_else(|| GlueError::UnknownEnumClass(type_name.clone()))?;
                self.static_constant(class, constant)?
            }
            ManagedValue::Other(class) => return Err(GlueError::UnsupportedValue(class.clone())),
        };
        Ok(obj)
    }

    fn msgctrl(&mut self, ctrl: &JObject<'local>) -> Result<Option<MsgCtrl>> {
        if ctrl.is_null() {
            return Ok(None);
        }

        let env = &mut *self.env;
        Ok(Some(MsgCtrl {
            flags: env.get_field(ctrl, "flags", "I")?.i()?,
            ttl: env.get_field(ctrl, "ttl", "I")?.i()?,
            in_order: env.get_field(ctrl, "inOrder", "Z")?.z()?,
            boundary: env.get_field(ctrl, "boundary", "I")?.i()?,
            src_time: env.get_field(ctrl, "srcTime", "J")?.j()?,
            pkt_seq: env.get_field(ctrl, "pktSeq", "I")?.i()?,
            no: env.get_field(ctrl, "no", "I")?.i()?,
        }))
    }

    fn write_msgctrl(&mut self, obj: &JObject<'local>, ctrl: &MsgCtrl) -> Result<()> {
        let env = &mut *self.env;
        env.set_field(obj, "flags", "I", JValue::Int(ctrl.flags))?;
        env.set_field(obj, "ttl", "I", JValue::Int(ctrl.ttl))?;
        env.set_field(obj, "inOrder", "Z", JValue::Bool(u8::from(ctrl.in_order)))?;
        env.set_field(obj, "boundary", "I", JValue::Int(ctrl.boundary))?;
        env.set_field(obj, "srcTime", "J", JValue::Long(ctrl.src_time))?;
        env.set_field(obj, "pktSeq", "I", JValue::Int(ctrl.pkt_seq))?;
        env.set_field(obj, "no", "I", JValue::Int(ctrl.no))?;
        Ok(())
    }

    fn new_pair(
        &mut self,
        first: &JObject<'local>,
        second: &JObject<'local>,
    ) -> Result<JObject<'local>> {
        Ok(self.env.new_object(
            self.classes.pair.as_str(),
            "(Ljava/lang/Object;Ljava/lang/Object;)V",
            &[JValue::Object(first), JValue::Object(second)],
        )?)
    }

    fn with_pinned<T>(
        &mut self,
        array: &JObject<'local>,
        f: impl FnOnce(&[u8]) -> T,
    ) -> Result<T> {
        if array.is_null() {
            return Err(GlueError::Null("byte array"));
        }
        let array = <&JByteArray>::from(array);

        // SAFETY: no other view of `array` is created while the elements are held
        let elements = unsafe { self.env.get_array_elements(array, ReleaseMode::CopyBack)? };
        // SAFETY: jbyte and u8 share size and alignment
        let bytes =
            unsafe { std::slice::from_raw_parts(elements.as_ptr() as *const u8, elements.len()) };
        let result = f(bytes);
        drop(elements);
        Ok(result)
    }

    fn new_byte_array(&mut self, bytes: &[u8]) -> Result<JObject<'local>> {
        Ok(JObject::from(self.env.byte_array_from_slice(bytes)?))
    }

    fn list(&mut self, list: &JObject<'local>) -> Result<Vec<JObject<'local>>> {
        if list.is_null() {
            return Err(GlueError::Null("list"));
        }
        let size = self.env.call_method(list, "size", "()I", &[])?.i()?;
        let mut items = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        for i in 0..size {
            let item = self
                .env
                .call_method(list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(i)])?
                .l()?;
            items.push(item);
        }
        Ok(items)
    }

    fn new_list(&mut self, items: &[JObject<'local>]) -> Result<JObject<'local>> {
        let capacity = jint::try_from(items.len()).unwrap_or(jint::MAX);
        let list = self
            .env
            .new_object("java/util/ArrayList", "(I)V", &[JValue::Int(capacity)])?;
        for item in items {
            self.env
                .call_method(&list, "add", "(Ljava/lang/Object;)Z", &[JValue::Object(item)])?;
        }
        Ok(list)
    }

    fn set_epoll_event(
        &mut self,
        event: &JObject<'local>,
        socket: &JObject<'local>,
        events: &JObject<'local>,
    ) -> Result<()> {
        if event.is_null() {
            return Err(GlueError::Null("epoll event"));
        }
        let socket_sig = format!("L{};", self.classes.socket);
        self.env
            .set_field(event, "socket", socket_sig, JValue::Object(socket))?;
        self.env
            .set_field(event, "events", LIST_SIG, JValue::Object(events))?;
        Ok(())
    }

    fn new_stats(&mut self, stats: &SrtTraceBStats) -> Result<JObject<'local>> {
        let values = stats.values();
        let args: Vec<JValue> = values
            .iter()
            .map(|(_, value)| match *value {
                StatValue::Int(v) => JValue::Int(v),
                StatValue::Long(v) => JValue::Long(v),
                StatValue::Double(v) => JValue::Double(v),
            })
            .collect();
        Ok(self.env.new_object(
            self.classes.stats.as_str(),
            stats_descriptor(&values),
            &args,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_descriptor_follows_field_widths() {
        let values = [
            ("msTimeStamp", StatValue::Long(1)),
            ("pktSndLossTotal", StatValue::Int(2)),
            ("mbpsSendRate", StatValue::Double(0.5)),
        ];
        assert_eq!(stats_descriptor(&values), "(JID)V");
        assert_eq!(stats_descriptor(&[]), "()V");
    }

    #[test]
    fn test_stats_descriptor_covers_every_counter() {
        let values = SrtTraceBStats::default().values();
        let sig = stats_descriptor(&values);
        assert_eq!(sig.len(), SrtTraceBStats::FIELDS.len() + 3);
        assert!(sig.starts_with("(JJJI"));
    }

    #[test]
    fn test_enum_classes() {
        let classes = ClassNames::default();
        assert_eq!(
            ManagedEnum::EpollFlag.class(&classes),
            "com/github/thibaultbee/srtdroid/enums/EpollFlag"
        );
        assert_eq!(
            ManagedEnum::SockStatus.class(&classes),
            "com/github/thibaultbee/srtdroid/enums/SockStatus"
        );
    }
}
