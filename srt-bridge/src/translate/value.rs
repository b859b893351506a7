//! Polymorphic socket option values
//!
//! The managed side hands over an arbitrary object; it is first read into a
//! [`ManagedValue`] (its runtime type made explicit), then narrowed to an
//! [`OptionValue`] and encoded into the `(pointer, length)` payload
//! `srt_setsockopt` expects. `srt_getsockopt` results travel the other way,
//! decoded according to the option's [`OptionKind`].

use crate::error::TranslateError;
use crate::translate::enums::{KmState, SockOpt, Transtype, KMSTATE_TYPE, TRANSTYPE_TYPE};
use bytes::{BufMut, Bytes, BytesMut};
use std::mem;

/// A managed object, tagged with its runtime type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Bytes(Vec<u8>),
    String(String),
    /// Enum constant; `type_name` is the simple class name
    Enum {
        type_name: String,
        constant: String,
    },
    /// Any other object, carrying its class name for diagnostics
    Other(String),
}

impl ManagedValue {
    fn type_label(&self) -> String {
        match self {
            ManagedValue::Null => "null".to_string(),
            ManagedValue::Bool(_) => "Boolean".to_string(),
            ManagedValue::Int(_) => "Integer".to_string(),
            ManagedValue::Long(_) => "Long".to_string(),
            ManagedValue::Bytes(_) => "ByteArray".to_string(),
            ManagedValue::String(_) => "String".to_string(),
            ManagedValue::Enum { type_name, .. } => type_name.clone(),
            ManagedValue::Other(class) => class.clone(),
        }
    }
}

/// Values `srt_setsockopt` understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    Bytes(Vec<u8>),
    String(String),
}

impl OptionValue {
    /// Narrow a managed object to an option value
    ///
    /// `Transtype` constants are carried as their 32-bit native value.
    pub fn from_managed(value: ManagedValue) -> Result<Self, TranslateError> {
        match value {
            ManagedValue::Bool(v) => Ok(OptionValue::Bool(v)),
            ManagedValue::Int(v) => Ok(OptionValue::I32(v)),
            ManagedValue::Long(v) => Ok(OptionValue::I64(v)),
            ManagedValue::Bytes(v) => Ok(OptionValue::Bytes(v)),
            ManagedValue::String(v) => Ok(OptionValue::String(v)),
            ManagedValue::Enum {
                ref type_name,
                ref constant,
            } if type_name == TRANSTYPE_TYPE => {
                Ok(OptionValue::I32(Transtype::parse(constant)?.as_native()))
            }
            other => Err(TranslateError::UnsupportedValue(other.type_label())),
        }
    }

    /// Encode into the native payload for `opt`
    ///
    /// Booleans take one byte, integers their host-endian width, byte
    /// sequences are copied verbatim and strings are UTF-8 without a NUL.
    /// A 32-bit value for `LINGER` becomes a `struct linger`.
    pub fn encode(&self, opt: SockOpt) -> Bytes {
        match self {
            OptionValue::Bool(v) => Bytes::copy_from_slice(&[u8::from(*v)]),
            OptionValue::I32(v) if opt == SockOpt::Linger => {
                let linger = libc::linger {
                    l_onoff: libc::c_int::from(*v > 0),
                    l_linger: (*v).max(0),
                };
                let mut buf = BytesMut::with_capacity(mem::size_of::<libc::linger>());
                buf.put_slice(&linger.l_onoff.to_ne_bytes());
                buf.put_slice(&linger.l_linger.to_ne_bytes());
                buf.freeze()
            }
            OptionValue::I32(v) => Bytes::copy_from_slice(&v.to_ne_bytes()),
            OptionValue::I64(v) => Bytes::copy_from_slice(&v.to_ne_bytes()),
            OptionValue::Bytes(v) => Bytes::copy_from_slice(v),
            OptionValue::String(v) => Bytes::copy_from_slice(v.as_bytes()),
        }
    }
}

/// How libsrt reports an option through `srt_getsockopt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    Int64,
    String,
    Linger,
    KmState,
}

impl OptionKind {
    pub fn of(opt: SockOpt) -> Self {
        match opt {
            SockOpt::SndSyn
            | SockOpt::RcvSyn
            | SockOpt::Rendezvous
            | SockOpt::ReuseAddr
            | SockOpt::Sender
            | SockOpt::TsbpdMode
            | SockOpt::TlPktDrop
            | SockOpt::NakReport
            | SockOpt::MessageApi
            | SockOpt::EnforcedEncryption
            | SockOpt::DriftTracer => OptionKind::Bool,
            SockOpt::MaxBw | SockOpt::InputBw | SockOpt::MinInputBw => OptionKind::Int64,
            SockOpt::StreamId
            | SockOpt::Congestion
            | SockOpt::PacketFilter
            | SockOpt::BindToDevice
            | SockOpt::Passphrase => OptionKind::String,
            SockOpt::KmState | SockOpt::SndKmState | SockOpt::RcvKmState => OptionKind::KmState,
            SockOpt::Linger => OptionKind::Linger,
            _ => OptionKind::Int,
        }
    }

    /// Decode the first `len` bytes written by `srt_getsockopt`
    pub fn decode(self, value: &[u8]) -> Option<ManagedValue> {
        match self {
            OptionKind::Bool => match value.len() {
                0 => None,
                n if n >= mem::size_of::<i32>() => {
                    read_i32(value).map(|v| ManagedValue::Bool(v != 0))
                }
                _ => Some(ManagedValue::Bool(value[0] != 0)),
            },
            OptionKind::Int => read_i32(value).map(ManagedValue::Int),
            OptionKind::Int64 => {
                let raw: [u8; 8] = value.get(..8)?.try_into().ok()?;
                Some(ManagedValue::Long(i64::from_ne_bytes(raw)))
            }
            OptionKind::String => {
                let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
                Some(ManagedValue::String(
                    String::from_utf8_lossy(&value[..end]).into_owned(),
                ))
            }
            OptionKind::Linger => {
                let onoff = read_i32(value)?;
                let seconds = read_i32(value.get(4..)?)?;
                Some(ManagedValue::Int(if onoff != 0 { seconds } else { 0 }))
            }
            OptionKind::KmState => {
                let state = KmState::from_native(read_i32(value)?)?;
                Some(ManagedValue::Enum {
                    type_name: KMSTATE_TYPE.to_string(),
                    constant: state.name().to_string(),
                })
            }
        }
    }
}

fn read_i32(value: &[u8]) -> Option<i32> {
    let raw: [u8; 4] = value.get(..4)?.try_into().ok()?;
    Some(i32::from_ne_bytes(raw))
}
