//! Binding tables
//!
//! One table per managed class: runtime control, socket, error container,
//! error kind and epoll. Descriptors are built from the configured class
//! names.
//!
//! The tables only work as a set. Socket natives return `SockStatus` and
//! `Pair` objects whose callers go on to query `Error`, and epoll natives take
//! managed sockets. Registration of a table is all-or-nothing, and a failing
//! table unregisters every table registered before it, so a failed load
//! leaves no class half bound.

use crate::config::ClassNames;
use crate::error::Result;
use crate::natives::*;
use jni::NativeMethod;
use jni::JNIEnv;
use std::ffi::c_void;

/// A single `(name, descriptor, entry point)` binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: &'static str,
    pub signature: String,
    pub fn_ptr: *mut c_void,
}

impl Binding {
    fn new(name: &'static str, signature: impl Into<String>, fn_ptr: *mut c_void) -> Self {
        Binding {
            name,
            signature: signature.into(),
            fn_ptr,
        }
    }
}

/// The bindings of one managed class
#[derive(Debug, Clone)]
pub struct BindingTable {
    pub class: String,
    pub bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn find(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

fn object(class: &str) -> String {
    format!("L{};", class)
}

pub fn srt_table(classes: &ClassNames) -> BindingTable {
    BindingTable {
        class: classes.srt.clone(),
        bindings: vec![
            Binding::new("nativeStartUp", "()I", native_start_up as *mut c_void),
            Binding::new("nativeCleanUp", "()I", native_clean_up as *mut c_void),
            Binding::new("nativeSetLogLevel", "(I)V", native_set_log_level as *mut c_void),
        ],
    }
}

pub fn socket_table(classes: &ClassNames) -> BindingTable {
    let addr = object(&classes.inet_socket_address);
    let msgctrl = object(&classes.msg_ctrl);
    let sockopt = object(&classes.sock_opt);
    let stats = object(&classes.stats);

    BindingTable {
        class: classes.socket.clone(),
        bindings: vec![
            Binding::new(
                "nativeSocket",
                format!("({}II)I", object(&classes.protocol_family)),
                native_socket as *mut c_void,
            ),
            Binding::new("nativeCreateSocket", "()I", native_create_socket as *mut c_void),
            Binding::new(
                "nativeBind",
                format!("({})I", addr),
                native_bind as *mut c_void,
            ),
            Binding::new(
                "nativeGetSockState",
                format!("(){}", object(&classes.sock_status)),
                native_get_sock_state as *mut c_void,
            ),
            Binding::new("nativeClose", "()I", native_close as *mut c_void),
            Binding::new("nativeListen", "(I)I", native_listen as *mut c_void),
            Binding::new(
                "nativeAccept",
                format!("(){}", object(&classes.pair)),
                native_accept as *mut c_void,
            ),
            Binding::new(
                "nativeConnect",
                format!("({})I", addr),
                native_connect as *mut c_void,
            ),
            Binding::new(
                "nativeRendezVous",
                format!("({}{})I", addr, addr),
                native_rendezvous as *mut c_void,
            ),
            Binding::new(
                "nativeGetSockName",
                format!("(){}", addr),
                native_get_sock_name as *mut c_void,
            ),
            Binding::new(
                "nativeGetPeerName",
                format!("(){}", addr),
                native_get_peer_name as *mut c_void,
            ),
            Binding::new(
                "nativeSetSockOpt",
                format!("(I{}Ljava/lang/Object;)I", sockopt),
                native_set_sock_opt as *mut c_void,
            ),
            Binding::new(
                "nativeGetSockOpt",
                format!("(I{})Ljava/lang/Object;", sockopt),
                native_get_sock_opt as *mut c_void,
            ),
            Binding::new(
                "nativeGetRejectReason",
                "()I",
                native_get_reject_reason as *mut c_void,
            ),
            Binding::new(
                "nativeSetRejectReason",
                "(I)I",
                native_set_reject_reason as *mut c_void,
            ),
            Binding::new(
                "nativeGetConnectionTime",
                "()J",
                native_get_connection_time as *mut c_void,
            ),
            Binding::new("bstats", format!("(Z){}", stats), native_bstats as *mut c_void),
            Binding::new("bistats", format!("(ZZ){}", stats), native_bistats as *mut c_void),
            Binding::new("nativeSend", "([B)I", native_send as *mut c_void),
            Binding::new("nativeSendMsg", "([BIZ)I", native_send_msg as *mut c_void),
            Binding::new(
                "nativeSendMsg2",
                format!("([B{})I", msgctrl),
                native_send_msg2 as *mut c_void,
            ),
            Binding::new("nativeRecv", "(I)[B", native_recv as *mut c_void),
            Binding::new(
                "nativeRecvMsg2",
                format!("(I{})[B", msgctrl),
                native_recv_msg2 as *mut c_void,
            ),
            Binding::new(
                "nativeSendFile",
                "(Ljava/lang/String;JJI)J",
                native_send_file as *mut c_void,
            ),
            Binding::new(
                "nativeRecvFile",
                "(Ljava/lang/String;JJI)J",
                native_recv_file as *mut c_void,
            ),
        ],
    }
}

pub fn error_table(classes: &ClassNames) -> BindingTable {
    BindingTable {
        class: classes.error.clone(),
        bindings: vec![
            Binding::new(
                "nativeGetLastErrorStr",
                "()Ljava/lang/String;",
                native_get_last_error_str as *mut c_void,
            ),
            Binding::new(
                "nativeGetLastError",
                format!("(){}", object(&classes.error_type)),
                native_get_last_error as *mut c_void,
            ),
            Binding::new(
                "nativeClearLastError",
                "()V",
                native_clear_last_error as *mut c_void,
            ),
        ],
    }
}

pub fn error_type_table(classes: &ClassNames) -> BindingTable {
    BindingTable {
        class: classes.error_type.clone(),
        bindings: vec![Binding::new(
            "nativeStrError",
            "()Ljava/lang/String;",
            native_str_error as *mut c_void,
        )],
    }
}

pub fn epoll_table(classes: &ClassNames) -> BindingTable {
    let socket = object(&classes.socket);
    const LIST: &str = "Ljava/util/List;";

    BindingTable {
        class: classes.epoll.clone(),
        bindings: vec![
            Binding::new("create", "()I", epoll_create as *mut c_void),
            Binding::new("nativeIsValid", "()Z", epoll_is_valid as *mut c_void),
            Binding::new(
                "addUSock",
                format!("({}{})I", socket, LIST),
                epoll_add_usock as *mut c_void,
            ),
            Binding::new(
                "updateUSock",
                format!("({}{})I", socket, LIST),
                epoll_update_usock as *mut c_void,
            ),
            Binding::new(
                "removeUSock",
                format!("({})I", socket),
                epoll_remove_usock as *mut c_void,
            ),
            Binding::new(
                "wait",
                format!("({}{}J)I", LIST, LIST),
                epoll_wait as *mut c_void,
            ),
            Binding::new("uWait", format!("({}J)I", LIST), epoll_uwait as *mut c_void),
            Binding::new(
                "setFlags",
                format!("({}){}", LIST, LIST),
                epoll_set_flags as *mut c_void,
            ),
            Binding::new(
                "nativeGetFlags",
                format!("(){}", LIST),
                epoll_get_flags as *mut c_void,
            ),
            Binding::new("release", "()I", epoll_release as *mut c_void),
        ],
    }
}

/// Every table, in registration order
pub fn tables(classes: &ClassNames) -> Vec<BindingTable> {
    vec![
        srt_table(classes),
        socket_table(classes),
        error_table(classes),
        error_type_table(classes),
        epoll_table(classes),
    ]
}

/// Binds and unbinds the natives of a class
pub trait Registrar {
    fn register(&mut self, table: &BindingTable) -> Result<()>;

    fn unregister(&mut self, table: &BindingTable);
}

impl<'local> Registrar for JNIEnv<'local> {
    fn register(&mut self, table: &BindingTable) -> Result<()> {
        let methods: Vec<NativeMethod> = table
            .bindings
            .iter()
            .map(|b| NativeMethod {
                name: b.name.into(),
                sig: b.signature.as_str().into(),
                fn_ptr: b.fn_ptr,
            })
            .collect();

        if let Err(e) = self.register_native_methods(table.class.as_str(), &methods) {
            tracing::error!("RegisterNatives failed for '{}': {}", table.class, e);
            if self.exception_check().unwrap_or(false) {
                let _ = self.exception_clear();
            }
            return Err(e.into());
        }

        tracing::debug!(
            "Registered {} natives on '{}'",
            table.bindings.len(),
            table.class
        );
        Ok(())
    }

    fn unregister(&mut self, table: &BindingTable) {
        if let Err(e) = self.unregister_native_methods(table.class.as_str()) {
            tracing::warn!("UnregisterNatives failed for '{}': {}", table.class, e);
            if self.exception_check().unwrap_or(false) {
                let _ = self.exception_clear();
            }
        }
    }
}

/// Register `tables` in order, undoing the registered ones on failure
pub fn register_tables<R: Registrar + ?Sized>(
    registrar: &mut R,
    tables: &[BindingTable],
) -> Result<()> {
    for (done, table) in tables.iter().enumerate() {
        if let Err(e) = registrar.register(table) {
            for registered in tables[..done].iter().rev() {
                registrar.unregister(registered);
            }
            return Err(e);
        }
    }
    Ok(())
}

pub fn register_all(env: &mut JNIEnv, classes: &ClassNames) -> Result<()> {
    register_tables(env, &tables(classes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_five_tables() {
        let classes = ClassNames::default();
        let tables = tables(&classes);
        let names: Vec<&str> = tables.iter().map(|t| t.class.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "com/github/thibaultbee/srtdroid/Srt",
                "com/github/thibaultbee/srtdroid/models/Socket",
                "com/github/thibaultbee/srtdroid/models/Error",
                "com/github/thibaultbee/srtdroid/enums/ErrorType",
                "com/github/thibaultbee/srtdroid/models/Epoll",
            ]
        );
    }

    #[test]
    fn test_stats_and_epoll_descriptors() {
        let classes = ClassNames::default();
        let socket = socket_table(&classes);
        assert_eq!(
            socket.find("bistats").unwrap().signature,
            "(ZZ)Lcom/github/thibaultbee/srtdroid/models/Stats;"
        );

        let epoll = epoll_table(&classes);
        assert_eq!(
            epoll.find("addUSock").unwrap().signature,
            "(Lcom/github/thibaultbee/srtdroid/models/Socket;Ljava/util/List;)I"
        );
        assert_eq!(
            epoll.find("wait").unwrap().signature,
            "(Ljava/util/List;Ljava/util/List;J)I"
        );
        assert_eq!(epoll.find("uWait").unwrap().signature, "(Ljava/util/List;J)I");
        assert_eq!(
            epoll.find("setFlags").unwrap().signature,
            "(Ljava/util/List;)Ljava/util/List;"
        );
        assert_eq!(epoll.find("nativeIsValid").unwrap().signature, "()Z");
    }

    /// Records calls; fails to register the class named `fail_on`
    #[derive(Default)]
    struct Recorder {
        fail_on: Option<String>,
        log: Vec<String>,
    }

    impl Registrar for Recorder {
        fn register(&mut self, table: &BindingTable) -> Result<()> {
            if self.fail_on.as_deref() == Some(table.class.as_str()) {
                return Err(jni::errors::Error::JavaException.into());
            }
            self.log.push(format!("+{}", table.class));
            Ok(())
        }

        fn unregister(&mut self, table: &BindingTable) {
            self.log.push(format!("-{}", table.class));
        }
    }

    fn short_names(log: &[String]) -> Vec<&str> {
        log.iter()
            .map(|entry| entry.rsplit('/').next().unwrap_or(entry))
            .collect()
    }

    #[test]
    fn test_failed_table_unregisters_earlier_ones() {
        let classes = ClassNames::default();
        let mut recorder = Recorder {
            fail_on: Some(classes.error_type.clone()),
            ..Recorder::default()
        };

        assert!(register_tables(&mut recorder, &tables(&classes)).is_err());
        assert_eq!(recorder.log.len(), 6);
        assert!(recorder.log[..3].iter().all(|e| e.starts_with('+')));
        assert_eq!(
            short_names(&recorder.log[3..]),
            vec!["Error", "Socket", "Srt"]
        );
        assert!(recorder.log[3..].iter().all(|e| e.starts_with('-')));
    }

    #[test]
    fn test_first_table_failure_unregisters_nothing() {
        let classes = ClassNames::default();
        let mut recorder = Recorder {
            fail_on: Some(classes.srt.clone()),
            ..Recorder::default()
        };
        assert!(register_tables(&mut recorder, &tables(&classes)).is_err());
        assert!(recorder.log.is_empty());
    }

    #[test]
    fn test_all_tables_registered() {
        let mut recorder = Recorder::default();
        assert!(register_tables(&mut recorder, &tables(&ClassNames::default())).is_ok());
        assert_eq!(recorder.log.len(), 5);
        assert!(recorder.log.iter().all(|e| e.starts_with('+')));
    }

    #[test]
    fn test_socket_descriptors() {
        let table = socket_table(&ClassNames::default());

        assert_eq!(
            table.find("nativeSocket").unwrap().signature,
            "(Ljava/net/StandardProtocolFamily;II)I"
        );
        assert_eq!(
            table.find("nativeBind").unwrap().signature,
            "(Ljava/net/InetSocketAddress;)I"
        );
        assert_eq!(
            table.find("nativeGetSockState").unwrap().signature,
            "()Lcom/github/thibaultbee/srtdroid/enums/SockStatus;"
        );
        assert_eq!(
            table.find("nativeAccept").unwrap().signature,
            "()Lkotlin/Pair;"
        );
        assert_eq!(
            table.find("nativeSetSockOpt").unwrap().signature,
            "(ILcom/github/thibaultbee/srtdroid/enums/SockOpt;Ljava/lang/Object;)I"
        );
        assert_eq!(
            table.find("nativeRecvMsg2").unwrap().signature,
            "(ILcom/github/thibaultbee/srtdroid/models/MsgCtrl;)[B"
        );
        assert_eq!(
            table.find("nativeSendFile").unwrap().signature,
            "(Ljava/lang/String;JJI)J"
        );
    }

    #[test]
    fn test_error_descriptors() {
        let classes = ClassNames::default();
        assert_eq!(
            error_table(&classes)
                .find("nativeGetLastError")
                .unwrap()
                .signature,
            "()Lcom/github/thibaultbee/srtdroid/enums/ErrorType;"
        );
        assert_eq!(
            error_type_table(&classes)
                .find("nativeStrError")
                .unwrap()
                .signature,
            "()Ljava/lang/String;"
        );
    }

    #[test]
    fn test_bindings_unique_and_bound() {
        for table in tables(&ClassNames::default()) {
            let mut seen = HashSet::new();
            for binding in &table.bindings {
                assert!(seen.insert(binding.name), "duplicate {}", binding.name);
                assert!(!binding.fn_ptr.is_null());
            }
        }
    }

    #[test]
    fn test_descriptors_follow_class_names() {
        let classes = ClassNames {
            msg_ctrl: "org/acme/Ctrl".to_string(),
            ..ClassNames::default()
        };
        let table = socket_table(&classes);
        assert_eq!(
            table.find("nativeSendMsg2").unwrap().signature,
            "([BLorg/acme/Ctrl;)I"
        );
    }
}
