//! Native entry points registered on the managed classes
//!
//! Each entry point wraps its `JNIEnv` in a [`JniHeap`] and runs the method
//! body from [`methods`] under [`guard`](methods::guard), so a JNI failure or
//! a panic yields the method's fallback (`INVALID_ARGUMENT` or null) instead
//! of unwinding into the JVM.

use crate::context;
use crate::error::{GlueError, Result};
use crate::heap::JniHeap;
use crate::methods;
use jni::objects::{JByteArray, JObject, JString};
use jni::sys::{jboolean, jbyteArray, jint, jlong, jobject, jstring, JNI_FALSE};
use jni::JNIEnv;
use srt_bridge::{Bridge, INVALID_ARGUMENT};

fn run<'local, T>(
    env: &mut JNIEnv<'local>,
    method: &'static str,
    fallback: T,
    f: impl FnOnce(&mut JniHeap<'_, 'local>, &Bridge) -> Result<T>,
) -> T {
    let Some(ctx) = context() else {
        tracing::error!("{}: {}", method, GlueError::NotLoaded);
        return fallback;
    };
    let mut heap = JniHeap::new(env, &ctx.classes);
    methods::guard(&mut heap, method, fallback, |heap| f(heap, &ctx.bridge))
}

/// [`run`] for methods returning an object; null on failure
fn run_object<'local>(
    env: &mut JNIEnv<'local>,
    method: &'static str,
    f: impl FnOnce(&mut JniHeap<'_, 'local>, &Bridge) -> Result<JObject<'local>>,
) -> jobject {
    run(env, method, JObject::null(), f).into_raw()
}

fn flag(value: jboolean) -> bool {
    value != JNI_FALSE
}

// Library initialization

pub extern "system" fn native_start_up<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jint {
    run(&mut env, "nativeStartUp", INVALID_ARGUMENT, |_, bridge| {
        Ok(bridge.start_up())
    })
}

pub extern "system" fn native_clean_up<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jint {
    run(&mut env, "nativeCleanUp", INVALID_ARGUMENT, |_, bridge| {
        Ok(bridge.clean_up())
    })
}

pub extern "system" fn native_set_log_level<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    level: jint,
) {
    run(&mut env, "nativeSetLogLevel", (), |_, bridge| {
        bridge.set_log_level(level);
        Ok(())
    })
}

// Creating and configuring sockets

pub extern "system" fn native_socket<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    family: JObject<'local>,
    ty: jint,
    protocol: jint,
) -> jint {
    run(&mut env, "nativeSocket", INVALID_ARGUMENT, |heap, bridge| {
        methods::socket(heap, bridge, &family, ty, protocol)
    })
}

pub extern "system" fn native_create_socket<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jint {
    run(&mut env, "nativeCreateSocket", INVALID_ARGUMENT, |_, bridge| {
        Ok(bridge.create_socket())
    })
}

pub extern "system" fn native_bind<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    addr: JObject<'local>,
) -> jint {
    run(&mut env, "nativeBind", INVALID_ARGUMENT, |heap, bridge| {
        methods::bind(heap, bridge, &this, &addr)
    })
}

pub extern "system" fn native_get_sock_state<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetSockState", |heap, bridge| {
        methods::sock_state(heap, bridge, &this)
    })
}

pub extern "system" fn native_close<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jint {
    run(&mut env, "nativeClose", INVALID_ARGUMENT, |heap, bridge| {
        methods::close(heap, bridge, &this)
    })
}

// Connecting

pub extern "system" fn native_listen<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    backlog: jint,
) -> jint {
    run(&mut env, "nativeListen", INVALID_ARGUMENT, |heap, bridge| {
        methods::listen(heap, bridge, &this, backlog)
    })
}

pub extern "system" fn native_accept<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeAccept", |heap, bridge| {
        methods::accept(heap, bridge, &this)
    })
}

pub extern "system" fn native_connect<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    addr: JObject<'local>,
) -> jint {
    run(&mut env, "nativeConnect", INVALID_ARGUMENT, |heap, bridge| {
        methods::connect(heap, bridge, &this, &addr)
    })
}

pub extern "system" fn native_rendezvous<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    local: JObject<'local>,
    remote: JObject<'local>,
) -> jint {
    run(&mut env, "nativeRendezVous", INVALID_ARGUMENT, |heap, bridge| {
        methods::rendezvous(heap, bridge, &this, &local, &remote)
    })
}

pub extern "system" fn native_get_sock_name<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetSockName", |heap, bridge| {
        methods::sock_name(heap, bridge, &this)
    })
}

pub extern "system" fn native_get_peer_name<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetPeerName", |heap, bridge| {
        methods::peer_name(heap, bridge, &this)
    })
}

// Options and properties

pub extern "system" fn native_set_sock_opt<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    level: jint,
    opt: JObject<'local>,
    value: JObject<'local>,
) -> jint {
    run(&mut env, "nativeSetSockOpt", INVALID_ARGUMENT, |heap, bridge| {
        methods::set_sock_opt(heap, bridge, &this, level, &opt, &value)
    })
}

pub extern "system" fn native_get_sock_opt<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    level: jint,
    opt: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetSockOpt", |heap, bridge| {
        methods::get_sock_opt(heap, bridge, &this, level, &opt)
    })
}

pub extern "system" fn native_get_reject_reason<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jint {
    run(&mut env, "nativeGetRejectReason", INVALID_ARGUMENT, |heap, bridge| {
        methods::reject_reason(heap, bridge, &this)
    })
}

pub extern "system" fn native_set_reject_reason<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    reason: jint,
) -> jint {
    run(&mut env, "nativeSetRejectReason", INVALID_ARGUMENT, |heap, bridge| {
        methods::set_reject_reason(heap, bridge, &this, reason)
    })
}

pub extern "system" fn native_get_connection_time<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jlong {
    let fallback = jlong::from(INVALID_ARGUMENT);
    run(&mut env, "nativeGetConnectionTime", fallback, |heap, bridge| {
        methods::connection_time(heap, bridge, &this)
    })
}

pub extern "system" fn native_bstats<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    clear: jboolean,
) -> jobject {
    run_object(&mut env, "bstats", |heap, bridge| {
        methods::bstats(heap, bridge, &this, flag(clear))
    })
}

pub extern "system" fn native_bistats<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    clear: jboolean,
    instantaneous: jboolean,
) -> jobject {
    run_object(&mut env, "bistats", |heap, bridge| {
        methods::bistats(heap, bridge, &this, flag(clear), flag(instantaneous))
    })
}

// Transmission

pub extern "system" fn native_send<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    buf: JByteArray<'local>,
) -> jint {
    let buf = JObject::from(buf);
    run(&mut env, "nativeSend", INVALID_ARGUMENT, |heap, bridge| {
        methods::send(heap, bridge, &this, &buf)
    })
}

pub extern "system" fn native_send_msg<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    buf: JByteArray<'local>,
    ttl: jint,
    in_order: jboolean,
) -> jint {
    let buf = JObject::from(buf);
    run(&mut env, "nativeSendMsg", INVALID_ARGUMENT, |heap, bridge| {
        methods::send_msg(heap, bridge, &this, &buf, ttl, flag(in_order))
    })
}

pub extern "system" fn native_send_msg2<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    buf: JByteArray<'local>,
    ctrl: JObject<'local>,
) -> jint {
    let buf = JObject::from(buf);
    run(&mut env, "nativeSendMsg2", INVALID_ARGUMENT, |heap, bridge| {
        methods::send_msg2(heap, bridge, &this, &buf, &ctrl)
    })
}

pub extern "system" fn native_recv<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    len: jint,
) -> jbyteArray {
    run_object(&mut env, "nativeRecv", |heap, bridge| {
        methods::recv(heap, bridge, &this, len)
    })
}

pub extern "system" fn native_recv_msg2<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    len: jint,
    ctrl: JObject<'local>,
) -> jbyteArray {
    run_object(&mut env, "nativeRecvMsg2", |heap, bridge| {
        methods::recv_msg2(heap, bridge, &this, len, &ctrl)
    })
}

pub extern "system" fn native_send_file<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    path: JString<'local>,
    offset: jlong,
    size: jlong,
    block: jint,
) -> jlong {
    let path = JObject::from(path);
    let fallback = jlong::from(INVALID_ARGUMENT);
    run(&mut env, "nativeSendFile", fallback, |heap, bridge| {
        methods::send_file(heap, bridge, &this, &path, offset, size, block)
    })
}

pub extern "system" fn native_recv_file<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    path: JString<'local>,
    offset: jlong,
    size: jlong,
    block: jint,
) -> jlong {
    let path = JObject::from(path);
    let fallback = jlong::from(INVALID_ARGUMENT);
    run(&mut env, "nativeRecvFile", fallback, |heap, bridge| {
        methods::recv_file(heap, bridge, &this, &path, offset, size, block)
    })
}

// Errors

pub extern "system" fn native_get_last_error_str<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    run_object(&mut env, "nativeGetLastErrorStr", |heap, bridge| {
        methods::last_error_str(heap, bridge)
    })
}

pub extern "system" fn native_get_last_error<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetLastError", |heap, bridge| {
        methods::last_error(heap, bridge)
    })
}

pub extern "system" fn native_clear_last_error<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    run(&mut env, "nativeClearLastError", (), |_, bridge| {
        bridge.clear_last_error();
        Ok(())
    })
}

pub extern "system" fn native_str_error<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jstring {
    run_object(&mut env, "nativeStrError", |heap, bridge| {
        methods::str_error(heap, bridge, &this)
    })
}

// Epoll

pub extern "system" fn epoll_create<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jint {
    run(&mut env, "create", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_create(heap, bridge)
    })
}

pub extern "system" fn epoll_is_valid<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jboolean {
    run(&mut env, "nativeIsValid", JNI_FALSE, |heap, _| {
        methods::epoll_is_valid(heap, &this).map(jboolean::from)
    })
}

pub extern "system" fn epoll_add_usock<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    socket: JObject<'local>,
    events: JObject<'local>,
) -> jint {
    run(&mut env, "addUSock", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_add_usock(heap, bridge, &this, &socket, &events)
    })
}

pub extern "system" fn epoll_update_usock<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    socket: JObject<'local>,
    events: JObject<'local>,
) -> jint {
    run(&mut env, "updateUSock", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_update_usock(heap, bridge, &this, &socket, &events)
    })
}

pub extern "system" fn epoll_remove_usock<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    socket: JObject<'local>,
) -> jint {
    run(&mut env, "removeUSock", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_remove_usock(heap, bridge, &this, &socket)
    })
}

pub extern "system" fn epoll_wait<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    read: JObject<'local>,
    write: JObject<'local>,
    timeout: jlong,
) -> jint {
    run(&mut env, "wait", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_wait(heap, bridge, &this, &read, &write, timeout)
    })
}

pub extern "system" fn epoll_uwait<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    fds: JObject<'local>,
    timeout: jlong,
) -> jint {
    run(&mut env, "uWait", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_uwait(heap, bridge, &this, &fds, timeout)
    })
}

pub extern "system" fn epoll_set_flags<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    flags: JObject<'local>,
) -> jobject {
    run_object(&mut env, "setFlags", |heap, bridge| {
        methods::epoll_set_flags(heap, bridge, &this, &flags)
    })
}

pub extern "system" fn epoll_get_flags<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jobject {
    run_object(&mut env, "nativeGetFlags", |heap, bridge| {
        methods::epoll_get_flags(heap, bridge, &this)
    })
}

pub extern "system" fn epoll_release<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
) -> jint {
    run(&mut env, "release", INVALID_ARGUMENT, |heap, bridge| {
        methods::epoll_release(heap, bridge, &this)
    })
}
