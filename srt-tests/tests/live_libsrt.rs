//! Scenarios against a real libsrt
//!
//! Each test loads libsrt (from `SRT_LIBRARY_PATH`, or the usual library
//! names) and returns early when none is installed.

use srt_bridge::{Bridge, ErrorKind, ManagedSocketAddress, ManagedValue, MsgCtrl, SockStatus};
use srt_sys::consts::loglevel::LOG_DEBUG;
use srt_sys::{SrtLibrary, SRT_INVALID_SOCK};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn live_bridge() -> Option<Bridge> {
    let path = std::env::var_os("SRT_LIBRARY_PATH").map(PathBuf::from);
    match SrtLibrary::load(path.as_deref()) {
        Ok(library) => {
            let bridge = Bridge::new(Arc::new(library));
            assert!(bridge.start_up() >= 0);
            Some(bridge)
        }
        Err(e) => {
            eprintln!("libsrt unavailable, skipping: {}", e);
            None
        }
    }
}

fn loopback(port: u16) -> ManagedSocketAddress {
    ManagedSocketAddress::new("127.0.0.1", i32::from(port))
}

fn file_mode() -> ManagedValue {
    ManagedValue::Enum {
        type_name: "Transtype".into(),
        constant: "FILE".into(),
    }
}

#[test]
fn test_startup_teardown_cycle() {
    let Some(bridge) = live_bridge() else { return };

    bridge.set_log_level(LOG_DEBUG);
    assert_eq!(bridge.clean_up(), 0);
    assert!(!bridge.is_initialized());

    // 1 when another test in this process keeps libsrt started
    assert!(bridge.start_up() >= 0);
    assert!(bridge.is_initialized());
    assert_eq!(bridge.clean_up(), 0);
}

#[test]
fn test_socket_lifecycle() {
    let Some(bridge) = live_bridge() else { return };

    let u = bridge.socket("INET", 0, 0);
    assert!(u > 0);
    assert_eq!(bridge.get_sock_state(u), SockStatus::Init);

    assert_eq!(bridge.bind(u, &loopback(0)), 0);
    assert_eq!(bridge.get_sock_state(u), SockStatus::Opened);
    let local = bridge.get_sock_name(u).unwrap();
    assert!(local.ip().is_loopback());
    assert_ne!(local.port(), 0);

    assert_eq!(bridge.listen(u, 1), 0);
    assert_eq!(bridge.get_sock_state(u), SockStatus::Listening);

    assert_eq!(bridge.close(u), 0);
    bridge.clean_up();
}

#[test]
fn test_options() {
    let Some(bridge) = live_bridge() else { return };
    let u = bridge.create_socket();

    assert_eq!(bridge.set_sockopt(u, 0, "PAYLOADSIZE", ManagedValue::Int(1316)), 0);
    assert_eq!(bridge.set_sockopt(u, 0, "LATENCY", ManagedValue::Int(250)), 0);
    assert_eq!(
        bridge.get_sockopt(u, 0, "LATENCY"),
        Some(ManagedValue::Int(250))
    );

    assert_eq!(
        bridge.set_sockopt(u, 0, "STREAMID", ManagedValue::String("live/feed".into())),
        0
    );
    assert_eq!(
        bridge.get_sockopt(u, 0, "STREAMID"),
        Some(ManagedValue::String("live/feed".into()))
    );

    assert_eq!(bridge.set_sockopt(u, 0, "RCVSYN", ManagedValue::Bool(false)), 0);
    assert_eq!(
        bridge.get_sockopt(u, 0, "RCVSYN"),
        Some(ManagedValue::Bool(false))
    );

    assert_eq!(bridge.set_sockopt(u, 0, "LINGER", ManagedValue::Int(0)), 0);
    assert_eq!(bridge.get_sockopt(u, 0, "LINGER"), Some(ManagedValue::Int(0)));

    assert_eq!(bridge.set_sockopt(u, 0, "TRANSTYPE", file_mode()), 0);

    bridge.close(u);
    bridge.clean_up();
}

#[test]
fn test_accept_on_unbound_socket() {
    let Some(bridge) = live_bridge() else { return };
    let u = bridge.create_socket();

    let accepted = bridge.accept(u);
    assert_eq!(accepted.handle, SRT_INVALID_SOCK);
    assert_eq!(accepted.peer, None);
    assert!(!bridge.get_last_error().is_success());

    bridge.clear_last_error();
    assert_eq!(bridge.get_last_error(), ErrorKind::Success);

    bridge.close(u);
    bridge.clean_up();
}

#[test]
fn test_accept_on_closed_listener() {
    let Some(bridge) = live_bridge() else { return };
    let u = bridge.create_socket();
    assert_eq!(bridge.bind(u, &loopback(0)), 0);
    assert_eq!(bridge.listen(u, 1), 0);
    assert_eq!(bridge.close(u), 0);

    let accepted = bridge.accept(u);
    assert_eq!(accepted.handle, SRT_INVALID_SOCK);
    assert_eq!(accepted.peer, None);
    assert!(!bridge.get_last_error().is_success());

    bridge.clean_up();
}

#[test]
fn test_message_exchange() {
    let Some(bridge) = live_bridge() else { return };

    let server = bridge.create_socket();
    assert_eq!(bridge.bind(server, &loopback(0)), 0);
    let port = bridge.get_sock_name(server).unwrap().port();
    assert_eq!(bridge.listen(server, 1), 0);

    let client = bridge.create_socket();
    assert_eq!(bridge.connect(client, &loopback(port)), 0);

    let accepted = bridge.accept(server);
    assert!(accepted.handle > 0);
    let peer = accepted.peer.unwrap();
    assert_eq!(bridge.get_peer_name(client).unwrap().port(), port);
    assert!(peer.ip().is_loopback());

    let mut sent = MsgCtrl::default();
    assert_eq!(bridge.send_msg2(client, b"hello srt", Some(&mut sent)), 9);
    assert_ne!(sent.no, MsgCtrl::default().no);

    let mut received = MsgCtrl::default();
    let data = bridge.recv_msg2(accepted.handle, 1316, Some(&mut received));
    assert_eq!(data.as_deref(), Some(&b"hello srt"[..]));
    assert_eq!(received.no, sent.no);

    assert!(bridge.connection_time(client) >= 0);

    bridge.close(client);
    bridge.close(accepted.handle);
    bridge.close(server);
    bridge.clean_up();
}

#[test]
fn test_loopback_send_recv_on_fixed_port() {
    let Some(bridge) = live_bridge() else { return };

    let server = bridge.create_socket();
    assert_eq!(bridge.bind(server, &loopback(9000)), 0);
    assert_eq!(bridge.listen(server, 1), 0);

    let client = bridge.create_socket();
    assert_eq!(bridge.connect(client, &loopback(9000)), 0);
    let accepted = bridge.accept(server);
    assert!(accepted.handle > 0);
    let peer = accepted.peer.unwrap();
    assert_eq!(peer.ip(), std::net::Ipv4Addr::LOCALHOST);
    assert_ne!(peer.port(), 0);

    assert_eq!(bridge.send(client, &[0x01, 0x02, 0x03]), 3);
    assert_eq!(bridge.recv(accepted.handle, 3), Some(vec![0x01, 0x02, 0x03]));

    bridge.close(client);
    bridge.close(accepted.handle);
    bridge.close(server);
    bridge.clean_up();
}

#[test]
fn test_plain_send_recv() {
    let Some(bridge) = live_bridge() else { return };

    let server = bridge.create_socket();
    assert_eq!(bridge.bind(server, &loopback(0)), 0);
    let port = bridge.get_sock_name(server).unwrap().port();
    assert_eq!(bridge.listen(server, 1), 0);

    let client = bridge.create_socket();
    assert_eq!(bridge.connect(client, &loopback(port)), 0);
    let accepted = bridge.accept(server);

    assert_eq!(bridge.send(client, &[0x01, 0x02, 0x03]), 3);
    // Live mode hands out whole messages, so offer a full payload
    assert_eq!(bridge.recv(accepted.handle, 1316), Some(vec![0x01, 0x02, 0x03]));

    bridge.close(client);
    bridge.close(accepted.handle);
    bridge.close(server);
    bridge.clean_up();
}

#[test]
fn test_file_transfer() {
    let Some(bridge) = live_bridge() else { return };

    let dir = std::env::temp_dir();
    let src = dir.join(format!("srt-bridge-src-{}", std::process::id()));
    let dst = dir.join(format!("srt-bridge-dst-{}", std::process::id()));
    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    fs::write(&src, &payload).unwrap();
    let size = payload.len() as i64;

    let server = bridge.create_socket();
    assert_eq!(bridge.set_sockopt(server, 0, "TRANSTYPE", file_mode()), 0);
    assert_eq!(bridge.bind(server, &loopback(0)), 0);
    let port = bridge.get_sock_name(server).unwrap().port();
    assert_eq!(bridge.listen(server, 1), 0);

    let client = bridge.create_socket();
    assert_eq!(bridge.set_sockopt(client, 0, "TRANSTYPE", file_mode()), 0);

    let src_path = src.to_str().unwrap();
    let dst_path = dst.to_str().unwrap();
    thread::scope(|s| {
        let receiver = s.spawn(|| {
            let accepted = bridge.accept(server);
            let n = bridge.recv_file(accepted.handle, dst_path, 0, size, 7_320_000);
            bridge.close(accepted.handle);
            n
        });

        assert_eq!(bridge.connect(client, &loopback(port)), 0);
        assert_eq!(bridge.send_file(client, src_path, 0, size, 364_000), size);
        assert_eq!(receiver.join().unwrap(), size);
    });

    assert_eq!(fs::read(&dst).unwrap(), payload);

    bridge.close(client);
    bridge.close(server);
    bridge.clean_up();
    let _ = fs::remove_file(&src);
    let _ = fs::remove_file(&dst);
}
