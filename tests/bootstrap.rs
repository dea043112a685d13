//! Bootstrap scenarios against a scripted compositor on a socketpair.
//!
//! The codec is direction-agnostic, so the mock server uses the same crate:
//! it parses the client's requests with `parse_message` and answers with
//! typed events.

use std::os::unix::net::UnixStream;
use std::thread;

use wayland_wire::interfaces::{
    wl_callback, wl_display, wl_registry, WL_COMPOSITOR_INTERFACE, WL_SHM_INTERFACE,
};
use wayland_wire::{
    parse_message, register_globals, BindError, Connection, IdPool, DISPLAY_ID,
};

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pair() -> (Connection, Connection) {
    let (a, b) = UnixStream::pair().unwrap();
    (Connection::from_stream(a), Connection::from_stream(b))
}

/// Reads the two handshake requests and returns (registry_id, callback_id).
fn expect_handshake(server: &mut Connection) -> (u32, u32) {
    let (header, body) = server.recv().unwrap();
    assert_eq!(header.object_id, DISPLAY_ID);
    let registry = match parse_message::<wl_display::Request>(header, body).unwrap() {
        wl_display::Request::GetRegistry { registry } => registry,
        other => panic!("expected get_registry, got {other:?}"),
    };

    let (header, body) = server.recv().unwrap();
    assert_eq!(header.object_id, DISPLAY_ID);
    let callback = match parse_message::<wl_display::Request>(header, body).unwrap() {
        wl_display::Request::Sync { callback } => callback,
        other => panic!("expected sync, got {other:?}"),
    };

    (registry, callback)
}

#[test]
fn binds_required_globals_in_input_order() {
    init_log();
    let (mut client, mut server) = pair();

    let server_thread = thread::spawn(move || {
        let (registry, callback) = expect_handshake(&mut server);

        server
            .send(
                registry,
                &wl_registry::Event::Global { name: 1, interface: "wl_compositor", version: 5 },
            )
            .unwrap();
        server
            .send(registry, &wl_registry::Event::Global { name: 2, interface: "wl_shm", version: 1 })
            .unwrap();
        // a global nobody asked for
        server
            .send(registry, &wl_registry::Event::Global { name: 3, interface: "wl_output", version: 4 })
            .unwrap();
        server.send(callback, &wl_callback::Event::Done { callback_data: 0 }).unwrap();

        // both binds arrive after the replay, echoing the advertised names
        let mut binds = Vec::new();
        for _ in 0..2 {
            let (header, body) = server.recv().unwrap();
            assert_eq!(header.object_id, registry);
            match parse_message::<wl_registry::Request>(header, body).unwrap() {
                wl_registry::Request::Bind { name, interface, version, id } => {
                    binds.push((name, interface.to_owned(), version, id));
                }
            }
        }
        binds
    });

    let mut ids = IdPool::new();
    let bound = register_globals(
        &mut client,
        &mut ids,
        &[&WL_SHM_INTERFACE, &WL_COMPOSITOR_INTERFACE],
    )
    .unwrap();

    let binds = server_thread.join().unwrap();

    // registry and callback ids came first, then one id per matched global
    assert_eq!(bound.len(), 2);
    let shm_id = bound[0].expect("wl_shm was advertised");
    let compositor_id = bound[1].expect("wl_compositor was advertised");
    assert!(shm_id >= 4 && compositor_id >= 4);
    assert_ne!(shm_id, compositor_id);

    assert_eq!(binds.len(), 2);
    assert_eq!(binds[0], (1, "wl_compositor".to_owned(), WL_COMPOSITOR_INTERFACE.version, compositor_id));
    assert_eq!(binds[1], (2, "wl_shm".to_owned(), WL_SHM_INTERFACE.version, shm_id));
}

#[test]
fn missing_globals_are_reported_as_none() {
    init_log();
    let (mut client, mut server) = pair();

    let server_thread = thread::spawn(move || {
        let (registry, callback) = expect_handshake(&mut server);
        server
            .send(registry, &wl_registry::Event::Global { name: 1, interface: "wl_shm", version: 1 })
            .unwrap();
        server.send(callback, &wl_callback::Event::Done { callback_data: 0 }).unwrap();
        let _ = server.recv().unwrap(); // the single bind
    });

    let mut ids = IdPool::new();
    let bound = register_globals(
        &mut client,
        &mut ids,
        &[&WL_COMPOSITOR_INTERFACE, &WL_SHM_INTERFACE],
    )
    .unwrap();
    server_thread.join().unwrap();

    assert_eq!(bound[0], None);
    assert!(bound[1].is_some());
}

#[test]
fn outdated_compositor_version_aborts() {
    init_log();
    let (mut client, mut server) = pair();

    let server_thread = thread::spawn(move || {
        let (registry, callback) = expect_handshake(&mut server);
        server
            .send(registry, &wl_registry::Event::Global { name: 1, interface: "wl_shm", version: 0 })
            .unwrap();
        server.send(callback, &wl_callback::Event::Done { callback_data: 0 }).unwrap();
    });

    let mut ids = IdPool::new();
    let err = register_globals(&mut client, &mut ids, &[&WL_SHM_INTERFACE]).unwrap_err();
    server_thread.join().unwrap();

    match err {
        BindError::IncompatibleVersion { interface, advertised, required } => {
            assert_eq!(interface, "wl_shm");
            assert_eq!(advertised, 0);
            assert_eq!(required, WL_SHM_INTERFACE.version);
        }
        other => panic!("expected IncompatibleVersion, got {other:?}"),
    }
}

#[test]
fn delete_id_during_bootstrap_recycles_the_id() {
    init_log();
    let (mut client, mut server) = pair();

    let server_thread = thread::spawn(move || {
        let (registry, callback) = expect_handshake(&mut server);
        // the server retires an id mid-handshake
        server.send(DISPLAY_ID, &wl_display::Event::DeleteId { id: 2 }).unwrap();
        server
            .send(registry, &wl_registry::Event::Global { name: 1, interface: "wl_shm", version: 1 })
            .unwrap();
        server.send(callback, &wl_callback::Event::Done { callback_data: 0 }).unwrap();
        let _ = server.recv().unwrap();
    });

    let mut ids = IdPool::new();
    let bound = register_globals(&mut client, &mut ids, &[&WL_SHM_INTERFACE]).unwrap();
    server_thread.join().unwrap();

    // ids 2 and 3 went to the registry and callback, 4 to the bind... unless
    // the recycled id 2 was reused for it
    assert_eq!(bound[0], Some(2));
    // the recycled id is handed out again before any fresh one
    assert_eq!(ids.create(), 4);
}

#[test]
fn unrelated_events_are_skipped() {
    init_log();
    let (mut client, mut server) = pair();

    let server_thread = thread::spawn(move || {
        let (registry, callback) = expect_handshake(&mut server);
        // an event for an object the bootstrap knows nothing about
        server.send(99, &wl_callback::Event::Done { callback_data: 7 }).unwrap();
        server
            .send(registry, &wl_registry::Event::GlobalRemove { name: 12 })
            .unwrap();
        server.send(callback, &wl_callback::Event::Done { callback_data: 0 }).unwrap();
    });

    let mut ids = IdPool::new();
    let bound = register_globals(&mut client, &mut ids, &[&WL_SHM_INTERFACE]).unwrap();
    server_thread.join().unwrap();

    assert_eq!(bound, vec![None]);
}
