//! Contract Test: Connection Discipline
//!
//! This test verifies how router connections are opened and released.
//!
//! Constraints verified:
//! - Nothing is dialed until a command runs
//! - Each store call opens exactly one connection and closes it
//! - Connections are closed on error paths too
//! - Nested sessions reuse the outer connection and leave it open
//!
//! If this test fails, the provider leaks router sessions.

mod common;

use common::*;
use routeros_dns_core::store::MemoryRouter;
use routeros_dns_core::traits::{DnsProvider, RecordStore};
use routeros_dns_core::{Changes, Endpoint, Error};

#[test]
fn construction_does_not_dial() {
    let router = MemoryRouter::new();
    let _provider = provider(&router);
    let _store = router_store(&router);

    assert_eq!(router.dial_count(), 0);
}

#[test]
fn each_store_call_uses_one_connection() {
    let router = MemoryRouter::new();
    let store = router_store(&router);

    store.health().expect("health succeeds");
    store.list().expect("list succeeds");
    store
        .create(&managed_a("a.testing", "127.0.0.1"))
        .expect("create succeeds");

    assert_eq!(router.dial_count(), 3);
    assert_eq!(router.close_count(), 3);
    assert_eq!(router.open_connections(), 0);
}

#[test]
fn connection_closed_when_command_fails() {
    let router = MemoryRouter::new();
    router.fail_command(PRINT);
    let store = router_store(&router);

    assert!(store.list().is_err());
    assert!(store.health().is_ok());

    assert_eq!(router.dial_count(), 2);
    assert_eq!(router.open_connections(), 0);
}

#[test]
fn failed_dial_propagates_transport_error() {
    let router = MemoryRouter::new();
    router.fail_dial(true);
    let store = router_store(&router);

    let result = store.list();

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(router.close_count(), 0);
    assert_eq!(router.open_connections(), 0);
}

#[test]
fn nested_session_does_not_close_outer() {
    let router = MemoryRouter::new();
    router.insert(managed_a("a.testing", "127.0.0.1"));
    let store = router_store(&router);

    let mut outer = store.session();
    {
        let mut inner = outer.nested().expect("outer connection opens");
        let records = inner.list().expect("list succeeds");
        let id = records[0].id().expect("listed record has an id").to_string();
        inner.delete(&id).expect("delete succeeds");
    }
    assert!(outer.is_connected());
    assert_eq!(router.close_count(), 0);

    outer.health().expect("health succeeds");
    drop(outer);

    assert_eq!(router.dial_count(), 1);
    assert_eq!(router.close_count(), 1);
    assert!(router.records().is_empty());
}

#[test]
fn apply_changes_releases_every_connection() {
    let router = MemoryRouter::new();
    router.insert(managed_a("old.testing", "127.0.0.1"));
    router.fail_nth_command(ADD, 1);
    let provider = provider(&router);

    let result = provider.apply_changes(&Changes {
        delete: vec![Endpoint::new("old.testing", "A", ["127.0.0.1"])],
        create: vec![
            Endpoint::new("a.testing", "A", ["127.0.0.2"]),
            Endpoint::new("b.testing", "A", ["127.0.0.3"]),
        ],
        ..Default::default()
    });

    assert!(matches!(result, Err(Error::ApplyFailed { failed: 1 })));
    assert!(router.dial_count() > 0);
    assert_eq!(router.open_connections(), 0);
    assert_eq!(router.dial_count(), router.close_count());
}

#[test]
fn records_always_refetch() {
    let router = MemoryRouter::new();
    let provider = provider(&router);

    assert!(provider.records().expect("records succeed").is_empty());
    router.insert(managed_a("a.testing", "127.0.0.1"));
    assert_eq!(provider.records().expect("records succeed").len(), 1);

    assert_eq!(router.commands_for(PRINT).len(), 2);
}
