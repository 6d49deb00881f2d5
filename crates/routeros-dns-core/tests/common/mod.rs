//! Test doubles and common utilities for contract tests
//!
//! Everything runs against [`MemoryRouter`]; [`RecordingStore`] sits between
//! the provider and the router store to observe what the engine asks for.

// Each contract test binary uses only a subset of these helpers
#![allow(dead_code)]

use routeros_dns_core::config::{ProviderConfig, RouterConfig};
use routeros_dns_core::error::Result;
use routeros_dns_core::record::{NativeRecord, fields};
use routeros_dns_core::store::{MemoryRouter, RouterStore};
use routeros_dns_core::traits::RecordStore;
use routeros_dns_core::{DomainFilter, RouterOsProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ADDRESS: &str = "192.168.88.1:8728";

pub const HEALTH: &str = "/system/resource/print";
pub const PRINT: &str = "/ip/dns/static/print";
pub const ADD: &str = "/ip/dns/static/add";
pub const REMOVE: &str = "/ip/dns/static/remove";

/// Minimal valid configuration
pub fn minimal_config() -> ProviderConfig {
    ProviderConfig::new(RouterConfig::new(ADDRESS, "admin", ""))
}

/// Router store on top of a memory router
pub fn router_store(router: &MemoryRouter) -> RouterStore {
    RouterStore::new(RouterConfig::new(ADDRESS, "admin", ""), Arc::new(router.clone()))
        .expect("valid router config")
}

/// Provider on top of a memory router
pub fn provider(router: &MemoryRouter) -> RouterOsProvider {
    RouterOsProvider::from_config(&minimal_config(), Arc::new(router.clone()))
        .expect("valid provider config")
}

/// Provider whose store calls are observed through a [`RecordingStore`]
pub fn recording_provider(router: &MemoryRouter) -> (RouterOsProvider, RecordingStore) {
    let recording = RecordingStore::new(router_store(router));
    let provider = RouterOsProvider::new(Box::new(recording.clone()), DomainFilter::default());
    (provider, recording)
}

/// A record carrying a valid ownership tag, as listed by the router (no type for A)
pub fn managed_a(name: &str, address: &str) -> NativeRecord {
    NativeRecord::new()
        .with(fields::NAME, name)
        .with(fields::ADDRESS, address)
        .with(fields::TTL, "1d")
        .with(fields::COMMENT, "external-dns:{}")
}

/// A managed MX record
pub fn managed_mx(name: &str, preference: &str, exchange: &str) -> NativeRecord {
    NativeRecord::new()
        .with(fields::TYPE, "MX")
        .with(fields::NAME, name)
        .with(fields::MX_PREFERENCE, preference)
        .with(fields::MX_EXCHANGE, exchange)
        .with(fields::TTL, "1d")
        .with(fields::COMMENT, "external-dns:{}")
}

/// A record with an arbitrary comment
pub fn commented_a(name: &str, comment: &str) -> NativeRecord {
    NativeRecord::new()
        .with(fields::NAME, name)
        .with(fields::ADDRESS, "10.0.0.1")
        .with(fields::TTL, "1d")
        .with(fields::COMMENT, comment)
}

/// Store wrapper that records every call before delegating
#[derive(Clone)]
pub struct RecordingStore {
    inner: Arc<RouterStore>,
    created: Arc<Mutex<Vec<NativeRecord>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    list_call_count: Arc<AtomicUsize>,
    health_call_count: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new(inner: RouterStore) -> Self {
        Self {
            inner: Arc::new(inner),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            health_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Records passed to `create`, including ones that failed
    pub fn created(&self) -> Vec<NativeRecord> {
        self.created.lock().unwrap().clone()
    }

    /// Ids passed to `delete`, including ones that failed
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn health_call_count(&self) -> usize {
        self.health_call_count.load(Ordering::SeqCst)
    }
}

impl RecordStore for RecordingStore {
    fn health(&self) -> Result<()> {
        self.health_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.health()
    }

    fn list(&self) -> Result<Vec<NativeRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.list()
    }

    fn create(&self, record: &NativeRecord) -> Result<()> {
        self.created.lock().unwrap().push(record.clone());
        self.inner.create(record)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(id.to_string());
        self.inner.delete(id)
    }
}
