//! Reconciliation engine
//!
//! The RouterOsProvider is responsible for:
//! - Normalizing desired endpoints (default TTL, ownership id)
//! - Applying change batches: every delete first, then every create
//! - Reading managed records back as endpoints
//! - Reporting router health
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ external-dns │─── Changes ───┐
//! └──────────────┘               │
//!                                ▼
//!                     ┌──────────────────┐
//!                     │ RouterOsProvider │
//!                     └──────────────────┘
//!                                │
//!              ┌─────────────────┼─────────────────┐
//!              │                 │                 │
//!              ▼                 ▼                 ▼
//!      ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//!      │    codec    │   │ RecordStore  │   │  Ownership  │
//!      │ (en/decode) │   │ (list/add/rm)│   │  (filter)   │
//!      └─────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. For each endpoint in `Delete` then `UpdateOld`: list, remove every
//!    record with the same (type, name)
//! 2. For each endpoint in `Create` then `UpdateNew`: encode each target,
//!    add each record
//! 3. Failures are counted and logged; iteration never stops early
//! 4. Any failure turns the whole call into `Error::ApplyFailed`

use std::sync::Arc;

use tracing::{Span, debug, error, info, warn};
use uuid::Uuid;

use crate::codec;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::filter::DomainFilter;
use crate::model::{Changes, DEFAULT_TTL_SECS, Endpoint, LABEL_ID};
use crate::store::RouterStore;
use crate::traits::{DnsProvider, RecordStore, RouterDialer};

/// Fill in provider defaults on desired endpoints
///
/// - A zero TTL becomes [`DEFAULT_TTL_SECS`]; RouterOS disables records with a zero TTL
/// - An endpoint without a [`LABEL_ID`] label gets a fresh random id
///
/// Running it again on its own output changes nothing.
pub fn normalize(mut endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    for endpoint in &mut endpoints {
        if endpoint.record_ttl == 0 {
            endpoint.record_ttl = DEFAULT_TTL_SECS;
        }
        endpoint
            .labels
            .entry(LABEL_ID.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string());
    }
    endpoints
}

/// external-dns provider for RouterOS static DNS
///
/// ## Lifecycle
///
/// 1. Create with [`RouterOsProvider::from_config()`] (or [`RouterOsProvider::new()`]
///    around any [`RecordStore`])
/// 2. Call the [`DnsProvider`] methods; each call is independent
///
/// ## Threading
///
/// Holds no mutable state. Concurrent calls each get their own router
/// connection from the store.
pub struct RouterOsProvider {
    /// Managed native records
    store: Box<dyn RecordStore>,

    /// Filter returned to external-dns
    domain_filter: DomainFilter,

    span: Span,
}

impl RouterOsProvider {
    /// Create a provider around a record store
    ///
    /// # Parameters
    ///
    /// - `store`: Record store implementation
    /// - `domain_filter`: Filter handed back to external-dns
    pub fn new(store: Box<dyn RecordStore>, domain_filter: DomainFilter) -> Self {
        Self {
            store,
            domain_filter,
            span: tracing::info_span!("provider"),
        }
    }

    /// Create a provider talking to a router
    ///
    /// Validates the whole configuration; no connection is opened.
    ///
    /// # Parameters
    ///
    /// - `config`: Router settings and domain filter
    /// - `dialer`: Opens router sessions
    ///
    /// # Returns
    ///
    /// - `Ok(RouterOsProvider)`: Ready to serve
    /// - `Err(Error::Config)`: Bad address, port or filter regex
    pub fn from_config(config: &ProviderConfig, dialer: Arc<dyn RouterDialer>) -> Result<Self> {
        config.validate()?;

        let domain_filter = DomainFilter::try_from(&config.domain_filter)?;
        let store = RouterStore::new(config.router.clone(), dialer)?;

        Ok(Self::new(Box::new(store), domain_filter))
    }

    /// Log under the given span instead of the default `provider` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Remove every managed record sharing the endpoint's (type, name)
    ///
    /// Targets are not compared: the whole set is replaced on recreate.
    fn delete_endpoint(&self, endpoint: &Endpoint) -> Result<()> {
        let key = endpoint.key();

        for record in self.store.list()? {
            if record.key() != key {
                continue;
            }
            let id = record
                .id()
                .ok_or_else(|| Error::transport(format!("listed record {key} has no id")))?;
            self.store.delete(id)?;
        }
        Ok(())
    }

    /// Add one record per target
    ///
    /// Every target is encoded before anything is sent, so a malformed or
    /// unsupported endpoint creates nothing.
    fn create_endpoint(&self, endpoint: &Endpoint) -> Result<()> {
        for record in codec::encode_endpoint(endpoint)? {
            self.store.create(&record)?;
        }
        Ok(())
    }
}

impl DnsProvider for RouterOsProvider {
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<Vec<Endpoint>> {
        let _enter = self.span.enter();
        debug!(count = endpoints.len(), "adjusting endpoints");

        Ok(normalize(endpoints))
    }

    fn apply_changes(&self, changes: &Changes) -> Result<()> {
        let _enter = self.span.enter();
        if changes.is_empty() {
            debug!("no changes to apply");
            return Ok(());
        }
        info!("applying changes");

        let mut failed = 0;

        for endpoint in changes.to_delete() {
            info!(
                record_type = %endpoint.record_type,
                name = %endpoint.dns_name,
                "deleting endpoint"
            );
            if let Err(e) = self.delete_endpoint(endpoint) {
                warn!(
                    record_type = %endpoint.record_type,
                    name = %endpoint.dns_name,
                    error = %e,
                    "failed to delete endpoint"
                );
                failed += 1;
            }
        }

        for endpoint in changes.to_create() {
            info!(
                record_type = %endpoint.record_type,
                name = %endpoint.dns_name,
                "creating endpoint"
            );
            if let Err(e) = self.create_endpoint(endpoint) {
                error!(
                    record_type = %endpoint.record_type,
                    name = %endpoint.dns_name,
                    error = %e,
                    "failed to create endpoint"
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::ApplyFailed { failed });
        }
        Ok(())
    }

    fn records(&self) -> Result<Vec<Endpoint>> {
        let _enter = self.span.enter();
        info!("fetching records");

        let records = self.store.list()?;
        codec::decode(&records)
    }

    fn health(&self) -> Result<()> {
        let _enter = self.span.enter();
        info!("performing health check");

        self.store.health().map_err(Error::health_check)
    }

    fn domain_filter(&self) -> &DomainFilter {
        &self.domain_filter
    }

    fn provider_name(&self) -> &'static str {
        "routeros"
    }
}
