// # Router Store
//
// Managed static DNS records on a RouterOS device.
//
// ## Connection Discipline
//
// Every call runs inside a [`Session`]. A session dials on first use and
// closes the connection when it is dropped, whether the call succeeded or
// not. A session created with [`Session::nested`] reuses the outer
// connection and leaves it open, so inner calls never reconnect.
//
// ## Ownership Filtering
//
// `list` only returns records carrying this provider's ownership tag.
// Foreign records are skipped. Records whose tag is present but unreadable
// are removed on the same connection before `list` returns; if removal
// fails the whole listing fails.

use std::sync::Arc;

use tracing::{Span, debug, info};

use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::ownership::Ownership;
use crate::record::{NativeRecord, fields};
use crate::traits::{RecordStore, Reply, RouterConnection, RouterDialer};

/// Introspection command used for health checks
pub const HEALTH_COMMAND: &str = "/system/resource/print";
/// Lists every static DNS record
pub const PRINT_COMMAND: &str = "/ip/dns/static/print";
/// Adds one static DNS record
pub const ADD_COMMAND: &str = "/ip/dns/static/add";
/// Removes one static DNS record by id
pub const REMOVE_COMMAND: &str = "/ip/dns/static/remove";

/// Record store backed by a RouterOS device
pub struct RouterStore {
    config: RouterConfig,
    dialer: Arc<dyn RouterDialer>,
    span: Span,
}

impl std::fmt::Debug for RouterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RouterStore {
    /// Create a store
    ///
    /// Validates the router address; no connection is opened.
    ///
    /// # Parameters
    ///
    /// - `config`: Router address and credentials
    /// - `dialer`: Opens router sessions
    pub fn new(config: RouterConfig, dialer: Arc<dyn RouterDialer>) -> Result<Self> {
        config.validate()?;

        let span = tracing::info_span!("router_store", address = %config.address);
        Ok(Self {
            config,
            dialer,
            span,
        })
    }

    /// Log under the given span instead of the default `router_store` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Start a session; nothing is dialed until the first command
    pub fn session(&self) -> Session<'_> {
        Session {
            store: self,
            slot: Slot::Idle,
        }
    }
}

impl RecordStore for RouterStore {
    fn health(&self) -> Result<()> {
        self.session().health()
    }

    fn list(&self) -> Result<Vec<NativeRecord>> {
        self.session().list()
    }

    fn create(&self, record: &NativeRecord) -> Result<()> {
        self.session().create(record)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.session().delete(id)
    }
}

enum Slot<'a> {
    Idle,
    Owned(Box<dyn RouterConnection>),
    Borrowed(&'a mut (dyn RouterConnection + 'static)),
}

/// A scoped router connection
///
/// Dials lazily and closes on drop, but only a connection it opened itself.
pub struct Session<'a> {
    store: &'a RouterStore,
    slot: Slot<'a>,
}

impl Session<'_> {
    /// Whether this session currently holds a connection
    pub fn is_connected(&self) -> bool {
        !matches!(self.slot, Slot::Idle)
    }

    /// A session sharing this session's connection
    ///
    /// Opens the connection first if needed. Dropping the nested session
    /// leaves the connection open.
    pub fn nested(&mut self) -> Result<Session<'_>> {
        let store = self.store;
        let conn = self.connection()?;
        Ok(Session {
            store,
            slot: Slot::Borrowed(conn),
        })
    }

    fn connection(&mut self) -> Result<&mut (dyn RouterConnection + 'static)> {
        if let Slot::Idle = self.slot {
            let _enter = self.store.span.enter();
            debug!("opening router connection");
            self.slot = Slot::Owned(self.store.dialer.dial(&self.store.config)?);
        }

        match &mut self.slot {
            Slot::Owned(conn) => Ok(conn.as_mut()),
            Slot::Borrowed(conn) => Ok(&mut **conn),
            Slot::Idle => Err(Error::transport("router connection not open")),
        }
    }

    fn run(&mut self, words: Vec<String>) -> Result<Vec<Reply>> {
        self.connection()?.run(&words)
    }

    /// Issue the introspection command
    pub fn health(&mut self) -> Result<()> {
        self.run(vec![HEALTH_COMMAND.to_string()]).map(|_| ())
    }

    /// Fetch managed records, removing any with a corrupt ownership tag
    pub fn list(&mut self) -> Result<Vec<NativeRecord>> {
        let replies = self.run(vec![PRINT_COMMAND.to_string(), "=detail".to_string()])?;

        let span = self.store.span.clone();
        let _enter = span.enter();

        let mut managed = Vec::with_capacity(replies.len());
        let mut corrupt = Vec::new();

        for reply in replies {
            let mut record = NativeRecord::from_fields(reply);
            match Ownership::of(record.comment()) {
                Ownership::NotManaged => {
                    debug!(id = record.id().unwrap_or_default(), "ignoring unmanaged record");
                }
                Ownership::Corrupt { reason } => {
                    debug!(
                        id = record.id().unwrap_or_default(),
                        reason = %reason,
                        "removing record with corrupt ownership tag"
                    );
                    corrupt.push(record);
                }
                Ownership::Managed(_) => {
                    record.backfill_type();
                    managed.push(record);
                }
            }
        }

        if !corrupt.is_empty() {
            let mut inner = self.nested()?;
            for record in &corrupt {
                let id = record
                    .id()
                    .ok_or_else(|| Error::transport("listed record has no id"))?;
                inner.delete(id)?;
            }
        }

        Ok(managed)
    }

    /// Add one record
    pub fn create(&mut self, record: &NativeRecord) -> Result<()> {
        {
            let _enter = self.store.span.enter();
            info!(
                record_type = record.record_type(),
                name = record.name(),
                "creating record"
            );
        }

        let mut words = vec![ADD_COMMAND.to_string()];
        words.extend(record.attribute_words());
        self.run(words).map(|_| ())
    }

    /// Remove one record by id
    pub fn delete(&mut self, id: &str) -> Result<()> {
        {
            let _enter = self.store.span.enter();
            info!(id, "deleting record");
        }

        self.run(vec![
            REMOVE_COMMAND.to_string(),
            format!("={}={id}", fields::ID),
        ])
        .map(|_| ())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Slot::Owned(mut conn) = std::mem::replace(&mut self.slot, Slot::Idle) {
            let _enter = self.store.span.enter();
            match conn.close() {
                Ok(()) => debug!("router connection closed"),
                Err(e) => debug!(error = %e, "closing router connection failed"),
            }
        }
    }
}
