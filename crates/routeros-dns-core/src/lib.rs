// # routeros-dns-core
//
// Core library for an external-dns provider backed by RouterOS static DNS.
//
// ## Architecture Overview
//
// This library turns external-dns endpoints into RouterOS records and back:
// - **codec**: Endpoint target <-> native record fields, per record type
// - **ownership**: Comment tag marking records this provider manages
// - **RecordStore**: Managed records on the router (list, create, delete)
// - **RouterOsProvider**: Applies change batches, reads records, reports health
// - **DomainFilter**: Include/exclude rules handed back to external-dns
//
// ## Design Principles
//
// 1. **Foreign records are untouchable**: anything without the ownership tag is skipped
// 2. **Delete before create**: a batch never leaves duplicates for the same name and type
// 3. **Best effort batches**: one failed item never stops the rest
// 4. **Scoped connections**: every call opens and closes its own router session
// 5. **Library-First**: no global logging or runtime state; spans are injected

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod ownership;
pub mod record;
pub mod store;
pub mod traits;
pub mod ttl;

// Re-export core types for convenience
pub use config::{DomainFilterConfig, ProviderConfig, RouterConfig};
pub use engine::{RouterOsProvider, normalize};
pub use error::{Error, Result};
pub use filter::DomainFilter;
pub use model::{Changes, Endpoint, RecordKey};
pub use ownership::Ownership;
pub use record::NativeRecord;
pub use store::{MemoryRouter, RouterStore};
pub use traits::{DnsProvider, RecordStore, RouterConnection, RouterDialer};
