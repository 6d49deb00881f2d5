//! Core traits for the RouterOS DNS provider
//!
//! This module defines the abstract interfaces between the layers.
//!
//! - [`RouterDialer`] / [`RouterConnection`]: Run API commands on a router
//! - [`RecordStore`]: Managed native records (list, create, delete)
//! - [`DnsProvider`]: The external-dns facing contract

pub mod dns_provider;
pub mod record_store;
pub mod router;

pub use dns_provider::DnsProvider;
pub use record_store::RecordStore;
pub use router::{Reply, RouterConnection, RouterDialer};
