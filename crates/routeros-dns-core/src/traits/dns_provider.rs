// # DNS Provider Trait
//
// The contract external-dns drives through its webhook: adjust endpoints,
// apply a change batch, list records, report health and the domain filter.
//
// ## Implementations
//
// - RouterOS: [`crate::engine::RouterOsProvider`]
//
// ## Usage
//
// ```rust
// use routeros_dns_core::{Changes, DnsProvider, Endpoint, RouterOsProvider};
// use routeros_dns_core::config::ProviderConfig;
// use routeros_dns_core::config::RouterConfig;
// use routeros_dns_core::store::MemoryRouter;
// use std::sync::Arc;
//
// # fn main() -> routeros_dns_core::Result<()> {
// let config = ProviderConfig::new(RouterConfig::new("192.168.88.1:8728", "admin", ""));
// let provider = RouterOsProvider::from_config(&config, Arc::new(MemoryRouter::new()))?;
//
// let endpoints = provider.adjust_endpoints(vec![Endpoint::new("a.testing", "A", ["127.0.0.1"])])?;
// provider.apply_changes(&Changes { create: endpoints, ..Default::default() })?;
//
// assert_eq!(provider.records()?.len(), 1);
// # Ok(())
// # }
// ```

use crate::filter::DomainFilter;
use crate::model::{Changes, Endpoint};

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be usable from several threads at once. Each call
/// stands alone; no state is carried between calls.
///
/// # Retries
///
/// Providers never retry. A failed call returns an error and the caller
/// decides whether to try again on its next reconcile.
pub trait DnsProvider: Send + Sync {
    /// Prepare desired endpoints before external-dns computes a diff
    ///
    /// Fills in defaults the provider needs so that the desired state and
    /// the state read back by [`DnsProvider::records`] compare equal.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<Vec<Endpoint>, crate::Error>;

    /// Apply a change batch
    ///
    /// Every item is attempted even when earlier ones fail.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: every delete and create succeeded
    /// - `Err(Error::ApplyFailed { failed })`: `failed` items did not apply
    fn apply_changes(&self, changes: &Changes) -> Result<(), crate::Error>;

    /// Current managed records as endpoints
    fn records(&self) -> Result<Vec<Endpoint>, crate::Error>;

    /// Check that the backing DNS server is reachable
    fn health(&self) -> Result<(), crate::Error>;

    /// Domains external-dns should restrict itself to
    fn domain_filter(&self) -> &DomainFilter;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
