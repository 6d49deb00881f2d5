//! Minimal embedding example for routeros-dns-core
//!
//! Runs one external-dns reconcile cycle against an in-memory router:
//! adjust desired endpoints, read current records, apply the difference,
//! read back. A real deployment swaps `MemoryRouter` for a RouterOS API
//! client implementing `RouterDialer`.
//!
//! Set `ROUTEROS_DNS_LOG_LEVEL` (error|warn|info|debug|trace) to change verbosity.
//! Router settings and the domain filter come from the usual
//! `EXTERNAL_DNS_ROUTEROS_PROVIDER_*` variables; the address defaults to
//! `192.168.88.1:8728` when unset.

use anyhow::Context;
use routeros_dns_core::config::ENV_PREFIX;
use routeros_dns_core::record::{NativeRecord, fields};
use routeros_dns_core::store::MemoryRouter;
use routeros_dns_core::{Changes, DnsProvider, Endpoint, ProviderConfig, RouterOsProvider};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "192.168.88.1:8728";

fn main() -> anyhow::Result<()> {
    let log_level = match std::env::var("ROUTEROS_DNS_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let address_var = format!("{ENV_PREFIX}ROUTEROS_ADDRESS");
    let config = ProviderConfig::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == address_var).then(|| DEFAULT_ADDRESS.to_string()))
    })
    .context("invalid provider configuration")?;

    // Seed the router with a record someone configured by hand and a
    // record left over from an earlier run
    let router = MemoryRouter::new();
    router.insert(
        NativeRecord::new()
            .with(fields::NAME, "printer.lan")
            .with(fields::ADDRESS, "192.168.88.20")
            .with(fields::TTL, "1d")
            .with(fields::COMMENT, "office printer"),
    );
    router.insert(
        NativeRecord::new()
            .with(fields::NAME, "old.testing")
            .with(fields::ADDRESS, "10.0.0.9")
            .with(fields::TTL, "1d")
            .with(fields::COMMENT, "external-dns:{}"),
    );

    let provider = RouterOsProvider::from_config(&config, Arc::new(router.clone()))?;
    provider.health()?;

    info!(
        filter = %serde_json::to_string(provider.domain_filter())?,
        "domain filter"
    );

    let desired = provider.adjust_endpoints(vec![
        Endpoint::new("a.testing", "A", ["127.0.0.1"]),
        Endpoint::new("www.testing", "CNAME", ["a.testing"]),
        Endpoint::new("testing", "MX", ["10 mail.testing"]),
    ])?;

    let current = provider.records()?;
    info!(count = current.len(), "current records");

    let changes = Changes {
        create: desired
            .iter()
            .filter(|d| !current.iter().any(|c| c.key() == d.key()))
            .cloned()
            .collect(),
        delete: current
            .iter()
            .filter(|c| !desired.iter().any(|d| d.key() == c.key()))
            .cloned()
            .collect(),
        ..Default::default()
    };
    provider.apply_changes(&changes)?;

    let after = provider.records()?;
    println!("{}", serde_json::to_string_pretty(&after)?);
    info!(
        managed = after.len(),
        total = router.records().len(),
        "reconcile complete"
    );

    Ok(())
}
