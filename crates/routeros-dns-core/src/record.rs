//! Native RouterOS static DNS records
//!
//! RouterOS describes a `/ip/dns/static` entry as a flat list of
//! `field=value` attributes. [`NativeRecord`] keeps that shape so records
//! round-trip through the router untouched; typed access lives in
//! [`crate::codec`].

use std::collections::BTreeMap;

use crate::model::RecordKey;

/// Field names used by `/ip/dns/static`
pub mod fields {
    pub const ID: &str = ".id";
    pub const TYPE: &str = "type";
    pub const NAME: &str = "name";
    pub const TTL: &str = "ttl";
    pub const COMMENT: &str = "comment";

    pub const ADDRESS: &str = "address";
    pub const CNAME: &str = "cname";
    pub const MX_PREFERENCE: &str = "mx-preference";
    pub const MX_EXCHANGE: &str = "mx-exchange";
    pub const NS: &str = "ns";
    pub const SRV_PRIORITY: &str = "srv-priority";
    pub const SRV_WEIGHT: &str = "srv-weight";
    pub const SRV_PORT: &str = "srv-port";
    pub const SRV_TARGET: &str = "srv-target";
    pub const TEXT: &str = "text";
}

/// Record type RouterOS assumes when `type` is omitted
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// One router record, one target of one endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeRecord {
    fields: BTreeMap<String, String>,
}

impl NativeRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a field map returned by the router
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Field value, empty when absent
    pub fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    /// Router-assigned id, present only on listed records
    pub fn id(&self) -> Option<&str> {
        self.get(fields::ID)
    }

    pub fn record_type(&self) -> &str {
        self.field(fields::TYPE)
    }

    pub fn name(&self) -> &str {
        self.field(fields::NAME)
    }

    pub fn ttl(&self) -> &str {
        self.field(fields::TTL)
    }

    pub fn comment(&self) -> &str {
        self.field(fields::COMMENT)
    }

    /// Fill in the type RouterOS leaves out for A records
    pub fn backfill_type(&mut self) {
        if self.record_type().is_empty() {
            self.set(fields::TYPE, DEFAULT_RECORD_TYPE);
        }
    }

    /// Correlation key, treating a missing type as A
    pub fn key(&self) -> RecordKey {
        let record_type = match self.record_type() {
            "" => DEFAULT_RECORD_TYPE,
            other => other,
        };
        RecordKey::new(record_type, self.name())
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    /// `=field=value` words for an `add` command
    ///
    /// The id is router-owned and never sent.
    pub fn attribute_words(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(key, _)| key.as_str() != fields::ID)
            .map(|(key, value)| format!("={key}={value}"))
            .collect()
    }
}
