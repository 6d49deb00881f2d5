// # Data Model
//
// Logical DNS records as exchanged with external-dns.
//
// The JSON field names follow the external-dns webhook wire format
// (`dnsName`, `recordType`, `recordTTL`, ...) so these types can be handed
// to and from a transport layer without a translation step.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label under which each endpoint carries its ownership id
pub const LABEL_ID: &str = "external-dns-routeros-provider/id";

/// TTL assigned to endpoints that arrive without one (24h)
///
/// RouterOS treats a zero TTL as "disabled", so it is never sent.
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Provider specific key/value attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

/// A logical DNS record
///
/// One endpoint maps to one native router record per target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified record name
    pub dns_name: String,

    /// Record values, one native record per entry
    #[serde(default)]
    pub targets: Vec<String>,

    /// Record type as sent by external-dns ("A", "MX", ...)
    pub record_type: String,

    /// Disambiguates records with identical name, type and target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// TTL in seconds, 0 means unset
    #[serde(rename = "recordTTL", default)]
    pub record_ttl: u64,

    /// Labels, including [`LABEL_ID`] once normalized
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Opaque provider specific properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

impl Endpoint {
    /// Create an endpoint with no TTL and no labels
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            record_type: record_type.into(),
            set_identifier: None,
            record_ttl: 0,
            labels: BTreeMap::new(),
            provider_specific: Vec::new(),
        }
    }

    /// Set the TTL in seconds
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.record_ttl = ttl;
        self
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The correlation key of this endpoint
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.record_type, &self.dns_name)
    }
}

/// (record type, name) pair linking endpoints to native records
///
/// Not unique: a multi-target endpoint owns several native records with
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Record type
    pub record_type: String,
    /// Record name
    pub name: String,
}

impl RecordKey {
    pub fn new(record_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.record_type, self.name)
    }
}

/// A change batch computed by external-dns
///
/// Updates arrive as old/new pairs; the engine deletes every old version
/// and creates every new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    /// Records to create
    #[serde(rename = "Create", default, deserialize_with = "null_as_empty")]
    pub create: Vec<Endpoint>,

    /// Previous versions of updated records
    #[serde(rename = "UpdateOld", default, deserialize_with = "null_as_empty")]
    pub update_old: Vec<Endpoint>,

    /// New versions of updated records
    #[serde(rename = "UpdateNew", default, deserialize_with = "null_as_empty")]
    pub update_new: Vec<Endpoint>,

    /// Records to delete
    #[serde(rename = "Delete", default, deserialize_with = "null_as_empty")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Endpoints whose native records must be removed, in batch order
    pub fn to_delete(&self) -> impl Iterator<Item = &Endpoint> {
        self.delete.iter().chain(self.update_old.iter())
    }

    /// Endpoints whose native records must be added, in batch order
    pub fn to_create(&self) -> impl Iterator<Item = &Endpoint> {
        self.create.iter().chain(self.update_new.iter())
    }

    /// Whether the batch holds no work
    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty()
    }
}

// external-dns serializes empty slices as `null`
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Endpoint>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Endpoint>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_json_names() {
        let json = r#"{
            "dnsName": "a.testing",
            "targets": ["127.0.0.1"],
            "recordType": "A",
            "recordTTL": 300,
            "labels": {"owner": "default"}
        }"#;

        let endpoint: Endpoint = serde_json::from_str(json).unwrap();
        assert_eq!(endpoint.dns_name, "a.testing");
        assert_eq!(endpoint.record_type, "A");
        assert_eq!(endpoint.record_ttl, 300);
        assert_eq!(endpoint.labels.get("owner").map(String::as_str), Some("default"));
        assert!(endpoint.set_identifier.is_none());
    }

    #[test]
    fn test_endpoint_missing_ttl_defaults_to_zero() {
        let json = r#"{"dnsName": "a.testing", "targets": [], "recordType": "A"}"#;
        let endpoint: Endpoint = serde_json::from_str(json).unwrap();
        assert_eq!(endpoint.record_ttl, 0);
        assert!(endpoint.labels.is_empty());
    }

    #[test]
    fn test_changes_null_lists() {
        let json = r#"{"Create": null, "UpdateOld": [], "UpdateNew": null, "Delete": [
            {"dnsName": "old.testing", "targets": ["1.1.1.1"], "recordType": "A"}
        ]}"#;

        let changes: Changes = serde_json::from_str(json).unwrap();
        assert!(changes.create.is_empty());
        assert_eq!(changes.delete.len(), 1);
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_changes_pass_order() {
        let changes = Changes {
            create: vec![Endpoint::new("c.testing", "A", ["1.1.1.1"])],
            update_old: vec![Endpoint::new("u.testing", "A", ["2.2.2.2"])],
            update_new: vec![Endpoint::new("u.testing", "A", ["3.3.3.3"])],
            delete: vec![Endpoint::new("d.testing", "A", ["4.4.4.4"])],
        };

        let deletes: Vec<_> = changes.to_delete().map(|e| e.dns_name.as_str()).collect();
        assert_eq!(deletes, vec!["d.testing", "u.testing"]);

        let creates: Vec<_> = changes
            .to_create()
            .map(|e| e.targets[0].as_str())
            .collect();
        assert_eq!(creates, vec!["1.1.1.1", "3.3.3.3"]);
    }

    #[test]
    fn test_record_key_display() {
        let key = Endpoint::new("mx.testing", "MX", ["10 mail.testing"]).key();
        assert_eq!(key.to_string(), "MX::mx.testing");
    }
}
