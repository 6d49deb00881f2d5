// # Ownership Tagging
//
// Records managed by this provider carry a marker in their `comment`
// field: a fixed prefix followed by a JSON metadata object.
//
// Reading a comment yields one of three outcomes:
//
// - `NotManaged`: no prefix, the record belongs to someone else and is left alone
// - `Managed(metadata)`: prefix and parseable metadata
// - `Corrupt`: prefix present but the body does not parse; the record is
//   ours and gets removed on the next listing

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Comment prefix identifying managed records
pub const OWNERSHIP_PREFIX: &str = "external-dns:";

/// Metadata stored in a managed record's comment
///
/// Carries no fields yet. Unknown fields are ignored when reading, so
/// comments written by newer versions stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {}

/// Result of inspecting a record comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// Comment does not carry the prefix
    NotManaged,
    /// Comment carries valid metadata
    Managed(RecordMetadata),
    /// Comment carries the prefix but the metadata is unreadable
    Corrupt {
        /// Parse failure description
        reason: String,
    },
}

impl Ownership {
    /// Inspect a comment
    pub fn of(comment: &str) -> Self {
        let Some(body) = comment.strip_prefix(OWNERSHIP_PREFIX) else {
            return Ownership::NotManaged;
        };

        // Metadata is always a JSON object; serde would also accept `[]` for a fieldless struct
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                return Ownership::Corrupt {
                    reason: e.to_string(),
                };
            }
        };
        if !value.is_object() {
            return Ownership::Corrupt {
                reason: "metadata is not a JSON object".to_string(),
            };
        }

        match serde_json::from_value::<RecordMetadata>(value) {
            Ok(metadata) => Ownership::Managed(metadata),
            Err(e) => Ownership::Corrupt {
                reason: e.to_string(),
            },
        }
    }

    /// Whether the record is managed and intact
    pub fn is_managed(&self) -> bool {
        matches!(self, Ownership::Managed(_))
    }
}

/// Build the comment for a newly created record
pub fn tag(metadata: &RecordMetadata) -> Result<String> {
    let body = serde_json::to_string(metadata)?;
    Ok(format!("{OWNERSHIP_PREFIX}{body}"))
}
