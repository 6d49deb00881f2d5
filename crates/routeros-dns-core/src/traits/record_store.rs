// # Record Store Trait
//
// Native record access as the reconciliation engine sees it.
//
// The store only ever hands out records this provider owns: foreign records
// are filtered out and records with corrupt ownership tags are cleaned up
// during `list`.

use crate::record::NativeRecord;

/// Access to the router's managed static DNS records
pub trait RecordStore: Send + Sync {
    /// Check that the router answers
    fn health(&self) -> Result<(), crate::Error>;

    /// Fetch all managed records
    ///
    /// Always re-fetches; nothing is cached between calls.
    ///
    /// # Returns
    ///
    /// - `Ok(records)`: managed records in listing order, type backfilled
    /// - `Err(Error)`: listing failed, or removing a corrupt record failed
    fn list(&self) -> Result<Vec<NativeRecord>, crate::Error>;

    /// Add one record
    fn create(&self, record: &NativeRecord) -> Result<(), crate::Error>;

    /// Remove one record by its router-assigned id
    fn delete(&self, id: &str) -> Result<(), crate::Error>;
}
