// # Memory Router
//
// In-memory stand-in for a RouterOS device.
//
// ## Purpose
//
// Implements the transport seam without a network so the store and the
// engine can run end to end in tests and demos. It understands the four
// commands the store issues and behaves like the router where it matters:
//
// - ids are assigned as `*1`, `*2`, ... and never reused
// - the `type` field is dropped for A records, which RouterOS omits
// - `remove` of an unknown id is rejected
//
// ## Failure Injection
//
// Dialing, or any command path, can be made to fail on every call or on
// the n-th call only. Every command is recorded, including failed ones.
//
// ## Crash Behavior
//
// - All state is lost when the last clone is dropped
// - A connection that is never closed stays counted in `open_connections`

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::record::{DEFAULT_RECORD_TYPE, NativeRecord, fields};
use crate::store::router::{ADD_COMMAND, HEALTH_COMMAND, PRINT_COMMAND, REMOVE_COMMAND};
use crate::traits::{Reply, RouterConnection, RouterDialer};

#[derive(Debug, Default)]
struct State {
    records: Vec<NativeRecord>,
    next_id: u64,
    commands: Vec<Vec<String>>,
    calls: HashMap<String, usize>,
    failures: Vec<Failure>,
    fail_dial: bool,
    dials: usize,
    closes: usize,
    open: usize,
}

#[derive(Debug, Clone)]
struct Failure {
    path: String,
    // 1-based call number; None fails every call
    nth: Option<usize>,
}

impl State {
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("*{:X}", self.next_id)
    }
}

/// In-memory router
///
/// Clones share the same state, so a test can keep one handle for
/// inspection while the store owns another.
///
/// # Example
///
/// ```rust
/// use routeros_dns_core::config::RouterConfig;
/// use routeros_dns_core::store::{MemoryRouter, RouterStore};
/// use routeros_dns_core::traits::RecordStore;
/// use std::sync::Arc;
///
/// # fn main() -> routeros_dns_core::Result<()> {
/// let router = MemoryRouter::new();
/// let store = RouterStore::new(
///     RouterConfig::new("192.168.88.1:8728", "admin", ""),
///     Arc::new(router.clone()),
/// )?;
///
/// store.health()?;
/// assert_eq!(router.dial_count(), 1);
/// assert_eq!(router.open_connections(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRouter {
    inner: Arc<Mutex<State>>,
}

impl MemoryRouter {
    /// Create a router with no records
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.inner
            .lock()
            .map_err(|_| Error::transport("memory router state poisoned"))
    }

    // Inspection keeps working after a panicking test thread
    fn inspect(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a record as-is, bypassing `add`
    ///
    /// # Returns
    ///
    /// The id assigned to the record
    pub fn insert(&self, mut record: NativeRecord) -> String {
        let mut state = self.inspect();
        let id = state.assign_id();
        record.set(fields::ID, &id);
        state.records.push(record);
        id
    }

    /// Snapshot of every stored record, managed or not
    pub fn records(&self) -> Vec<NativeRecord> {
        self.inspect().records.clone()
    }

    /// Every command received, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.inspect().commands.clone()
    }

    /// Commands received for one path
    pub fn commands_for(&self, path: &str) -> Vec<Vec<String>> {
        self.inspect()
            .commands
            .iter()
            .filter(|words| words.first().is_some_and(|p| p == path))
            .cloned()
            .collect()
    }

    /// Number of dial attempts
    pub fn dial_count(&self) -> usize {
        self.inspect().dials
    }

    /// Number of closed connections
    pub fn close_count(&self) -> usize {
        self.inspect().closes
    }

    /// Connections dialed but not yet closed
    pub fn open_connections(&self) -> usize {
        self.inspect().open
    }

    /// Fail every call of a command path
    pub fn fail_command(&self, path: &str) {
        self.inspect().failures.push(Failure {
            path: path.to_string(),
            nth: None,
        });
    }

    /// Fail only the n-th call (1-based) of a command path
    pub fn fail_nth_command(&self, path: &str, n: usize) {
        self.inspect().failures.push(Failure {
            path: path.to_string(),
            nth: Some(n),
        });
    }

    /// Refuse new connections
    pub fn fail_dial(&self, fail: bool) {
        self.inspect().fail_dial = fail;
    }

    /// Remove every injected failure
    pub fn clear_failures(&self) {
        let mut state = self.inspect();
        state.failures.clear();
        state.fail_dial = false;
    }
}

impl RouterDialer for MemoryRouter {
    fn dial(&self, config: &RouterConfig) -> Result<Box<dyn RouterConnection>> {
        let mut state = self.state()?;
        state.dials += 1;

        if state.fail_dial {
            return Err(Error::transport(format!(
                "dial {}: connection refused",
                config.address
            )));
        }

        state.open += 1;
        Ok(Box::new(MemoryConnection {
            router: self.clone(),
            closed: false,
        }))
    }
}

/// A session on a [`MemoryRouter`]
#[derive(Debug)]
pub struct MemoryConnection {
    router: MemoryRouter,
    closed: bool,
}

impl RouterConnection for MemoryConnection {
    fn run(&mut self, words: &[String]) -> Result<Vec<Reply>> {
        if self.closed {
            return Err(Error::transport("connection closed"));
        }

        let Some((path, args)) = words.split_first() else {
            return Err(Error::transport("empty command"));
        };

        let mut state = self.router.state()?;
        state.commands.push(words.to_vec());

        let call = {
            let count = state.calls.entry(path.clone()).or_default();
            *count += 1;
            *count
        };
        let injected = state
            .failures
            .iter()
            .any(|f| f.path == *path && f.nth.is_none_or(|n| n == call));
        if injected {
            return Err(Error::transport(format!("{path}: failure injected")));
        }

        match path.as_str() {
            HEALTH_COMMAND => {
                let mut reply = Reply::new();
                reply.insert("board-name".to_string(), "memory".to_string());
                reply.insert("uptime".to_string(), "0s".to_string());
                Ok(vec![reply])
            }
            PRINT_COMMAND => Ok(state
                .records
                .iter()
                .map(|record| record.fields().clone())
                .collect()),
            ADD_COMMAND => {
                let mut record = NativeRecord::new();
                for (key, value) in args.iter().filter_map(|word| attribute(word)) {
                    record.set(key, value);
                }
                if record.record_type() == DEFAULT_RECORD_TYPE {
                    let mut fields = record.into_fields();
                    fields.remove(fields::TYPE);
                    record = NativeRecord::from_fields(fields);
                }

                let id = state.assign_id();
                record.set(fields::ID, id);
                state.records.push(record);
                Ok(Vec::new())
            }
            REMOVE_COMMAND => {
                let id = args
                    .iter()
                    .filter_map(|word| attribute(word))
                    .find(|(key, _)| *key == fields::ID)
                    .map(|(_, value)| value)
                    .ok_or_else(|| Error::transport("remove: missing .id"))?;

                let position = state
                    .records
                    .iter()
                    .position(|record| record.id() == Some(id))
                    .ok_or_else(|| Error::transport(format!("remove {id}: no such item")))?;
                state.records.remove(position);
                Ok(Vec::new())
            }
            other => Err(Error::transport(format!("{other}: no such command"))),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut state = self.router.state()?;
        state.closes += 1;
        state.open = state.open.saturating_sub(1);
        Ok(())
    }
}

// `=key=value` -> (key, value); bare flags like `=detail` yield nothing
fn attribute(word: &str) -> Option<(&str, &str)> {
    word.strip_prefix('=')?.split_once('=')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RouterConfig {
        RouterConfig::new("192.168.88.1:8728", "admin", "")
    }

    fn words(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_add_print_remove() {
        let router = MemoryRouter::new();
        let mut conn = router.dial(&config()).unwrap();

        conn.run(&words(&["/ip/dns/static/add", "=name=a.testing", "=type=A", "=address=127.0.0.1"]))
            .unwrap();
        conn.run(&words(&["/ip/dns/static/add", "=name=c.testing", "=type=CNAME", "=cname=a.testing"]))
            .unwrap();

        let listed = conn.run(&words(&["/ip/dns/static/print", "=detail"])).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].get(".id").map(String::as_str), Some("*1"));
        // RouterOS omits the default type
        assert!(!listed[0].contains_key("type"));
        assert_eq!(listed[1].get("type").map(String::as_str), Some("CNAME"));

        conn.run(&words(&["/ip/dns/static/remove", "=.id=*1"])).unwrap();
        assert_eq!(router.records().len(), 1);
        conn.close().unwrap();
    }

    #[test]
    fn test_remove_unknown_id_fails() {
        let router = MemoryRouter::new();
        let mut conn = router.dial(&config()).unwrap();
        let result = conn.run(&words(&["/ip/dns/static/remove", "=.id=*9"]));
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn test_unknown_command_fails() {
        let router = MemoryRouter::new();
        let mut conn = router.dial(&config()).unwrap();
        assert!(conn.run(&words(&["/interface/print"])).is_err());
        assert!(conn.run(&[]).is_err());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let router = MemoryRouter::new();
        let first = router.insert(NativeRecord::new().with("name", "a"));
        let mut conn = router.dial(&config()).unwrap();
        conn.run(&words(&["/ip/dns/static/remove", format!("=.id={first}").as_str()]))
            .unwrap();
        let second = router.insert(NativeRecord::new().with("name", "b"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_fail_nth_command() {
        let router = MemoryRouter::new();
        router.fail_nth_command("/system/resource/print", 2);
        let mut conn = router.dial(&config()).unwrap();
        let health = words(&["/system/resource/print"]);

        assert!(conn.run(&health).is_ok());
        assert!(conn.run(&health).is_err());
        assert!(conn.run(&health).is_ok());
        assert_eq!(router.commands_for("/system/resource/print").len(), 3);
    }

    #[test]
    fn test_fail_dial() {
        let router = MemoryRouter::new();
        router.fail_dial(true);
        assert!(router.dial(&config()).is_err());
        assert_eq!(router.dial_count(), 1);
        assert_eq!(router.open_connections(), 0);

        router.clear_failures();
        assert!(router.dial(&config()).is_ok());
        assert_eq!(router.open_connections(), 1);
    }

    #[test]
    fn test_closed_connection_rejects_commands() {
        let router = MemoryRouter::new();
        let mut conn = router.dial(&config()).unwrap();
        conn.close().unwrap();
        conn.close().unwrap();

        assert_eq!(router.close_count(), 1);
        assert!(conn.run(&words(&["/system/resource/print"])).is_err());
    }
}
