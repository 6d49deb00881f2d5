// # Router Transport Traits
//
// The seam between the record store and whatever speaks the RouterOS API.
//
// A command is a list of words: the command path first, then `=field=value`
// attributes. A reply is the list of `!re` sentences the router returned,
// each a flat field map.
//
// ## Implementations
//
// - In-memory: [`crate::store::MemoryRouter`]
// - Wire protocol clients live outside this crate
//
// ## Usage
//
// ```rust
// use routeros_dns_core::config::RouterConfig;
// use routeros_dns_core::store::MemoryRouter;
// use routeros_dns_core::traits::RouterDialer;
//
// # fn main() -> routeros_dns_core::Result<()> {
// let router = MemoryRouter::new();
// let config = RouterConfig::new("192.168.88.1:8728", "admin", "");
//
// let mut conn = router.dial(&config)?;
// let replies = conn.run(&["/system/resource/print".to_string()])?;
// assert_eq!(replies.len(), 1);
// conn.close()?;
// # Ok(())
// # }
// ```

use std::collections::BTreeMap;

use crate::config::RouterConfig;

/// One reply sentence: field name to value
pub type Reply = BTreeMap<String, String>;

/// An open API session on a router
///
/// Not safe for concurrent use: one command at a time, in order.
pub trait RouterConnection: Send {
    /// Run a command and collect its reply sentences
    ///
    /// # Parameters
    ///
    /// - `words`: command path followed by attribute words
    ///
    /// # Returns
    ///
    /// - `Ok(replies)`: one map per returned record (empty for `add`/`remove`)
    /// - `Err(Error::Transport)`: router unreachable or command rejected
    fn run(&mut self, words: &[String]) -> Result<Vec<Reply>, crate::Error>;

    /// Close the session
    fn close(&mut self) -> Result<(), crate::Error>;
}

/// Opens router sessions
///
/// Shared by every call of a store; each call dials its own session.
pub trait RouterDialer: Send + Sync {
    /// Open a session with the given settings
    ///
    /// # Returns
    ///
    /// - `Ok(connection)`: an authenticated session
    /// - `Err(Error)`: the router could not be reached or refused the login
    fn dial(&self, config: &RouterConfig) -> Result<Box<dyn RouterConnection>, crate::Error>;
}
