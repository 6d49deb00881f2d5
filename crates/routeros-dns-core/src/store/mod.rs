//! Record store implementations
//!
//! - [`RouterStore`]: managed records on a router, reached through a [`crate::traits::RouterDialer`]
//! - [`MemoryRouter`]: in-memory router for tests and demos

pub mod memory;
pub mod router;

pub use memory::{MemoryConnection, MemoryRouter};
pub use router::{RouterStore, Session};
