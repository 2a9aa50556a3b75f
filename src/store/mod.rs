//! Persistence layer: the "tour completed" flag and nothing else.

pub mod libsql_backend;
pub mod memory;
pub mod traits;

pub use libsql_backend::LibSqlFlagStore;
pub use memory::MemoryFlagStore;
pub use traits::FlagStore;
