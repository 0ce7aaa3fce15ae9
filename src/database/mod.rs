pub mod manager;
pub mod memory;
pub mod postgres;

pub use manager::{DatabaseError, Session, Store};
pub use memory::{MemorySession, MemoryStore};
pub use postgres::PgStore;
