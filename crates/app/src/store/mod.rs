//! Storage adapters for the pass, crossing and checkpoint repositories.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;
