//! Pass issuing, checkpoint crossings and lifecycle sweeping on top of the
//! `passage` core, with `PostgreSQL` and in-memory storage.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;
pub mod shutdown;
pub mod store;

#[cfg(test)]
mod test;
