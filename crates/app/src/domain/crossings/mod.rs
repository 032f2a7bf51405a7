//! Crossings

pub mod data;
pub mod errors;
mod repository;
pub mod service;

pub use errors::CrossingsServiceError;
pub use repository::*;
pub use service::*;
