//! Passes

pub mod data;
pub mod errors;
mod repository;
pub mod service;

pub use errors::PassesServiceError;
pub use repository::*;
pub use service::*;
