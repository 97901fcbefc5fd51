//! # stateless-core
//!
//! Core crate for Stateless Media. Contains the unified error system,
//! configuration schemas, the capability traits implemented by the
//! storage and database crates, and the shared response envelope.
//!
//! This crate has **no** internal dependencies on other Stateless crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
