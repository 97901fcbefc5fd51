//! # stateless-database
//!
//! PostgreSQL connection management and the stores behind the job
//! controller and attachment processor: job records, keyed options, and
//! the media library table. Each store also has an in-memory
//! implementation used by tests and single-process runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::JobStore;
