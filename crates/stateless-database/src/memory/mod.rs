//! In-process store implementations.
//!
//! Selected with `database.provider = "memory"`; state lives for the life
//! of the process.

pub mod job;
pub mod media;
pub mod option;

pub use job::MemoryJobStore;
pub use media::MemoryMediaLibrary;
pub use option::MemoryOptionStore;
