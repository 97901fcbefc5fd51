//! PostgreSQL store implementations.

pub mod attachment;
pub mod job;
pub mod option;

pub use attachment::AttachmentRepository;
pub use job::JobRepository;
pub use option::OptionRepository;
