//! Single-attachment synchronization and its persisted bookkeeping.

pub mod processor;
pub mod progress;
pub mod registry;

pub use processor::AttachmentProcessor;
pub use progress::ProgressMarker;
pub use registry::FailedAttachmentRegistry;
