//! Capability traits defined in `stateless-core` and implemented by other
//! crates. Services receive these as `Arc<dyn ...>` at construction.

pub mod job_handler;
pub mod media;
pub mod object_store;
pub mod options;

pub use job_handler::{JobHandler, RemoteResponse};
pub use media::{MediaAttachment, MediaLibrary, RenditionGenerator};
pub use object_store::{ObjectRecord, ObjectStore, PutObject};
pub use options::OptionStore;
