//! Media attachment entities.

pub mod mime_class;
pub mod model;

pub use mime_class::MimeClass;
pub use model::Attachment;
