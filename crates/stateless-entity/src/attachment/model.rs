//! Resolved attachment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::mime_class::MimeClass;

/// An attachment resolved against local upload storage and the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Identifier in the host media library.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Stored MIME type.
    pub mime_type: String,
    /// Media class derived from `mime_type`.
    pub mime_class: MimeClass,
    /// Absolute path in upload storage.
    pub local_path: PathBuf,
    /// Object name in the bucket.
    pub remote_key: String,
    /// Public URL of the original upload.
    pub guid: String,
}
