//! # stateless-storage
//!
//! Object store clients for Stateless Media: an in-process cache that
//! synthesizes Cloud Storage object records, and a Google Cloud Storage
//! JSON API client. Also hosts service-account credential validation,
//! remote object naming, and the image rendition generator.

pub mod credentials;
pub mod naming;
pub mod providers;
pub mod renditions;

pub use credentials::ServiceAccountKey;
pub use providers::build_object_store;
pub use renditions::ImageRenditionGenerator;
