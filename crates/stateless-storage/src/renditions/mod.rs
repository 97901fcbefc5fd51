//! Derived rendition generation.

pub mod generator;

pub use generator::ImageRenditionGenerator;
