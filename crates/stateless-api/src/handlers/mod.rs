//! Route handlers organized by resource.

pub mod attachment;
pub mod job;
pub mod status;
