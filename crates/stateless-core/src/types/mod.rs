//! Core type definitions used across the Stateless workspace.

pub mod response;

pub use response::{ProcessResult, StepResult};
