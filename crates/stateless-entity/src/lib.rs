//! # stateless-entity
//!
//! Domain entity models for Stateless Media. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod attachment;
pub mod job;
