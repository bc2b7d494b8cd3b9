//! Core types shared across Nova4D facilities
//!
//! This crate provides foundational types used by the logging and admission
//! layers:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId};
