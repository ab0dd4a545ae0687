//! Core types shared across Stasher facilities
//!
//! This crate provides foundational types used by the record pipeline,
//! the error facility and the logging facility:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Schema constants**: Envelope keys, tags, framework event names and
//!   canonical diagnostic field keys

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId};
