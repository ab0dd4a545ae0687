//! Stasher Core - lifecycle events to structured JSON log lines
//!
//! This crate turns framework lifecycle events (request start, request
//! completion, redirects, SQL queries) into single-line JSON records with a
//! fixed `@source`/`@tags`/`@fields`/`@timestamp` envelope:
//! - Pure extractors that pick fields out of loosely-typed payloads
//! - A subscriber that routes events and applies the suppression policy
//! - Request-scoped custom fields with an explicit clear boundary
//! - A record writer that renders lines and hands them to a sink
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use stasher_core::{Payload, RawEvent, ScopeStore, StasherConfig, Subscriber};
//! use stasher_core::sink::MemorySink;
//!
//! let sink = MemorySink::new();
//! let config = StasherConfig::default()
//!     .with_source("source")
//!     .with_timestamp("timestamp");
//! let subscriber = Subscriber::new(&config, Arc::new(sink.clone()));
//!
//! let payload: Payload = [("name", json!("User Load")), ("sql", json!("SELECT 1"))]
//!     .into_iter()
//!     .collect();
//! let mut scope = ScopeStore::new();
//! subscriber.handle_in(&mut scope, &RawEvent::new("sql.active_record", payload, 1));
//!
//! assert_eq!(
//!     sink.lines()[0],
//!     "{\"@source\":\"source\",\"@tags\":[\"sql\"],\"@fields\":{\"name\":\"User Load\",\"sql\":\"SELECT 1\",\"binds\":\"\",\"duration\":0.0},\"@timestamp\":\"timestamp\"}\n"
//! );
//! ```

pub mod clock;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod event;
pub mod extractors;
pub mod logging_facility;
pub mod record;
pub mod report;
pub mod scope;
pub mod sink;
pub mod subscriber;

pub use stasher_core_types as core_types;

// Re-export commonly used types
pub use config::StasherConfig;
pub use errors::{ExError, ExErrorKind, Result, StasherError};
pub use event::{EventCategory, FieldMapping, Payload, RawEvent};
pub use record::{EventRecord, RecordWriter, Tags};
pub use scope::ScopeStore;
pub use subscriber::Subscriber;
