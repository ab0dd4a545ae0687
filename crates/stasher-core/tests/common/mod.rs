use serde_json::{json, Value};
use stasher_core::clock::FixedClock;
use stasher_core::record::RecordWriter;
use stasher_core::report::CollectingErrorReporter;
use stasher_core::sink::MemorySink;
use stasher_core::{Payload, RawEvent, Subscriber};
use std::sync::Arc;

pub const SQL_TEXT: &str = "SELECT \"users\".* FROM \"users\" WHERE \"users\".\"id\" = 1 LIMIT 1";

/// Subscriber writing to memory with source "source" and timestamp "timestamp"
pub struct Harness {
    pub sink: MemorySink,
    pub reporter: CollectingErrorReporter,
    pub subscriber: Subscriber,
}

#[allow(dead_code)]
pub fn harness() -> Harness {
    harness_with_custom_fields(Vec::new())
}

#[allow(dead_code)]
pub fn harness_with_custom_fields(custom_fields: Vec<String>) -> Harness {
    let sink = MemorySink::new();
    let reporter = CollectingErrorReporter::new();
    let writer = RecordWriter::new(
        "source",
        Arc::new(FixedClock::new("timestamp")),
        Arc::new(sink.clone()),
        Arc::new(reporter.clone()),
    );
    Harness {
        sink,
        reporter,
        subscriber: Subscriber::from_writer(writer, custom_fields),
    }
}

fn payload(value: Value) -> Payload {
    serde_json::from_value(value).unwrap()
}

/// Completion payload as the controller layer delivers it
#[allow(dead_code)]
pub fn actioncontroller_payload() -> Payload {
    payload(json!({
        "controller": "home",
        "action": "index",
        "params": {"foo": "bar"},
        "format": "application/json",
        "method": "GET",
        "path": "/home",
        "status": 200,
        "view_runtime": 0.01,
        "db_runtime": 0.02
    }))
}

#[allow(dead_code)]
pub fn activerecord_sql_payload(name: &str) -> Payload {
    payload(json!({
        "name": name,
        "sql": SQL_TEXT,
        "binds": [],
        "connection_id": 70_123_456
    }))
}

#[allow(dead_code)]
pub fn event(name: &str, payload: Payload, sequence_id: u64) -> RawEvent {
    RawEvent::new(name, payload, sequence_id)
}
