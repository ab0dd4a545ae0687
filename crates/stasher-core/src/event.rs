//! Inbound framework events
//!
//! A `RawEvent` is what the dispatcher hands over: the event name, its
//! loosely-typed payload, a monotonic sequence id and the elapsed time of
//! the instrumented operation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use stasher_core_types::schema::{
    EVENT_PROCESS_ACTION, EVENT_REDIRECT_TO, EVENT_SQL, EVENT_START_PROCESSING,
};

/// Ordered field mapping; insertion order is rendering order
pub type FieldMapping = Map<String, Value>;

/// Event payload with default-on-absence access
///
/// A key holding JSON `null` reads the same as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, treating `null` as absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Get a value or JSON `null`
    pub fn value_or_null(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One occurrence of a framework event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub sequence_id: u64,
    /// Elapsed time of the instrumented operation, in milliseconds
    #[serde(default)]
    pub duration: f64,
}

impl RawEvent {
    pub fn new(name: impl Into<String>, payload: Payload, sequence_id: u64) -> Self {
        Self {
            name: name.into(),
            payload,
            sequence_id,
            duration: 0.0,
        }
    }

    /// Set the elapsed time in milliseconds
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Derive the elapsed time from start and finish instants.
    ///
    /// A finish earlier than start yields `0.0`.
    pub fn with_timing(self, start: DateTime<Utc>, finish: DateTime<Utc>) -> Self {
        let elapsed = (finish - start)
            .num_microseconds()
            .map(|us| us as f64 / 1000.0)
            .unwrap_or(0.0);
        self.with_duration(elapsed.max(0.0))
    }

    pub fn category(&self) -> Option<EventCategory> {
        EventCategory::from_name(&self.name)
    }
}

/// Event categories the subscriber understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    StartProcessing,
    ProcessAction,
    RedirectTo,
    Sql,
}

impl EventCategory {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            EVENT_START_PROCESSING => Some(Self::StartProcessing),
            EVENT_PROCESS_ACTION => Some(Self::ProcessAction),
            EVENT_REDIRECT_TO => Some(Self::RedirectTo),
            EVENT_SQL => Some(Self::Sql),
            _ => None,
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::StartProcessing => EVENT_START_PROCESSING,
            Self::ProcessAction => EVENT_PROCESS_ACTION,
            Self::RedirectTo => EVENT_REDIRECT_TO,
            Self::Sql => EVENT_SQL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;

    #[test]
    fn test_null_reads_as_absent() {
        let payload: Payload = [("status", Value::Null), ("path", json!("/home"))]
            .into_iter()
            .collect();

        assert!(payload.get("status").is_none());
        assert!(!payload.contains("status"));
        assert_eq!(payload.value_or_null("missing"), Value::Null);
        assert_eq!(payload.get_str("path"), Some("/home"));
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(
            EventCategory::from_name("sql.active_record"),
            Some(EventCategory::Sql)
        );
        assert_eq!(EventCategory::from_name("render_template.action_view"), None);
        for category in [
            EventCategory::StartProcessing,
            EventCategory::ProcessAction,
            EventCategory::RedirectTo,
            EventCategory::Sql,
        ] {
            assert_eq!(EventCategory::from_name(category.event_name()), Some(category));
        }
    }

    #[test]
    fn test_with_timing_in_milliseconds() {
        let start = Utc::now();
        let finish = start + TimeDelta::microseconds(12_500);

        let event = RawEvent::new(EVENT_SQL, Payload::new(), 1).with_timing(start, finish);
        assert_eq!(event.duration, 12.5);

        let backwards = RawEvent::new(EVENT_SQL, Payload::new(), 2).with_timing(finish, start);
        assert_eq!(backwards.duration, 0.0);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let event: RawEvent = serde_json::from_str(r#"{"name":"sql.active_record"}"#).unwrap();
        assert_eq!(event.sequence_id, 0);
        assert_eq!(event.duration, 0.0);
        assert_eq!(event.payload, Payload::new());
    }
}
