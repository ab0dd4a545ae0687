//! Record envelope and line rendering
//!
//! Every emitted record has the same four-key envelope, rendered in this
//! order on a single line:
//!
//! ```text
//! {"@source":"...","@tags":[...],"@fields":{...},"@timestamp":"..."}
//! ```

use crate::clock::Clock;
use crate::errors::{ExError, StasherError};
use crate::event::FieldMapping;
use crate::report::ErrorReporter;
use crate::sink::LineSink;
use serde::Serialize;
use stasher_core_types::RequestContext;
use std::sync::Arc;

/// Ordered record tags; duplicates are kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Tags {
    fn from(tag: &str) -> Self {
        Self(vec![tag.to_string()])
    }
}

impl From<String> for Tags {
    fn from(tag: String) -> Self {
        Self(vec![tag])
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl From<&[&str]> for Tags {
    fn from(tags: &[&str]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Tags {
    fn from(tags: [&str; N]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}

/// One log record, adjustable until rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    #[serde(rename = "@source")]
    pub source: String,
    #[serde(rename = "@tags")]
    pub tags: Vec<String>,
    #[serde(rename = "@fields")]
    pub fields: FieldMapping,
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
}

impl EventRecord {
    /// Render as one JSON line terminated by `\n`.
    ///
    /// # Errors
    ///
    /// Returns `StasherError::Render` if JSON encoding fails.
    pub fn render(&self) -> Result<String, StasherError> {
        let mut line =
            serde_json::to_string(self).map_err(|source| StasherError::Render { source })?;
        line.push('\n');
        Ok(line)
    }
}

/// Builds, renders and writes records
///
/// Write failures are handed to the error reporter and never returned to
/// the caller.
#[derive(Clone)]
pub struct RecordWriter {
    source: String,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LineSink>,
    reporter: Arc<dyn ErrorReporter>,
}

impl RecordWriter {
    pub fn new(
        source: impl Into<String>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn LineSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            source: source.into(),
            clock,
            sink,
            reporter,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Emit a record with the given tags and already-final fields
    pub fn log_event(&self, tags: impl Into<Tags>, fields: FieldMapping) {
        self.log_event_with(tags, fields, |_| {});
    }

    /// Emit a record, letting `hook` adjust it before rendering
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use stasher_core::clock::FixedClock;
    /// use stasher_core::record::RecordWriter;
    /// use stasher_core::report::TracingErrorReporter;
    /// use stasher_core::sink::MemorySink;
    ///
    /// let sink = MemorySink::new();
    /// let writer = RecordWriter::new(
    ///     "source",
    ///     Arc::new(FixedClock::new("timestamp")),
    ///     Arc::new(sink.clone()),
    ///     Arc::new(TracingErrorReporter),
    /// );
    ///
    /// writer.log_event_with("tag", Default::default(), |record| {
    ///     record.tags.push("extra".into());
    /// });
    /// assert!(sink.lines()[0].contains(r#""@tags":["tag","extra"]"#));
    /// ```
    pub fn log_event_with<F>(&self, tags: impl Into<Tags>, fields: FieldMapping, hook: F)
    where
        F: FnOnce(&mut EventRecord),
    {
        if let Err(err) = self.try_log_event(tags.into(), fields, hook) {
            self.reporter.report(&err);
        }
    }

    /// Emit a record on behalf of one event in a request context
    ///
    /// A failure report carries the event's sequence id and the context's
    /// request id.
    pub fn log_event_in(
        &self,
        context: &RequestContext,
        sequence_id: u64,
        tags: impl Into<Tags>,
        fields: FieldMapping,
    ) {
        if let Err(err) = self.try_log_event(tags.into(), fields, |_| {}) {
            let err = err
                .with_sequence_id(sequence_id)
                .with_request_id(context.request_id.clone());
            self.reporter.report(&err);
        }
    }

    fn try_log_event<F>(&self, tags: Tags, fields: FieldMapping, hook: F) -> Result<(), ExError>
    where
        F: FnOnce(&mut EventRecord),
    {
        let mut record = EventRecord {
            source: self.source.clone(),
            tags: tags.into_vec(),
            fields,
            timestamp: self.clock.now(),
        };
        hook(&mut record);

        let line = record.render()?;
        self.sink
            .write_line(&line)
            .map_err(|source| StasherError::SinkWrite { source })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::report::CollectingErrorReporter;
    use crate::sink::MemorySink;
    use serde_json::{json, Value};
    use stasher_core_types::schema::{KEY_FIELDS, KEY_SOURCE, KEY_TAGS, KEY_TIMESTAMP};

    fn writer(sink: &MemorySink) -> RecordWriter {
        RecordWriter::new(
            "source",
            Arc::new(FixedClock::new("timestamp")),
            Arc::new(sink.clone()),
            Arc::new(CollectingErrorReporter::new()),
        )
    }

    #[test]
    fn test_tags_from_single_and_many() {
        assert_eq!(Tags::from("sql").into_vec(), vec!["sql"]);
        assert_eq!(
            Tags::from(["response", "exception"]).into_vec(),
            vec!["response", "exception"]
        );
        assert_eq!(Tags::from(["a", "a"]).into_vec(), vec!["a", "a"]);
    }

    #[test]
    fn test_render_envelope_order() {
        let mut fields = FieldMapping::new();
        fields.insert("foo".into(), json!("bar"));
        fields.insert("baz".into(), json!("bot"));
        let record = EventRecord {
            source: "source".into(),
            tags: vec!["tag".into()],
            fields,
            timestamp: "timestamp".into(),
        };

        assert_eq!(
            record.render().unwrap(),
            "{\"@source\":\"source\",\"@tags\":[\"tag\"],\"@fields\":{\"foo\":\"bar\",\"baz\":\"bot\"},\"@timestamp\":\"timestamp\"}\n"
        );
    }

    #[test]
    fn test_rendered_keys_match_schema_constants() {
        let sink = MemorySink::new();
        writer(&sink).log_event("tag", FieldMapping::new());

        let record: Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        let keys: Vec<_> = record.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, [KEY_SOURCE, KEY_TAGS, KEY_FIELDS, KEY_TIMESTAMP]);
    }

    #[test]
    fn test_hook_sees_stamped_record() {
        let sink = MemorySink::new();
        let mut seen = Vec::new();

        writer(&sink).log_event_with("tag", FieldMapping::new(), |record| {
            seen.push(record.clone());
        });

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source, "source");
        assert_eq!(seen[0].timestamp, "timestamp");
        assert_eq!(sink.lines().len(), 1);
    }
}
