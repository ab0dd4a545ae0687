//! Event routing and suppression policy
//!
//! The subscriber receives one framework event at a time, picks the
//! extractor set for its category, merges the results in a fixed order and
//! hands the fields to the [`RecordWriter`]. Extraction and writing are
//! separate steps: the scope store is no longer borrowed when the sink runs.
//!
//! | category            | record tags                         | side effect            |
//! |---------------------|-------------------------------------|------------------------|
//! | start processing    | `request`                           |                        |
//! | process action      | `response` (+ `exception`)          | scope cleared          |
//! | redirect            | none                                | pending location set   |
//! | sql                 | `sql` unless suppressed             |                        |

use crate::config::StasherConfig;
use crate::event::{EventCategory, FieldMapping, RawEvent};
use crate::extractors::{
    extract_current_scope, extract_custom_fields, extract_exception, extract_request,
    extract_sql, extract_status, has_exception, location, runtimes,
};
use crate::record::RecordWriter;
use crate::report::{ErrorReporter, TracingErrorReporter};
use crate::scope::{current, ScopeStore};
use crate::sink::LineSink;
use stasher_core_types::schema::{
    SQL_NAME_SCHEMA, SQL_NAME_SESSION_STORE, TAG_EXCEPTION, TAG_REQUEST, TAG_RESPONSE, TAG_SQL,
};
use stasher_core_types::RequestContext;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Whether a SQL event with this query name produces no record
///
/// Blank names, schema queries and session-store bookkeeping are noise.
pub fn is_suppressed_sql(name: Option<&str>) -> bool {
    match name.map(str::trim) {
        None | Some("") => true,
        Some(name) => name == SQL_NAME_SCHEMA || name == SQL_NAME_SESSION_STORE,
    }
}

#[derive(Clone)]
pub struct Subscriber {
    writer: RecordWriter,
    custom_fields: Vec<String>,
}

impl Subscriber {
    /// Subscriber reporting sink failures through `tracing`
    pub fn new(config: &StasherConfig, sink: Arc<dyn LineSink>) -> Self {
        Self::with_reporter(config, sink, Arc::new(TracingErrorReporter))
    }

    pub fn with_reporter(
        config: &StasherConfig,
        sink: Arc<dyn LineSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let writer = RecordWriter::new(config.source.clone(), config.clock(), sink, reporter);
        Self::from_writer(writer, config.custom_fields.clone())
    }

    pub fn from_writer(writer: RecordWriter, custom_fields: Vec<String>) -> Self {
        Self {
            writer,
            custom_fields,
        }
    }

    pub fn writer(&self) -> &RecordWriter {
        &self.writer
    }

    /// Handle an event against the calling thread's current scope
    ///
    /// The thread's store is only borrowed while fields are extracted; the
    /// sink and error reporter run after the borrow is released, so they may
    /// use [`current`] themselves.
    pub fn handle(&self, event: &RawEvent) {
        if let Some(emission) = current::with(|scope| self.route(scope, event)) {
            self.emit(emission);
        }
    }

    /// Handle an event against an explicit scope store
    ///
    /// Unknown event names are ignored.
    pub fn handle_in(&self, scope: &mut ScopeStore, event: &RawEvent) {
        if let Some(emission) = self.route(scope, event) {
            self.emit(emission);
        }
    }

    fn route(&self, scope: &mut ScopeStore, event: &RawEvent) -> Option<Emission> {
        scope.observe(event.sequence_id);

        match event.category() {
            Some(EventCategory::StartProcessing) => Some(self.start_processing(scope, event)),
            Some(EventCategory::ProcessAction) => Some(self.process_action(scope, event)),
            Some(EventCategory::RedirectTo) => {
                self.redirect_to(scope, event);
                None
            }
            Some(EventCategory::Sql) => self.sql(scope, event),
            None => {
                tracing::trace!(
                    component = module_path!(),
                    event_name = %event.name,
                    sequence_id = event.sequence_id,
                    "ignoring unrecognised event"
                );
                None
            }
        }
    }

    fn start_processing(&self, scope: &ScopeStore, event: &RawEvent) -> Emission {
        let mut fields = extract_request(&event.payload);
        fields.extend(extract_current_scope(scope));

        Emission::new(scope, event, vec![TAG_REQUEST.to_string()], fields)
    }

    /// Build the response record and close the request scope.
    ///
    /// The scope is cleared even if extraction unwinds.
    fn process_action(&self, scope: &mut ScopeStore, event: &RawEvent) -> Emission {
        let mut scope = ClearOnExit(scope);
        let payload = &event.payload;

        let mut fields = extract_request(payload);
        fields.extend(extract_status(payload));
        fields.extend(runtimes(event));
        fields.extend(location(&mut scope));
        fields.extend(extract_exception(payload));
        fields.extend(extract_custom_fields(payload, &self.custom_fields));
        fields.extend(extract_current_scope(&scope));

        let mut tags = vec![TAG_RESPONSE.to_string()];
        if has_exception(payload) {
            tags.push(TAG_EXCEPTION.to_string());
        }

        Emission::new(&scope, event, tags, fields)
    }

    fn redirect_to(&self, scope: &mut ScopeStore, event: &RawEvent) {
        match event.payload.get_str("location") {
            Some(target) => scope.record_location(target),
            None => tracing::trace!(
                component = module_path!(),
                sequence_id = event.sequence_id,
                "redirect without location"
            ),
        }
    }

    fn sql(&self, scope: &ScopeStore, event: &RawEvent) -> Option<Emission> {
        if is_suppressed_sql(event.payload.get_str("name")) {
            tracing::trace!(
                component = module_path!(),
                sequence_id = event.sequence_id,
                "suppressed sql event"
            );
            return None;
        }

        let mut fields = extract_sql(event);
        fields.extend(extract_current_scope(scope));

        Some(Emission::new(scope, event, vec![TAG_SQL.to_string()], fields))
    }

    fn emit(&self, emission: Emission) {
        let Emission {
            context,
            sequence_id,
            tags,
            fields,
        } = emission;

        tracing::debug!(
            component = module_path!(),
            sequence_id,
            request_id = %context.request_id,
            first_sequence_id = ?context.first_sequence_id,
            tags = ?tags,
            "emitting record"
        );
        self.writer.log_event_in(&context, sequence_id, tags, fields);
    }
}

/// A record extracted from one event, waiting to be written
struct Emission {
    context: RequestContext,
    sequence_id: u64,
    tags: Vec<String>,
    fields: FieldMapping,
}

impl Emission {
    fn new(scope: &ScopeStore, event: &RawEvent, tags: Vec<String>, fields: FieldMapping) -> Self {
        Self {
            context: scope.context().clone(),
            sequence_id: event.sequence_id,
            tags,
            fields,
        }
    }
}

struct ClearOnExit<'a>(&'a mut ScopeStore);

impl Deref for ClearOnExit<'_> {
    type Target = ScopeStore;

    fn deref(&self) -> &ScopeStore {
        self.0
    }
}

impl DerefMut for ClearOnExit<'_> {
    fn deref_mut(&mut self) -> &mut ScopeStore {
        self.0
    }
}

impl Drop for ClearOnExit<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}
