//! Request-scoped custom fields
//!
//! A `ScopeStore` holds the caller-supplied fields merged into every record
//! emitted while one request is processed, plus the pending redirect
//! location consumed by the next completion event.
//!
//! Stores are plain owned values. Code that processes one request per thread
//! can use the per-thread store in [`current`]; code that multiplexes
//! requests over a thread keeps one store per request and passes it to
//! [`crate::Subscriber::handle_in`].

use crate::event::FieldMapping;
use serde_json::Value;
use stasher_core_types::{RequestContext, RequestId};

#[derive(Debug, Clone, Default)]
pub struct ScopeStore {
    fields: FieldMapping,
    location: Option<String>,
    context: RequestContext,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store labelled with an existing request id
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            context: RequestContext::with_request_id(request_id),
            ..Self::default()
        }
    }

    /// Store a field, overwriting any existing value for the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Copy of the stored fields, unaffected by later mutation
    pub fn snapshot(&self) -> FieldMapping {
        self.fields.clone()
    }

    /// Remove all custom fields and start a new correlation context.
    ///
    /// The pending redirect location is left for `take_location`.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.context = RequestContext::new();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remember a redirect target for the next completion event
    pub fn record_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    /// Read and clear the pending redirect target
    pub fn take_location(&mut self) -> Option<String> {
        self.location.take()
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub(crate) fn observe(&mut self, sequence_id: u64) {
        self.context.observe(sequence_id);
    }
}

/// Per-thread current scope
///
/// Each thread lazily gets its own store on first use; no state is shared
/// between threads.
///
/// # Example
///
/// ```
/// use stasher_core::scope::current;
///
/// current::set("user", "alice");
/// assert_eq!(current::snapshot()["user"], "alice");
/// current::clear();
/// assert!(current::snapshot().is_empty());
/// ```
pub mod current {
    use super::ScopeStore;
    use crate::event::FieldMapping;
    use serde_json::Value;
    use std::cell::RefCell;

    thread_local! {
        static CURRENT: RefCell<ScopeStore> = RefCell::new(ScopeStore::new());
    }

    /// Run `f` with exclusive access to this thread's store
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `with` closure.
    pub fn with<R>(f: impl FnOnce(&mut ScopeStore) -> R) -> R {
        CURRENT.with(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn set(key: impl Into<String>, value: impl Into<Value>) {
        with(|scope| scope.set(key, value));
    }

    pub fn snapshot() -> FieldMapping {
        with(|scope| scope.snapshot())
    }

    pub fn clear() {
        with(ScopeStore::clear);
    }

    pub fn record_location(location: impl Into<String>) {
        with(|scope| scope.record_location(location));
    }
}
