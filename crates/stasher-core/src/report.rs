//! Out-of-band reporting of failures that must not break the observed work

use crate::errors::ExError;
use std::sync::{Arc, Mutex};

/// Receives errors that are swallowed on the logging path
pub trait ErrorReporter: Send + Sync {
    fn report(&self, err: &ExError);
}

/// Reports through `tracing` at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, err: &ExError) {
        tracing::error!(
            component = module_path!(),
            op = err.op().unwrap_or("unknown"),
            event = stasher_core_types::schema::EVENT_END_ERROR,
            err_kind = ?err.kind(),
            err_code = err.code(),
            sequence_id = ?err.sequence_id(),
            request_id = ?err.request_id().map(|id| id.as_str()),
            "{}",
            err.message()
        );
    }
}

/// Keeps reported errors in memory; clones share the same buffer
#[derive(Clone, Default)]
pub struct CollectingErrorReporter {
    errors: Arc<Mutex<Vec<ExError>>>,
}

impl CollectingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<ExError> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report(&self, err: &ExError) {
        self.errors.lock().map(|mut e| e.push(err.clone())).ok();
    }
}
