//! Field extractors, one per event aspect
//!
//! Each extractor maps an event (or its payload) to a flat [`FieldMapping`]
//! without side effects; `location` is the one exception and consumes the
//! pending redirect. Missing optional payload keys never fail: they are
//! rendered as `null`, defaulted, or omitted as each extractor documents.

use crate::event::{FieldMapping, Payload, RawEvent};
use crate::scope::ScopeStore;
use serde_json::{json, Value};

/// Status reported when neither a status nor an exception is present
pub const UNKNOWN_STATUS: i64 = 0;
/// Status reported when the request ended with an exception
pub const EXCEPTION_STATUS: i64 = 500;

/// `{method, ip, params, path, format, controller, action}`
///
/// Every key is present; absent values render as `null`.
pub fn extract_request(payload: &Payload) -> FieldMapping {
    let ip = payload
        .get("ip")
        .or_else(|| payload.get("remote_ip"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut fields = FieldMapping::new();
    fields.insert("method".into(), payload.value_or_null("method"));
    fields.insert("ip".into(), ip);
    fields.insert("params".into(), payload.value_or_null("params"));
    fields.insert("path".into(), payload.value_or_null("path"));
    fields.insert("format".into(), payload.value_or_null("format"));
    fields.insert("controller".into(), payload.value_or_null("controller"));
    fields.insert("action".into(), payload.value_or_null("action"));
    fields
}

/// `{status}`: explicit integer status, else 500 on exception, else 0
///
/// A status that is not an integer (`"200"`, `200.5`) counts as absent.
pub fn extract_status(payload: &Payload) -> FieldMapping {
    let status = match payload.get_i64("status") {
        Some(status) => status,
        None if has_exception(payload) => EXCEPTION_STATUS,
        None => UNKNOWN_STATUS,
    };

    let mut fields = FieldMapping::new();
    fields.insert("status".into(), json!(status));
    fields
}

/// `{error}` when the payload carries an exception marker, else `{}`
///
/// The marker is a `[type, message]` pair. A `backtrace` sequence in the
/// payload is appended one frame per line.
pub fn extract_exception(payload: &Payload) -> FieldMapping {
    let mut fields = FieldMapping::new();
    let Some(marker) = payload.get("exception") else {
        return fields;
    };

    let mut error = match marker.as_array().map(Vec::as_slice) {
        Some([kind, message]) => format!("{}\n\n{}", scalar_text(kind), scalar_text(message)),
        _ => scalar_text(marker),
    };

    if let Some(frames) = payload.get("backtrace").and_then(Value::as_array) {
        let frames: Vec<String> = frames.iter().map(scalar_text).collect();
        if !frames.is_empty() {
            error.push_str("\n\n");
            error.push_str(&frames.join("\n"));
        }
    }

    fields.insert("error".into(), Value::String(error));
    fields
}

/// `{name, sql, binds, duration}`
pub fn extract_sql(event: &RawEvent) -> FieldMapping {
    let payload = &event.payload;

    let mut fields = FieldMapping::new();
    fields.insert("name".into(), payload.value_or_null("name"));
    fields.insert("sql".into(), payload.value_or_null("sql"));
    fields.insert("binds".into(), Value::String(render_binds(payload)));
    fields.insert("duration".into(), json!(timing(event.duration)));
    fields
}

/// `{duration, view, db}`, each defaulting to `0.0`
pub fn runtimes(event: &RawEvent) -> FieldMapping {
    let payload = &event.payload;
    let view = payload.get_f64("view_runtime").unwrap_or(0.0);
    let db = payload.get_f64("db_runtime").unwrap_or(0.0);

    let mut fields = FieldMapping::new();
    fields.insert("duration".into(), json!(timing(event.duration)));
    fields.insert("view".into(), json!(timing(view)));
    fields.insert("db".into(), json!(timing(db)));
    fields
}

/// `{location}` if a redirect was recorded in this scope, else `{}`
///
/// Consumes the pending location.
pub fn location(scope: &mut ScopeStore) -> FieldMapping {
    let mut fields = FieldMapping::new();
    if let Some(location) = scope.take_location() {
        fields.insert("location".into(), Value::String(location));
    }
    fields
}

/// Copy each named payload key that is present
pub fn extract_custom_fields(payload: &Payload, names: &[String]) -> FieldMapping {
    names
        .iter()
        .filter_map(|name| payload.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

/// The scope store's current fields
pub fn extract_current_scope(scope: &ScopeStore) -> FieldMapping {
    scope.snapshot()
}

/// Whether the payload carries an exception marker
pub fn has_exception(payload: &Payload) -> bool {
    payload.contains("exception")
}

fn render_binds(payload: &Payload) -> String {
    let Some(binds) = payload.get("binds").and_then(Value::as_array) else {
        return String::new();
    };

    binds
        .iter()
        .map(|bind| match bind.as_array().map(Vec::as_slice) {
            Some([column, value]) => format!("{}={}", scalar_text(column), scalar_text(value)),
            _ => scalar_text(bind),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Round a timing to two decimals, never negative and always finite.
///
/// Negative and non-finite inputs become `0.0`. Values too large to round
/// are kept as they are.
fn timing(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
