//! Payload enrichment done by the application before the completion event
//! fires.
//!
//! Pair [`add_default_fields`] with [`DEFAULT_FIELDS`] in
//! `StasherConfig::custom_fields` to surface the added keys.

use crate::event::Payload;
use serde_json::Value;

/// Custom field names populated by [`add_default_fields`]
pub const DEFAULT_FIELDS: [&str; 3] = ["ip", "route", "parameters"];

/// Parameter keys the framework adds on its own
const FRAMEWORK_PARAMS: [&str; 3] = ["controller", "action", "format"];

/// Add `ip`, `route` and `parameters` to a completion payload.
///
/// `route` is `controller#action`; `parameters` holds one `key=value` line
/// per request parameter, framework keys excluded.
pub fn add_default_fields(payload: &mut Payload, remote_ip: Option<&str>) {
    payload.insert("ip", remote_ip.map_or(Value::Null, Value::from));

    let route = format!(
        "{}#{}",
        payload.get_str("controller").unwrap_or_default(),
        payload.get_str("action").unwrap_or_default()
    );
    payload.insert("route", route);

    let parameters = payload
        .get("params")
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .filter(|(key, _)| !FRAMEWORK_PARAMS.contains(&key.as_str()))
                .map(|(key, value)| match value {
                    Value::String(s) => format!("{key}={s}\n"),
                    other => format!("{key}={other}\n"),
                })
                .collect::<String>()
        })
        .unwrap_or_default();
    payload.insert("parameters", parameters);
}
