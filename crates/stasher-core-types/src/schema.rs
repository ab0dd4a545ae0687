//! Canonical schema constants for records and diagnostics
//!
//! These constants keep the rendered envelope, the tag vocabulary and the
//! framework event names consistent across the workspace.

// Record envelope keys, in rendering order
pub const KEY_SOURCE: &str = "@source";
pub const KEY_TAGS: &str = "@tags";
pub const KEY_FIELDS: &str = "@fields";
pub const KEY_TIMESTAMP: &str = "@timestamp";

// Record tags
pub const TAG_REQUEST: &str = "request";
pub const TAG_RESPONSE: &str = "response";
pub const TAG_SQL: &str = "sql";
pub const TAG_EXCEPTION: &str = "exception";

// Framework event names
pub const EVENT_START_PROCESSING: &str = "start_processing.action_controller";
pub const EVENT_PROCESS_ACTION: &str = "process_action.action_controller";
pub const EVENT_REDIRECT_TO: &str = "redirect_to.action_controller";
pub const EVENT_SQL: &str = "sql.active_record";

// Replay pseudo-event whose payload is copied into the scope store
pub const EVENT_SET_SCOPE: &str = "stasher.scope";

// SQL query names that never produce a record
pub const SQL_NAME_SCHEMA: &str = "SCHEMA";
pub const SQL_NAME_SESSION_STORE: &str = "ActiveRecord::SessionStore";

// Canonical field keys for internal diagnostics
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical diagnostic event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
