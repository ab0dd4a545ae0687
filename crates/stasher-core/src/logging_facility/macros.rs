//! Operation lifecycle macros
//!
//! A replay run (or any other long operation) reports itself as a `start`
//! event, then either an `end` or an `end_error` event. All three carry the
//! same `component`, `op` and `event` fields so [`crate::logging_facility::test_capture`]
//! and log processors can pair them. Extra `key = value` fields are passed
//! through to `tracing` unchanged.

/// `start` event for `$op`
///
/// ```
/// # use stasher_core::log_op_start;
/// log_op_start!("replay");
/// log_op_start!("replay", input = "events.jsonl");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// `end` event for `$op`; `duration_ms` is required
///
/// ```
/// # use stasher_core::log_op_end;
/// let events: u64 = 3;
/// log_op_end!("replay", duration_ms = 12, events = events);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// `end_error` event for `$op`
///
/// `$err` is anything convertible into [`crate::errors::ExError`]; its kind,
/// code and rendered message are attached.
///
/// ```
/// # use stasher_core::log_op_error;
/// use stasher_core::errors::StasherError;
///
/// let err = StasherError::InvalidEvent { line: 2, reason: "expected value".into() };
/// log_op_error!("replay", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err,
            $($($field)+)?
        );
    }};
}
