//! Boundary events of the public pipeline operations
//!
//! `reconcile`, `consolidate` and `display_key` each emit one start event and
//! then exactly one of an end or an error event. Event names come from
//! `recon_core_types::schema`; the field keys are the ones the schema lists
//! (`component`, `op`, `event`, `duration_ms`, `err.code`, `err.kind`).

#[doc(hidden)]
#[macro_export]
macro_rules! __op_boundary {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Start of a pipeline operation, with any identifying fields.
///
/// ```
/// # use recon_core::log_op_start;
/// log_op_start!("consolidate", expression = "characters.[].address.line1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_boundary!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Successful end of a pipeline operation. `duration_ms` is required; result
/// sizes such as `entry_count` follow it.
///
/// ```
/// # use recon_core::log_op_end;
/// log_op_end!("reconcile", duration_ms = 3, entry_count = 11);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_boundary!(info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Failed end of a pipeline operation.
///
/// The error goes through [`RcError`](crate::errors::RcError), so the event
/// carries its stable code next to the kind.
///
/// ```
/// # use recon_core::{log_op_error, errors::ReconcileError};
/// let err = ReconcileError::PatternCompilation {
///     expression: "characters.[".to_string(),
///     reason: "unbalanced '['".to_string(),
/// };
/// log_op_error!("consolidate", err, duration_ms = 1, expression = "characters.[");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let rc_err: $crate::errors::RcError = $err.into();
        $crate::__op_boundary!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err.code = rc_err.code(),
            err.kind = ?rc_err.kind()
            $(, $($field)*)?
        )
    }};
}
