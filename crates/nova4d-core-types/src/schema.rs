//! Field keys and event names shared by every Nova4D log line
//!
//! `tracing` needs literal field names at the call site, so the logging
//! macros spell these out; readers of captured events (tests, log shippers)
//! use the constants.

/// Emitting module path
pub const FIELD_COMPONENT: &str = "component";
/// Boundary operation name, e.g. `queue_command`
pub const FIELD_OP: &str = "op";
/// One of the `EVENT_*` values
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

pub const FIELD_ROUTE: &str = "route";
pub const FIELD_COMMAND_ID: &str = "command_id";
pub const FIELD_WORKFLOW_ID: &str = "workflow_id";
pub const FIELD_JOB_ID: &str = "job_id";

/// Commands a guard pass let through
pub const FIELD_ALLOWED_LEN: &str = "allowed_len";
/// Commands a guard pass refused
pub const FIELD_BLOCKED_LEN: &str = "blocked_len";
/// Records dropped by a prune
pub const FIELD_REMOVED_LEN: &str = "removed_len";

pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_fields_share_prefix() {
        assert!(FIELD_ERR_KIND.starts_with("err."));
        assert!(FIELD_ERR_CODE.starts_with("err."));
    }

    #[test]
    fn test_length_fields_use_len_suffix() {
        for field in [FIELD_ALLOWED_LEN, FIELD_BLOCKED_LEN, FIELD_REMOVED_LEN] {
            assert!(field.ends_with("_len"), "{field}");
        }
    }
}
