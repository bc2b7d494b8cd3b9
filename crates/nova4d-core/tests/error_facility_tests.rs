#![allow(clippy::unwrap_used, clippy::expect_used)]

use nova4d_core::errors::{ExError, ExErrorKind, NovaError};

#[test]
fn test_every_kind_has_unique_code() {
    let kinds = [
        ExErrorKind::RouteNotFound,
        ExErrorKind::ValidationFailed,
        ExErrorKind::WorkflowNotFound,
        ExErrorKind::EmptyWorkflow,
        ExErrorKind::NotFound,
        ExErrorKind::AlreadyCompleted,
        ExErrorKind::Canceled,
        ExErrorKind::InvalidState,
        ExErrorKind::InvalidInput,
        ExErrorKind::InvalidConfig,
        ExErrorKind::Io,
        ExErrorKind::Serialization,
        ExErrorKind::Internal,
    ];
    let codes: std::collections::HashSet<&str> = kinds.iter().map(|k| k.code()).collect();
    assert_eq!(codes.len(), kinds.len());
    assert!(codes.iter().all(|c| c.starts_with("ERR_")));
}

#[test]
fn test_route_not_found_conversion() {
    let err: ExError = NovaError::RouteNotFound {
        route: "/nova4d/nope".to_string(),
    }
    .into();

    assert_eq!(err.kind(), ExErrorKind::RouteNotFound);
    assert_eq!(err.code(), "ERR_ROUTE_NOT_FOUND");
    assert_eq!(err.route(), Some("/nova4d/nope"));
    assert_eq!(err.message(), "route spec not found");
}

#[test]
fn test_validation_failure_keeps_details() {
    let err: ExError = NovaError::ValidationFailed {
        route: "/nova4d/animation/set-key".to_string(),
        errors: vec![
            "missing required field: parameter".to_string(),
            "one of [target_name, target_path, name] is required".to_string(),
        ],
    }
    .into();

    assert_eq!(err.kind(), ExErrorKind::ValidationFailed);
    assert_eq!(err.details().len(), 2);
    assert_eq!(err.message(), "payload validation failed");
}

#[test]
fn test_workflow_errors_carry_id() {
    let err: ExError = NovaError::WorkflowNotFound {
        workflow_id: "not-a-workflow".to_string(),
    }
    .into();
    assert_eq!(err.code(), "ERR_WORKFLOW_NOT_FOUND");
    assert_eq!(err.subject(), Some("not-a-workflow"));
    assert_eq!(err.message(), "workflow not found");

    let err: ExError = NovaError::EmptyWorkflow {
        workflow_id: "spawn_cube".to_string(),
    }
    .into();
    assert_eq!(err.code(), "ERR_EMPTY_WORKFLOW");
}

#[test]
fn test_lifecycle_kinds() {
    assert_eq!(
        NovaError::JobNotRunning {
            job_id: "j1".to_string(),
            status: "failed".to_string(),
        }
        .kind(),
        ExErrorKind::InvalidState
    );
    assert_eq!(NovaError::MissingCommandId.kind(), ExErrorKind::InvalidInput);
    assert_eq!(
        NovaError::CommandNotFound {
            command_id: "c1".to_string(),
        }
        .kind(),
        NovaError::JobNotFound {
            job_id: "j1".to_string(),
        }
        .kind()
    );
}

#[test]
fn test_op_context_leads_rendering() {
    let err = ExError::from(NovaError::MissingCommandId).with_op("report_result");

    assert_eq!(err.op(), Some("report_result"));
    assert_eq!(
        err.to_string(),
        "[ERR_INVALID_INPUT] report_result: command_id is required"
    );
}

#[test]
fn test_io_and_json_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert_eq!(NovaError::from(io).kind(), ExErrorKind::Io);

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert_eq!(NovaError::from(json).kind(), ExErrorKind::Serialization);
}
