use thiserror::Error;

/// Result type alias using NovaError
pub type Result<T> = std::result::Result<T, NovaError>;

/// Coarse error classes for boundary reporting
///
/// Each kind maps to a stable error code used by the CLI, by log lines
/// (`err.code`) and by any transport that wraps this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Admission
    RouteNotFound,
    ValidationFailed,

    // Planning
    WorkflowNotFound,
    EmptyWorkflow,

    // Queue / job lifecycle
    NotFound,
    AlreadyCompleted,
    Canceled,
    InvalidState,
    InvalidInput,

    // Configuration / IO
    InvalidConfig,
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// `ERR_*` code; never changes once published
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::RouteNotFound => "ERR_ROUTE_NOT_FOUND",
            ExErrorKind::ValidationFailed => "ERR_VALIDATION_FAILED",
            ExErrorKind::WorkflowNotFound => "ERR_WORKFLOW_NOT_FOUND",
            ExErrorKind::EmptyWorkflow => "ERR_EMPTY_WORKFLOW",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyCompleted => "ERR_ALREADY_COMPLETED",
            ExErrorKind::Canceled => "ERR_CANCELED",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// A [`NovaError`] flattened for the boundary
///
/// Carries the kind plus whatever context the failing call knew about: the
/// op name, the command/job/workflow id, the route and validator details.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    subject: Option<String>,
    route: Option<String>,
    message: String,
    details: Vec<String>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            subject: None,
            route: None,
            message: String::new(),
            details: Vec::new(),
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Command, job or workflow id the error is about
    pub fn with_subject(mut self, id: impl Into<String>) -> Self {
        self.subject = Some(id.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Validator messages
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " {}", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(route) = &self.route {
            write!(f, " ({})", route)?;
        }
        if let Some(subject) = &self.subject {
            write!(f, " [{}]", subject)?;
        }
        if !self.details.is_empty() {
            write!(f, " - {}", self.details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Domain error taxonomy for admission, planning and job bookkeeping
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NovaError {
    // ===== Admission =====
    /// Route is absent from the route registry
    #[error("route spec not found: {route}")]
    RouteNotFound { route: String },

    /// Payload failed schema validation
    #[error("payload validation failed for {route}: {}", .errors.join("; "))]
    ValidationFailed { route: String, errors: Vec<String> },

    // ===== Planning =====
    /// Workflow id is not in the catalog
    #[error("workflow not found: {workflow_id}")]
    WorkflowNotFound { workflow_id: String },

    /// Workflow resolved but produced zero commands
    #[error("workflow produced no commands: {workflow_id}")]
    EmptyWorkflow { workflow_id: String },

    // ===== Command queue =====
    #[error("command {command_id} not found")]
    CommandNotFound { command_id: String },

    #[error("command {command_id} already completed")]
    CommandAlreadyCompleted { command_id: String },

    #[error("command {command_id} is canceled")]
    CommandCanceled { command_id: String },

    #[error("command_id is required")]
    MissingCommandId,

    // ===== Headless jobs =====
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("job {job_id} is {status}")]
    JobNotRunning { job_id: String, status: String },

    // ===== Generic =====
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("io error: {message}")]
    Io { message: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl NovaError {
    /// Kind of the canonical error this converts into
    pub fn kind(&self) -> ExErrorKind {
        match self {
            NovaError::RouteNotFound { .. } => ExErrorKind::RouteNotFound,
            NovaError::ValidationFailed { .. } => ExErrorKind::ValidationFailed,
            NovaError::WorkflowNotFound { .. } => ExErrorKind::WorkflowNotFound,
            NovaError::EmptyWorkflow { .. } => ExErrorKind::EmptyWorkflow,
            NovaError::CommandNotFound { .. } | NovaError::JobNotFound { .. } => {
                ExErrorKind::NotFound
            }
            NovaError::CommandAlreadyCompleted { .. } => ExErrorKind::AlreadyCompleted,
            NovaError::CommandCanceled { .. } => ExErrorKind::Canceled,
            NovaError::JobNotRunning { .. } => ExErrorKind::InvalidState,
            NovaError::MissingCommandId => ExErrorKind::InvalidInput,
            NovaError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            NovaError::Io { .. } => ExErrorKind::Io,
            NovaError::Serialization { .. } => ExErrorKind::Serialization,
            NovaError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for NovaError {
    fn from(err: serde_json::Error) -> Self {
        NovaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for NovaError {
    fn from(err: std::io::Error) -> Self {
        NovaError::Io {
            message: err.to_string(),
        }
    }
}

/// Conversion from NovaError to the canonical ExError
impl From<NovaError> for ExError {
    fn from(err: NovaError) -> Self {
        let base = ExError::new(err.kind());
        match err {
            NovaError::RouteNotFound { route } => base
                .with_route(route)
                .with_message("route spec not found"),
            NovaError::ValidationFailed { route, errors } => base
                .with_route(route)
                .with_message("payload validation failed")
                .with_details(errors),
            NovaError::WorkflowNotFound { workflow_id } => base
                .with_subject(workflow_id)
                .with_message("workflow not found"),
            NovaError::EmptyWorkflow { workflow_id } => base
                .with_subject(workflow_id)
                .with_message("workflow produced no commands"),
            NovaError::CommandNotFound { command_id } => base
                .with_subject(command_id)
                .with_message("command not found"),
            NovaError::CommandAlreadyCompleted { command_id } => base
                .with_subject(command_id)
                .with_message("command already completed"),
            NovaError::CommandCanceled { command_id } => base
                .with_subject(command_id)
                .with_message("command is canceled"),
            NovaError::MissingCommandId => base.with_message("command_id is required"),
            NovaError::JobNotFound { job_id } => {
                base.with_subject(job_id).with_message("job not found")
            }
            NovaError::JobNotRunning { job_id, status } => base
                .with_subject(job_id)
                .with_message(format!("job is {}", status)),
            NovaError::InvalidConfig { reason }
            | NovaError::Io { message: reason }
            | NovaError::Serialization { message: reason }
            | NovaError::Internal { message: reason } => base.with_message(reason),
        }
    }
}
