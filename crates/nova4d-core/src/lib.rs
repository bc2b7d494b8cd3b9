//! Nova4D Core - command admission, workflow planning and job bookkeeping
//!
//! This crate provides the in-process kernel of the Nova4D gateway:
//! - Route registry and per-route payload rules
//! - Command admission gateway (validation, safety gating, enqueue)
//! - In-memory command queue with leases, retries and bounded retention
//! - Workflow catalog, option normalization and template planning
//! - Headless job bookkeeping with explicit pruning
//! - Configuration, structured errors and the logging facility

pub mod coerce;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod routes;
pub mod rules;
pub mod workflow;

pub use nova4d_core_types::{schema, RequestContext};

// Re-export commonly used types
pub use config::NovaConfig;
pub use errors::{ExError, ExErrorKind, NovaError, Result};
pub use gateway::{CommandGateway, CommandGuard, GuardResult, QueueAck, QueueRequest, QueueResponse};
pub use model::{Command, CommandCandidate, CommandStatus, HeadlessJob, JobStatus, Metadata, Payload};
pub use ops::{CommandStore, HeadlessJobStore, InMemoryCommandStore};
pub use policy::{RiskLevel, SafetyInput, SafetyPolicy};
pub use routes::{RouteRegistry, RouteSpec};
pub use workflow::{PlanResponse, WorkflowId, WorkflowPlan, WorkflowPlanner};
