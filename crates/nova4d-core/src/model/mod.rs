pub mod command;
pub mod field_map;
pub mod headless_job;

pub use command::{Command, CommandCandidate, CommandStatus, NewCommand};
pub use field_map::{FieldMap, Metadata, Payload};
pub use headless_job::{HeadlessJob, JobStatus};
