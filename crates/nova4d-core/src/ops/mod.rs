pub mod headless_jobs;
pub mod store;

pub use headless_jobs::HeadlessJobStore;
pub use store::{
    CancelSummary, CommandStore, InMemoryCommandStore, QueueCounters, ResultOutcome, ResultReport,
    RetrySummary, StatusCounts, StoreSummary,
};
