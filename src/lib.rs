#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod report;
pub mod session;
pub mod store;

pub use error::{FsError, FsResult};
pub use model::{CaptureOptions, FailureRecord, Fixture, FixtureDetail, LocalVariable, PassedRecord};
pub use render::render_report;
pub use report::{ReportWriter, WriteSummary};
pub use session::{CaseContext, CaseOutcome, CaseRunner, TestSession};
pub use store::{FailureStore, StoreLimits};
