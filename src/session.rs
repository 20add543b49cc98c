//! Session lifecycle and per-case capture surface.
//!
//! This is the thin orchestration layer the test-runner collaborator talks
//! to: configure store ceilings once, clean the output directory when a
//! session starts, wrap each discovered case, and trigger report generation
//! when the session finishes with a nonzero exit status. The session owns
//! its [`FailureStore`] explicitly — there is no ambient global state, so
//! independent sessions never leak records into each other.

use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::FsResult;
use crate::model::{CaptureOptions, FailureRecord, Fixture, LocalVariable, PassedRecord};
use crate::report::{ReportWriter, WriteSummary};
use crate::store::{FailureStore, StoreLimits};

/// Context the extraction collaborator gathered for one test case ahead of
/// execution: source location, stringified locals, fixtures, markers. The
/// session folds it into a [`FailureRecord`] only when the case fails, and
/// only as far as [`CaptureOptions`] allow.
#[derive(Debug, Clone, Default)]
pub struct CaseContext {
    pub module: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub locals: Vec<LocalVariable>,
    pub source: Option<String>,
    pub fixtures: Option<Vec<Fixture>>,
    pub markers: Vec<String>,
    pub backtrace: Option<String>,
}

/// Result of executing one wrapped case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed,
}

/// A named test callable plus its capture context.
///
/// Wrapping marks the case so capture instrumentation is attached exactly
/// once; wrapping an already-wrapped case is a no-op.
pub struct CaseRunner {
    name: String,
    context: CaseContext,
    body: Box<dyn FnOnce()>,
    wrapped: bool,
}

impl std::fmt::Debug for CaseRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseRunner")
            .field("name", &self.name)
            .field("wrapped", &self.wrapped)
            .finish_non_exhaustive()
    }
}

impl CaseRunner {
    pub fn new(name: impl Into<String>, body: impl FnOnce() + 'static) -> Self {
        Self {
            name: name.into(),
            context: CaseContext::default(),
            body: Box::new(body),
            wrapped: false,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: CaseContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_wrapped(&self) -> bool {
        self.wrapped
    }
}

/// One test session: a store, capture configuration, and an output
/// directory, passed explicitly to both the capture side and the report
/// writer.
#[derive(Debug)]
pub struct TestSession {
    store: FailureStore,
    options: CaptureOptions,
    output_dir: PathBuf,
}

impl TestSession {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(output_dir, CaptureOptions::default())
    }

    #[must_use]
    pub fn with_options(output_dir: impl Into<PathBuf>, options: CaptureOptions) -> Self {
        Self {
            store: FailureStore::new(),
            options,
            output_dir: output_dir.into(),
        }
    }

    /// Bound the store. Invoked once at session configuration time.
    pub fn set_limits(&mut self, max_failures: usize, max_passed: usize) {
        self.store.configure(StoreLimits {
            max_failures,
            max_passed,
        });
    }

    #[must_use]
    pub const fn options(&self) -> &CaptureOptions {
        &self.options
    }

    #[must_use]
    pub const fn store(&self) -> &FailureStore {
        &self.store
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// "Session starting" trigger: remove previously generated report files
    /// and (re)create the output directory.
    pub fn begin(&self) -> FsResult<()> {
        let mut removed = 0usize;
        if self.output_dir.exists() {
            for entry in fs::read_dir(&self.output_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::remove_file(entry.path())?;
                    removed += 1;
                }
            }
        }
        fs::create_dir_all(&self.output_dir)?;
        tracing::info!(
            dir = %self.output_dir.display(),
            removed,
            "output directory ready"
        );
        Ok(())
    }

    /// Append an externally built failure record.
    pub fn record_failure(&mut self, record: FailureRecord) {
        self.store.record_failure(record);
    }

    /// Append a passed record against the passed ceiling.
    pub fn record_passed(&mut self, record: PassedRecord) {
        self.store.record_passed(record);
    }

    /// Mark a case as capture-instrumented. Already-wrapped cases pass
    /// through untouched, so applying this to every discovered case — even
    /// repeatedly — attaches capture exactly once.
    #[must_use]
    pub fn wrap(&self, mut case: CaseRunner) -> CaseRunner {
        if !case.wrapped {
            case.wrapped = true;
        }
        case
    }

    /// Run a case, capturing a [`FailureRecord`] on panic and a
    /// [`PassedRecord`] on success. The original failure is never masked:
    /// the outcome reports it regardless of what capture managed to gather.
    pub fn execute(&mut self, case: CaseRunner) -> CaseOutcome {
        let case = self.wrap(case);
        let CaseRunner {
            name,
            context,
            body,
            wrapped: _,
        } = case;

        let started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(body));
        let duration = started.elapsed().as_secs_f64();

        match result {
            Ok(()) => {
                self.store.record_passed(PassedRecord {
                    test_name: name,
                    duration: Some(duration),
                });
                CaseOutcome::Passed
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::debug!(test = %name, "captured failing case");
                let record = build_failure_record(name, context, &self.options, message, duration);
                self.store.record_failure(record);
                CaseOutcome::Failed
            }
        }
    }

    /// "Session finished" trigger. Exit status zero suppresses report
    /// generation entirely, even when the store is non-empty.
    pub fn finish(&self, exit_status: i32) -> FsResult<WriteSummary> {
        if exit_status == 0 {
            tracing::info!("session exited cleanly, skipping report generation");
            return Ok(WriteSummary::default());
        }

        let summary = ReportWriter::new(&self.output_dir).write_all(&self.store)?;
        if summary.written.is_empty() && summary.failed.is_empty() {
            tracing::info!("no failures to report");
        } else {
            tracing::info!(
                generated = summary.written.len(),
                failed = summary.failed.len(),
                dir = %self.output_dir.display(),
                "failure reports generated"
            );
        }
        Ok(summary)
    }

    /// Drop all captured records, e.g. when a collaborator starts a fresh
    /// logical session in the same process.
    pub fn reset(&mut self) {
        self.store.reset();
    }
}

fn build_failure_record(
    test_name: String,
    context: CaseContext,
    options: &CaptureOptions,
    message: String,
    duration: f64,
) -> FailureRecord {
    let mut record = FailureRecord::new(test_name);
    record.test_module = context.module;
    record.test_file = context.file;
    record.line_number = context.line;
    record.exception_type = Some("panic".to_owned());
    record.exception_message = Some(message);
    record.exception_traceback = context.backtrace;
    if options.include_locals {
        record.local_variables = context.locals;
    }
    record.test_source = context
        .source
        .map(|source| clamp_source(&source, options.max_code_lines));
    if options.include_fixtures {
        record.fixtures = context.fixtures;
    }
    record.markers = context.markers;
    record.duration = Some(duration);
    record
}

/// Keep at most `max_lines` lines of captured source.
fn clamp_source(source: &str, max_lines: usize) -> String {
    let mut lines = source.lines();
    let kept: Vec<&str> = lines.by_ref().take(max_lines).collect();
    if lines.next().is_none() {
        source.to_owned()
    } else {
        kept.join("\n")
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}
