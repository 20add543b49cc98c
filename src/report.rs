//! Persists one markdown document per captured failure.
//!
//! Filenames are derived from the sanitized test name plus a
//! second-resolution timestamp; a same-second collision with an identical
//! sanitized name gets a numeric suffix instead of silently overwriting the
//! earlier report. Per-record I/O failures are isolated — one unwritable
//! file never aborts the batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{FsError, FsResult};
use crate::render::render_report;
use crate::store::FailureStore;

/// Filename stamp format, one-second granularity.
const FILENAME_STAMP: &str = "%Y%m%d_%H%M%S";

/// Outcome of one `write_all` batch: paths written in capture order, plus
/// any per-record failures that were isolated along the way.
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<WriteFailure>,
}

/// One report that could not be persisted.
#[derive(Debug)]
pub struct WriteFailure {
    pub test_name: String,
    pub error: FsError,
}

/// Writes each of a store's failure records to its own report file.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and persist every failure record in capture order.
    ///
    /// An empty store is a strict no-op: no directory is created and the
    /// summary is empty. A record whose file cannot be written is reported
    /// in the summary (and logged) while the batch continues; only failure
    /// to create the output directory itself aborts.
    pub fn write_all(&self, store: &FailureStore) -> FsResult<WriteSummary> {
        self.write_all_at(store, Utc::now())
    }

    pub(crate) fn write_all_at(
        &self,
        store: &FailureStore,
        generated_at: DateTime<Utc>,
    ) -> FsResult<WriteSummary> {
        let mut summary = WriteSummary::default();
        if store.failure_count() == 0 {
            return Ok(summary);
        }

        fs::create_dir_all(&self.output_dir)?;
        let stamp = generated_at.format(FILENAME_STAMP).to_string();
        let mut taken: HashSet<PathBuf> = HashSet::new();

        for record in store.failures() {
            let path = self.derive_path(&record.test_name, &stamp, &taken);
            taken.insert(path.clone());

            let document = render_report(record, generated_at);
            match fs::write(&path, document) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), test = %record.test_name, "report written");
                    summary.written.push(path);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        test = %record.test_name,
                        %error,
                        "failed to write failure report, continuing"
                    );
                    summary.failed.push(WriteFailure {
                        test_name: record.test_name.clone(),
                        error: FsError::from_write_failure(path, &error),
                    });
                }
            }
        }

        Ok(summary)
    }

    /// `<sanitized>_<stamp>.md`, with a `_2`, `_3`, … suffix when the base
    /// name is already taken on disk or earlier in this batch.
    fn derive_path(&self, test_name: &str, stamp: &str, taken: &HashSet<PathBuf>) -> PathBuf {
        let safe_name = sanitize_test_name(test_name);
        let base = self.output_dir.join(format!("{safe_name}_{stamp}.md"));
        if !taken.contains(&base) && !base.exists() {
            return base;
        }

        let mut sequence = 2usize;
        loop {
            let candidate = self
                .output_dir
                .join(format!("{safe_name}_{stamp}_{sequence}.md"));
            if !taken.contains(&candidate) && !candidate.exists() {
                return candidate;
            }
            sequence += 1;
        }
    }
}

/// Replace path-separator and test-id-separator substrings with `_` so the
/// test identity survives as a single flat filename component.
#[must_use]
pub fn sanitize_test_name(name: &str) -> String {
    name.replace("::", "_").replace(['/', '\\'], "_")
}
