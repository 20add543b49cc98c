//! Deterministic markdown rendering of one [`FailureRecord`].
//!
//! Each section is an independent rule conditioned on field presence; the
//! composition order is fixed (Header, Exception, Locals, Source, Fixtures,
//! Markers, Duration) and never depends on input iteration order. Absent
//! optional fields simply omit their section — rendering is total and never
//! errors on a record.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::model::{FailureRecord, FixtureDetail};

/// Hard ceiling on one local variable's rendered representation.
pub const LOCAL_REPR_LIMIT: usize = 200;

/// Hard ceiling on one fixture's rendered source text.
pub const FIXTURE_SOURCE_LIMIT: usize = 300;

/// Marker appended when a representation is cut at its ceiling.
pub const ELLIPSIS: &str = "...";

const UNKNOWN: &str = "unknown";

/// Render a complete report document for one failure record.
///
/// `generated_at` is the render time (not the capture time) and appears in
/// the header; the report writer stamps the whole batch with one instant so
/// document timestamps and filenames agree.
#[must_use]
pub fn render_report(record: &FailureRecord, generated_at: DateTime<Utc>) -> String {
    let mut lines: Vec<String> = Vec::new();

    push_header(&mut lines, record, generated_at);
    push_exception(&mut lines, record);
    push_locals(&mut lines, record);
    push_source(&mut lines, record);
    push_fixtures(&mut lines, record);
    push_markers(&mut lines, record);
    push_duration(&mut lines, record);

    lines.join("\n")
}

fn push_header(lines: &mut Vec<String>, record: &FailureRecord, generated_at: DateTime<Utc>) {
    let module = record.test_module.as_deref().unwrap_or(UNKNOWN);
    let file = record.test_file.as_deref().unwrap_or(UNKNOWN);
    let line_number = record
        .line_number
        .map_or_else(|| UNKNOWN.to_owned(), |n| n.to_string());

    lines.push(format!("# Test Failure Report: `{}`", record.test_name));
    lines.push(String::new());
    lines.push(format!("**Generated on:** {}", generated_at.to_rfc3339()));
    lines.push(String::new());
    lines.push("## Test Information".to_owned());
    lines.push(String::new());
    lines.push(format!("- **Test Name:** `{}`", record.test_name));
    lines.push(format!("- **Module:** `{module}`"));
    lines.push(format!("- **File:** `{file}`"));
    lines.push(format!("- **Line Number:** {line_number}"));
    lines.push(String::new());
}

fn push_exception(lines: &mut Vec<String>, record: &FailureRecord) {
    let exception_type = record.exception_type.as_deref().unwrap_or(UNKNOWN);
    let message = record
        .exception_message
        .as_deref()
        .unwrap_or("no message captured");
    let traceback = record
        .exception_traceback
        .as_deref()
        .unwrap_or("no backtrace captured");

    lines.push("## Failure Details".to_owned());
    lines.push(String::new());
    lines.push("### Exception Type".to_owned());
    lines.push(format!("`{exception_type}`"));
    lines.push(String::new());
    lines.push("### Error Message".to_owned());
    lines.push("```".to_owned());
    lines.push(message.to_owned());
    lines.push("```".to_owned());
    lines.push(String::new());
    lines.push("### Full Traceback".to_owned());
    lines.push("```text".to_owned());
    lines.push(traceback.to_owned());
    lines.push("```".to_owned());
    lines.push(String::new());
}

fn push_locals(lines: &mut Vec<String>, record: &FailureRecord) {
    if record.local_variables.is_empty() {
        return;
    }

    lines.push("## Local Variables at Failure".to_owned());
    lines.push(String::new());
    lines.push("```rust".to_owned());
    for variable in &record.local_variables {
        let repr = truncate_repr(&variable.repr, LOCAL_REPR_LIMIT);
        lines.push(format!("{} = {}", variable.name, repr));
    }
    lines.push("```".to_owned());
    lines.push(String::new());
}

fn push_source(lines: &mut Vec<String>, record: &FailureRecord) {
    let Some(source) = record.test_source.as_deref() else {
        return;
    };

    lines.push("## Test Source Code".to_owned());
    lines.push(String::new());
    lines.push("```rust".to_owned());
    lines.push(source.to_owned());
    lines.push("```".to_owned());
    lines.push(String::new());
}

fn push_fixtures(lines: &mut Vec<String>, record: &FailureRecord) {
    // None means fixtures were not captured at all; the section is omitted.
    // An empty list means capture ran and found nothing, which is worth
    // saying out loud.
    let Some(fixtures) = record.fixtures.as_deref() else {
        return;
    };

    lines.push("## Fixture Information".to_owned());
    lines.push(String::new());

    if fixtures.is_empty() {
        lines.push("No fixtures detected for this test.".to_owned());
        lines.push(String::new());
        return;
    }

    lines.push("```rust".to_owned());
    for fixture in fixtures {
        match &fixture.detail {
            FixtureDetail::Builtin { description } => {
                let description = description.as_deref().unwrap_or("no description");
                lines.push(format!("# {} (built-in): {}", fixture.name, description));
            }
            FixtureDetail::Custom { scope, source } => {
                lines.push(format!("# {} (scope: {})", fixture.name, scope));
                if let Some(source) = source {
                    lines.push(truncate_repr(source, FIXTURE_SOURCE_LIMIT).into_owned());
                    lines.push(String::new());
                }
            }
        }
    }
    lines.push("```".to_owned());
    lines.push(String::new());
}

fn push_markers(lines: &mut Vec<String>, record: &FailureRecord) {
    if record.markers.is_empty() {
        return;
    }

    lines.push("## Test Markers".to_owned());
    lines.push(String::new());
    for marker in &record.markers {
        lines.push(format!("- {marker}"));
    }
    lines.push(String::new());
}

fn push_duration(lines: &mut Vec<String>, record: &FailureRecord) {
    let Some(duration) = record.duration else {
        return;
    };

    lines.push("## Performance".to_owned());
    lines.push(String::new());
    lines.push(format!("- **Test Duration:** {duration:.3} seconds"));
    lines.push(String::new());
}

/// Cut `text` to at most `limit` characters, appending [`ELLIPSIS`] when
/// anything was dropped. Character-based so a multi-byte code point is never
/// split.
pub(crate) fn truncate_repr(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        None => Cow::Borrowed(text),
        Some((byte_index, _)) => {
            let mut cut = text[..byte_index].to_owned();
            cut.push_str(ELLIPSIS);
            Cow::Owned(cut)
        }
    }
}
