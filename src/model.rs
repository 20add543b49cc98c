use serde::{Deserialize, Serialize};

/// One captured local variable at the point of failure.
///
/// The textual representation arrives already stringified by the capture
/// collaborator; capture order is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub name: String,
    pub repr: String,
}

impl LocalVariable {
    #[must_use]
    pub fn new(name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repr: repr.into(),
        }
    }
}

/// Fixture classification, tagged by the `type` field on the wire.
///
/// Builtin fixtures carry only an optional description; every other fixture
/// has a scope and, when captured, its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixtureDetail {
    Builtin {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Custom {
        scope: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

/// One fixture the failing test depended on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(flatten)]
    pub detail: FixtureDetail,
}

impl Fixture {
    #[must_use]
    pub fn builtin(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            detail: FixtureDetail::Builtin { description },
        }
    }

    #[must_use]
    pub fn custom(
        name: impl Into<String>,
        scope: impl Into<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            detail: FixtureDetail::Custom {
                scope: scope.into(),
                source,
            },
        }
    }
}

/// Structured snapshot of one failed test's context.
///
/// `test_name` is the only required field; every other field is
/// independently optional and its absence never breaks rendering. Records
/// are immutable once appended to a [`crate::store::FailureStore`] — the
/// store only hands out shared references.
///
/// `fixtures` distinguishes "not captured" (`None`, section omitted from
/// the report) from "captured, none found" (`Some` of an empty vec, which
/// renders an explicit notice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub test_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_traceback: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_variables: Vec<LocalVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<Vec<Fixture>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl FailureRecord {
    /// A record carrying only the required test identity.
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            test_module: None,
            test_file: None,
            line_number: None,
            exception_type: None,
            exception_message: None,
            exception_traceback: None,
            local_variables: Vec::new(),
            test_source: None,
            fixtures: None,
            markers: Vec::new(),
            duration: None,
        }
    }
}

/// Minimal entry for a passing test, retained only for the passed-record
/// ceiling. Passed records are never rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassedRecord {
    pub test_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Configuration consumed when a wrapped test case builds its
/// [`FailureRecord`].
///
/// `max_depth` and `code_context_lines` are bounds handed to the extraction
/// collaborator (how deep to stringify nested values, how much surrounding
/// source to gather); `max_code_lines` is applied by the session itself when
/// attaching captured test source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOptions {
    pub include_locals: bool,
    pub include_fixtures: bool,
    pub max_depth: usize,
    pub code_context_lines: usize,
    pub max_code_lines: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            include_locals: true,
            include_fixtures: true,
            max_depth: 10,
            code_context_lines: 20,
            max_code_lines: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minimal_record_has_only_identity() {
        let record = FailureRecord::new("tests::test_minimal");
        assert_eq!(record.test_name, "tests::test_minimal");
        assert!(record.test_module.is_none());
        assert!(record.local_variables.is_empty());
        assert!(record.fixtures.is_none());
        assert!(record.markers.is_empty());
        assert!(record.duration.is_none());
    }

    #[test]
    fn minimal_record_serializes_compactly() {
        let record = FailureRecord::new("tests::test_compact");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value, json!({"test_name": "tests::test_compact"}));
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut record = FailureRecord::new("tests::integration::test_round_trip");
        record.test_module = Some("integration".to_owned());
        record.test_file = Some("tests/integration.rs".to_owned());
        record.line_number = Some(42);
        record.exception_type = Some("assertion failed".to_owned());
        record.exception_message = Some("left != right".to_owned());
        record.local_variables = vec![LocalVariable::new("count", "3")];
        record.fixtures = Some(vec![
            Fixture::builtin("tmp_path", Some("temporary directory".to_owned())),
            Fixture::custom("database", "module", Some("fn database() {}".to_owned())),
        ]);
        record.markers = vec!["slow".to_owned()];
        record.duration = Some(0.125);

        let encoded = serde_json::to_string(&record).expect("serialize");
        let decoded: FailureRecord = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, record);
    }

    #[test]
    fn record_without_test_name_fails_to_parse() {
        let result = serde_json::from_str::<FailureRecord>(r#"{"duration": 1.0}"#);
        assert!(result.is_err(), "test_name is required");
    }

    #[test]
    fn fixture_wire_format_uses_type_tag() {
        let builtin = Fixture::builtin("capsys", None);
        let value = serde_json::to_value(&builtin).expect("serialize");
        assert_eq!(value, json!({"name": "capsys", "type": "builtin"}));

        let custom = Fixture::custom("server", "session", None);
        let value = serde_json::to_value(&custom).expect("serialize");
        assert_eq!(
            value,
            json!({"name": "server", "type": "custom", "scope": "session"})
        );
    }

    #[test]
    fn fixture_parses_from_wire_format() {
        let fixture: Fixture = serde_json::from_value(json!({
            "name": "database",
            "type": "custom",
            "scope": "function",
            "source": "fn database() -> Db { Db::connect() }"
        }))
        .expect("deserialize");
        assert_eq!(fixture.name, "database");
        assert!(matches!(
            fixture.detail,
            FixtureDetail::Custom { ref scope, ref source }
                if scope == "function" && source.is_some()
        ));
    }

    #[test]
    fn empty_fixture_list_survives_round_trip() {
        let mut record = FailureRecord::new("tests::test_no_fixtures");
        record.fixtures = Some(Vec::new());

        let encoded = serde_json::to_string(&record).expect("serialize");
        let decoded: FailureRecord = serde_json::from_str(&encoded).expect("deserialize");
        // Some(vec![]) must not collapse to None: the distinction drives the
        // "no fixtures detected" notice.
        assert_eq!(decoded.fixtures, Some(Vec::new()));
    }

    #[test]
    fn capture_options_defaults() {
        let options = CaptureOptions::default();
        assert!(options.include_locals);
        assert!(options.include_fixtures);
        assert_eq!(options.max_depth, 10);
        assert_eq!(options.code_context_lines, 20);
        assert_eq!(options.max_code_lines, 500);
    }

    #[test]
    fn passed_record_round_trips() {
        let record = PassedRecord {
            test_name: "tests::test_ok".to_owned(),
            duration: Some(0.002),
        };
        let encoded = serde_json::to_string(&record).expect("serialize");
        let decoded: PassedRecord = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, record);
    }
}
