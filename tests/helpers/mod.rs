#![allow(dead_code)]

use failscribe::model::{FailureRecord, Fixture, LocalVariable};

/// Record carrying only the required identity.
pub fn minimal_record(test_name: &str) -> FailureRecord {
    FailureRecord::new(test_name)
}

/// Record with every optional field populated.
pub fn full_record(test_name: &str) -> FailureRecord {
    let mut record = FailureRecord::new(test_name);
    record.test_module = Some("integration".to_owned());
    record.test_file = Some("tests/integration.rs".to_owned());
    record.line_number = Some(88);
    record.exception_type = Some("assertion failed".to_owned());
    record.exception_message = Some("left != right".to_owned());
    record.exception_traceback =
        Some("0: integration::test_case\n1: core::panicking::panic".to_owned());
    record.local_variables = vec![
        LocalVariable::new("expected", "42"),
        LocalVariable::new("actual", "41"),
    ];
    record.test_source = Some("fn test_case() {\n    assert_eq!(41, 42);\n}".to_owned());
    record.fixtures = Some(vec![
        Fixture::builtin("tmp_path", Some("temporary directory".to_owned())),
        Fixture::custom("database", "module", Some("fn database() {}".to_owned())),
    ]);
    record.markers = vec!["slow".to_owned(), "flaky".to_owned()];
    record.duration = Some(1.25);
    record
}
