use serde_json::{Map, Value};
use vdbbench::error::BenchError;
use vdbbench::types::IndexType;

/// Assert that none of `keys` appear in a payload's params.
pub fn assert_no_keys(params: &Map<String, Value>, keys: &[&str], what: &str) {
    for key in keys {
        assert!(
            !params.contains_key(*key),
            "{what} params unexpectedly contain '{key}': {params:?}"
        );
    }
}

/// Assert that `result` failed with `MissingRequiredField` for `index` and `field`.
pub fn assert_missing_field<T: std::fmt::Debug>(
    result: Result<T, BenchError>,
    index: IndexType,
    field: &str,
) {
    match result {
        Err(BenchError::MissingRequiredField { index: i, field: f }) => {
            assert_eq!(i, index);
            assert_eq!(f, field);
        }
        other => panic!("expected missing field '{field}' for {index}, got {other:?}"),
    }
}

/// Assert that `result` failed with `InvalidField` for `field`.
pub fn assert_invalid_field<T: std::fmt::Debug>(result: Result<T, BenchError>, field: &str) {
    match result {
        Err(BenchError::InvalidField { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected invalid field '{field}', got {other:?}"),
    }
}
