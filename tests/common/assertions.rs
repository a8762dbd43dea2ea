//! Custom assertion utilities for tests.

use aleo_sandbox::TransactionError;

/// Assert that a result is Ok and return the inner value.
///
/// Panics with `context` and the error chain if the result is `Err`.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that `wait()` ended in a rejection (not a confirmation failure)
/// whose reason mentions `reason`.
#[allow(dead_code)]
pub fn assert_rejected<T: std::fmt::Debug>(
    result: Result<T, TransactionError>,
    reason: &str,
    context: &str,
) {
    match result {
        Ok(v) => panic!("{} should have been rejected but got: {:?}", context, v),
        Err(err) => {
            assert!(err.is_rejected(), "{}: expected a rejection, got: {}", context, err);
            assert_error_contains(&err, reason, context);
        }
    }
}
