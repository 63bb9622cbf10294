//! Domain-specific assertion macros for trawl harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* traces a query returned versus what was expected.

/// Assert that a stream or result yields exactly the traces with these
/// builder ids, in order.
///
/// ```rust
/// assert_trace_ids!(result.traces, [CHECKOUT, CATALOG]);
/// ```
#[macro_export]
macro_rules! assert_trace_ids {
    ($traces:expr, [$($id:expr),* $(,)?]) => {{
        let actual: Vec<u64> = $traces.iter().map(|t| $crate::common::id_of(t)).collect();
        let expected: Vec<u64> = vec![$($id),*];
        pretty_assertions::assert_eq!(
            actual, expected,
            "assert_trace_ids! failed: query returned the wrong traces"
        );
    }};
}

/// Assert that a `Result` is an `Err` whose display contains `needle`.
///
/// ```rust
/// assert_err_contains!(validate(&ir), "min_duration");
/// ```
#[macro_export]
macro_rules! assert_err_contains {
    ($result:expr, $needle:expr) => {{
        match $result {
            Ok(_) => panic!("assert_err_contains! failed: expected an error containing {:?}", $needle),
            Err(e) => {
                let msg = e.to_string();
                assert!(
                    msg.contains($needle),
                    "assert_err_contains! failed:\n  expected substring: {:?}\n  actual error:       {:?}",
                    $needle,
                    msg
                );
            }
        }
    }};
}
