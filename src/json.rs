//! Quasi-JSON helpers for terse test bodies.

/// Normalize a single-quoted quasi-JSON literal into strict JSON by replacing
/// every `'` with `"`.
///
/// Lets tests write `xq("{'a':'b'}")` instead of escaping double quotes.
/// Pure and stateless; idempotent on input that is already strict JSON.
/// Single quotes inside string values are converted too, so bodies containing
/// literal apostrophes must be written as strict JSON directly.
pub fn xq(input: &str) -> String {
    input.replace('\'', "\"")
}
