//! Constant-time comparisons for secret values
//!
//! Stored magic-login tokens, API keys and similar secrets must never be
//! compared with `==`: an early-exit comparison leaks the length of the
//! matching prefix through its running time.

use subtle::ConstantTimeEq;

/// Constant-time comparison of byte slices
///
/// Execution time is independent of the contents. Length is not treated as
/// secret.
///
/// ```rust
/// use crypto::constant_time::ct_eq;
///
/// assert!(ct_eq(b"abc123", b"abc123"));
/// assert!(!ct_eq(b"abc123", b"abc124"));
/// ```
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Constant-time comparison of strings
pub fn ct_eq_str(a: &str, b: &str) -> bool {
    ct_eq(a.as_bytes(), b.as_bytes())
}
