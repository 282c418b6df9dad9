//! Constant-time comparison of digest text

use subtle::{Choice, ConstantTimeEq};

/// Compare two byte strings without an early exit
///
/// The loop always runs over the longer input. Positions past the end of the
/// shorter input are compared against zero and forced unequal, so neither the
/// first differing position nor a length mismatch ends the loop early. Only
/// the returned boolean depends on the contents.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut equal: Choice = a.len().ct_eq(&b.len());

    for i in 0..len {
        let (x, in_a) = byte_at(a, i);
        let (y, in_b) = byte_at(b, i);
        equal &= x.ct_eq(&y) & in_a & in_b;
    }

    equal.into()
}

#[inline]
fn byte_at(bytes: &[u8], index: usize) -> (u8, Choice) {
    match bytes.get(index) {
        Some(&byte) => (byte, Choice::from(1)),
        None => (0, Choice::from(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_inputs() {
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(b"E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW", b"E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"));
    }

    #[test]
    fn test_unequal_inputs() {
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"xbc", b"abc"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abc\0"));
        assert!(!constant_time_eq(b"abc\0", b"abc"));
        assert!(!constant_time_eq(b"", b"\0"));
        assert!(!constant_time_eq(b"abc", b""));
    }
}
