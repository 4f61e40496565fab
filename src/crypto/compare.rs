use subtle::ConstantTimeEq;

/// Constant-time byte comparison.
///
/// Lengths are compared first and are not treated as secret.
#[must_use]
pub fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_and_unequal_slices() {
        assert!(bytes_equal(b"abc", b"abc"));
        assert!(bytes_equal(b"", b""));
        assert!(!bytes_equal(b"abc", b"abd"));
        assert!(!bytes_equal(b"abc", b"abcd"));
    }
}
