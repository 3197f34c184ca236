//! How much of a word gets emphasized.

/// Words up to this many characters are emphasized in full.
pub const DEFAULT_FULL_EMPHASIS_LEN: usize = 3;

/// Maps a word length to the number of leading characters to emphasize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmphasisPolicy {
    full_emphasis_len: usize,
}

impl EmphasisPolicy {
    pub fn new(full_emphasis_len: usize) -> Self {
        Self { full_emphasis_len }
    }

    /// Split index for a word of `length` characters.
    ///
    /// Short words are emphasized entirely; longer ones get `ceil(log2(length))`
    /// leading characters, so the emphasized prefix grows slowly with length.
    pub fn split_point(&self, length: usize) -> usize {
        if length <= self.full_emphasis_len {
            return length;
        }
        ceil_log2(length).min(length)
    }
}

impl Default for EmphasisPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FULL_EMPHASIS_LEN)
    }
}

/// [`EmphasisPolicy::split_point`] with the default threshold.
pub fn split_point(length: usize) -> usize {
    EmphasisPolicy::default().split_point(length)
}

/// Exact `ceil(log2(n))` for `n >= 1`.
fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_words_fully_emphasized() {
        assert_eq!(split_point(0), 0);
        assert_eq!(split_point(1), 1);
        assert_eq!(split_point(2), 2);
        assert_eq!(split_point(3), 3);
    }

    #[test]
    fn test_logarithmic_split() {
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 3);
        assert_eq!(split_point(7), 3);
        assert_eq!(split_point(8), 3);
        assert_eq!(split_point(9), 4);
        assert_eq!(split_point(16), 4);
        assert_eq!(split_point(17), 5);
    }

    #[test]
    fn test_custom_threshold() {
        let policy = EmphasisPolicy::new(5);
        assert_eq!(policy.split_point(5), 5);
        assert_eq!(policy.split_point(6), 3);

        let policy = EmphasisPolicy::new(0);
        assert_eq!(policy.split_point(1), 0);
        assert_eq!(policy.split_point(2), 1);
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(1024), 10);
        assert_eq!(ceil_log2(1025), 11);
    }

    proptest! {
        #[test]
        fn prop_split_point_within_word(len in 0usize..100_000) {
            prop_assert!(split_point(len) <= len);
        }

        #[test]
        fn prop_split_point_non_decreasing_past_threshold(len in 4usize..100_000) {
            prop_assert!(split_point(len) <= split_point(len + 1));
        }

        #[test]
        fn prop_matches_float_log2(len in 4usize..1_000_000) {
            let expected = (len as f64).log2().ceil() as usize;
            prop_assert_eq!(split_point(len), expected);
        }
    }
}
