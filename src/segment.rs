//! Splitting text runs into words and the material between them.
//!
//! A text run is cut into maximal segments of one kind each. Concatenating the
//! segments in order gives back the input exactly, so callers can rewrite the
//! words and re-emit everything else untouched.
//!
//! ```
//! use bionic_epub::segment::{Segmenter, SegmentKind};
//!
//! let segmenter = Segmenter::new();
//! let kinds: Vec<_> = segmenter.segments("Hi, you").map(|s| s.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [SegmentKind::Word, SegmentKind::Punctuation, SegmentKind::Whitespace, SegmentKind::Word]
//! );
//! ```

use regex::Regex;

/// Token class of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Letters, combining marks and numbers of any script.
    Word,
    /// Unicode whitespace.
    Whitespace,
    /// Anything else: punctuation, symbols, emoji.
    Punctuation,
    /// One or more numeric character references such as `&#8212;` or `&#x2014;`.
    CharacterReference,
}

/// A borrowed slice of the input with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'t> {
    pub kind: SegmentKind,
    pub text: &'t str,
}

/// Reusable tokenizer. Construct once and share by reference.
#[derive(Debug, Clone)]
pub struct Segmenter {
    word: Regex,
    char_ref: Regex,
}

impl Segmenter {
    pub fn new() -> Self {
        // Both anchored; matched against the remaining input only.
        let word = Regex::new(r"^[\p{L}\p{M}\p{N}]+")
            .unwrap_or_else(|_| unreachable!("word pattern is valid"));
        let char_ref = Regex::new(r"^(?:&#[0-9]+;|&#[xX][0-9a-fA-F]+;)+")
            .unwrap_or_else(|_| unreachable!("character reference pattern is valid"));
        Self { word, char_ref }
    }

    /// Lazily segment `text`. The iterator is `Clone`, so a run can be walked
    /// more than once.
    pub fn segments<'s, 't>(&'s self, text: &'t str) -> Segments<'s, 't> {
        Segments {
            segmenter: self,
            text,
            pos: 0,
        }
    }

    /// Length in bytes of the word run at the start of `rest`.
    fn word_len(&self, rest: &str) -> Option<usize> {
        self.word.find(rest).map(|m| m.end())
    }

    /// Length in bytes of the character-reference run at the start of `rest`.
    fn char_ref_len(&self, rest: &str) -> Option<usize> {
        if !rest.starts_with("&#") {
            return None;
        }
        self.char_ref.find(rest).map(|m| m.end())
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the segments of one text run.
#[derive(Debug, Clone)]
pub struct Segments<'s, 't> {
    segmenter: &'s Segmenter,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for Segments<'_, 't> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let first = rest.chars().next()?;

        let (kind, len) = if let Some(len) = self.segmenter.word_len(rest) {
            (SegmentKind::Word, len)
        } else if let Some(len) = self.segmenter.char_ref_len(rest) {
            (SegmentKind::CharacterReference, len)
        } else if first.is_whitespace() {
            (SegmentKind::Whitespace, run_len(rest, char::is_whitespace))
        } else {
            (SegmentKind::Punctuation, self.punctuation_len(rest))
        };

        let text = &rest[..len];
        self.pos += len;
        Some(Segment { kind, text })
    }
}

impl Segments<'_, '_> {
    /// Punctuation runs end at a word, whitespace, or the start of a
    /// character reference.
    fn punctuation_len(&self, rest: &str) -> usize {
        for (offset, c) in rest.char_indices() {
            if offset == 0 {
                continue;
            }
            if c.is_whitespace()
                || self.segmenter.word_len(&rest[offset..]).is_some()
                || self.segmenter.char_ref_len(&rest[offset..]).is_some()
            {
                return offset;
            }
        }
        rest.len()
    }
}

fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn split(text: &str) -> Vec<(SegmentKind, &str)> {
        let segmenter = Segmenter::new();
        segmenter
            .segments(text)
            .map(|s| (s.kind, s.text))
            .collect::<Vec<_>>()
    }

    #[test]
    fn test_empty_input() {
        assert!(split("").is_empty());
    }

    #[test]
    fn test_words_and_spaces() {
        use SegmentKind::*;
        assert_eq!(
            split("Bionic reading  test"),
            vec![
                (Word, "Bionic"),
                (Whitespace, " "),
                (Word, "reading"),
                (Whitespace, "  "),
                (Word, "test"),
            ]
        );
    }

    #[test]
    fn test_punctuation_runs() {
        use SegmentKind::*;
        assert_eq!(
            split("\"Well...\" — she said."),
            vec![
                (Punctuation, "\""),
                (Word, "Well"),
                (Punctuation, "...\""),
                (Whitespace, " "),
                (Punctuation, "—"),
                (Whitespace, " "),
                (Word, "she"),
                (Whitespace, " "),
                (Word, "said"),
                (Punctuation, "."),
            ]
        );
    }

    #[test]
    fn test_digits_are_words() {
        use SegmentKind::*;
        assert_eq!(
            split("chapter 12b"),
            vec![(Word, "chapter"), (Whitespace, " "), (Word, "12b")]
        );
    }

    #[test]
    fn test_character_references() {
        use SegmentKind::*;
        assert_eq!(
            split("a&#8212;&#x2014;b"),
            vec![
                (Word, "a"),
                (CharacterReference, "&#8212;&#x2014;"),
                (Word, "b"),
            ]
        );
        assert_eq!(
            split("(&#65;)"),
            vec![
                (Punctuation, "("),
                (CharacterReference, "&#65;"),
                (Punctuation, ")"),
            ]
        );
    }

    #[test]
    fn test_incomplete_reference_is_punctuation() {
        use SegmentKind::*;
        assert_eq!(
            split("&#;&amp;"),
            vec![(Punctuation, "&#;&"), (Word, "amp"), (Punctuation, ";")]
        );
    }

    #[test]
    fn test_non_latin_scripts() {
        use SegmentKind::*;
        assert_eq!(
            split("Привет, мир"),
            vec![
                (Word, "Привет"),
                (Punctuation, ","),
                (Whitespace, " "),
                (Word, "мир"),
            ]
        );
        // Vowel signs and the virama are marks and stay inside the word.
        assert_eq!(split("हिन्दी"), vec![(Word, "हिन्दी")]);
        assert_eq!(split("日本語"), vec![(Word, "日本語")]);
    }

    #[test]
    fn test_segments_restartable() {
        let segmenter = Segmenter::new();
        let segments = segmenter.segments("one two");
        let first: Vec<_> = segments.clone().collect();
        let second: Vec<_> = segments.collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_segments_concatenate_to_input(s in "\\PC*") {
            let segmenter = Segmenter::new();
            let joined: String = segmenter.segments(&s).map(|seg| seg.text).collect();
            prop_assert_eq!(joined, s);
        }

        #[test]
        fn prop_segments_non_empty_and_maximal(s in "[a-z &#;0-9x.,\\t]{0,40}") {
            let segmenter = Segmenter::new();
            let segments: Vec<_> = segmenter.segments(&s).collect();
            for seg in &segments {
                prop_assert!(!seg.text.is_empty());
            }
            for pair in segments.windows(2) {
                let merged = pair[0].kind == pair[1].kind
                    && matches!(pair[0].kind, SegmentKind::Word | SegmentKind::Whitespace);
                prop_assert!(!merged, "adjacent segments of one kind: {:?}", pair);
            }
        }
    }
}
