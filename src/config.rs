//! Conversion settings.
//!
//! A [`Config`] is built once, validated, and then only read. The exclusion
//! tables default to what suits typical trade-book EPUBs: links, headings and
//! document metadata are left alone, as are figure captions and code
//! listings marked up with the usual class names.

use std::collections::BTreeMap;

use crate::emphasis::DEFAULT_FULL_EMPHASIS_LEN;
use crate::error::{Error, Result};

/// Tags whose whole subtree is never rewritten.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &[
    "a", "meta", "title", "h1", "h2", "h3", "h4", "h5", "h6", "link", "script", "style",
];

/// Tags skipped only when they carry one of the listed classes.
pub const DEFAULT_EXCLUDED_CLASSES: &[(&str, &[&str])] = &[
    ("p", &["caption", "parttext"]),
    ("span", &["bold"]),
    ("div", &["listing"]),
];

/// Member suffixes treated as content documents.
pub const DEFAULT_DOCUMENT_SUFFIXES: &[&str] = &[".html", ".xhtml", ".htm"];

/// Configuration for a conversion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default, deny_unknown_fields))]
pub struct Config {
    /// Tag names excluded together with their descendants.
    pub excluded_tags: Vec<String>,
    /// Tag name to class names; the element is excluded when any class matches.
    pub excluded_classes: BTreeMap<String, Vec<String>>,
    /// Element wrapped around the emphasized prefix.
    pub emphasis_tag: String,
    /// Words up to this many characters are emphasized entirely.
    pub full_emphasis_len: usize,
    /// Members whose path ends with one of these are transformed.
    pub document_suffixes: Vec<String>,
    /// Deflate level for packed members (0-9). `None` uses the zip default.
    pub compression_level: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            excluded_classes: DEFAULT_EXCLUDED_CLASSES
                .iter()
                .map(|(tag, classes)| {
                    (
                        tag.to_string(),
                        classes.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect(),
            emphasis_tag: "b".to_string(),
            full_emphasis_len: DEFAULT_FULL_EMPHASIS_LEN,
            document_suffixes: DEFAULT_DOCUMENT_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            compression_level: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add one class-scoped exclusion, e.g. `("aside", "sidebar")`.
    pub fn with_excluded_class(mut self, tag: impl Into<String>, class: impl Into<String>) -> Self {
        self.excluded_classes
            .entry(tag.into())
            .or_default()
            .push(class.into());
        self
    }

    pub fn with_emphasis_tag(mut self, tag: impl Into<String>) -> Self {
        self.emphasis_tag = tag.into();
        self
    }

    pub fn with_full_emphasis_len(mut self, len: usize) -> Self {
        self.full_emphasis_len = len;
        self
    }

    pub fn with_document_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Whether a member path names a content document.
    pub fn is_document(&self, path: &str) -> bool {
        self.document_suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }

    /// Reject settings that would produce broken markup or archives.
    pub fn validate(&self) -> Result<()> {
        let tag = &self.emphasis_tag;
        let valid_tag = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid_tag {
            return Err(Error::Config(format!("invalid emphasis tag {tag:?}")));
        }
        if let Some(level) = self.compression_level
            && !(0..=9).contains(&level)
        {
            return Err(Error::Config(format!(
                "compression level {level} is outside 0-9"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.excluded_tags.iter().any(|t| t == "a"));
        assert_eq!(config.excluded_classes["p"], ["caption", "parttext"]);
        assert_eq!(config.emphasis_tag, "b");
        assert_eq!(config.full_emphasis_len, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_document() {
        let config = Config::default();
        assert!(config.is_document("OEBPS/text/ch01.xhtml"));
        assert!(config.is_document("chapter.html"));
        assert!(!config.is_document("OEBPS/style.css"));
        assert!(!config.is_document("chapter.HTML"));
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_excluded_tags(["pre"])
            .with_excluded_class("aside", "sidebar")
            .with_emphasis_tag("strong")
            .with_document_suffixes([".xhtml"]);
        assert_eq!(config.excluded_tags, ["pre"]);
        assert_eq!(config.excluded_classes["aside"], ["sidebar"]);
        assert_eq!(config.emphasis_tag, "strong");
        assert!(!config.is_document("a.html"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::new().with_emphasis_tag("").validate().is_err());
        assert!(Config::new().with_emphasis_tag("b x").validate().is_err());
        assert!(Config::new().with_emphasis_tag("<b>").validate().is_err());
        assert!(
            Config::new()
                .with_compression_level(Some(12))
                .validate()
                .is_err()
        );
    }
}
