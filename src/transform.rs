//! Bionic-reading rewrite of one content document.
//!
//! The document is parsed into a [`DocumentTree`], walked depth-first, and every
//! text node that contains words is replaced in place by a run of nodes in
//! which each word's leading characters sit inside an emphasis element:
//!
//! ```text
//! <p>Bionic reading</p>  →  <p><b>Bio</b>nic <b>rea</b>ding</p>
//! ```
//!
//! Elements matched by the [`ExclusionRules`] are skipped together with their
//! whole subtree, as is foreign content (SVG, MathML), where an HTML emphasis
//! element would not be valid.

use std::collections::{HashMap, HashSet};

use html5ever::{LocalName, QualName, ns};
use thiserror::Error;

use crate::config::Config;
use crate::dom::{DocumentTree, NodeId, NodeKind, parse_html, serialize_xhtml};
use crate::emphasis::EmphasisPolicy;
use crate::segment::{SegmentKind, Segmenter};

/// Why a document could not be transformed.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("serialization failed")]
    Serialize(#[from] std::fmt::Error),
}

/// Counters collected while rewriting a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Text nodes replaced by emphasized runs.
    pub text_nodes: usize,
    /// Words that received an emphasis element.
    pub words: usize,
}

impl std::ops::AddAssign for TransformStats {
    fn add_assign(&mut self, rhs: Self) {
        self.text_nodes += rhs.text_nodes;
        self.words += rhs.words;
    }
}

/// Elements whose subtree is left untouched.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    tags: HashSet<String>,
    tag_classes: HashMap<String, HashSet<String>>,
}

impl ExclusionRules {
    pub fn from_config(config: &Config) -> Self {
        let tags = config
            .excluded_tags
            .iter()
            .map(|t| t.to_ascii_lowercase())
            .collect();
        let tag_classes = config
            .excluded_classes
            .iter()
            .map(|(tag, classes)| (tag.to_ascii_lowercase(), classes.iter().cloned().collect()))
            .collect();
        Self { tags, tag_classes }
    }

    /// Whether an element with this tag and class list is excluded.
    pub fn excludes(&self, tag: &str, classes: &[String]) -> bool {
        if self.tags.contains(tag) {
            return true;
        }
        self.tag_classes
            .get(tag)
            .is_some_and(|forbidden| classes.iter().any(|c| forbidden.contains(c)))
    }
}

/// Rewrites content documents. Build once per conversion and reuse.
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    rules: ExclusionRules,
    segmenter: Segmenter,
    policy: EmphasisPolicy,
    emphasis: QualName,
}

impl DocumentTransformer {
    pub fn new(config: &Config) -> Self {
        Self {
            rules: ExclusionRules::from_config(config),
            segmenter: Segmenter::new(),
            policy: EmphasisPolicy::new(config.full_emphasis_len),
            emphasis: QualName::new(
                None,
                ns!(html),
                LocalName::from(config.emphasis_tag.to_ascii_lowercase()),
            ),
        }
    }

    /// Parse, rewrite and serialize one document.
    pub fn transform(&self, markup: &str) -> Result<String, TransformError> {
        self.transform_with_stats(markup).map(|(out, _)| out)
    }

    /// Like [`transform`](Self::transform), also reporting what was changed.
    ///
    /// A document without any word to emphasize is returned as given.
    pub fn transform_with_stats(
        &self,
        markup: &str,
    ) -> Result<(String, TransformStats), TransformError> {
        let mut tree = parse_html(markup);
        let stats = self.rewrite(&mut tree);
        if stats.text_nodes == 0 {
            return Ok((markup.to_string(), stats));
        }
        let out = serialize_xhtml(&tree)?;
        Ok((out, stats))
    }

    /// Rewrite an already parsed tree in place.
    pub fn rewrite(&self, tree: &mut DocumentTree) -> TransformStats {
        let mut stats = TransformStats::default();
        let mut stack = vec![tree.root()];

        while let Some(id) = stack.pop() {
            match &tree[id].kind {
                NodeKind::Text(_) => self.rewrite_text(tree, id, &mut stats),
                NodeKind::Element(element)
                    if !element.is_html()
                        || self.rules.excludes(element.tag(), element.classes()) => {}
                NodeKind::Element(_) | NodeKind::Document => {
                    // Collected up front: rewriting splices new siblings into the list.
                    let start = stack.len();
                    stack.extend(tree.children(id));
                    stack[start..].reverse();
                }
                NodeKind::Comment(_) | NodeKind::Doctype(_) => {}
            }
        }
        stats
    }

    /// Replace a text node by emphasized words and plain runs. Text without
    /// any word is left as it is.
    fn rewrite_text(&self, tree: &mut DocumentTree, id: NodeId, stats: &mut TransformStats) {
        let Some(text) = tree.text(id) else {
            return;
        };
        if !self
            .segmenter
            .segments(text)
            .any(|s| s.kind == SegmentKind::Word)
        {
            return;
        }
        let text = text.to_owned();

        let mut replacements = Vec::new();
        let mut plain = String::new();
        let mut words = 0;

        for segment in self.segmenter.segments(&text) {
            if segment.kind != SegmentKind::Word {
                plain.push_str(segment.text);
                continue;
            }

            let split = self.policy.split_point(segment.text.chars().count());
            let byte_split = segment
                .text
                .char_indices()
                .nth(split)
                .map_or(segment.text.len(), |(i, _)| i);
            let (head, tail) = segment.text.split_at(byte_split);

            if !head.is_empty() {
                if !plain.is_empty() {
                    replacements.push(tree.push_text(std::mem::take(&mut plain)));
                }
                let emphasis = tree.push_element(self.emphasis.clone(), Vec::new());
                let inner = tree.push_text(head);
                tree.append_child(emphasis, inner);
                replacements.push(emphasis);
                words += 1;
            }
            plain.push_str(tail);
        }
        if !plain.is_empty() {
            replacements.push(tree.push_text(plain));
        }

        tree.splice(id, &replacements);
        stats.text_nodes += 1;
        stats.words += words;
    }
}

impl Default for DocumentTransformer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
