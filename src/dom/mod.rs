//! Document tree for content documents.
//!
//! Markup is parsed by html5ever, which tolerates whatever browsers tolerate,
//! into a [`DocumentTree`]. [`serialize_xhtml`] writes the tree back out in
//! the strict form EPUB reading systems expect.

mod builder;
mod serialize;
mod tree;

pub use builder::DocumentBuilder;
pub use serialize::serialize_xhtml;
pub use tree::{
    Attribute, Children, Descendants, Doctype, DocumentTree, Element, Node, NodeId, NodeKind,
};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

/// Parse a whole document. Never fails; malformed markup is repaired the way
/// the HTML5 tree builder repairs it.
pub fn parse_html(html: &str) -> DocumentTree {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            // `<noscript>` content is markup, not raw text.
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let builder = parse_document(DocumentBuilder::new(), opts).one(html);
    if builder.error_count() > 0 {
        tracing::trace!(errors = builder.error_count(), "recovered from parse errors");
    }
    builder.into_tree()
}
