//! XHTML serialization of a [`DocumentTree`].
//!
//! The tree came out of a permissive HTML parser, but the result has to be
//! well-formed XML: void elements are self-closed, every other element gets an
//! explicit end tag, and text and attribute values are escaped for XML.

use std::fmt::{self, Write};

use html5ever::QualName;

use super::tree::{Doctype, DocumentTree, Element, NodeId, NodeKind};

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Serialize the whole document to an XHTML string.
///
/// The walk keeps its own stack, so nesting depth is not limited by the call
/// stack.
pub fn serialize_xhtml(tree: &DocumentTree) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let mut pending = Vec::new();
    schedule_children(tree, tree.root(), &mut pending);

    while let Some(step) = pending.pop() {
        match step {
            Step::Enter(id) => {
                if enter(tree, id, &mut out)? {
                    pending.push(Step::Leave(id));
                    schedule_children(tree, id, &mut pending);
                }
            }
            Step::Leave(id) => {
                if let Some(element) = tree.element(id) {
                    out.write_str("</")?;
                    write_qname(&mut out, &element.name)?;
                    out.write_char('>')?;
                }
            }
        }
    }

    Ok(out)
}

fn schedule_children(tree: &DocumentTree, parent: NodeId, pending: &mut Vec<Step>) {
    let start = pending.len();
    pending.extend(tree.children(parent).map(Step::Enter));
    pending[start..].reverse();
}

/// Write everything up to a node's content. Returns whether its children and
/// end tag still have to follow.
fn enter(tree: &DocumentTree, id: NodeId, out: &mut String) -> Result<bool, fmt::Error> {
    let node = &tree[id];
    match &node.kind {
        NodeKind::Document => return Ok(node.has_children()),
        NodeKind::Element(element) => {
            write_start_tag(out, element)?;
            if node.has_children() {
                out.write_char('>')?;
                return Ok(true);
            }
            if is_void(element) || !element.is_html() {
                out.write_str("/>")?;
            } else {
                out.write_str("></")?;
                write_qname(out, &element.name)?;
                out.write_char('>')?;
            }
        }
        NodeKind::Text(text) => escape_into(out, text, false)?,
        NodeKind::Comment(text) => match processing_instruction(text) {
            Some(pi) if in_prolog(tree, id) => writeln!(out, "<{pi}>")?,
            _ => write!(out, "<!--{text}-->")?,
        },
        NodeKind::Doctype(doctype) => write_doctype(out, doctype)?,
    }
    Ok(false)
}

fn write_start_tag(out: &mut String, element: &Element) -> fmt::Result {
    out.write_char('<')?;
    write_qname(out, &element.name)?;
    for attr in &element.attrs {
        out.write_char(' ')?;
        write_qname(out, &attr.name)?;
        out.write_str("=\"")?;
        escape_into(out, &attr.value, true)?;
        out.write_char('"')?;
    }
    Ok(())
}

fn write_doctype(out: &mut String, doctype: &Doctype) -> fmt::Result {
    write!(out, "<!DOCTYPE {}", doctype.name)?;
    match (doctype.public_id.as_str(), doctype.system_id.as_str()) {
        ("", "") => {}
        ("", system) => write!(out, " SYSTEM \"{system}\"")?,
        (public, "") => write!(out, " PUBLIC \"{public}\"")?,
        (public, system) => write!(out, " PUBLIC \"{public}\" \"{system}\"")?,
    }
    out.write_str(">\n")
}

/// The HTML tokenizer turns `<?xml ...?>` into a bogus comment holding
/// `?xml ...?`. Recover the instruction from that form.
/// Whether a node sits at document level ahead of the root element.
fn in_prolog(tree: &DocumentTree, id: NodeId) -> bool {
    let root = tree.root();
    tree[id].parent() == Some(root)
        && tree
            .children(root)
            .take_while(|&child| child != id)
            .all(|child| tree.element(child).is_none())
}

fn processing_instruction(comment: &str) -> Option<&str> {
    (comment.len() >= 2 && comment.starts_with('?') && comment.ends_with('?')).then_some(comment)
}

fn is_void(element: &Element) -> bool {
    element.is_html() && VOID_ELEMENTS.contains(&element.tag())
}

fn write_qname(out: &mut String, name: &QualName) -> fmt::Result {
    if let Some(prefix) = &name.prefix {
        out.write_str(prefix)?;
        out.write_char(':')?;
    }
    out.write_str(&name.local)
}

fn escape_into(out: &mut String, text: &str, attr_mode: bool) -> fmt::Result {
    for c in text.chars() {
        match c {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' if attr_mode => out.write_str("&quot;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}
