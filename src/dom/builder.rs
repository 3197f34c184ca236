//! Feeds html5ever's tree builder into a [`DocumentTree`].

use std::borrow::Cow;
use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{QualName, local_name, ns};

use super::tree::{Attribute, Doctype, DocumentTree, NodeId, NodeKind};

/// Name handed out for nodes that are not elements.
static NO_NAME: QualName = QualName {
    prefix: None,
    ns: ns!(),
    local: local_name!(""),
};

/// html5ever sink producing a [`DocumentTree`].
///
/// The trait works through `&self`, so the tree sits in a `RefCell`.
pub struct DocumentBuilder {
    tree: RefCell<DocumentTree>,
    quirks_mode: Cell<QuirksMode>,
    errors: Cell<usize>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(DocumentTree::new()),
            quirks_mode: Cell::new(QuirksMode::NoQuirks),
            errors: Cell::new(0),
        }
    }

    pub fn into_tree(self) -> DocumentTree {
        self.tree.into_inner()
    }

    /// Recoverable errors the parser reported and worked around.
    pub fn error_count(&self) -> usize {
        self.errors.get()
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode.get()
    }
}

fn convert_attrs(attrs: Vec<html5ever::Attribute>) -> impl Iterator<Item = Attribute> {
    attrs.into_iter().map(|a| Attribute {
        name: a.name,
        value: a.value.to_string(),
    })
}

impl TreeSink for DocumentBuilder {
    type Handle = NodeId;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        self.errors.set(self.errors.get() + 1);
    }

    fn get_document(&self) -> NodeId {
        self.tree.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> &'a QualName {
        let tree = self.tree.borrow();
        let Some(element) = tree.element(*target) else {
            return &NO_NAME;
        };
        let name: *const QualName = &*element.name;
        // SAFETY: the name sits behind an `Rc` that is never replaced or
        // dropped while the tree lives, and the tree lives as long as `self`.
        // Growing the node vector moves the `Rc`, not the `QualName`.
        unsafe { &*name }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: ElementFlags,
    ) -> NodeId {
        self.tree
            .borrow_mut()
            .push_element(name, convert_attrs(attrs).collect())
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeKind::Comment(text.to_string()))
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeKind::Comment(format!("?{target} {data}?")))
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut tree = self.tree.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => tree.append_child(*parent, node),
            NodeOrText::AppendText(text) => tree.append_text(*parent, &text),
        }
    }

    fn append_before_sibling(&self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        let mut tree = self.tree.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => tree.insert_before(*sibling, node),
            NodeOrText::AppendText(text) => tree.insert_text_before(*sibling, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        // Foster parenting: go before the table if it is still in the tree.
        let in_tree = self.tree.borrow()[*element].parent().is_some();
        if in_tree {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut tree = self.tree.borrow_mut();
        let doctype = tree.push(NodeKind::Doctype(Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }));
        let root = tree.root();
        tree.append_child(root, doctype);
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        // No separate fragment; template content stays under the element.
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.quirks_mode.set(mode);
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<html5ever::Attribute>) {
        if let Some(element) = self.tree.borrow_mut().element_mut(*target) {
            element.add_missing_attrs(convert_attrs(attrs));
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.tree.borrow_mut().unlink(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        self.tree.borrow_mut().move_children(*node, *new_parent);
    }
}

#[cfg(test)]
mod tests {
    use html5ever::parse_document;
    use html5ever::tendril::TendrilSink;
    use html5ever::tree_builder::QuirksMode;

    use super::DocumentBuilder;
    use crate::dom::{DocumentTree, parse_html};

    fn first_text(tree: &DocumentTree, tag: &str) -> String {
        let element = tree.find_element(tag).expect("element present");
        let child = tree.children(element).next().expect("has a child");
        tree.text(child).expect("child is text").to_string()
    }

    #[test]
    fn test_implied_structure() {
        let tree = parse_html("<p>Hello");
        for tag in ["html", "head", "body", "p"] {
            assert!(tree.find_element(tag).is_some(), "{tag}");
        }
        assert_eq!(first_text(&tree, "p"), "Hello");
    }

    #[test]
    fn test_references_decoded() {
        let tree = parse_html("<p>Fish &amp; chips&nbsp;&#8212;&#x41;</p>");
        assert_eq!(first_text(&tree, "p"), "Fish & chips\u{a0}\u{2014}A");
    }

    #[test]
    fn test_class_list() {
        let tree = parse_html(r#"<div id="main" class="caption  wide">x</div>"#);
        let div = tree.find_element("div").and_then(|id| tree.element(id)).unwrap();
        assert_eq!(div.attr("id"), Some("main"));
        assert_eq!(div.classes(), ["caption", "wide"]);
    }

    #[test]
    fn test_duplicate_body_merges_attributes() {
        let tree = parse_html(r#"<body class="a"><p>x</p><body class="b" id="late">"#);
        let body = tree.find_element("body").and_then(|id| tree.element(id)).unwrap();
        assert_eq!(body.attr("class"), Some("a"));
        assert_eq!(body.attr("id"), Some("late"));
    }

    #[test]
    fn test_misnested_formatting() {
        let tree = parse_html("<p><b>bold <i>both</b> italic</i></p>");
        assert!(tree.find_element("b").is_some());
        assert!(tree.find_element("i").is_some());
    }

    #[test]
    fn test_foster_parenting() {
        let tree = parse_html("<table>stray<tr><td>cell</td></tr></table>");
        let body = tree.find_element("body").unwrap();
        let first = tree.children(body).next().unwrap();
        assert_eq!(tree.text(first), Some("stray"));
    }

    #[test]
    fn test_noscript_children_are_elements() {
        let tree = parse_html("<body><noscript><p>Enable scripts</p></noscript></body>");
        let noscript = tree.find_element("noscript").unwrap();
        let p = tree.children(noscript).next().unwrap();
        assert_eq!(tree.element(p).map(|e| e.tag()), Some("p"));
        assert_eq!(first_text(&tree, "p"), "Enable scripts");
    }

    #[test]
    fn test_quirks_mode_and_errors() {
        let parse = |html: &str| parse_document(DocumentBuilder::new(), Default::default()).one(html);

        let builder = parse("<p>no doctype</p>");
        assert_eq!(builder.quirks_mode(), QuirksMode::Quirks);
        assert!(builder.error_count() > 0);

        let builder = parse("<!DOCTYPE html><p>fine</p>");
        assert_eq!(builder.quirks_mode(), QuirksMode::NoQuirks);
    }
}
