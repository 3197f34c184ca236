//! Index-linked document tree.
//!
//! All nodes of a document sit in one `Vec` owned by [`DocumentTree`] and
//! refer to each other by [`NodeId`]. A node's `parent` is a plain index used
//! to find its place among its siblings; ownership always runs from the tree
//! down, never through the links.

use std::ops::Index;
use std::rc::Rc;

use html5ever::{QualName, ns};

/// Position of a node in its [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    /// Character data, entities already decoded.
    Text(String),
    /// Comment text. Processing instructions arrive here too, in the
    /// `?target data?` form the HTML tokenizer gives them.
    Comment(String),
    Doctype(Doctype),
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Shared so the parser can hold on to a name while the tree grows.
    pub name: Rc<QualName>,
    pub attrs: Vec<Attribute>,
    classes: Vec<String>,
}

impl Element {
    pub fn new(name: impl Into<Rc<QualName>>, attrs: Vec<Attribute>) -> Self {
        let mut element = Self {
            name: name.into(),
            attrs,
            classes: Vec::new(),
        };
        element.split_classes();
        element
    }

    fn split_classes(&mut self) {
        self.classes = self
            .attrs
            .iter()
            .find(|a| a.name.ns == ns!() && &*a.name.local == "class")
            .map(|a| a.value.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
    }

    /// Local tag name, e.g. `p`.
    pub fn tag(&self) -> &str {
        &self.name.local
    }

    /// Whether this is an HTML element rather than SVG or MathML content.
    pub fn is_html(&self) -> bool {
        self.name.ns == ns!(html)
    }

    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| &*a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// The `class` attribute split on whitespace.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Add the attributes whose names are not present yet.
    pub fn add_missing_attrs(&mut self, attrs: impl IntoIterator<Item = Attribute>) {
        for attr in attrs {
            if !self.attrs.iter().any(|a| a.name == attr.name) {
                self.attrs.push(attr);
            }
        }
        self.split_classes();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// A parsed document.
///
/// Unlinked nodes keep their slot until the tree is dropped. A tree lives for
/// one parse/rewrite/serialize pass, so nothing is reclaimed early.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for DocumentTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(NodeKind::Document);
        tree
    }

    /// The document node. Always the first slot.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Allocate an unlinked node.
    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        });
        id
    }

    pub fn push_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn push_element(&mut self, name: impl Into<Rc<QualName>>, attrs: Vec<Attribute>) -> NodeId {
        self.push(NodeKind::Element(Element::new(name, attrs)))
    }

    /// Slots allocated so far, unlinked nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self[id].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self[id].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    fn links(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Make `child` the last child of `parent`, taking it out of wherever it
    /// was first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.unlink(child);
        let last = self[parent].last_child;

        let node = self.links(child);
        node.parent = Some(parent);
        node.prev_sibling = last;

        match last {
            Some(last) => self.links(last).next_sibling = Some(child),
            None => self.links(parent).first_child = Some(child),
        }
        self.links(parent).last_child = Some(child);
    }

    /// Put `node` right before `anchor`. Does nothing when `anchor` has no
    /// parent.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        let Some(parent) = self[anchor].parent else {
            return;
        };
        self.unlink(node);
        let prev = self[anchor].prev_sibling;

        let links = self.links(node);
        links.parent = Some(parent);
        links.prev_sibling = prev;
        links.next_sibling = Some(anchor);

        self.links(anchor).prev_sibling = Some(node);
        match prev {
            Some(prev) => self.links(prev).next_sibling = Some(node),
            None => self.links(parent).first_child = Some(node),
        }
    }

    /// Take `node` out of its parent's child list. Its own children stay.
    pub fn unlink(&mut self, node: NodeId) {
        let Node {
            parent,
            prev_sibling: prev,
            next_sibling: next,
            ..
        } = self[node];
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(prev) => self.links(prev).next_sibling = next,
            None => self.links(parent).first_child = next,
        }
        match next {
            Some(next) => self.links(next).prev_sibling = prev,
            None => self.links(parent).last_child = prev,
        }

        let links = self.links(node);
        links.parent = None;
        links.prev_sibling = None;
        links.next_sibling = None;
    }

    /// Put `replacements`, in order, where `target` is and unlink `target`.
    ///
    /// Returns `false`, changing nothing, when `target` has no parent.
    pub fn splice(&mut self, target: NodeId, replacements: &[NodeId]) -> bool {
        if self[target].parent.is_none() {
            return false;
        }
        for &node in replacements {
            self.insert_before(target, node);
        }
        self.unlink(target);
        true
    }

    /// Add text at the end of `parent`, extending its last child when that
    /// is already text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self[parent].last_child
            && let Some(existing) = self.text_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.push_text(text);
        self.append_child(parent, node);
    }

    /// Add text right before `anchor`, extending the preceding sibling when
    /// that is already text.
    pub fn insert_text_before(&mut self, anchor: NodeId, text: &str) {
        if let Some(prev) = self[anchor].prev_sibling
            && let Some(existing) = self.text_mut(prev)
        {
            existing.push_str(text);
            return;
        }
        let node = self.push_text(text);
        self.insert_before(anchor, node);
    }

    /// Move every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        while let Some(child) = self[from].first_child {
            self.append_child(to, child);
        }
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[parent].first_child,
        }
    }

    /// `start` and everything below it, in document order.
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![start],
        }
    }

    /// First element named `tag` in document order.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|&id| self.element(id).is_some_and(|e| e.tag() == tag))
    }
}

pub struct Children<'a> {
    tree: &'a DocumentTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].next_sibling;
        Some(id)
    }
}

pub struct Descendants<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.tree.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}
