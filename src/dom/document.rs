//! XML Document - arena-based DOM over an in-place parsed buffer
//!
//! The document owns two arenas (nodes, attributes) and the parse buffer,
//! which is either borrowed from the caller for `'a` or owned. Names and
//! values from the parse are spans into that buffer; renamed or rewritten
//! strings are owned separately.
//!
//! All access goes through `NodeId` / `AttrId` handles. A stale handle (a
//! detached node, a handle from another document) resolves to nothing; it
//! never touches freed memory.

use super::node::{self, AttrData, AttrId, NodeData, NodeId, NodeKind};
use super::strings::{Buffer, XmlStr};
use crate::core::arena::Arena;
use crate::core::options::ParseOptions;
use crate::core::parser::Parser;
use crate::error::{Error, ParseError, Result};

/// Parsed XML document
#[derive(Debug)]
pub struct Document<'a> {
    pub(crate) buffer: Buffer<'a>,
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) attributes: Arena<AttrData>,
    /// Set once orders are assigned, cleared by structural changes
    pub(crate) order_current: bool,
}

/// Document that owns its buffer
pub type OwnedDocument = Document<'static>;

impl<'a> Document<'a> {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut doc = Document {
            buffer: Buffer::Empty,
            nodes: Arena::new(),
            attributes: Arena::new(),
            order_current: false,
        };
        doc.reset();
        doc
    }

    fn reset(&mut self) {
        self.buffer = Buffer::Empty;
        self.nodes.reset_with(NodeData::new(NodeKind::Document, None));
        self.attributes.clear();
        self.order_current = false;
    }

    /// Parse `buffer` in place.
    ///
    /// The buffer is rewritten during the parse and stays borrowed for as
    /// long as the document lives. Input ends at the first NUL byte or at
    /// the end of the slice.
    pub fn parse(buffer: &'a mut [u8], options: ParseOptions) -> std::result::Result<Self, ParseError> {
        let mut doc = Self::new();
        doc.load(buffer, options)?;
        Ok(doc)
    }

    /// Parse a buffer the document takes ownership of
    pub fn parse_owned(buffer: Vec<u8>, options: ParseOptions) -> std::result::Result<Self, ParseError> {
        let mut doc = Self::new();
        doc.load_owned(buffer, options)?;
        Ok(doc)
    }

    /// Discard the current tree and parse `buffer` in place.
    ///
    /// On failure the nodes built before the error remain; call
    /// [`clear`](Self::clear) before reusing the document.
    pub fn load(&mut self, buffer: &'a mut [u8], options: ParseOptions) -> std::result::Result<(), ParseError> {
        self.reset();
        self.buffer = Buffer::Borrowed(buffer);
        self.run_parser(options)
    }

    /// Discard the current tree and parse an owned buffer.
    ///
    /// The buffer is kept even when the parse fails.
    pub fn load_owned(&mut self, buffer: Vec<u8>, options: ParseOptions) -> std::result::Result<(), ParseError> {
        self.reset();
        self.buffer = Buffer::Owned(buffer);
        self.run_parser(options)
    }

    fn run_parser(&mut self, options: ParseOptions) -> std::result::Result<(), ParseError> {
        let len = self.buffer.as_slice().len();
        tracing::debug!(len, ?options, owned = self.buffer.is_owned(), "parse start");

        let Document {
            buffer,
            nodes,
            attributes,
            ..
        } = self;
        let result = Parser::new(buffer.as_mut_slice(), nodes, attributes, options).parse();

        match &result {
            Ok(()) => tracing::debug!(
                nodes = self.nodes.len(),
                attributes = self.attributes.len(),
                "parse complete"
            ),
            Err(e) => tracing::debug!(error = %e, nodes = self.nodes.len(), "parse failed"),
        }
        result
    }

    /// Drop the tree and the buffer, leaving an empty document
    pub fn clear(&mut self) {
        self.reset();
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// The (rewritten) parse buffer
    #[inline]
    pub fn input(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Get a node by ID
    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    /// Get an attribute by ID
    #[inline]
    pub fn get_attribute(&self, id: AttrId) -> Option<&AttrData> {
        self.attributes.get(id.0)
    }

    /// Number of node records, including the document node and detached nodes
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of attribute records, including detached ones
    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Arena blocks in use for nodes and attributes
    pub fn block_count(&self) -> (usize, usize) {
        (self.nodes.block_count(), self.attributes.block_count())
    }

    #[inline]
    pub(crate) fn resolve<'s>(&'s self, s: &'s XmlStr) -> Option<&'s [u8]> {
        s.resolve(self.buffer.as_slice())
    }

    // ========================================================================
    // Node properties
    // ========================================================================

    /// The document node
    #[inline]
    pub fn document_node(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// First element child of the document
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(NodeId::DOCUMENT)
            .find(|&id| self.kind(id) == NodeKind::Element)
    }

    /// Node type; `Null` for dead or unknown handles
    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get_node(id).map_or(NodeKind::Null, |n| n.kind)
    }

    #[inline]
    pub fn is_document(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Document
    }

    /// Node name as bytes
    #[inline]
    pub fn name_bytes(&self, id: NodeId) -> Option<&[u8]> {
        self.resolve(&self.get_node(id)?.name)
    }

    /// Node name; `None` if absent or not UTF-8
    #[inline]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        std::str::from_utf8(self.name_bytes(id)?).ok()
    }

    /// Node value as bytes
    #[inline]
    pub fn value_bytes(&self, id: NodeId) -> Option<&[u8]> {
        self.resolve(&self.get_node(id)?.value)
    }

    /// Node value; `None` if absent or not UTF-8
    #[inline]
    pub fn value(&self, id: NodeId) -> Option<&str> {
        std::str::from_utf8(self.value_bytes(id)?).ok()
    }

    /// Attribute name as bytes
    #[inline]
    pub fn attribute_name_bytes(&self, id: AttrId) -> Option<&[u8]> {
        self.resolve(&self.get_attribute(id)?.name)
    }

    /// Attribute name; `None` if absent or not UTF-8
    #[inline]
    pub fn attribute_name(&self, id: AttrId) -> Option<&str> {
        std::str::from_utf8(self.attribute_name_bytes(id)?).ok()
    }

    /// Attribute value as bytes
    #[inline]
    pub fn attribute_value_bytes(&self, id: AttrId) -> Option<&[u8]> {
        self.resolve(&self.get_attribute(id)?.value)
    }

    /// Attribute value; `None` if absent or not UTF-8
    #[inline]
    pub fn attribute_value(&self, id: AttrId) -> Option<&str> {
        std::str::from_utf8(self.attribute_value_bytes(id)?).ok()
    }

    // ========================================================================
    // Links
    // ========================================================================

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.first_child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.last_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    #[inline]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }

    #[inline]
    pub fn first_attribute(&self, id: NodeId) -> Option<AttrId> {
        self.get_node(id)?.first_attribute
    }

    #[inline]
    pub fn last_attribute(&self, id: NodeId) -> Option<AttrId> {
        self.get_node(id)?.last_attribute
    }

    #[inline]
    pub fn next_attribute(&self, id: AttrId) -> Option<AttrId> {
        self.get_attribute(id)?.next
    }

    #[inline]
    pub fn previous_attribute(&self, id: AttrId) -> Option<AttrId> {
        self.get_attribute(id)?.prev
    }

    /// Element an attribute belongs to
    #[inline]
    pub fn attribute_owner(&self, id: AttrId) -> Option<NodeId> {
        self.get_attribute(id)?.owner
    }

    /// Topmost ancestor (the document node for attached nodes)
    pub fn root(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// Next node in pre-order within the subtree rooted at `root`
    pub(crate) fn next_in_subtree(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut current = id;
        loop {
            if current == root {
                return None;
            }
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Iterate over children
    pub fn children(&self, id: NodeId) -> Children<'_, 'a> {
        let node = self.get_node(id);
        Children {
            doc: self,
            front: node.and_then(|n| n.first_child),
            back: node.and_then(|n| n.last_child),
        }
    }

    /// Iterate over the parent's children; empty for the document
    pub fn siblings(&self, id: NodeId) -> Children<'_, 'a> {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => Children {
                doc: self,
                front: None,
                back: None,
            },
        }
    }

    /// Iterate over attributes
    pub fn attributes(&self, id: NodeId) -> Attributes<'_, 'a> {
        let node = self.get_node(id);
        Attributes {
            doc: self,
            front: node.and_then(|n| n.first_attribute),
            back: node.and_then(|n| n.last_attribute),
        }
    }

    /// Iterate over descendants in document order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, 'a> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a new empty node of `kind` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        let parent_kind = self.kind(parent);
        if !parent_kind.can_have_children() {
            return Err(Error::WrongKind {
                operation: "append_child",
                kind: parent_kind,
            });
        }
        if matches!(kind, NodeKind::Document | NodeKind::Null) {
            return Err(Error::WrongKind {
                operation: "append_child",
                kind,
            });
        }

        let id = node::append_node(&mut self.nodes, parent, kind)?;
        self.order_current = false;
        Ok(id)
    }

    /// Append an attribute named `name` with an empty value to an element
    pub fn append_attribute(&mut self, id: NodeId, name: impl AsRef<[u8]>) -> Result<AttrId> {
        let kind = self.kind(id);
        if kind != NodeKind::Element {
            return Err(Error::WrongKind {
                operation: "append_attribute",
                kind,
            });
        }

        let mut owned_name = XmlStr::Absent;
        owned_name.assign(name.as_ref())?;
        let mut owned_value = XmlStr::Absent;
        owned_value.assign(b"")?;

        let attr = node::append_attribute(&mut self.nodes, &mut self.attributes, id)?;
        if let Some(data) = self.attributes.get_mut(attr.0) {
            data.name = owned_name;
            data.value = owned_value;
        }
        self.order_current = false;
        Ok(attr)
    }

    /// Rename an element or processing instruction
    pub fn set_name(&mut self, id: NodeId, name: impl AsRef<[u8]>) -> Result<()> {
        let node = self.nodes.get_mut(id.0).ok_or(Error::InvalidHandle)?;
        if !node.kind.has_name() {
            return Err(Error::WrongKind {
                operation: "set_name",
                kind: node.kind,
            });
        }
        node.name.assign(name.as_ref())?;
        Ok(())
    }

    /// Replace the value of a PI, CDATA, text or comment node
    pub fn set_value(&mut self, id: NodeId, value: impl AsRef<[u8]>) -> Result<()> {
        let node = self.nodes.get_mut(id.0).ok_or(Error::InvalidHandle)?;
        if !node.kind.has_value() {
            return Err(Error::WrongKind {
                operation: "set_value",
                kind: node.kind,
            });
        }
        node.value.assign(value.as_ref())?;
        Ok(())
    }

    /// Rename an attribute
    pub fn set_attribute_name(&mut self, id: AttrId, name: impl AsRef<[u8]>) -> Result<()> {
        self.live_attribute_mut(id)?.name.assign(name.as_ref())?;
        Ok(())
    }

    /// Replace an attribute value
    pub fn set_attribute_value(&mut self, id: AttrId, value: impl AsRef<[u8]>) -> Result<()> {
        self.live_attribute_mut(id)?.value.assign(value.as_ref())?;
        Ok(())
    }

    fn live_attribute_mut(&mut self, id: AttrId) -> Result<&mut AttrData> {
        self.attributes
            .get_mut(id.0)
            .filter(|a| a.owner.is_some())
            .ok_or(Error::InvalidHandle)
    }

    /// Detach `child` (and its subtree) from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if child == NodeId::DOCUMENT || self.parent(child) != Some(parent) {
            return Err(Error::NotAChild);
        }

        node::unlink_node(&mut self.nodes, child);
        self.release_subtree(child);
        self.order_current = false;
        tracing::trace!(node = child.0, "subtree detached");
        Ok(())
    }

    /// Detach the first child named `name`; returns whether one was found
    pub fn remove_child_named(&mut self, parent: NodeId, name: impl AsRef<[u8]>) -> bool {
        let name = name.as_ref();
        let found = self
            .children(parent)
            .find(|&c| self.name_bytes(c) == Some(name));
        match found {
            Some(child) => self.remove_child(parent, child).is_ok(),
            None => false,
        }
    }

    /// Detach an attribute from its element
    pub fn remove_attribute(&mut self, id: NodeId, attr: AttrId) -> Result<()> {
        if self.attribute_owner(attr) != Some(id) {
            return Err(Error::ForeignAttribute);
        }

        node::unlink_attribute(&mut self.nodes, &mut self.attributes, attr);
        if let Some(data) = self.attributes.get_mut(attr.0) {
            data.name.release();
            data.value.release();
            data.order = 0;
        }
        self.order_current = false;
        Ok(())
    }

    /// Detach the first attribute named `name`; returns whether one was found
    pub fn remove_attribute_named(&mut self, id: NodeId, name: impl AsRef<[u8]>) -> bool {
        let name = name.as_ref();
        let found = self
            .attributes(id)
            .find(|&a| self.attribute_name_bytes(a) == Some(name));
        match found {
            Some(attr) => self.remove_attribute(id, attr).is_ok(),
            None => false,
        }
    }

    /// Turn an unlinked subtree into dead records with no links or strings
    fn release_subtree(&mut self, root: NodeId) {
        // collect first: the walk needs the links that are cleared below
        let mut dead = vec![root];
        let mut cursor = self.first_child(root);
        while let Some(id) = cursor {
            dead.push(id);
            cursor = self.next_in_subtree(id, root);
        }

        for id in dead {
            let mut attr = self.first_attribute(id);
            while let Some(a) = attr {
                attr = self.next_attribute(a);
                if let Some(data) = self.attributes.get_mut(a.0) {
                    data.owner = None;
                    data.prev = None;
                    data.next = None;
                    data.name.release();
                    data.value.release();
                    data.order = 0;
                }
            }
            if let Some(node) = self.nodes.get_mut(id.0) {
                node.kind = NodeKind::Null;
                node.name.release();
                node.value.release();
                node.order = 0;
                node.parent = None;
                node.first_child = None;
                node.last_child = None;
                node.prev_sibling = None;
                node.next_sibling = None;
                node.first_attribute = None;
                node.last_attribute = None;
            }
        }
    }
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over child nodes
pub struct Children<'d, 'a> {
    doc: &'d Document<'a>,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<'d, 'a> Iterator for Children<'d, 'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.doc.next_sibling(current);
        }
        Some(current)
    }
}

impl<'d, 'a> DoubleEndedIterator for Children<'d, 'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.doc.previous_sibling(current);
        }
        Some(current)
    }
}

/// Iterator over attributes
pub struct Attributes<'d, 'a> {
    doc: &'d Document<'a>,
    front: Option<AttrId>,
    back: Option<AttrId>,
}

impl<'d, 'a> Iterator for Attributes<'d, 'a> {
    type Item = AttrId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.doc.next_attribute(current);
        }
        Some(current)
    }
}

impl<'d, 'a> DoubleEndedIterator for Attributes<'d, 'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.doc.previous_attribute(current);
        }
        Some(current)
    }
}

/// Iterator over descendants in document order
pub struct Descendants<'d, 'a> {
    doc: &'d Document<'a>,
    root: NodeId,
    next: Option<NodeId>,
}

impl<'d, 'a> Iterator for Descendants<'d, 'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.next_in_subtree(current, self.root);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> OwnedDocument {
        Document::parse_owned(input.as_bytes().to_vec(), ParseOptions::DEFAULT).unwrap()
    }

    fn names(doc: &Document<'_>, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| doc.name(id).unwrap_or("#").to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let doc = parse("<root><child/></root>");
        let root = doc.root_element().unwrap();
        assert_eq!(doc.name(root), Some("root"));
        assert_eq!(doc.kind(root), NodeKind::Element);
        assert_eq!(doc.parent(root), Some(NodeId::DOCUMENT));
        assert_eq!(doc.parent(NodeId::DOCUMENT), None);
        assert!(doc.is_document(doc.document_node()));
    }

    #[test]
    fn test_borrowed_parse_points_into_buffer() {
        let mut buf = b"<root a=\"1\">text</root>".to_vec();
        let base = buf.as_ptr() as usize;
        let len = buf.len();
        let doc = Document::parse(&mut buf, ParseOptions::DEFAULT).unwrap();
        let root = doc.root_element().unwrap();
        let name = doc.name_bytes(root).unwrap().as_ptr() as usize;
        assert!(name >= base && name < base + len);
        let text = doc.first_child(root).unwrap();
        assert_eq!(doc.value(text), Some("text"));
        assert!(doc.get_node(text).unwrap().value().is_borrowed());
    }

    #[test]
    fn test_children_double_ended() {
        let doc = parse("<r><a/><b/><c/></r>");
        let r = doc.root_element().unwrap();
        assert_eq!(names(&doc, doc.children(r)), vec!["a", "b", "c"]);
        assert_eq!(names(&doc, doc.children(r).rev()), vec!["c", "b", "a"]);

        let mut it = doc.children(r);
        assert_eq!(doc.name(it.next().unwrap()), Some("a"));
        assert_eq!(doc.name(it.next_back().unwrap()), Some("c"));
        assert_eq!(doc.name(it.next().unwrap()), Some("b"));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_attributes_iteration() {
        let doc = parse("<r x=\"1\" y=\"2\" z=\"3\"/>");
        let r = doc.root_element().unwrap();
        let forward: Vec<_> = doc.attributes(r).map(|a| doc.attribute_name(a).unwrap()).collect();
        assert_eq!(forward, vec!["x", "y", "z"]);
        let back: Vec<_> = doc.attributes(r).rev().map(|a| doc.attribute_value(a).unwrap()).collect();
        assert_eq!(back, vec!["3", "2", "1"]);
        let last = doc.last_attribute(r).unwrap();
        assert_eq!(doc.attribute_owner(last), Some(r));
        assert_eq!(doc.previous_attribute(last), doc.attributes(r).nth(1));
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = parse("<r><a><b/><c/></a><d><e/></d></r>");
        let r = doc.root_element().unwrap();
        assert_eq!(names(&doc, doc.descendants(r)), vec!["a", "b", "c", "d", "e"]);
        let a = doc.first_child(r).unwrap();
        assert_eq!(names(&doc, doc.descendants(a)), vec!["b", "c"]);
    }

    #[test]
    fn test_siblings_and_root() {
        let doc = parse("<r><a/><b/></r>");
        let r = doc.root_element().unwrap();
        let b = doc.last_child(r).unwrap();
        assert_eq!(names(&doc, doc.siblings(b)), vec!["a", "b"]);
        assert_eq!(doc.siblings(NodeId::DOCUMENT).count(), 0);
        assert_eq!(doc.root(b), Some(NodeId::DOCUMENT));
    }

    #[test]
    fn test_load_replaces_tree() {
        let mut doc = Document::new();
        doc.load_owned(b"<a/>".to_vec(), ParseOptions::DEFAULT).unwrap();
        assert_eq!(doc.node_count(), 2);
        doc.load_owned(b"<b><c/></b>".to_vec(), ParseOptions::DEFAULT).unwrap();
        assert_eq!(doc.node_count(), 3);
        assert_eq!(doc.name(doc.root_element().unwrap()), Some("b"));

        assert!(doc.load_owned(b"<x><y></x>".to_vec(), ParseOptions::DEFAULT).is_err());
        assert!(doc.node_count() > 1);
        doc.clear();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.block_count(), (1, 0));
        assert!(doc.is_document(NodeId::DOCUMENT));
        assert!(doc.input().is_empty());
    }

    #[test]
    fn test_append_child_and_attribute() {
        let mut doc = parse("<r/>");
        let r = doc.root_element().unwrap();
        let c = doc.append_child(r, NodeKind::Element).unwrap();
        doc.set_name(c, "child").unwrap();
        let t = doc.append_child(c, NodeKind::Text).unwrap();
        doc.set_value(t, "hello").unwrap();
        let a = doc.append_attribute(c, "id").unwrap();
        doc.set_attribute_value(a, "7").unwrap();

        assert_eq!(doc.name(c), Some("child"));
        assert_eq!(doc.value(t), Some("hello"));
        assert_eq!(doc.attribute_name(a), Some("id"));
        assert_eq!(doc.attribute_value(a), Some("7"));
        assert_eq!(doc.last_child(r), Some(c));
    }

    #[test]
    fn test_append_rejects_wrong_kinds() {
        let mut doc = parse("<r>text</r>");
        let r = doc.root_element().unwrap();
        let text = doc.first_child(r).unwrap();
        assert!(matches!(
            doc.append_child(text, NodeKind::Element),
            Err(Error::WrongKind { kind: NodeKind::Text, .. })
        ));
        assert!(doc.append_child(r, NodeKind::Document).is_err());
        assert!(doc.append_child(r, NodeKind::Null).is_err());
        assert!(doc.append_attribute(text, "x").is_err());
        assert!(doc.append_attribute(NodeId::DOCUMENT, "x").is_err());
        assert!(doc.append_child(NodeId::DOCUMENT, NodeKind::Comment).is_ok());
    }

    #[test]
    fn test_set_name_value_kind_rules() {
        let mut doc = parse("<r>text<![CDATA[cd]]></r>");
        let r = doc.root_element().unwrap();
        let text = doc.first_child(r).unwrap();
        let cdata = doc.last_child(r).unwrap();

        assert!(doc.set_name(text, "nope").is_err());
        assert!(doc.set_value(r, "nope").is_err());
        assert!(doc.set_name(NodeId::DOCUMENT, "nope").is_err());
        doc.set_value(cdata, "new").unwrap();
        doc.set_name(r, "renamed").unwrap();
        assert_eq!(doc.value(cdata), Some("new"));
        assert_eq!(doc.name(r), Some("renamed"));
        assert!(!doc.get_node(r).unwrap().name().is_borrowed());
    }

    #[test]
    fn test_remove_child_detaches_subtree() {
        let mut doc = parse("<r><a x=\"1\"><b/></a><c/></r>");
        let r = doc.root_element().unwrap();
        let a = doc.first_child(r).unwrap();
        let b = doc.first_child(a).unwrap();
        let x = doc.first_attribute(a).unwrap();

        doc.remove_child(r, a).unwrap();
        assert_eq!(names(&doc, doc.children(r)), vec!["c"]);
        assert_eq!(doc.kind(a), NodeKind::Null);
        assert_eq!(doc.kind(b), NodeKind::Null);
        assert_eq!(doc.name(a), None);
        assert_eq!(doc.attribute_name(x), None);
        assert_eq!(doc.attribute_owner(x), None);

        assert!(matches!(doc.remove_child(r, a), Err(Error::NotAChild)));
        assert!(matches!(doc.remove_child(r, NodeId::DOCUMENT), Err(Error::NotAChild)));
    }

    #[test]
    fn test_remove_named() {
        let mut doc = parse("<r a=\"1\" b=\"2\"><x/><y/><x/></r>");
        let r = doc.root_element().unwrap();
        assert!(doc.remove_child_named(r, "x"));
        assert_eq!(names(&doc, doc.children(r)), vec!["y", "x"]);
        assert!(!doc.remove_child_named(r, "zzz"));

        assert!(doc.remove_attribute_named(r, "a"));
        let remaining: Vec<_> = doc.attributes(r).map(|a| doc.attribute_name(a).unwrap()).collect();
        assert_eq!(remaining, vec!["b"]);
        assert!(!doc.remove_attribute_named(r, "a"));
    }

    #[test]
    fn test_remove_foreign_attribute() {
        let mut doc = parse("<r><a k=\"1\"/><b/></r>");
        let r = doc.root_element().unwrap();
        let a = doc.first_child(r).unwrap();
        let b = doc.last_child(r).unwrap();
        let k = doc.first_attribute(a).unwrap();
        assert!(matches!(doc.remove_attribute(b, k), Err(Error::ForeignAttribute)));
        doc.remove_attribute(a, k).unwrap();
        assert!(matches!(doc.set_attribute_value(k, "v"), Err(Error::InvalidHandle)));
    }

    #[test]
    fn test_stale_handles_are_safe() {
        let doc = parse("<r/>");
        let bogus = NodeId(999);
        assert_eq!(doc.kind(bogus), NodeKind::Null);
        assert_eq!(doc.name(bogus), None);
        assert_eq!(doc.children(bogus).count(), 0);
        assert_eq!(doc.root(bogus), None);
    }
}
