//! Node and attribute records
//!
//! Records live in the document's arenas and link to each other through
//! `NodeId` / `AttrId` handles (u32 arena indices). Only a parent owns its
//! children; the other links are plain back-references.

use super::strings::XmlStr;
use crate::core::arena::Arena;
use crate::error::AllocError;

/// Handle to a node (index into the node arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The document node of every document
    pub const DOCUMENT: NodeId = NodeId(0);

    /// Arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to an attribute (index into the attribute arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(pub(crate) u32);

impl AttrId {
    /// Arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Detached or otherwise dead node
    Null,
    /// Document root
    Document,
    /// Element node
    Element,
    /// Character data
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

impl NodeKind {
    /// Kinds that carry a name
    #[inline]
    pub fn has_name(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::ProcessingInstruction)
    }

    /// Kinds that carry a value
    #[inline]
    pub fn has_value(self) -> bool {
        matches!(
            self,
            NodeKind::ProcessingInstruction | NodeKind::CData | NodeKind::Text | NodeKind::Comment
        )
    }

    /// Kinds that may have children
    #[inline]
    pub fn can_have_children(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::Document)
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) first_attribute: Option<AttrId>,
    pub(crate) last_attribute: Option<AttrId>,
    pub(crate) name: XmlStr,
    pub(crate) value: XmlStr,
    pub(crate) order: u32,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        NodeData {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            first_attribute: None,
            last_attribute: None,
            name: XmlStr::Absent,
            value: XmlStr::Absent,
            order: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Parent node (None for the document and detached nodes)
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    #[inline]
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    #[inline]
    pub fn first_attribute(&self) -> Option<AttrId> {
        self.first_attribute
    }

    #[inline]
    pub fn last_attribute(&self) -> Option<AttrId> {
        self.last_attribute
    }

    /// Raw name storage
    #[inline]
    pub fn name(&self) -> &XmlStr {
        &self.name
    }

    /// Raw value storage
    #[inline]
    pub fn value(&self) -> &XmlStr {
        &self.value
    }

    /// Document order, 0 if not assigned
    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }
}

/// An attribute in the arena
#[derive(Debug, Clone)]
pub struct AttrData {
    pub(crate) owner: Option<NodeId>,
    pub(crate) prev: Option<AttrId>,
    pub(crate) next: Option<AttrId>,
    pub(crate) name: XmlStr,
    pub(crate) value: XmlStr,
    pub(crate) order: u32,
}

impl AttrData {
    pub(crate) fn new(owner: NodeId) -> Self {
        AttrData {
            owner: Some(owner),
            prev: None,
            next: None,
            name: XmlStr::Absent,
            value: XmlStr::Absent,
            order: 0,
        }
    }

    /// Element the attribute is attached to
    #[inline]
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    #[inline]
    pub fn prev(&self) -> Option<AttrId> {
        self.prev
    }

    #[inline]
    pub fn next(&self) -> Option<AttrId> {
        self.next
    }

    #[inline]
    pub fn name(&self) -> &XmlStr {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &XmlStr {
        &self.value
    }

    /// Document order, 0 if not assigned
    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }
}

/// Allocate a node of `kind` and append it as the last child of `parent`
pub(crate) fn append_node(
    nodes: &mut Arena<NodeData>,
    parent: NodeId,
    kind: NodeKind,
) -> Result<NodeId, AllocError> {
    let id = NodeId(nodes.alloc(NodeData::new(kind, Some(parent)))?);

    let prev = nodes.get_mut(parent.0).and_then(|p| {
        let prev = p.last_child.replace(id);
        if prev.is_none() {
            p.first_child = Some(id);
        }
        prev
    });

    if let Some(prev) = prev {
        if let Some(prev_node) = nodes.get_mut(prev.0) {
            prev_node.next_sibling = Some(id);
        }
        if let Some(node) = nodes.get_mut(id.0) {
            node.prev_sibling = Some(prev);
        }
    }

    Ok(id)
}

/// Allocate an attribute and append it to `owner`'s attribute list
pub(crate) fn append_attribute(
    nodes: &mut Arena<NodeData>,
    attributes: &mut Arena<AttrData>,
    owner: NodeId,
) -> Result<AttrId, AllocError> {
    let id = AttrId(attributes.alloc(AttrData::new(owner))?);

    let prev = nodes.get_mut(owner.0).and_then(|n| {
        let prev = n.last_attribute.replace(id);
        if prev.is_none() {
            n.first_attribute = Some(id);
        }
        prev
    });

    if let Some(prev) = prev {
        if let Some(prev_attr) = attributes.get_mut(prev.0) {
            prev_attr.next = Some(id);
        }
        if let Some(attr) = attributes.get_mut(id.0) {
            attr.prev = Some(prev);
        }
    }

    Ok(id)
}

/// Splice `id` out of its parent's child list, keeping the subtree intact
pub(crate) fn unlink_node(nodes: &mut Arena<NodeData>, id: NodeId) {
    let Some(node) = nodes.get_mut(id.0) else {
        return;
    };
    let parent = node.parent.take();
    let prev = node.prev_sibling.take();
    let next = node.next_sibling.take();

    match prev.and_then(|p| nodes.get_mut(p.0)) {
        Some(prev_node) => prev_node.next_sibling = next,
        None => {
            if let Some(parent_node) = parent.and_then(|p| nodes.get_mut(p.0)) {
                parent_node.first_child = next;
            }
        }
    }
    match next.and_then(|n| nodes.get_mut(n.0)) {
        Some(next_node) => next_node.prev_sibling = prev,
        None => {
            if let Some(parent_node) = parent.and_then(|p| nodes.get_mut(p.0)) {
                parent_node.last_child = prev;
            }
        }
    }
}

/// Splice `id` out of its owner's attribute list
pub(crate) fn unlink_attribute(
    nodes: &mut Arena<NodeData>,
    attributes: &mut Arena<AttrData>,
    id: AttrId,
) {
    let Some(attr) = attributes.get_mut(id.0) else {
        return;
    };
    let owner = attr.owner.take();
    let prev = attr.prev.take();
    let next = attr.next.take();

    match prev.and_then(|p| attributes.get_mut(p.0)) {
        Some(prev_attr) => prev_attr.next = next,
        None => {
            if let Some(owner_node) = owner.and_then(|o| nodes.get_mut(o.0)) {
                owner_node.first_attribute = next;
            }
        }
    }
    match next.and_then(|n| attributes.get_mut(n.0)) {
        Some(next_attr) => next_attr.prev = prev,
        None => {
            if let Some(owner_node) = owner.and_then(|o| nodes.get_mut(o.0)) {
                owner_node.last_attribute = prev;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_document() -> Arena<NodeData> {
        let mut nodes = Arena::with_block_slots(4);
        nodes.alloc(NodeData::new(NodeKind::Document, None)).unwrap();
        nodes
    }

    fn child_ids(nodes: &Arena<NodeData>, parent: NodeId) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = nodes.get(parent.0).unwrap().first_child;
        while let Some(id) = cur {
            out.push(id.0);
            cur = nodes.get(id.0).unwrap().next_sibling;
        }
        out
    }

    #[test]
    fn test_append_links_siblings() {
        let mut nodes = arena_with_document();
        let a = append_node(&mut nodes, NodeId::DOCUMENT, NodeKind::Element).unwrap();
        let b = append_node(&mut nodes, NodeId::DOCUMENT, NodeKind::Comment).unwrap();
        let c = append_node(&mut nodes, NodeId::DOCUMENT, NodeKind::Text).unwrap();

        assert_eq!(child_ids(&nodes, NodeId::DOCUMENT), vec![1, 2, 3]);
        let doc = nodes.get(0).unwrap();
        assert_eq!(doc.first_child(), Some(a));
        assert_eq!(doc.last_child(), Some(c));
        assert_eq!(nodes.get(b.0).unwrap().prev_sibling(), Some(a));
        assert_eq!(nodes.get(b.0).unwrap().next_sibling(), Some(c));
        assert_eq!(nodes.get(c.0).unwrap().parent(), Some(NodeId::DOCUMENT));
    }

    #[test]
    fn test_unlink_middle_first_last() {
        let mut nodes = arena_with_document();
        let ids: Vec<NodeId> = (0..4)
            .map(|_| append_node(&mut nodes, NodeId::DOCUMENT, NodeKind::Element).unwrap())
            .collect();

        unlink_node(&mut nodes, ids[1]);
        assert_eq!(child_ids(&nodes, NodeId::DOCUMENT), vec![1, 3, 4]);
        assert_eq!(nodes.get(ids[1].0).unwrap().parent(), None);

        unlink_node(&mut nodes, ids[0]);
        unlink_node(&mut nodes, ids[3]);
        assert_eq!(child_ids(&nodes, NodeId::DOCUMENT), vec![3]);
        let doc = nodes.get(0).unwrap();
        assert_eq!(doc.first_child(), Some(ids[2]));
        assert_eq!(doc.last_child(), Some(ids[2]));
        assert_eq!(nodes.get(ids[2].0).unwrap().prev_sibling(), None);
        assert_eq!(nodes.get(ids[2].0).unwrap().next_sibling(), None);
    }

    #[test]
    fn test_attribute_list() {
        let mut nodes = arena_with_document();
        let mut attrs = Arena::new();
        let el = append_node(&mut nodes, NodeId::DOCUMENT, NodeKind::Element).unwrap();
        let a = append_attribute(&mut nodes, &mut attrs, el).unwrap();
        let b = append_attribute(&mut nodes, &mut attrs, el).unwrap();

        assert_eq!(nodes.get(el.0).unwrap().first_attribute(), Some(a));
        assert_eq!(attrs.get(a.0).unwrap().next(), Some(b));
        assert_eq!(attrs.get(b.0).unwrap().owner(), Some(el));

        unlink_attribute(&mut nodes, &mut attrs, a);
        assert_eq!(nodes.get(el.0).unwrap().first_attribute(), Some(b));
        assert_eq!(nodes.get(el.0).unwrap().last_attribute(), Some(b));
        assert_eq!(attrs.get(b.0).unwrap().prev(), None);
        assert_eq!(attrs.get(a.0).unwrap().owner(), None);
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(NodeKind::Element.has_name());
        assert!(!NodeKind::Text.has_name());
        assert!(NodeKind::Comment.has_value());
        assert!(!NodeKind::Element.has_value());
        assert!(NodeKind::Document.can_have_children());
        assert!(!NodeKind::ProcessingInstruction.can_have_children());
    }
}
