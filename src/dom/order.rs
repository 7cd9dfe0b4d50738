//! Document order
//!
//! One pre-order pass numbers every reachable node and attribute from 1:
//! a node, then its attributes in list order, then its children. Order 0
//! means "not assigned". Any structural mutation marks the numbering stale
//! until the next pass.

use std::cmp::Ordering;

use super::document::Document;
use super::node::{AttrId, NodeId};

impl<'a> Document<'a> {
    /// Assign document order to every node and attribute reachable from the
    /// document node
    pub fn precompute_document_order(&mut self) {
        let mut counter: u32 = 1;
        let mut cursor = Some(NodeId::DOCUMENT);

        while let Some(id) = cursor {
            let mut attr = match self.nodes.get_mut(id.0) {
                Some(node) => {
                    node.order = counter;
                    counter = counter.saturating_add(1);
                    node.first_attribute
                }
                None => None,
            };
            while let Some(a) = attr {
                attr = match self.attributes.get_mut(a.0) {
                    Some(data) => {
                        data.order = counter;
                        counter = counter.saturating_add(1);
                        data.next
                    }
                    None => None,
                };
            }
            cursor = self.next_in_subtree(id, NodeId::DOCUMENT);
        }

        self.order_current = true;
        tracing::trace!(assigned = counter - 1, "document order assigned");
    }

    /// False after a structural change until orders are recomputed
    #[inline]
    pub fn document_order_is_current(&self) -> bool {
        self.order_current
    }

    /// Order of a node, 0 if not assigned
    #[inline]
    pub fn document_order(&self, id: NodeId) -> u32 {
        self.get_node(id).map_or(0, |n| n.order)
    }

    /// Order of an attribute, 0 if not assigned
    #[inline]
    pub fn attribute_document_order(&self, id: AttrId) -> u32 {
        self.get_attribute(id).map_or(0, |a| a.order)
    }

    /// Compare two nodes by assigned order; `None` if either is unassigned
    pub fn compare_document_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        match (self.document_order(a), self.document_order(b)) {
            (0, _) | (_, 0) => None,
            (x, y) => Some(x.cmp(&y)),
        }
    }
}
