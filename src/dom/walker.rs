//! Visitor-style traversal
//!
//! `traverse` calls `begin` on entering a node and `end` after all of its
//! descendants, with the depth relative to the starting node (0 for the
//! start, 1 for its children). Returning `ControlFlow::Break` from either
//! callback stops the walk immediately.
//!
//! The walk follows parent/sibling links, so it uses no stack proportional
//! to tree depth.

use std::ops::ControlFlow;

use super::document::Document;
use super::node::NodeId;

/// Callbacks for [`Document::traverse`]
pub trait TreeWalker {
    /// Called when entering a node
    fn begin(&mut self, doc: &Document<'_>, node: NodeId, depth: usize) -> ControlFlow<()> {
        let _ = (doc, node, depth);
        ControlFlow::Continue(())
    }

    /// Called after every descendant of the node has been visited
    fn end(&mut self, doc: &Document<'_>, node: NodeId, depth: usize) -> ControlFlow<()> {
        let _ = (doc, node, depth);
        ControlFlow::Continue(())
    }
}

impl<'a> Document<'a> {
    /// Walk the subtree rooted at `root` depth-first.
    ///
    /// Returns `Break` if a callback stopped the walk. An unknown handle is
    /// walked as an empty subtree with no callbacks.
    pub fn traverse<W: TreeWalker + ?Sized>(&self, root: NodeId, walker: &mut W) -> ControlFlow<()> {
        if self.get_node(root).is_none() {
            return ControlFlow::Continue(());
        }

        let mut depth = 0usize;
        let mut current = root;
        walker.begin(self, current, depth)?;

        loop {
            if let Some(child) = self.first_child(current) {
                depth += 1;
                current = child;
                walker.begin(self, current, depth)?;
                continue;
            }

            // leaf reached: close nodes until one has a next sibling
            loop {
                walker.end(self, current, depth)?;
                if current == root {
                    return ControlFlow::Continue(());
                }
                if let Some(next) = self.next_sibling(current) {
                    current = next;
                    walker.begin(self, current, depth)?;
                    break;
                }
                match self.parent(current) {
                    Some(parent) => {
                        current = parent;
                        depth -= 1;
                    }
                    None => return ControlFlow::Continue(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_at: Option<&'static str>,
        stop_after: Option<&'static str>,
    }

    impl TreeWalker for Recorder {
        fn begin(&mut self, doc: &Document<'_>, node: NodeId, depth: usize) -> ControlFlow<()> {
            let name = doc.name(node).unwrap_or("#");
            self.events.push(format!("+{name}@{depth}"));
            if self.stop_at == Some(name) {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }

        fn end(&mut self, doc: &Document<'_>, node: NodeId, depth: usize) -> ControlFlow<()> {
            let name = doc.name(node).unwrap_or("#");
            self.events.push(format!("-{name}@{depth}"));
            if self.stop_after == Some(name) {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
    }

    fn parse(input: &str) -> crate::OwnedDocument {
        Document::parse_owned(input.as_bytes().to_vec(), ParseOptions::DEFAULT).unwrap()
    }

    #[test]
    fn test_begin_end_order_and_depth() {
        let doc = parse("<a><b><c/></b><d/></a>");
        let mut rec = Recorder::default();
        assert!(doc.traverse(NodeId::DOCUMENT, &mut rec).is_continue());
        assert_eq!(
            rec.events,
            vec!["+#@0", "+a@1", "+b@2", "+c@3", "-c@3", "-b@2", "+d@2", "-d@2", "-a@1", "-#@0"]
        );
    }

    #[test]
    fn test_subtree_walk_stays_inside() {
        let doc = parse("<a><b><c/></b><d/></a>");
        let b = doc.first_element(NodeId::DOCUMENT, "b").unwrap();
        let mut rec = Recorder::default();
        assert!(doc.traverse(b, &mut rec).is_continue());
        assert_eq!(rec.events, vec!["+b@0", "+c@1", "-c@1", "-b@0"]);
    }

    #[test]
    fn test_break_stops_walk() {
        let doc = parse("<a><b/><c/><d/></a>");
        let mut rec = Recorder {
            stop_at: Some("c"),
            ..Default::default()
        };
        assert!(doc.traverse(NodeId::DOCUMENT, &mut rec).is_break());
        assert_eq!(rec.events, vec!["+#@0", "+a@1", "+b@2", "-b@2", "+c@2"]);
    }

    #[test]
    fn test_break_from_end_skips_remaining_siblings() {
        let doc = parse("<a><b><x/></b><c/><d/></a>");
        let mut rec = Recorder {
            stop_after: Some("b"),
            ..Default::default()
        };
        assert!(doc.traverse(NodeId::DOCUMENT, &mut rec).is_break());
        assert_eq!(rec.events, vec!["+#@0", "+a@1", "+b@2", "+x@3", "-x@3", "-b@2"]);
    }

    #[test]
    fn test_deep_tree_without_recursion() {
        let depth = 100_000;
        let mut xml = String::with_capacity(depth * 8);
        for _ in 0..depth {
            xml.push_str("<n>");
        }
        for _ in 0..depth {
            xml.push_str("</n>");
        }
        let doc = parse(&xml);

        struct MaxDepth(usize);
        impl TreeWalker for MaxDepth {
            fn begin(&mut self, _: &Document<'_>, _: NodeId, depth: usize) -> ControlFlow<()> {
                self.0 = self.0.max(depth);
                ControlFlow::Continue(())
            }
        }
        let mut max = MaxDepth(0);
        assert!(doc.traverse(NodeId::DOCUMENT, &mut max).is_continue());
        assert_eq!(max.0, depth);
    }

    #[test]
    fn test_unknown_root_is_noop() {
        let doc = parse("<a/>");
        let mut rec = Recorder::default();
        assert!(doc.traverse(NodeId(77), &mut rec).is_continue());
        assert!(rec.events.is_empty());
    }
}
