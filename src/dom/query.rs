//! Lookups and searches over a parsed document
//!
//! Every name- or value-based query comes in two flavours: exact byte
//! comparison and `_wild` glob matching (see [`crate::core::wildcard`]).
//! Depth-first searches visit descendants in document order, excluding the
//! start node, and return the first match.

use super::document::Document;
use super::node::{AttrId, NodeId, NodeKind};
use crate::core::wildcard;

/// How names and values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compare {
    Exact,
    Wildcard,
}

impl Compare {
    #[inline]
    fn test(self, pattern: &[u8], candidate: Option<&[u8]>) -> bool {
        match (self, candidate) {
            (_, None) => false,
            (Compare::Exact, Some(candidate)) => pattern == candidate,
            (Compare::Wildcard, Some(candidate)) => wildcard::matches(pattern, candidate),
        }
    }
}

impl<'a> Document<'a> {
    // ========================================================================
    // Direct lookups
    // ========================================================================

    /// First child named `name`
    pub fn child(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<NodeId> {
        self.find_child(id, name.as_ref(), Compare::Exact)
    }

    /// First child whose name matches the glob `pattern`
    pub fn child_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<NodeId> {
        self.find_child(id, pattern.as_ref(), Compare::Wildcard)
    }

    fn find_child(&self, id: NodeId, name: &[u8], cmp: Compare) -> Option<NodeId> {
        self.children(id).find(|&c| cmp.test(name, self.name_bytes(c)))
    }

    /// First attribute named `name`
    pub fn attribute(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<AttrId> {
        self.find_attribute(id, name.as_ref(), Compare::Exact)
    }

    /// First attribute whose name matches the glob `pattern`
    pub fn attribute_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<AttrId> {
        self.find_attribute(id, pattern.as_ref(), Compare::Wildcard)
    }

    fn find_attribute(&self, id: NodeId, name: &[u8], cmp: Compare) -> Option<AttrId> {
        self.attributes(id)
            .find(|&a| cmp.test(name, self.attribute_name_bytes(a)))
    }

    /// First child of the parent named `name` (may be `id` itself)
    pub fn sibling(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<NodeId> {
        self.find_child(self.parent(id)?, name.as_ref(), Compare::Exact)
    }

    pub fn sibling_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<NodeId> {
        self.find_child(self.parent(id)?, pattern.as_ref(), Compare::Wildcard)
    }

    /// Nearest following sibling named `name`
    pub fn next_sibling_named(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<NodeId> {
        self.scan_siblings(id, name.as_ref(), Compare::Exact, Self::next_sibling)
    }

    pub fn next_sibling_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<NodeId> {
        self.scan_siblings(id, pattern.as_ref(), Compare::Wildcard, Self::next_sibling)
    }

    /// Nearest preceding sibling named `name`
    pub fn previous_sibling_named(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<NodeId> {
        self.scan_siblings(id, name.as_ref(), Compare::Exact, Self::previous_sibling)
    }

    pub fn previous_sibling_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<NodeId> {
        self.scan_siblings(id, pattern.as_ref(), Compare::Wildcard, Self::previous_sibling)
    }

    fn scan_siblings(
        &self,
        id: NodeId,
        name: &[u8],
        cmp: Compare,
        step: fn(&Self, NodeId) -> Option<NodeId>,
    ) -> Option<NodeId> {
        let mut current = step(self, id);
        while let Some(node) = current {
            if cmp.test(name, self.name_bytes(node)) {
                return Some(node);
            }
            current = step(self, node);
        }
        None
    }

    /// Value of the first text or CDATA child
    pub fn child_value(&self, id: NodeId) -> Option<&str> {
        self.children(id)
            .find(|&c| matches!(self.kind(c), NodeKind::Text | NodeKind::CData))
            .and_then(|c| self.value(c))
    }

    /// `child_value` of the first child named `name`
    pub fn child_value_of(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<&str> {
        self.child_value(self.child(id, name)?)
    }

    pub fn child_value_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<&str> {
        self.child_value(self.child_wild(id, pattern)?)
    }

    // ========================================================================
    // Depth-first searches
    // ========================================================================

    fn find_element(&self, id: NodeId, mut accept: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.descendants(id)
            .find(|&d| self.kind(d) == NodeKind::Element && accept(d))
    }

    /// First descendant element named `name`
    pub fn first_element(&self, id: NodeId, name: impl AsRef<[u8]>) -> Option<NodeId> {
        let name = name.as_ref();
        self.find_element(id, |d| Compare::Exact.test(name, self.name_bytes(d)))
    }

    pub fn first_element_wild(&self, id: NodeId, pattern: impl AsRef<[u8]>) -> Option<NodeId> {
        let pattern = pattern.as_ref();
        self.find_element(id, |d| Compare::Wildcard.test(pattern, self.name_bytes(d)))
    }

    /// First descendant element named `name` with a text child equal to `value`.
    ///
    /// Plain pre-order: an element whose name matches but whose text does
    /// not is still searched below.
    pub fn first_element_by_value(
        &self,
        id: NodeId,
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        self.element_by_value(id, name.as_ref(), value.as_ref(), Compare::Exact)
    }

    pub fn first_element_by_value_wild(
        &self,
        id: NodeId,
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        self.element_by_value(id, name.as_ref(), value.as_ref(), Compare::Wildcard)
    }

    fn element_by_value(&self, id: NodeId, name: &[u8], value: &[u8], cmp: Compare) -> Option<NodeId> {
        self.find_element(id, |d| {
            cmp.test(name, self.name_bytes(d))
                && self
                    .children(d)
                    .any(|c| self.kind(c) == NodeKind::Text && cmp.test(value, self.value_bytes(c)))
        })
    }

    /// First descendant element named `name` carrying `attr_name="attr_value"`.
    ///
    /// Name matches without the attribute are searched below, as in
    /// [`first_element_by_value`](Self::first_element_by_value).
    pub fn first_element_by_attribute(
        &self,
        id: NodeId,
        name: impl AsRef<[u8]>,
        attr_name: impl AsRef<[u8]>,
        attr_value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        let name = name.as_ref();
        self.element_by_attribute(id, Some(name), attr_name.as_ref(), attr_value.as_ref(), Compare::Exact)
    }

    pub fn first_element_by_attribute_wild(
        &self,
        id: NodeId,
        name: impl AsRef<[u8]>,
        attr_name: impl AsRef<[u8]>,
        attr_value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        let name = name.as_ref();
        self.element_by_attribute(id, Some(name), attr_name.as_ref(), attr_value.as_ref(), Compare::Wildcard)
    }

    /// First descendant element of any name carrying `attr_name="attr_value"`
    pub fn first_element_with_attribute(
        &self,
        id: NodeId,
        attr_name: impl AsRef<[u8]>,
        attr_value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        self.element_by_attribute(id, None, attr_name.as_ref(), attr_value.as_ref(), Compare::Exact)
    }

    pub fn first_element_with_attribute_wild(
        &self,
        id: NodeId,
        attr_name: impl AsRef<[u8]>,
        attr_value: impl AsRef<[u8]>,
    ) -> Option<NodeId> {
        self.element_by_attribute(id, None, attr_name.as_ref(), attr_value.as_ref(), Compare::Wildcard)
    }

    fn element_by_attribute(
        &self,
        id: NodeId,
        name: Option<&[u8]>,
        attr_name: &[u8],
        attr_value: &[u8],
        cmp: Compare,
    ) -> Option<NodeId> {
        self.find_element(id, |d| {
            name.map_or(true, |n| cmp.test(n, self.name_bytes(d)))
                && self.attributes(d).any(|a| {
                    cmp.test(attr_name, self.attribute_name_bytes(a))
                        && cmp.test(attr_value, self.attribute_value_bytes(a))
                })
        })
    }

    /// First descendant of the given kind
    pub fn first_node(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.descendants(id).find(|&d| self.kind(d) == kind)
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Names from the document down to `id`, joined by `delimiter`.
    ///
    /// Attached nodes start with the delimiter (`/a/b`); the document node
    /// itself yields an empty string.
    pub fn path(&self, id: NodeId, delimiter: char) -> String {
        let mut segments: Vec<&[u8]> = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if self.get_node(node).is_none() {
                break;
            }
            segments.push(self.name_bytes(node).unwrap_or_default());
            if self.is_document(node) {
                break;
            }
            current = self.parent(node);
        }

        let mut delim = [0u8; 4];
        let delim = delimiter.encode_utf8(&mut delim).as_bytes();
        let mut out = Vec::new();
        for (i, segment) in segments.iter().rev().enumerate() {
            if i > 0 {
                out.extend_from_slice(delim);
            }
            out.extend_from_slice(segment);
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Resolve a `delimiter`-separated path relative to `id`.
    ///
    /// A leading delimiter starts at the topmost ancestor. `.` stays put,
    /// `..` moves to the parent, and any other segment selects a child by
    /// name, trying each same-named child in order until the rest of the
    /// path resolves. Empty segments are ignored.
    pub fn first_element_by_path(&self, id: NodeId, path: &str, delimiter: char) -> Option<NodeId> {
        let (start, rest) = match path.strip_prefix(delimiter) {
            Some(rest) => (self.root(id)?, rest),
            None => (id, path),
        };
        self.get_node(start)?;
        let segments: Vec<&str> = rest.split(delimiter).filter(|s| !s.is_empty()).collect();
        self.resolve_path(start, &segments)
    }

    fn resolve_path(&self, id: NodeId, segments: &[&str]) -> Option<NodeId> {
        let Some((segment, rest)) = segments.split_first() else {
            return Some(id);
        };
        match *segment {
            "." => self.resolve_path(id, rest),
            ".." => self.resolve_path(self.parent(id)?, rest),
            name => self
                .children(id)
                .filter(|&c| self.name_bytes(c) == Some(name.as_bytes()))
                .find_map(|c| self.resolve_path(c, rest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, NodeId, NodeKind, OwnedDocument, ParseOptions};

    const CATALOG: &str = r#"<?app cfg?><catalog>
  <book id="b1" lang="en"><title>Rust</title><price>10</price></book>
  <book id="b2" lang="de"><title>Go</title><price>20</price></book>
  <magazine id="m1"><title>Weekly</title><![CDATA[raw]]></magazine>
  <!-- note -->
</catalog>"#;

    fn doc() -> OwnedDocument {
        let opts = ParseOptions::DEFAULT | ParseOptions::PI | ParseOptions::COMMENTS;
        Document::parse_owned(CATALOG.as_bytes().to_vec(), opts).unwrap()
    }

    #[test]
    fn test_child_and_attribute() {
        let d = doc();
        let cat = d.child(NodeId::DOCUMENT, "catalog").unwrap();
        let book = d.child(cat, "book").unwrap();
        assert_eq!(d.attribute_value(d.attribute(book, "id").unwrap()), Some("b1"));
        assert_eq!(d.child(cat, "nothing"), None);
        assert_eq!(d.attribute(book, "missing"), None);

        let mag = d.child_wild(cat, "mag*").unwrap();
        assert_eq!(d.name(mag), Some("magazine"));
        let lang = d.attribute_wild(book, "l?ng").unwrap();
        assert_eq!(d.attribute_value(lang), Some("en"));
        assert_eq!(d.child(NodeId::DOCUMENT, "app").map(|p| d.kind(p)), Some(NodeKind::ProcessingInstruction));
    }

    #[test]
    fn test_sibling_lookups() {
        let d = doc();
        let cat = d.root_element().unwrap();
        let first = d.child(cat, "book").unwrap();
        let second = d.next_sibling_named(first, "book").unwrap();
        assert_eq!(d.attribute_value(d.attribute(second, "id").unwrap()), Some("b2"));
        assert_eq!(d.previous_sibling_named(second, "book"), Some(first));
        assert_eq!(d.next_sibling_named(second, "book"), None);
        assert_eq!(d.next_sibling_wild(first, "m*"), d.child(cat, "magazine"));
        assert_eq!(d.previous_sibling_wild(second, "b??k"), Some(first));

        assert_eq!(d.sibling(second, "book"), Some(first));
        assert_eq!(d.sibling_wild(first, "*zine"), d.child(cat, "magazine"));
        assert_eq!(d.sibling(NodeId::DOCUMENT, "catalog"), None);
    }

    #[test]
    fn test_child_value() {
        let d = doc();
        let cat = d.root_element().unwrap();
        let book = d.child(cat, "book").unwrap();
        assert_eq!(d.child_value_of(book, "title"), Some("Rust"));
        assert_eq!(d.child_value_wild(book, "pr*"), Some("10"));
        assert_eq!(d.child_value(book), None);
        let mag = d.child(cat, "magazine").unwrap();
        assert_eq!(d.child_value(mag), Some("raw"));
    }

    #[test]
    fn test_first_element_searches() {
        let d = doc();
        let title = d.first_element(NodeId::DOCUMENT, "title").unwrap();
        assert_eq!(d.child_value(title), Some("Rust"));

        let by_value = d.first_element_by_value(NodeId::DOCUMENT, "title", "Go").unwrap();
        assert_eq!(d.attribute_value(d.attribute(d.parent(by_value).unwrap(), "id").unwrap()), Some("b2"));
        assert_eq!(d.first_element_by_value(NodeId::DOCUMENT, "title", "Nope"), None);
        let wild = d.first_element_by_value_wild(NodeId::DOCUMENT, "t*", "W*").unwrap();
        assert_eq!(d.child_value(wild), Some("Weekly"));

        let de = d.first_element_by_attribute(NodeId::DOCUMENT, "book", "lang", "de").unwrap();
        assert_eq!(d.child_value_of(de, "price"), Some("20"));
        assert_eq!(d.first_element_by_attribute(NodeId::DOCUMENT, "magazine", "lang", "de"), None);
        let m = d.first_element_by_attribute_wild(NodeId::DOCUMENT, "*", "id", "m?").unwrap();
        assert_eq!(d.name(m), Some("magazine"));

        let any = d.first_element_with_attribute(NodeId::DOCUMENT, "id", "m1").unwrap();
        assert_eq!(any, m);
        assert_eq!(d.first_element_with_attribute_wild(NodeId::DOCUMENT, "lang", "[a-e]?"), d.child(d.root_element().unwrap(), "book"));
        assert_eq!(d.first_element_wild(NodeId::DOCUMENT, "pri?e").map(|p| d.child_value(p)), Some(Some("10")));
    }

    #[test]
    fn test_search_excludes_start_node() {
        let d = doc();
        let cat = d.root_element().unwrap();
        assert_eq!(d.first_element(cat, "catalog"), None);
        let book = d.child(cat, "book").unwrap();
        assert_eq!(d.first_element(book, "book"), None);
    }

    #[test]
    fn test_search_descends_below_partial_matches() {
        let d = Document::parse_owned(b"<r><t>x<t>y</t></t></r>".to_vec(), ParseOptions::DEFAULT).unwrap();
        let inner = d.first_element_by_value(NodeId::DOCUMENT, "t", "y").unwrap();
        assert_eq!(d.name(d.parent(inner).unwrap()), Some("t"));

        let d = Document::parse_owned(b"<r><t k='1'><t k='2'/></t></r>".to_vec(), ParseOptions::DEFAULT).unwrap();
        let inner = d.first_element_by_attribute(NodeId::DOCUMENT, "t", "k", "2").unwrap();
        assert_eq!(d.name(d.parent(inner).unwrap()), Some("t"));
        assert_eq!(d.first_element_with_attribute(NodeId::DOCUMENT, "k", "2"), Some(inner));
    }

    #[test]
    fn test_first_node_by_kind() {
        let d = doc();
        let comment = d.first_node(NodeId::DOCUMENT, NodeKind::Comment).unwrap();
        assert_eq!(d.value(comment), Some(" note "));
        let pi = d.first_node(NodeId::DOCUMENT, NodeKind::ProcessingInstruction).unwrap();
        assert_eq!(d.name(pi), Some("app"));
        assert_eq!(d.first_node(d.root_element().unwrap(), NodeKind::Document), None);
    }

    #[test]
    fn test_path() {
        let d = doc();
        let price = d.first_element(NodeId::DOCUMENT, "price").unwrap();
        assert_eq!(d.path(price, '/'), "/catalog/book/price");
        assert_eq!(d.path(price, '.'), ".catalog.book.price");
        assert_eq!(d.path(NodeId::DOCUMENT, '/'), "");
    }

    #[test]
    fn test_path_resolution() {
        let d = doc();
        let cat = d.root_element().unwrap();
        let price = d.first_element_by_path(NodeId::DOCUMENT, "/catalog/book/price", '/').unwrap();
        assert_eq!(d.child_value(price), Some("10"));

        let book = d.child(cat, "book").unwrap();
        assert_eq!(d.first_element_by_path(book, "../magazine/title", '/'), d.first_element_by_value(cat, "title", "Weekly"));
        assert_eq!(d.first_element_by_path(book, "./title", '/'), d.child(book, "title"));
        assert_eq!(d.first_element_by_path(book, "/catalog", '/'), Some(cat));
        assert_eq!(d.first_element_by_path(book, "", '/'), Some(book));
        assert_eq!(d.first_element_by_path(book, "title/", '/'), d.child(book, "title"));
        assert_eq!(d.first_element_by_path(NodeId::DOCUMENT, "..", '/'), None);
        assert_eq!(d.first_element_by_path(cat, "book/missing", '/'), None);
    }

    #[test]
    fn test_path_backtracks_over_same_named_children() {
        let d = Document::parse_owned(
            b"<r><item><a/></item><item><b/></item></r>".to_vec(),
            ParseOptions::DEFAULT,
        )
        .unwrap();
        let b = d.first_element_by_path(NodeId::DOCUMENT, "/r/item/b", '/').unwrap();
        assert_eq!(d.name(b), Some("b"));
        assert_eq!(d.path(b, '/'), "/r/item/b");
    }
}
