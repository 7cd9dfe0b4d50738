//! situxml - in-situ XML DOM parsing
//!
//! The parser rewrites the input buffer in place: entity references and
//! end-of-line sequences are decoded by compacting bytes toward the front,
//! and node names and values become spans into that buffer. Nodes and
//! attributes live in block-chained arenas and are addressed by `u32`
//! handles.
//!
//! ```
//! use situxml::{Document, NodeId, ParseOptions};
//!
//! let mut input = b"<cfg><item key=\"a &amp; b\"/></cfg>".to_vec();
//! let doc = Document::parse(&mut input, ParseOptions::DEFAULT).unwrap();
//! let item = doc.first_element(NodeId::DOCUMENT, "item").unwrap();
//! let key = doc.attribute(item, "key").unwrap();
//! assert_eq!(doc.attribute_value(key), Some("a & b"));
//! ```
//!
//! Modules:
//! - `core`: arena, byte scanner, entity decoding, encoding helpers, parser
//! - `dom`: document, navigation, queries, traversal, document order
//! - `memory`: per-document and process-wide memory accounting

pub mod core;
pub mod dom;
pub mod error;
mod load;
pub mod memory;

pub use crate::core::options::ParseOptions;
pub use dom::{
    AttrData, AttrId, Attributes, Children, Descendants, Document, NodeData, NodeId, NodeKind,
    OwnedDocument, Span, TreeWalker, XmlStr,
};
pub use error::{AllocError, Error, ParseError, ParseErrorKind, Result};
pub use memory::{allocated_bytes, peak_allocated_bytes, reset_memory_stats, DocumentMemory};
