//! DOM Module - arena-based document over an in-place parsed buffer
//!
//! - `NodeId` / `AttrId` (u32) handles into per-document arenas
//! - Names and values as spans into the parse buffer until rewritten
//! - Queries, traversal and document order as `Document` methods

pub mod document;
pub mod node;
pub mod order;
pub mod query;
pub mod strings;
pub mod value;
pub mod walker;

pub use document::{Attributes, Children, Descendants, Document, OwnedDocument};
pub use node::{AttrData, AttrId, NodeData, NodeId, NodeKind};
pub use strings::{Span, XmlStr};
pub use walker::TreeWalker;
