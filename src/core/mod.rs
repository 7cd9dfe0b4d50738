//! Core parsing primitives
//!
//! - Arena: block-chained storage with stable handles
//! - Scanner: byte-class table and cursor over the mutable buffer
//! - Entities: in-place decoding with gap compaction
//! - Encoding: UTF-8 helpers and UTF-16 input conversion
//! - Wildcard: `*` / `?` / `[...]` name patterns
//! - Parser: builds the node tree from a buffer

pub mod arena;
pub mod encoding;
pub mod entities;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod wildcard;
