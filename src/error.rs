//! Error types
//!
//! `ParseError` comes back from every parse entry point; `Error` covers
//! mutation, allocation and I/O failures on a parsed document.

use crate::dom::node::NodeKind;
use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, Error>;

/// Storage could not be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// Why a parse stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("malformed processing instruction")]
    BadPi,
    #[error("unterminated processing instruction")]
    UnterminatedPi,
    #[error("malformed comment")]
    BadComment,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("malformed CDATA section")]
    BadCdata,
    #[error("unterminated CDATA section")]
    UnterminatedCdata,
    #[error("malformed DOCTYPE declaration")]
    BadDoctype,
    #[error("unterminated DOCTYPE declaration")]
    UnterminatedDoctype,
    #[error("unknown markup declaration")]
    UnknownDeclaration,
    #[error("invalid character after '<'")]
    BadTagStart,
    #[error("malformed start tag")]
    BadStartTag,
    #[error("unterminated start tag")]
    UnterminatedStartTag,
    #[error("malformed attribute")]
    BadAttribute,
    #[error("attribute value is not quoted")]
    UnquotedAttributeValue,
    #[error("unterminated attribute value")]
    UnterminatedAttributeValue,
    #[error("malformed end tag")]
    BadEndTag,
    #[error("unterminated end tag")]
    UnterminatedEndTag,
    #[error("end tag does not match the open element")]
    MismatchedEndTag,
    #[error("end tag without an open element")]
    UnexpectedEndTag,
    #[error("element not closed before end of input")]
    UnclosedElement,
    #[error("input exceeds 4 GiB")]
    InputTooLarge,
    #[error("memory allocation failed")]
    OutOfMemory,
}

/// Parse failure with the byte offset where scanning stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        ParseError { kind, offset }
    }

    /// Failure class
    #[inline]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Byte offset into the input
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Errors from document construction and mutation
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error("{operation} is not supported on {kind:?} nodes")]
    WrongKind {
        operation: &'static str,
        kind: NodeKind,
    },

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("attribute does not belong to the given node")]
    ForeignAttribute,

    #[error("handle does not refer to a live node or attribute")]
    InvalidHandle,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(ParseErrorKind::MismatchedEndTag, 12);
        assert_eq!(
            err.to_string(),
            "end tag does not match the open element at byte 12"
        );
        assert_eq!(err.kind(), ParseErrorKind::MismatchedEndTag);
        assert_eq!(err.offset(), 12);
    }

    #[test]
    fn test_error_conversions() {
        let err: Error = ParseError::new(ParseErrorKind::BadPi, 0).into();
        assert!(matches!(err, Error::Parse(_)));

        let err: Error = AllocError.into();
        assert_eq!(err.to_string(), "memory allocation failed");

        let err = Error::WrongKind {
            operation: "set_name",
            kind: NodeKind::Text,
        };
        assert_eq!(err.to_string(), "set_name is not supported on Text nodes");
    }
}
