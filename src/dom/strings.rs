//! Name and value storage
//!
//! Two storage modes:
//! - Input: a `Span` into the parse buffer (zero-copy, the parse result)
//! - Owned: a separate allocation, created when a name or value is replaced
//!
//! The document resolves a `XmlStr` against its buffer; nothing here keeps
//! a pointer into the buffer.

use crate::error::AllocError;

/// A span referencing a portion of the parse buffer.
///
/// Offsets are `u32`, so a buffer is limited to 4 GiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset into the buffer
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a span covering `start..end`
    ///
    /// Callers guarantee the buffer length fits in `u32`.
    #[inline]
    pub(crate) fn from_range(start: usize, end: usize) -> Self {
        Span {
            offset: start as u32,
            len: (end - start) as u32,
        }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the end offset (exclusive)
    #[inline]
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.len)
    }

    /// Extract the byte slice from the buffer, `None` if out of bounds
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> Option<&'a [u8]> {
        input.get(self.offset as usize..self.end() as usize)
    }
}

/// Storage for one name or value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum XmlStr {
    /// No name or value
    #[default]
    Absent,
    /// Decoded text inside the parse buffer
    Input(Span),
    /// Separately allocated replacement
    Owned(Vec<u8>),
}

impl XmlStr {
    /// Resolve against the parse buffer
    #[inline]
    pub fn resolve<'s>(&'s self, input: &'s [u8]) -> Option<&'s [u8]> {
        match self {
            XmlStr::Absent => None,
            XmlStr::Input(span) => span.slice(input),
            XmlStr::Owned(bytes) => Some(bytes),
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, XmlStr::Absent)
    }

    /// True if the text lives in the parse buffer
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, XmlStr::Input(_))
    }

    /// Bytes of separately allocated storage
    #[inline]
    pub fn heap_bytes(&self) -> usize {
        match self {
            XmlStr::Owned(bytes) => bytes.capacity(),
            _ => 0,
        }
    }

    /// Span into the parse buffer, if borrowed
    #[inline]
    pub fn span(&self) -> Option<Span> {
        match self {
            XmlStr::Input(span) => Some(*span),
            _ => None,
        }
    }

    /// Replace the contents with a copy of `value`.
    ///
    /// Owned storage with enough capacity is reused; otherwise a new exact
    /// allocation is made. On failure the old contents are kept.
    pub fn assign(&mut self, value: &[u8]) -> Result<(), AllocError> {
        if let XmlStr::Owned(bytes) = self {
            if bytes.capacity() >= value.len() {
                bytes.clear();
                bytes.extend_from_slice(value);
                return Ok(());
            }
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(value.len()).map_err(|_| AllocError)?;
        bytes.extend_from_slice(value);
        *self = XmlStr::Owned(bytes);
        Ok(())
    }

    /// Release owned storage and mark absent
    #[inline]
    pub fn release(&mut self) {
        *self = XmlStr::Absent;
    }
}

/// Parse buffer: borrowed from the caller or owned by the document
#[derive(Debug, Default)]
pub(crate) enum Buffer<'a> {
    #[default]
    Empty,
    Borrowed(&'a mut [u8]),
    Owned(Vec<u8>),
}

impl<'a> Buffer<'a> {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Empty => &[],
            Buffer::Borrowed(buf) => buf,
            Buffer::Owned(buf) => buf,
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Buffer::Empty => &mut [],
            Buffer::Borrowed(buf) => buf,
            Buffer::Owned(buf) => buf,
        }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Buffer::Owned(_))
    }

    #[inline]
    pub fn heap_bytes(&self) -> usize {
        match self {
            Buffer::Owned(buf) => buf.capacity(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice() {
        let input = b"<root>hello</root>";
        let span = Span::from_range(6, 11);
        assert_eq!(span.slice(input), Some(&b"hello"[..]));
        assert_eq!(span.end(), 11);
        assert!(!span.is_empty());
        assert_eq!(Span::from_range(10, 30).slice(input), None);
    }

    #[test]
    fn test_resolve_modes() {
        let input = b"abcdef";
        assert_eq!(XmlStr::Absent.resolve(input), None);
        assert_eq!(XmlStr::Input(Span::from_range(1, 3)).resolve(input), Some(&b"bc"[..]));
        assert_eq!(XmlStr::Owned(b"xyz".to_vec()).resolve(input), Some(&b"xyz"[..]));
    }

    #[test]
    fn test_assign_from_borrowed_copies() {
        let mut s = XmlStr::Input(Span::from_range(0, 3));
        s.assign(b"new").unwrap();
        assert_eq!(s, XmlStr::Owned(b"new".to_vec()));
        assert!(!s.is_borrowed());
    }

    #[test]
    fn test_assign_reuses_capacity() {
        let mut s = XmlStr::Absent;
        s.assign(b"longer value").unwrap();
        let ptr = match &s {
            XmlStr::Owned(bytes) => bytes.as_ptr(),
            _ => unreachable!(),
        };
        s.assign(b"short").unwrap();
        match &s {
            XmlStr::Owned(bytes) => {
                assert_eq!(bytes.as_slice(), b"short");
                assert_eq!(bytes.as_ptr(), ptr);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_buffer_views() {
        let mut data = *b"xy";
        let mut borrowed = Buffer::Borrowed(&mut data);
        borrowed.as_mut_slice()[0] = b'z';
        assert_eq!(borrowed.as_slice(), b"zy");
        assert!(!borrowed.is_owned());
        assert!(Buffer::Owned(vec![1]).is_owned());
        assert!(Buffer::Empty.as_slice().is_empty());
    }
}
