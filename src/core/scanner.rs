//! Byte classification and cursor over a mutable input buffer
//!
//! Every byte is classified once through a static 256-entry table so the
//! hot loops test membership with a single AND. Delimiter searches use
//! memchr, which picks SSE2/AVX2/NEON at runtime.
//!
//! The logical input ends at the first NUL byte or at the end of the slice.
//! Reading past that end yields 0, so every scan loop stops on the
//! terminator without a separate bounds check.

use memchr::{memchr, memmem};

/// Character-class bits stored in [`CHARTYPE`]
pub mod ct {
    /// `\0`, `&`, `\r`, `<`
    pub const PCDATA: u8 = 1;
    /// `\0`, `&`, `\r`, `'`, `"`
    pub const ATTR: u8 = 2;
    /// `ATTR` plus `\n`, space, tab
    pub const ATTR_WS: u8 = 4;
    /// `\r`, `\n`, space, tab
    pub const SPACE: u8 = 8;
    /// `\0`, `]`, `>`, `\r`
    pub const CDATA: u8 = 16;
    /// `\0`, `-`, `>`, `\r`
    pub const COMMENT: u8 = 32;
    /// Name characters: bytes above 127, letters, digits, `_ : - .`
    pub const SYMBOL: u8 = 64;
    /// Name start characters: bytes above 127, letters, `_ :`
    pub const START_SYMBOL: u8 = 128;
}

/// Static byte classification table
pub static CHARTYPE: [u8; 256] = build_chartype();

const fn build_chartype() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        let mut class = 0;
        if matches!(b, 0 | b'&' | b'\r' | b'<') {
            class |= ct::PCDATA;
        }
        if matches!(b, 0 | b'&' | b'\r' | b'\'' | b'"') {
            class |= ct::ATTR;
        }
        if matches!(b, 0 | b'&' | b'\r' | b'\'' | b'"' | b'\n' | b' ' | b'\t') {
            class |= ct::ATTR_WS;
        }
        if matches!(b, b'\r' | b'\n' | b' ' | b'\t') {
            class |= ct::SPACE;
        }
        if matches!(b, 0 | b']' | b'>' | b'\r') {
            class |= ct::CDATA;
        }
        if matches!(b, 0 | b'-' | b'>' | b'\r') {
            class |= ct::COMMENT;
        }
        if b >= 0x80 || b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-' | b'.') {
            class |= ct::SYMBOL;
        }
        if b >= 0x80 || b.is_ascii_alphabetic() || matches!(b, b'_' | b':') {
            class |= ct::START_SYMBOL;
        }
        table[i] = class;
        i += 1;
    }
    table
}

/// Test `byte` against a class mask
#[inline(always)]
pub fn is(byte: u8, class: u8) -> bool {
    CHARTYPE[byte as usize] & class != 0
}

/// Byte at `pos`, or 0 past the end
#[inline(always)]
pub fn at(buf: &[u8], pos: usize) -> u8 {
    buf.get(pos).copied().unwrap_or(0)
}

/// Length of the logical input: up to the first NUL, if any
#[inline]
pub fn logical_len(buf: &[u8]) -> usize {
    memchr(0, buf).unwrap_or(buf.len())
}

/// Cursor over a mutable input buffer
pub struct Scanner<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> Scanner<'b> {
    /// Create a scanner over the logical part of `buf`
    #[inline]
    pub fn new(buf: &'b mut [u8]) -> Self {
        let len = logical_len(buf);
        Scanner {
            buf: &mut buf[..len],
            pos: 0,
        }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Length of the logical input
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Current byte, 0 at the end
    #[inline]
    pub fn peek(&self) -> u8 {
        at(&*self.buf, self.pos)
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Skip bytes in the given class
    #[inline]
    pub fn skip(&mut self, class: u8) {
        while is(self.peek(), class) {
            self.pos += 1;
        }
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        self.skip(ct::SPACE);
    }

    /// Check if the remaining input starts with `prefix`
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.buf
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(prefix))
    }

    /// Absolute position of the next `needle` at or after the cursor
    #[inline]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        let rest = self.buf.get(self.pos..)?;
        memmem::find(rest, needle).map(|i| self.pos + i)
    }

    /// Absolute position of the next `byte` at or after the cursor
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        let rest = self.buf.get(self.pos..)?;
        memchr(byte, rest).map(|i| self.pos + i)
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        &self.buf[start..end]
    }

    /// Whole logical buffer, for the in-place decoders
    #[inline]
    pub fn buf_mut(&mut self) -> &mut [u8] {
        &mut *self.buf
    }
}
