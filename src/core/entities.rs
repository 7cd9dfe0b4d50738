//! In-place text decoding
//!
//! Entity expansion and line-end normalisation only ever shrink text, so
//! every decoder rewrites the input buffer in place. Removed bytes form a
//! single "gap" that trails the write position; each time the gap grows,
//! the bytes kept since the previous growth are moved left over it with one
//! `copy_within`. Each byte moves at most once per gap extension.
//!
//! Handled forms:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - CR and CR LF line ends (optional)
//! - Attribute whitespace conversion and normalisation (optional)
//!
//! Anything that is not a recognised reference is left untouched.

use super::encoding::encode_utf8;
use super::options::ParseOptions;
use super::scanner::{at, ct, is};

/// Pending run of removed bytes
#[derive(Debug, Default)]
pub struct Gap {
    /// Position just past the last removed run, if any
    end: Option<usize>,
    /// Total bytes removed so far
    size: usize,
}

impl Gap {
    /// Drop `count` bytes at `*pos`, advancing `*pos` past them
    #[inline]
    pub fn push(&mut self, buf: &mut [u8], pos: &mut usize, count: usize) {
        if let Some(end) = self.end {
            buf.copy_within(end..*pos, end - self.size);
        }
        *pos += count;
        self.end = Some(*pos);
        self.size += count;
    }

    /// Close the gap at `pos` and return the compacted end position
    #[inline]
    pub fn flush(&self, buf: &mut [u8], pos: usize) -> usize {
        match self.end {
            Some(end) => {
                buf.copy_within(end..pos, end - self.size);
                pos - self.size
            }
            None => pos,
        }
    }
}

/// Result of decoding one text region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Compacted end: the decoded text is `buf[start..end]`
    pub end: usize,
    /// Where scanning resumes: the `<` for text, past the terminator otherwise
    pub next: usize,
}

/// Expand the reference starting at `buf[amp] == b'&'`.
///
/// Returns the position to continue scanning from. An unrecognised or
/// malformed reference is kept literally and scanning resumes after `&`.
pub fn expand_entity(buf: &mut [u8], amp: usize, gap: &mut Gap) -> usize {
    let rest = &buf[amp + 1..];
    let (replacement, consumed) = match rest.first() {
        Some(b'#') => match numeric_reference(&rest[1..]) {
            Some((cp, len)) => (cp, len + 2),
            None => return amp + 1,
        },
        _ => match named_reference(rest) {
            Some((byte, len)) => (byte as u32, len + 1),
            None => return amp + 1,
        },
    };

    let mut utf8 = [0u8; 4];
    let written = encode_utf8(replacement, &mut utf8);
    buf[amp..amp + written].copy_from_slice(&utf8[..written]);

    let mut pos = amp + written;
    gap.push(buf, &mut pos, consumed - written);
    pos
}

/// Match a built-in entity name; returns the byte and the length through `;`
#[inline]
fn named_reference(rest: &[u8]) -> Option<(u8, usize)> {
    const NAMED: [(&[u8], u8); 5] = [
        (b"amp;", b'&'),
        (b"lt;", b'<'),
        (b"gt;", b'>'),
        (b"apos;", b'\''),
        (b"quot;", b'"'),
    ];
    NAMED
        .iter()
        .find(|(name, _)| rest.starts_with(name))
        .map(|&(name, byte)| (byte, name.len()))
}

/// Parse the digits of `&#...;` (input starts after `#`).
///
/// Returns the code point and the length through `;`. Fails on zero
/// digits, a missing `;`, U+0000, surrogates and values above U+10FFFF.
fn numeric_reference(rest: &[u8]) -> Option<(u32, usize)> {
    let (radix, digits_start) = if rest.first() == Some(&b'x') {
        (16, 1)
    } else {
        (10, 0)
    };

    let mut cp: u32 = 0;
    let mut pos = digits_start;
    while let Some(digit) = rest.get(pos).and_then(|&b| (b as char).to_digit(radix)) {
        // saturate above the Unicode range so long digit runs stay invalid
        cp = cp.saturating_mul(radix).saturating_add(digit).min(0x11_0000);
        pos += 1;
    }

    if pos == digits_start || rest.get(pos) != Some(&b';') {
        return None;
    }
    char::from_u32(cp).filter(|&c| c != '\0')?;
    Some((cp, pos + 1))
}

/// Signature shared by the character-data decoders
pub type TextDecoder = fn(&mut [u8], usize) -> Decoded;

/// Signature shared by the attribute-value decoders; third argument is the quote
pub type AttributeDecoder = fn(&mut [u8], usize, u8) -> Option<Decoded>;

/// Decode character data starting at `start`, up to `<` or end of input
pub fn decode_text<const ESCAPES: bool, const EOL: bool>(buf: &mut [u8], start: usize) -> Decoded {
    let mut gap = Gap::default();
    let mut s = start;

    loop {
        while !is(at(buf, s), ct::PCDATA) {
            s += 1;
        }

        match at(buf, s) {
            b'\r' if EOL => {
                buf[s] = b'\n';
                s += 1;
                if at(buf, s) == b'\n' {
                    gap.push(buf, &mut s, 1);
                }
            }
            b'&' if ESCAPES => s = expand_entity(buf, s, &mut gap),
            // end of input ends text like `<` does
            b'<' | 0 => {
                let end = gap.flush(buf, s);
                return Decoded { end, next: s };
            }
            _ => s += 1,
        }
    }
}

/// Decode an attribute value starting just after its opening quote
pub fn decode_attribute<const ESCAPES: bool, const WNORM: bool, const WCONV: bool, const EOL: bool>(
    buf: &mut [u8],
    start: usize,
    quote: u8,
) -> Option<Decoded> {
    let mut gap = Gap::default();
    let mut s = start;

    if WNORM {
        let mut t = s;
        while is(at(buf, t), ct::SPACE) {
            t += 1;
        }
        if t != s {
            let count = t - s;
            gap.push(buf, &mut s, count);
        }
    }

    let stop = if WNORM || WCONV { ct::ATTR_WS } else { ct::ATTR };

    loop {
        while !is(at(buf, s), stop) {
            s += 1;
        }

        let c = at(buf, s);
        if c == quote {
            let mut end = gap.flush(buf, s);
            if WNORM {
                while end > start && is(buf[end - 1], ct::SPACE) {
                    end -= 1;
                }
            }
            return Some(Decoded { end, next: s + 1 });
        } else if c == 0 {
            return None;
        } else if ESCAPES && c == b'&' {
            s = expand_entity(buf, s, &mut gap);
        } else if WNORM && is(c, ct::SPACE) {
            buf[s] = b' ';
            s += 1;
            let mut t = s;
            while is(at(buf, t), ct::SPACE) {
                t += 1;
            }
            if t != s {
                let count = t - s;
                gap.push(buf, &mut s, count);
            }
        } else if WCONV && is(c, ct::SPACE) {
            buf[s] = b' ';
            s += 1;
            if EOL && c == b'\r' && at(buf, s) == b'\n' {
                gap.push(buf, &mut s, 1);
            }
        } else if EOL && c == b'\r' {
            buf[s] = b'\n';
            s += 1;
            if at(buf, s) == b'\n' {
                gap.push(buf, &mut s, 1);
            }
        } else {
            s += 1;
        }
    }
}

/// Decode comment content up to `-->`, normalising line ends
pub fn decode_comment(buf: &mut [u8], start: usize) -> Option<Decoded> {
    decode_until(buf, start, ct::COMMENT, b"-->")
}

/// Decode CDATA content up to `]]>`, normalising line ends
pub fn decode_cdata(buf: &mut [u8], start: usize) -> Option<Decoded> {
    decode_until(buf, start, ct::CDATA, b"]]>")
}

fn decode_until(buf: &mut [u8], start: usize, class: u8, terminator: &[u8; 3]) -> Option<Decoded> {
    let mut gap = Gap::default();
    let mut s = start;

    loop {
        while !is(at(buf, s), class) {
            s += 1;
        }

        let c = at(buf, s);
        if c == b'\r' {
            buf[s] = b'\n';
            s += 1;
            if at(buf, s) == b'\n' {
                gap.push(buf, &mut s, 1);
            }
        } else if c == terminator[0]
            && at(buf, s + 1) == terminator[1]
            && at(buf, s + 2) == terminator[2]
        {
            let end = gap.flush(buf, s);
            return Some(Decoded { end, next: s + 3 });
        } else if c == 0 {
            return None;
        } else {
            s += 1;
        }
    }
}

/// Pick the character-data decoder for a set of options
pub fn text_decoder(options: ParseOptions) -> TextDecoder {
    match (
        options.contains(ParseOptions::ESCAPES),
        options.contains(ParseOptions::EOL),
    ) {
        (false, false) => decode_text::<false, false>,
        (false, true) => decode_text::<false, true>,
        (true, false) => decode_text::<true, false>,
        (true, true) => decode_text::<true, true>,
    }
}

/// Pick the attribute decoder for a set of options
pub fn attribute_decoder(options: ParseOptions) -> AttributeDecoder {
    let escapes = options.contains(ParseOptions::ESCAPES);
    let wnorm = options.contains(ParseOptions::WNORM_ATTRIBUTE);
    let wconv = options.contains(ParseOptions::WCONV_ATTRIBUTE);
    let eol = options.contains(ParseOptions::EOL);

    match (escapes, wnorm, wconv, eol) {
        (false, false, false, false) => decode_attribute::<false, false, false, false>,
        (false, false, false, true) => decode_attribute::<false, false, false, true>,
        (false, false, true, false) => decode_attribute::<false, false, true, false>,
        (false, false, true, true) => decode_attribute::<false, false, true, true>,
        (false, true, false, false) => decode_attribute::<false, true, false, false>,
        (false, true, false, true) => decode_attribute::<false, true, false, true>,
        (false, true, true, false) => decode_attribute::<false, true, true, false>,
        (false, true, true, true) => decode_attribute::<false, true, true, true>,
        (true, false, false, false) => decode_attribute::<true, false, false, false>,
        (true, false, false, true) => decode_attribute::<true, false, false, true>,
        (true, false, true, false) => decode_attribute::<true, false, true, false>,
        (true, false, true, true) => decode_attribute::<true, false, true, true>,
        (true, true, false, false) => decode_attribute::<true, true, false, false>,
        (true, true, false, true) => decode_attribute::<true, true, false, true>,
        (true, true, true, false) => decode_attribute::<true, true, true, false>,
        (true, true, true, true) => decode_attribute::<true, true, true, true>,
    }
}
