//! Character encoding helpers
//!
//! - UTF-8 encode/decode with explicit sequence-length dispatch
//! - Conversion between UTF-8 and wide (one code point per unit) strings
//! - Input normalisation: UTF-8 BOM stripping, UTF-16 LE/BE to UTF-8

use crate::error::Error;

/// Replacement for undecodable input
const REPLACEMENT: u32 = 0xFFFD;

/// Encode a code point as UTF-8 into `out`, returning the byte count.
///
/// Values above U+10FFFF are written as U+FFFD.
#[inline]
pub fn encode_utf8(cp: u32, out: &mut [u8; 4]) -> usize {
    if cp < 0x80 {
        out[0] = cp as u8;
        1
    } else if cp < 0x800 {
        out[0] = 0xC0 | (cp >> 6) as u8;
        out[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp < 0x1_0000 {
        out[0] = 0xE0 | (cp >> 12) as u8;
        out[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        out[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else if cp < 0x11_0000 {
        out[0] = 0xF0 | (cp >> 18) as u8;
        out[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        out[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        out[3] = 0x80 | (cp & 0x3F) as u8;
        4
    } else {
        encode_utf8(REPLACEMENT, out)
    }
}

/// Length of the UTF-8 sequence introduced by `lead`, 0 for a stray byte
#[inline]
pub fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Decode one code point from the front of `bytes`.
///
/// Returns the code point and the bytes consumed, `None` for an empty
/// slice. Malformed or truncated sequences decode as U+FFFD and consume
/// one byte.
pub fn decode_utf8(bytes: &[u8]) -> Option<(u32, usize)> {
    let lead = *bytes.first()?;
    let len = sequence_len(lead);
    let cont = |i: usize| bytes.get(i).filter(|&&b| b & 0xC0 == 0x80).map(|&b| (b & 0x3F) as u32);

    let cp = match len {
        1 => Some(lead as u32),
        2 => cont(1).map(|c1| ((lead as u32 & 0x1F) << 6) | c1),
        3 => cont(1)
            .zip(cont(2))
            .map(|(c1, c2)| ((lead as u32 & 0x0F) << 12) | (c1 << 6) | c2)
            .filter(|&cp| cp >= 0x800 && !(0xD800..=0xDFFF).contains(&cp)),
        4 => cont(1)
            .zip(cont(2))
            .zip(cont(3))
            .map(|((c1, c2), c3)| ((lead as u32 & 0x07) << 18) | (c1 << 12) | (c2 << 6) | c3)
            .filter(|&cp| (0x1_0000..0x11_0000).contains(&cp)),
        _ => None,
    };

    Some(match cp {
        Some(cp) => (cp, len),
        None => (REPLACEMENT, 1),
    })
}

/// Convert UTF-8 bytes into a wide string of code points
pub fn to_wide(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while let Some((cp, len)) = decode_utf8(&bytes[pos..]) {
        out.push(cp);
        pos += len;
    }
    out
}

/// Convert a wide string of code points into UTF-8 bytes
pub fn from_wide(wide: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(wide.len());
    let mut utf8 = [0u8; 4];
    for &cp in wide {
        let cp = if (0xD800..=0xDFFF).contains(&cp) { REPLACEMENT } else { cp };
        let n = encode_utf8(cp, &mut utf8);
        out.extend_from_slice(&utf8[..n]);
    }
    out
}

/// Encoding of a raw XML input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Normalise raw input to UTF-8 ready for in-place parsing.
///
/// A UTF-8 BOM is stripped; UTF-16 input (BOM or `<` pattern) is
/// transcoded. Already-UTF-8 input is returned without copying.
pub fn convert_to_utf8(mut input: Vec<u8>) -> Result<Vec<u8>, Error> {
    match XmlEncoding::detect(&input) {
        XmlEncoding::Utf8 => {
            if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
                input.drain(..3);
            }
            Ok(input)
        }
        XmlEncoding::Utf16Le => utf16_to_utf8(&input, [0xFF, 0xFE], u16::from_le_bytes),
        XmlEncoding::Utf16Be => utf16_to_utf8(&input, [0xFE, 0xFF], u16::from_be_bytes),
    }
}

fn utf16_to_utf8(input: &[u8], bom: [u8; 2], unit: fn([u8; 2]) -> u16) -> Result<Vec<u8>, Error> {
    let bytes = input.strip_prefix(&bom[..]).unwrap_or(input);
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding("odd number of bytes in UTF-16 input".to_string()));
    }

    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut out = Vec::with_capacity(bytes.len());
    let mut utf8 = [0u8; 4];
    for decoded in char::decode_utf16(units) {
        let ch = decoded.map_err(|e| {
            Error::Encoding(format!("unpaired surrogate 0x{:04X} in UTF-16 input", e.unpaired_surrogate()))
        })?;
        let n = encode_utf8(ch as u32, &mut utf8);
        out.extend_from_slice(&utf8[..n]);
    }
    Ok(out)
}
