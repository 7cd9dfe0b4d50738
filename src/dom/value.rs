//! Numeric and boolean views of attribute values
//!
//! Parsing is lenient in the C library manner: leading whitespace is
//! skipped, the longest numeric prefix is used, and anything unparsable
//! reads as zero.

use super::document::Document;
use super::node::AttrId;
use crate::error::Result;

/// Integer prefix of `bytes`, saturating at the `i32` range
pub fn parse_int(bytes: &[u8]) -> i32 {
    let s = trim_start(bytes);
    let (negative, digits) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + (b - b'0') as i64).min(i64::from(i32::MAX) + 1);
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Floating-point prefix of `bytes`
pub fn parse_double(bytes: &[u8]) -> f64 {
    let s = trim_start(bytes);
    let mut end = 0;
    let digits = |from: usize| s[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    if matches!(s.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if s.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }
    if matches!(s.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(s.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    std::str::from_utf8(&s[..end])
        .ok()
        .and_then(|text| text.parse().ok())
        .unwrap_or(0.0)
}

/// True if the first byte is one of `1 t T y Y`
pub fn parse_bool(bytes: &[u8]) -> bool {
    matches!(bytes.first(), Some(b'1' | b't' | b'T' | b'y' | b'Y'))
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

impl<'a> Document<'a> {
    /// Attribute value as an integer, 0 if absent or not numeric
    pub fn attribute_as_int(&self, id: AttrId) -> i32 {
        self.attribute_value_bytes(id).map_or(0, parse_int)
    }

    /// Attribute value as a double, 0.0 if absent or not numeric
    pub fn attribute_as_double(&self, id: AttrId) -> f64 {
        self.attribute_value_bytes(id).map_or(0.0, parse_double)
    }

    pub fn attribute_as_float(&self, id: AttrId) -> f32 {
        self.attribute_as_double(id) as f32
    }

    /// Attribute value as a boolean, false if absent
    pub fn attribute_as_bool(&self, id: AttrId) -> bool {
        self.attribute_value_bytes(id).is_some_and(parse_bool)
    }

    pub fn set_attribute_int(&mut self, id: AttrId, value: i64) -> Result<()> {
        self.set_attribute_value(id, value.to_string())
    }

    /// Store the shortest representation that reads back as `value`
    pub fn set_attribute_double(&mut self, id: AttrId, value: f64) -> Result<()> {
        self.set_attribute_value(id, value.to_string())
    }

    pub fn set_attribute_bool(&mut self, id: AttrId, value: bool) -> Result<()> {
        self.set_attribute_value(id, if value { "true" } else { "false" })
    }
}
