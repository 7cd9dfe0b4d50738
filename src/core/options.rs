//! Parse option flags
//!
//! A plain `u32` bit set. Flags combine with `|`; the parser reads them
//! once at start-up to pick its decoders.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Which optional constructs the parser keeps and how it normalises text
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions(u32);

impl ParseOptions {
    /// Nothing optional: elements, attributes and in-root text only
    pub const MINIMAL: Self = Self(0);
    /// Keep processing instructions
    pub const PI: Self = Self(0x001);
    /// Keep comments
    pub const COMMENTS: Self = Self(0x002);
    /// Keep CDATA sections
    pub const CDATA: Self = Self(0x004);
    /// Keep whitespace-only character data
    pub const WS_TEXT: Self = Self(0x008);
    /// Keep character data outside the root element
    pub const EXT_TEXT: Self = Self(0x010);
    /// Expand entity and character references
    pub const ESCAPES: Self = Self(0x020);
    /// Trim attribute values and collapse whitespace runs to one space
    pub const WNORM_ATTRIBUTE: Self = Self(0x040);
    /// Replace each whitespace character in attribute values with a space
    pub const WCONV_ATTRIBUTE: Self = Self(0x080);
    /// Normalise CR and CR LF to LF
    pub const EOL: Self = Self(0x100);

    pub const DEFAULT: Self = Self(
        Self::CDATA.0 | Self::EXT_TEXT.0 | Self::ESCAPES.0 | Self::WCONV_ATTRIBUTE.0 | Self::EOL.0,
    );

    const ALL: u32 = 0x1ff;

    const NAMES: [(Self, &'static str); 9] = [
        (Self::PI, "PI"),
        (Self::COMMENTS, "COMMENTS"),
        (Self::CDATA, "CDATA"),
        (Self::WS_TEXT, "WS_TEXT"),
        (Self::EXT_TEXT, "EXT_TEXT"),
        (Self::ESCAPES, "ESCAPES"),
        (Self::WNORM_ATTRIBUTE, "WNORM_ATTRIBUTE"),
        (Self::WCONV_ATTRIBUTE, "WCONV_ATTRIBUTE"),
        (Self::EOL, "EOL"),
    ];

    /// Raw bit value
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones
    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    /// True if every flag in `other` is set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for ParseOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParseOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ParseOptions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("ParseOptions(MINIMAL)");
        }
        f.write_str("ParseOptions(")?;
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let opts = ParseOptions::default();
        assert!(opts.contains(ParseOptions::CDATA));
        assert!(opts.contains(ParseOptions::EXT_TEXT));
        assert!(opts.contains(ParseOptions::ESCAPES));
        assert!(opts.contains(ParseOptions::WCONV_ATTRIBUTE));
        assert!(opts.contains(ParseOptions::EOL));
        assert!(!opts.contains(ParseOptions::PI));
        assert!(!opts.contains(ParseOptions::COMMENTS));
        assert_eq!(opts.bits(), 0x1b4);
    }

    #[test]
    fn test_combine_and_remove() {
        let opts = ParseOptions::MINIMAL | ParseOptions::PI | ParseOptions::COMMENTS;
        assert_eq!(opts.bits(), 0x3);
        assert!(!opts.without(ParseOptions::PI).contains(ParseOptions::PI));
        assert_eq!(ParseOptions::from_bits_truncate(0xffff_ffff).bits(), 0x1ff);
        assert!(ParseOptions::MINIMAL.contains(ParseOptions::MINIMAL));
    }

    #[test]
    fn test_debug_lists_flags() {
        let opts = ParseOptions::PI | ParseOptions::EOL;
        assert_eq!(format!("{opts:?}"), "ParseOptions(PI | EOL)");
        assert_eq!(format!("{:?}", ParseOptions::MINIMAL), "ParseOptions(MINIMAL)");
    }
}
