//! Owned-buffer loading from strings, bytes, readers and files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::encoding::convert_to_utf8;
use crate::core::options::ParseOptions;
use crate::dom::document::Document;
use crate::error::Result;

impl Document<'static> {
    /// Parse a copy of `text`
    pub fn parse_str(text: &str, options: ParseOptions) -> Result<Self> {
        Ok(Self::parse_owned(text.as_bytes().to_vec(), options)?)
    }

    /// Parse raw bytes, transcoding UTF-16 and stripping a UTF-8 BOM first
    pub fn parse_bytes(bytes: Vec<u8>, options: ParseOptions) -> Result<Self> {
        let buffer = convert_to_utf8(bytes)?;
        Ok(Self::parse_owned(buffer, options)?)
    }

    /// Read everything from `reader`, then parse it as with [`parse_bytes`](Self::parse_bytes)
    pub fn parse_reader<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_bytes(bytes, options)
    }

    pub fn parse_file(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading document");

        let mut file = File::open(path)?;
        let mut bytes = Vec::with_capacity(file.metadata().map(|m| m.len() as usize).unwrap_or(0));
        file.read_to_end(&mut bytes)?;
        Self::parse_bytes(bytes, options)
    }
}
