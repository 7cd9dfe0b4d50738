//! Single-pass in-place parser
//!
//! Walks the buffer once, left to right. A cursor tracks the innermost
//! open element: start tags append a child and descend, end tags and
//! self-closing tags pop back to the parent. Names are recorded as spans;
//! text is decoded in place and recorded as spans over the compacted
//! bytes. Nothing is copied out of the buffer.
//!
//! The first malformed construct stops the parse. Nodes built up to that
//! point stay in the arenas.

use super::arena::Arena;
use super::entities::{self, AttributeDecoder, TextDecoder};
use super::options::ParseOptions;
use super::scanner::{ct, is, Scanner};
use crate::dom::node::{self, AttrData, AttrId, NodeData, NodeId, NodeKind};
use crate::dom::strings::{Span, XmlStr};
use crate::error::{ParseError, ParseErrorKind};

/// Parser state for one run over a buffer
pub struct Parser<'b, 'n> {
    scan: Scanner<'b>,
    nodes: &'n mut Arena<NodeData>,
    attributes: &'n mut Arena<AttrData>,
    options: ParseOptions,
    decode_text: TextDecoder,
    decode_attribute: AttributeDecoder,
    /// Innermost open element, or the document
    cursor: NodeId,
}

type Result<T> = std::result::Result<T, ParseError>;

impl<'b, 'n> Parser<'b, 'n> {
    /// Prepare a parse of `buf` into arenas that already hold the document node
    pub fn new(
        buf: &'b mut [u8],
        nodes: &'n mut Arena<NodeData>,
        attributes: &'n mut Arena<AttrData>,
        options: ParseOptions,
    ) -> Self {
        Parser {
            scan: Scanner::new(buf),
            nodes,
            attributes,
            options,
            decode_text: entities::text_decoder(options),
            decode_attribute: entities::attribute_decoder(options),
            cursor: NodeId::DOCUMENT,
        }
    }

    /// Run to the end of input
    pub fn parse(mut self) -> Result<()> {
        if u32::try_from(self.scan.len()).is_err() {
            return Err(self.error(ParseErrorKind::InputTooLarge));
        }

        while !self.scan.is_eof() {
            if self.scan.peek() == b'<' {
                self.scan.advance(1);
                self.parse_markup()?;
            } else {
                self.parse_text()?;
            }
        }

        if self.cursor != NodeId::DOCUMENT {
            return Err(self.error(ParseErrorKind::UnclosedElement));
        }
        Ok(())
    }

    #[inline]
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.scan.position())
    }

    #[inline]
    fn opt(&self, flag: ParseOptions) -> bool {
        self.options.contains(flag)
    }

    /// Byte after `<`
    fn parse_markup(&mut self) -> Result<()> {
        match self.scan.peek() {
            b'?' => {
                self.scan.advance(1);
                self.parse_pi()
            }
            b'!' => {
                self.scan.advance(1);
                match self.scan.peek() {
                    b'-' => self.parse_comment(),
                    b'[' => self.parse_cdata(),
                    b'D' => self.parse_doctype(),
                    _ => Err(self.error(ParseErrorKind::UnknownDeclaration)),
                }
            }
            b'/' => {
                self.scan.advance(1);
                self.parse_end_tag()
            }
            c if is(c, ct::START_SYMBOL) => self.parse_start_tag(),
            _ => Err(self.error(ParseErrorKind::BadTagStart)),
        }
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    fn push_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        node::append_node(self.nodes, self.cursor, kind)
            .map_err(|_| self.error(ParseErrorKind::OutOfMemory))
    }

    fn push_attribute(&mut self) -> Result<AttrId> {
        node::append_attribute(self.nodes, self.attributes, self.cursor)
            .map_err(|_| self.error(ParseErrorKind::OutOfMemory))
    }

    fn set_node_name(&mut self, id: NodeId, start: usize, end: usize) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            n.name = XmlStr::Input(Span::from_range(start, end));
        }
    }

    fn set_node_value(&mut self, id: NodeId, start: usize, end: usize) {
        if let Some(n) = self.nodes.get_mut(id.0) {
            n.value = XmlStr::Input(Span::from_range(start, end));
        }
    }

    /// Append a value-only node (comment, CDATA, text) covering `start..end`
    fn push_value_node(&mut self, kind: NodeKind, start: usize, end: usize) -> Result<()> {
        let id = self.push_node(kind)?;
        self.set_node_value(id, start, end);
        Ok(())
    }

    fn pop(&mut self) {
        self.cursor = self
            .nodes
            .get(self.cursor.0)
            .and_then(|n| n.parent)
            .unwrap_or(NodeId::DOCUMENT);
    }

    // ========================================================================
    // Markup declarations
    // ========================================================================

    /// After `<?`
    fn parse_pi(&mut self) -> Result<()> {
        if !is(self.scan.peek(), ct::START_SYMBOL) {
            return Err(self.error(ParseErrorKind::BadPi));
        }

        if !self.opt(ParseOptions::PI) {
            let end = self
                .scan
                .find(b"?>")
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedPi))?;
            self.scan.set_position(end + 2);
            return Ok(());
        }

        let target_start = self.scan.position();
        self.scan.skip(ct::SYMBOL);
        let target_end = self.scan.position();

        let ch = self.scan.peek();
        if ch == 0 {
            return Err(self.error(ParseErrorKind::UnterminatedPi));
        }
        if !is(ch, ct::SPACE) && ch != b'?' {
            return Err(self.error(ParseErrorKind::BadPi));
        }
        self.scan.advance(1);
        if self.scan.is_eof() {
            return Err(self.error(ParseErrorKind::UnterminatedPi));
        }

        let declaration = self
            .scan
            .slice(target_start, target_end)
            .eq_ignore_ascii_case(b"xml");

        if ch == b'?' {
            if self.scan.peek() != b'>' {
                return Err(self.error(ParseErrorKind::BadPi));
            }
            self.scan.advance(1);
            if !declaration {
                let id = self.push_node(NodeKind::ProcessingInstruction)?;
                self.set_node_name(id, target_start, target_end);
            }
            return Ok(());
        }

        if declaration {
            let end = self
                .scan
                .find(b"?>")
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedPi))?;
            self.scan.set_position(end + 2);
            return Ok(());
        }

        let id = self.push_node(NodeKind::ProcessingInstruction)?;
        self.set_node_name(id, target_start, target_end);

        self.scan.skip_whitespace();
        let value_start = self.scan.position();
        let end = self
            .scan
            .find(b"?>")
            .ok_or_else(|| self.error(ParseErrorKind::UnterminatedPi))?;
        self.set_node_value(id, value_start, end);
        self.scan.set_position(end + 2);
        Ok(())
    }

    /// After `<!`, at `-`
    fn parse_comment(&mut self) -> Result<()> {
        self.scan.advance(1);
        if self.scan.peek() != b'-' {
            return Err(self.error(ParseErrorKind::BadComment));
        }
        self.scan.advance(1);
        let start = self.scan.position();
        let keep = self.opt(ParseOptions::COMMENTS);

        if keep && self.opt(ParseOptions::EOL) {
            let decoded = entities::decode_comment(self.scan.buf_mut(), start)
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedComment))?;
            self.push_value_node(NodeKind::Comment, start, decoded.end)?;
            self.scan.set_position(decoded.next);
        } else {
            let end = self
                .scan
                .find(b"-->")
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedComment))?;
            if keep {
                self.push_value_node(NodeKind::Comment, start, end)?;
            }
            self.scan.set_position(end + 3);
        }
        Ok(())
    }

    /// After `<!`, at `[`
    fn parse_cdata(&mut self) -> Result<()> {
        if !self.scan.starts_with(b"[CDATA[") {
            return Err(self.error(ParseErrorKind::BadCdata));
        }
        self.scan.advance(7);
        let start = self.scan.position();
        let keep = self.opt(ParseOptions::CDATA);

        if keep && self.opt(ParseOptions::EOL) {
            let decoded = entities::decode_cdata(self.scan.buf_mut(), start)
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedCdata))?;
            self.push_value_node(NodeKind::CData, start, decoded.end)?;
            self.scan.set_position(decoded.next);
        } else {
            let end = self
                .scan
                .find(b"]]>")
                .ok_or_else(|| self.error(ParseErrorKind::UnterminatedCdata))?;
            if keep {
                self.push_value_node(NodeKind::CData, start, end)?;
            }
            self.scan.set_position(end + 3);
        }
        Ok(())
    }

    /// After `<!`, at `D`. The declaration is skipped, never stored.
    fn parse_doctype(&mut self) -> Result<()> {
        if !self.scan.starts_with(b"DOCTYPE") {
            return Err(self.error(ParseErrorKind::BadDoctype));
        }
        self.scan.advance(7);
        self.scan.skip_whitespace();

        loop {
            match self.scan.peek() {
                0 => return Err(self.error(ParseErrorKind::UnterminatedDoctype)),
                b'>' => {
                    self.scan.advance(1);
                    return Ok(());
                }
                quote @ (b'"' | b'\'') => self.skip_quoted(quote)?,
                b'[' => {
                    self.scan.advance(1);
                    self.skip_internal_subset()?;
                }
                _ => self.scan.advance(1),
            }
        }
    }

    /// Skip a quoted literal starting at the opening quote
    fn skip_quoted(&mut self, quote: u8) -> Result<()> {
        self.scan.advance(1);
        let end = self
            .scan
            .find_byte(quote)
            .ok_or_else(|| self.error(ParseErrorKind::UnterminatedDoctype))?;
        self.scan.set_position(end + 1);
        Ok(())
    }

    /// Skip to the `]` closing the internal subset, honouring nesting
    fn skip_internal_subset(&mut self) -> Result<()> {
        let mut depth = 1usize;
        loop {
            match self.scan.peek() {
                0 => return Err(self.error(ParseErrorKind::UnterminatedDoctype)),
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        self.scan.advance(1);
                        return Ok(());
                    }
                }
                quote @ (b'"' | b'\'') => {
                    self.skip_quoted(quote)?;
                    continue;
                }
                _ => {}
            }
            self.scan.advance(1);
        }
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// At the first byte of the element name
    fn parse_start_tag(&mut self) -> Result<()> {
        let id = self.push_node(NodeKind::Element)?;
        let name_start = self.scan.position();
        self.scan.skip(ct::SYMBOL);
        self.set_node_name(id, name_start, self.scan.position());
        self.cursor = id;

        let ch = self.scan.peek();
        if ch == 0 {
            return Err(self.error(ParseErrorKind::UnterminatedStartTag));
        }
        self.scan.advance(1);

        match ch {
            b'>' => Ok(()),
            b'/' => self.close_empty_tag(),
            c if is(c, ct::SPACE) => self.parse_attributes(),
            _ => Err(self.error(ParseErrorKind::BadStartTag)),
        }
    }

    /// After `/` in a start tag
    fn close_empty_tag(&mut self) -> Result<()> {
        if self.scan.peek() != b'>' {
            return Err(self.error(ParseErrorKind::BadStartTag));
        }
        self.scan.advance(1);
        self.pop();
        Ok(())
    }

    fn parse_attributes(&mut self) -> Result<()> {
        loop {
            self.scan.skip_whitespace();
            match self.scan.peek() {
                0 => return Err(self.error(ParseErrorKind::UnterminatedStartTag)),
                b'/' => {
                    self.scan.advance(1);
                    return self.close_empty_tag();
                }
                b'>' => {
                    self.scan.advance(1);
                    return Ok(());
                }
                c if is(c, ct::START_SYMBOL) => self.parse_attribute()?,
                _ => return Err(self.error(ParseErrorKind::BadAttribute)),
            }
        }
    }

    /// At the first byte of an attribute name
    fn parse_attribute(&mut self) -> Result<()> {
        let id = self.push_attribute()?;
        let name_start = self.scan.position();
        self.scan.skip(ct::SYMBOL);
        let name_end = self.scan.position();
        if let Some(attr) = self.attributes.get_mut(id.0) {
            attr.name = XmlStr::Input(Span::from_range(name_start, name_end));
        }

        self.scan.skip_whitespace();
        match self.scan.peek() {
            0 => return Err(self.error(ParseErrorKind::UnterminatedStartTag)),
            b'=' => self.scan.advance(1),
            _ => return Err(self.error(ParseErrorKind::BadAttribute)),
        }

        self.scan.skip_whitespace();
        let quote = self.scan.peek();
        if quote != b'"' && quote != b'\'' {
            return Err(self.error(ParseErrorKind::UnquotedAttributeValue));
        }
        self.scan.advance(1);

        let value_start = self.scan.position();
        let decoded = (self.decode_attribute)(self.scan.buf_mut(), value_start, quote)
            .ok_or_else(|| self.error(ParseErrorKind::UnterminatedAttributeValue))?;
        if let Some(attr) = self.attributes.get_mut(id.0) {
            attr.value = XmlStr::Input(Span::from_range(value_start, decoded.end));
        }
        self.scan.set_position(decoded.next);

        // attributes must be separated by whitespace
        if is(self.scan.peek(), ct::START_SYMBOL) {
            return Err(self.error(ParseErrorKind::BadAttribute));
        }
        Ok(())
    }

    /// After `</`
    fn parse_end_tag(&mut self) -> Result<()> {
        if self.cursor == NodeId::DOCUMENT {
            return Err(self.error(ParseErrorKind::UnexpectedEndTag));
        }

        let open = self
            .nodes
            .get(self.cursor.0)
            .and_then(|n| n.name.span())
            .unwrap_or_default();
        let start = self.scan.position();
        self.scan.skip(ct::SYMBOL);
        let end = self.scan.position();

        let open_name = self.scan.slice(open.offset as usize, open.end() as usize);
        if open_name != self.scan.slice(start, end) {
            self.scan.set_position(start);
            return Err(self.error(ParseErrorKind::MismatchedEndTag));
        }

        self.pop();
        self.scan.skip_whitespace();
        match self.scan.peek() {
            b'>' => {
                self.scan.advance(1);
                Ok(())
            }
            0 => Err(self.error(ParseErrorKind::UnterminatedEndTag)),
            _ => Err(self.error(ParseErrorKind::BadEndTag)),
        }
    }

    // ========================================================================
    // Character data
    // ========================================================================

    /// At a byte that is not `<`
    fn parse_text(&mut self) -> Result<()> {
        let mark = self.scan.position();
        self.scan.skip_whitespace();
        let blank = self.scan.is_eof() || self.scan.peek() == b'<';
        if blank && (mark == self.scan.position() || !self.opt(ParseOptions::WS_TEXT)) {
            return Ok(());
        }
        self.scan.set_position(mark);

        if self.opt(ParseOptions::EXT_TEXT) || self.cursor != NodeId::DOCUMENT {
            // text may run to end of input; an element still open fails later
            let decoded = (self.decode_text)(self.scan.buf_mut(), mark);
            self.push_value_node(NodeKind::Text, mark, decoded.end)?;
            self.scan.set_position(decoded.next);
        } else {
            let end = self.scan.find_byte(b'<').unwrap_or(self.scan.len());
            self.scan.set_position(end);
        }
        Ok(())
    }
}
