//! Bounded tree reader
//!
//! Wraps a forward-only XML tokenizer and yields one [`ElementStart`] per
//! start (or self-closing) tag, in document order. Each event is handed over
//! as an owned value and nothing about it is kept afterwards: the only state
//! carried between events is the stack of currently open tag names and a
//! reusable scratch buffer, so retained memory grows with document depth and
//! not with document size.

use crate::error::{Result, TransformError};
use crate::types::{Element, ElementStart};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};
use std::io::BufRead;

/// Lazy, non-restartable sequence of element-start events
pub struct TreeReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    open: Vec<String>,
    peak_depth: usize,
    finished: bool,
}

impl<R: BufRead> TreeReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        TreeReader {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            peak_depth: 0,
            finished: false,
        }
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Deepest open-element stack seen so far
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    fn read_next(&mut self) -> Result<Option<ElementStart>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(start)) => {
                    let element = decode_element(&start, self.reader.decoder())
                        .map_err(|reason| malformed(&self.reader, reason))?;
                    let depth = self.open.len();
                    self.open.push(element.tag.clone());
                    self.peak_depth = self.peak_depth.max(self.open.len());
                    return Ok(Some(ElementStart { depth, element }));
                }
                Ok(Event::Empty(start)) => {
                    let element = decode_element(&start, self.reader.decoder())
                        .map_err(|reason| malformed(&self.reader, reason))?;
                    let depth = self.open.len();
                    self.peak_depth = self.peak_depth.max(depth + 1);
                    return Ok(Some(ElementStart { depth, element }));
                }
                Ok(Event::End(_)) => {
                    if self.open.pop().is_none() {
                        return Err(malformed(&self.reader, "closing tag without an open element"));
                    }
                }
                Ok(Event::Eof) => {
                    if let Some(tag) = self.open.last() {
                        let reason = format!("unexpected end of input inside <{}>", tag);
                        return Err(malformed(&self.reader, reason));
                    }
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) => return Err(malformed(&self.reader, e.to_string())),
            }
        }
    }
}

impl<R: BufRead> Iterator for TreeReader<R> {
    type Item = Result<ElementStart>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_next() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn malformed<R>(reader: &Reader<R>, reason: impl Into<String>) -> TransformError {
    TransformError::MalformedInput {
        position: reader.buffer_position() as u64,
        reason: reason.into(),
    }
}

/// Copy tag name and attributes out of the tokenizer's buffer
fn decode_element(start: &BytesStart, decoder: Decoder) -> std::result::Result<Element, String> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("invalid tag name: {}", e))?
        .to_string();
    let mut element = Element::new(tag);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute in <{}>: {}", element.tag, e))?;
        let name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("invalid attribute name in <{}>: {}", element.tag, e))?
            .to_string();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| format!("invalid value for {} in <{}>: {}", name, element.tag, e))?
            .into_owned();
        element.attributes.push((name, value));
    }

    Ok(element)
}
