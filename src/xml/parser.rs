//! Body parser built on quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::xml::document::{Document, Element};

/// A body that could not be turned into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML parse error at line {line}: {message}")]
pub struct XmlError {
    /// 1-based line where the parser gave up.
    pub line: usize,
    pub message: String,
}

/// Parse a complete response body into a [`Document`].
pub fn parse(bytes: &[u8]) -> Result<Document, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut lines = LineCursor::new(bytes);

    loop {
        let event = reader.read_event();
        let line = lines.line_at(reader.buffer_position() as usize);

        match event {
            Ok(Event::Start(start)) => {
                ensure_single_root(&root, line)?;
                stack.push(open_element(&start, line)?);
            }
            Ok(Event::Empty(start)) => {
                ensure_single_root(&root, line)?;
                let element = open_element(&start, line)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| XmlError {
                    line,
                    message: "closing tag without an open element".to_string(),
                })?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| XmlError {
                    line,
                    message: e.to_string(),
                })?;
                append_text(&mut stack, &text, line)?;
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(&mut stack, &text, line)?;
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype.
            Ok(_) => {}
            Err(e) => {
                return Err(XmlError {
                    line: lines.line_at(reader.error_position() as usize),
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError {
            line: lines.line_at(bytes.len()),
            message: format!("unexpected end of document, <{}> is not closed", open.name),
        });
    }

    root.map(Document::new).ok_or_else(|| XmlError {
        line: lines.line_at(bytes.len()),
        message: "document has no root element".to_string(),
    })
}

fn open_element(start: &BytesStart<'_>, line: usize) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name, line);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError {
            line,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError {
                line,
                message: e.to_string(),
            })?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(stack: &mut [Element], text: &str, line: usize) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None => Err(XmlError {
            line,
            message: "text outside of the root element".to_string(),
        }),
    }
}

fn ensure_single_root(root: &Option<Element>, line: usize) -> Result<(), XmlError> {
    match root {
        Some(existing) => Err(XmlError {
            line,
            message: format!("second root element after <{}>", existing.name),
        }),
        None => Ok(()),
    }
}

/// Maps byte offsets to 1-based lines. Only the bytes between the previous
/// and the current offset are scanned, so a forward pass is linear.
struct LineCursor<'a> {
    bytes: &'a [u8],
    position: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            position: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.bytes.len());
        if position >= self.position {
            self.line += count_newlines(&self.bytes[self.position..position]);
        } else {
            self.line -= count_newlines(&self.bytes[position..self.position]);
        }
        self.position = position;
        self.line
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
