//! Pull parser from ARXML bytes to a [`Document`].

use std::collections::BTreeSet;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use super::SHORT_NAME_TAG;
use crate::base::Name;
use crate::error::{LoadError, ParseError, ParseErrorKind};
use crate::model::{Arena, Document, Element, ElementId};
use crate::schema::{Category, SchemaRelease, registry};

/// One open element on the parse stack.
struct Frame {
    tag: String,
    /// `None` for a SHORT-NAME being absorbed into its parent.
    node: Option<ElementId>,
    text: String,
    has_children: bool,
}

struct ArxmlReader<'a> {
    source: &'a [u8],
    arena: Arena,
    root: Option<ElementId>,
    release: Option<SchemaRelease>,
    stack: Vec<Frame>,
    closed_root: bool,
}

/// Parse ARXML bytes into a document.
pub(crate) fn parse(bytes: &[u8]) -> Result<Document, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::at(bytes, e.valid_up_to(), ParseErrorKind::InvalidUtf8))?;
    let mut reader = ArxmlReader {
        source: bytes,
        arena: Arena::default(),
        root: None,
        release: None,
        stack: Vec::new(),
        closed_root: false,
    };
    reader.read(text)?;
    let (Some(root), Some(release)) = (reader.root, reader.release) else {
        return Err(ParseError::at(bytes, bytes.len(), ParseErrorKind::NoRootElement).into());
    };

    let unregistered: BTreeSet<&str> = reader
        .arena
        .subtree(root)
        .into_iter()
        .filter_map(|id| reader.arena.get(id))
        .filter(|e| !registry().is_registered(release, e.category()))
        .map(|e| e.category().tag())
        .collect();
    if !unregistered.is_empty() {
        warn!(
            release = %release,
            categories = ?unregistered,
            "document contains categories unknown to the schema"
        );
    }
    debug!(release = %release, bytes = bytes.len(), "parsed ARXML");
    Ok(Document::from_parts(release, reader.arena, root))
}

impl<'a> ArxmlReader<'a> {
    fn read(&mut self, text: &str) -> Result<(), LoadError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        loop {
            let offset = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                ParseError::syntax(self.source, reader.error_position() as usize, e.to_string())
            })?;
            match event {
                Event::Start(e) => self.open(&e, offset)?,
                Event::Empty(e) => {
                    self.open(&e, offset)?;
                    self.close();
                }
                Event::End(_) => self.close(),
                Event::Text(e) => {
                    let content = e.unescape().map_err(|err| {
                        ParseError::syntax(self.source, offset, err.to_string())
                    })?;
                    self.text(&content, offset)?;
                }
                Event::CData(e) => {
                    let content = String::from_utf8_lossy(&e).into_owned();
                    self.text(&content, offset)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes are dropped.
                _ => {}
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(ParseError::at(
                self.source,
                self.source.len(),
                ParseErrorKind::UnclosedElement(open.tag.clone()),
            )
            .into());
        }
        Ok(())
    }

    fn open(&mut self, e: &BytesStart<'_>, offset: usize) -> Result<(), LoadError> {
        let tag = std::str::from_utf8(e.name().as_ref())
            .map_err(|err| ParseError::syntax(self.source, offset, format!("invalid tag name: {err}")))?
            .to_string();
        let attributes = self.attributes(e, offset)?;

        if self.closed_root {
            return Err(ParseError::at(self.source, offset, ParseErrorKind::MultipleRoots).into());
        }

        if self.stack.is_empty() {
            return self.open_root(tag, attributes, offset);
        }
        let mut parent_node = None;
        if let Some(parent) = self.stack.last_mut() {
            parent.has_children = true;
            parent_node = parent.node;
        }

        // Content of a SHORT-NAME is text only; anything nested in it is dropped.
        let node = if parent_node.is_none() || tag == SHORT_NAME_TAG {
            None
        } else {
            let release = self.release.unwrap_or(SchemaRelease::R20_11);
            let mut element = Element::new(Category::from_tag(&tag), release);
            element.attributes = attributes;
            element.parent = parent_node;
            let id = self.arena.alloc(element);
            if let Some(parent_el) = parent_node.and_then(|p| self.arena.get_mut(p)) {
                parent_el.children.push(id);
            }
            Some(id)
        };
        self.stack.push(Frame {
            tag,
            node,
            text: String::new(),
            has_children: false,
        });
        Ok(())
    }

    fn open_root(
        &mut self,
        tag: String,
        attributes: Vec<(Name, String)>,
        offset: usize,
    ) -> Result<(), LoadError> {
        if tag != "AUTOSAR" {
            return Err(ParseError::at(self.source, offset, ParseErrorKind::UnexpectedRoot(tag)).into());
        }
        let namespace = attributes
            .iter()
            .find(|(n, _)| n.as_str() == "xmlns")
            .map(|(_, v)| v.as_str());
        let location = attributes
            .iter()
            .find(|(n, _)| n.ends_with(":schemaLocation"))
            .map(|(_, v)| v.as_str());
        let release = registry().detect(namespace, location)?;

        let mut element = Element::new(Category::Autosar, release);
        element.attributes = attributes;
        let id = self.arena.alloc(element);
        self.root = Some(id);
        self.release = Some(release);
        self.stack.push(Frame {
            tag,
            node: Some(id),
            text: String::new(),
            has_children: false,
        });
        Ok(())
    }

    fn attributes(&self, e: &BytesStart<'_>, offset: usize) -> Result<Vec<(Name, String)>, LoadError> {
        let mut out = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| {
                ParseError::syntax(self.source, offset, format!("attribute error: {err}"))
            })?;
            let key = std::str::from_utf8(attr.key.as_ref()).map_err(|err| {
                ParseError::syntax(self.source, offset, format!("attribute key error: {err}"))
            })?;
            let value = attr.unescape_value().map_err(|err| {
                ParseError::syntax(self.source, offset, format!("attribute value error: {err}"))
            })?;
            out.push((Name::new(key), value.into_owned()));
        }
        Ok(out)
    }

    fn text(&mut self, content: &str, offset: usize) -> Result<(), LoadError> {
        match self.stack.last_mut() {
            Some(frame) => frame.text.push_str(content),
            None if content.trim().is_empty() => {}
            None => {
                return Err(
                    ParseError::syntax(self.source, offset, "text outside the root element").into(),
                );
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.node {
            None => {
                let name = frame.text.trim();
                if let Some(owner) = self
                    .stack
                    .last()
                    .and_then(|parent| parent.node)
                    .and_then(|p| self.arena.get_mut(p))
                {
                    if owner.short_name.is_none() {
                        owner.short_name = Some(Name::new(name));
                    }
                }
            }
            Some(id) => {
                let text = if frame.has_children {
                    let trimmed = frame.text.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                } else {
                    (!frame.text.is_empty()).then_some(frame.text)
                };
                if let Some(element) = self.arena.get_mut(id) {
                    element.text = text;
                }
            }
        }
        if self.stack.is_empty() {
            self.closed_root = true;
        }
    }
}
