//! Canonical ARXML emission.

use std::io;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use super::{SHORT_NAME_TAG, SerializeOptions};
use crate::model::{Document, Element, ElementId};
use crate::schema::attribute_sort_key;

/// Serialize a document.
pub(crate) fn write(doc: &Document, options: &SerializeOptions) -> io::Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', options.indent);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(io::Error::other)?;
    write_element(&mut writer, doc, doc.root(), 0, options)?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    debug!(bytes = output.len(), elements = doc.len(), "serialized ARXML");
    Ok(output)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    doc: &Document,
    id: ElementId,
    depth: usize,
    options: &SerializeOptions,
) -> io::Result<()> {
    let Some(element) = doc.element(id) else {
        return Ok(());
    };
    let tag = element.category().tag();
    let is_empty =
        element.short_name().is_none() && element.text().is_none() && element.children().is_empty();
    let start = start_tag(element, depth, options, is_empty);

    if is_empty {
        return writer
            .write_event(Event::Empty(start))
            .map_err(io::Error::other);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(io::Error::other)?;
    if let Some(text) = element.text() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(io::Error::other)?;
    }
    if let Some(short_name) = element.short_name() {
        writer
            .write_event(Event::Start(BytesStart::new(SHORT_NAME_TAG)))
            .map_err(io::Error::other)?;
        writer
            .write_event(Event::Text(BytesText::new(short_name)))
            .map_err(io::Error::other)?;
        writer
            .write_event(Event::End(BytesEnd::new(SHORT_NAME_TAG)))
            .map_err(io::Error::other)?;
    }
    for child in element.children() {
        write_element(writer, doc, *child, depth + 1, options)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(io::Error::other)
}

/// Build a start tag with attributes in canonical order.
///
/// When the one-line form would exceed `max_line_width`, every attribute
/// goes on its own line, indented one level deeper than the tag.
fn start_tag<'a>(
    element: &'a Element,
    depth: usize,
    options: &SerializeOptions,
    is_empty: bool,
) -> BytesStart<'a> {
    let tag = element.category().tag();
    let mut attributes: Vec<_> = element.attributes().iter().collect();
    attributes.sort_by(|a, b| attribute_sort_key(&a.0).cmp(&attribute_sort_key(&b.0)));
    let rendered: Vec<String> = attributes
        .iter()
        .map(|(name, value)| format!("{name}=\"{}\"", escape(value.as_str())))
        .collect();

    let closing = if is_empty { 3 } else { 1 };
    let width = depth * options.indent
        + 1
        + tag.len()
        + rendered.iter().map(|a| a.len() + 1).sum::<usize>()
        + closing;

    let mut content = String::from(tag);
    if rendered.len() > 1 && width > options.max_line_width {
        let pad = " ".repeat((depth + 1) * options.indent);
        for attribute in &rendered {
            content.push('\n');
            content.push_str(&pad);
            content.push_str(attribute);
        }
    } else {
        for attribute in &rendered {
            content.push(' ');
            content.push_str(attribute);
        }
    }
    BytesStart::from_content(content, tag.len())
}
