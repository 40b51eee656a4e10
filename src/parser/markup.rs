//! Markup (XML) parsing into [`HierarchicalNode`] trees
//!
//! Whitespace-only text between elements is layout and is dropped. Text of a
//! leaf element is kept verbatim; text mixed with child elements is trimmed.
//! Comments, processing instructions and the XML declaration are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{InputFormat, ParseError, ParseResult};
use crate::tree::HierarchicalNode;

/// An element that has been opened but not yet closed
struct OpenElement {
    node: HierarchicalNode,
    text: String,
}

/// Deepest element nesting [`parse_markup`] accepts
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Parse markup text into a tree. Fails on the first well-formedness error.
pub fn parse_markup(text: &str) -> ParseResult<HierarchicalNode> {
    parse_markup_with_depth(text, DEFAULT_MAX_DEPTH)
}

/// [`parse_markup`] with an explicit limit on element nesting
pub fn parse_markup_with_depth(text: &str, max_depth: usize) -> ParseResult<HierarchicalNode> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.check_end_names(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<HierarchicalNode> = None;

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| markup_error(e.to_string(), reader.buffer_position()))?;

        match event {
            Event::Start(start) => {
                ensure_single_root(&root, offset)?;
                ensure_depth(&stack, max_depth, offset)?;
                stack.push(OpenElement {
                    node: open_node(&start, offset)?,
                    text: String::new(),
                });
            }
            Event::Empty(start) => {
                ensure_single_root(&root, offset)?;
                ensure_depth(&stack, max_depth, offset)?;
                let node = open_node(&start, offset)?;
                close_node(node, &mut stack, &mut root);
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| markup_error("unexpected closing tag".to_string(), offset))?;
                let node = finish_text(open);
                close_node(node, &mut stack, &mut root);
            }
            Event::Text(raw) => {
                let content = raw
                    .unescape()
                    .map_err(|e| markup_error(e.to_string(), offset))?;
                push_text(&mut stack, &content, offset)?;
            }
            Event::CData(raw) => {
                let content = String::from_utf8(raw.into_inner().into_owned())
                    .map_err(|e| markup_error(e.to_string(), offset))?;
                push_text(&mut stack, &content, offset)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(markup_error(
            format!("element <{}> is never closed", open.node.tag),
            text.len(),
        ));
    }

    let root = root.ok_or_else(|| markup_error("document has no root element".to_string(), 0))?;
    debug!(root = %root.tag, "markup parsed");
    Ok(root)
}

fn markup_error(message: String, offset: usize) -> ParseError {
    ParseError::new(InputFormat::Markup, message).with_offset(Some(offset))
}

fn ensure_depth(stack: &[OpenElement], max_depth: usize, offset: usize) -> ParseResult<()> {
    if stack.len() >= max_depth {
        return Err(markup_error(
            format!("elements nested deeper than {} levels", max_depth),
            offset,
        ));
    }
    Ok(())
}

fn ensure_single_root(root: &Option<HierarchicalNode>, offset: usize) -> ParseResult<()> {
    match root {
        Some(existing) => Err(markup_error(
            format!(
                "second root element after <{}>; a document has exactly one root",
                existing.tag
            ),
            offset,
        )),
        None => Ok(()),
    }
}

fn open_node(start: &BytesStart<'_>, offset: usize) -> ParseResult<HierarchicalNode> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| markup_error(e.to_string(), offset))?
        .to_string();
    let mut node = HierarchicalNode::new(tag);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| markup_error(e.to_string(), offset))?;
        let name = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| markup_error(e.to_string(), offset))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| markup_error(e.to_string(), offset))?;
        node.attributes.set(name, value.into_owned());
    }

    Ok(node)
}

fn push_text(stack: &mut [OpenElement], content: &str, offset: usize) -> ParseResult<()> {
    match stack.last_mut() {
        Some(open) => {
            open.text.push_str(content);
            Ok(())
        }
        None if content.trim().is_empty() => Ok(()),
        None => Err(markup_error(
            "text content outside the root element".to_string(),
            offset,
        )),
    }
}

fn finish_text(open: OpenElement) -> HierarchicalNode {
    let OpenElement { mut node, text } = open;
    if node.children.is_empty() {
        node.set_text(text);
    } else {
        node.set_text(text.trim());
    }
    node
}

fn close_node(
    node: HierarchicalNode,
    stack: &mut [OpenElement],
    root: &mut Option<HierarchicalNode>,
) {
    match stack.last_mut() {
        Some(parent) => parent.node.push_child(node),
        None => *root = Some(node),
    }
}
