//! Markup and JSON output formatting

pub mod escape;
pub mod json;

pub use escape::{escape_attribute, escape_text, is_xml_char};
pub use json::{format_document, to_pretty_json};

use crate::conversion::config::ConversionConfig;
use crate::conversion::names::is_valid_name;
use crate::error::{ConversionResult, EncodingError};
use crate::tree::HierarchicalNode;

/// Declaration written when `include_declaration` is set
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Serializes [`HierarchicalNode`] trees as markup text
pub struct MarkupFormatter {
    indent: String,
    pretty: bool,
    include_declaration: bool,
}

impl MarkupFormatter {
    /// Create a new formatter with configuration
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            indent: " ".repeat(config.indent_size as usize),
            pretty: config.pretty,
            include_declaration: config.include_declaration,
        }
    }

    /// Single-line formatter without a declaration
    pub fn compact() -> Self {
        Self {
            indent: String::new(),
            pretty: false,
            include_declaration: false,
        }
    }

    /// Format a tree. Every tag and attribute name is checked before writing.
    pub fn format(&self, node: &HierarchicalNode) -> ConversionResult<String> {
        let mut out = String::with_capacity(256);
        if self.include_declaration {
            out.push_str(XML_DECLARATION);
            out.push('\n');
        }
        self.write_node(node, 0, &mut out)?;
        if self.pretty && !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }

    fn write_node(
        &self,
        node: &HierarchicalNode,
        depth: usize,
        out: &mut String,
    ) -> ConversionResult<()> {
        check_name(&node.tag)?;

        if self.pretty {
            for _ in 0..depth {
                out.push_str(&self.indent);
            }
        }

        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in node.attributes.iter() {
            check_name(name)?;
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        if node.children.is_empty() {
            match node.text() {
                Some(text) => {
                    out.push('>');
                    out.push_str(&escape_text(text));
                    self.write_close(&node.tag, out);
                }
                None => out.push_str("/>"),
            }
            self.newline(out);
            return Ok(());
        }

        out.push('>');
        // Mixed content: text goes right after the start tag
        if let Some(text) = node.text() {
            out.push_str(&escape_text(text));
        }
        self.newline(out);

        for child in &node.children {
            self.write_node(child, depth + 1, out)?;
        }

        if self.pretty {
            for _ in 0..depth {
                out.push_str(&self.indent);
            }
        }
        self.write_close(&node.tag, out);
        self.newline(out);
        Ok(())
    }

    fn write_close(&self, tag: &str, out: &mut String) {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn newline(&self, out: &mut String) {
        if self.pretty {
            out.push('\n');
        }
    }
}

fn check_name(name: &str) -> ConversionResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(EncodingError::invalid_name(name).into())
    }
}

/// Format a tree as markup with the given configuration
pub fn format_markup(node: &HierarchicalNode, config: &ConversionConfig) -> ConversionResult<String> {
    MarkupFormatter::new(config).format(node)
}
