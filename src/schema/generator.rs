//! Schema inference from a markup tree
//!
//! One walk over the tree records, for every distinct tag path, how often the
//! element occurs under its parent, the merged type of its text and the
//! merged types of its attributes. Rendering turns those shapes into XSD text.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::conversion::inference::PrimitiveType;
use crate::formatter::escape_attribute;
use crate::schema::types::{XsdType, XS_NAMESPACE};
use crate::tree::HierarchicalNode;

/// Observed facts about one attribute of an element path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeShape {
    pub name: String,
    pub xsd_type: XsdType,
    /// Present on every observed instance
    pub required: bool,
    #[serde(skip)]
    seen: usize,
}

/// Observed occurrence bounds of a child tag under its parent path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildOccurrence {
    pub tag: String,
    pub min_occurs: usize,
    pub max_occurs: usize,
    #[serde(skip)]
    seen_in: usize,
}

/// Observed shape of every element sharing one tag path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementShape {
    /// `/root/child/...`
    pub path: String,
    pub tag: String,
    pub instances: usize,
    /// Merged type of the text content, `None` when no instance had text.
    /// Widened to string when some leaf instance is empty.
    pub text_type: Option<XsdType>,
    pub attributes: Vec<AttributeShape>,
    /// Child tags in first-seen order
    pub children: Vec<ChildOccurrence>,
    /// Every instance lists its child tags in one consistent order
    pub ordered: bool,
    /// Instances with text, or flagged `null="true"`
    #[serde(skip)]
    with_text: usize,
}

impl ElementShape {
    fn new(path: &str, tag: &str) -> Self {
        Self {
            path: path.to_string(),
            tag: tag.to_string(),
            instances: 0,
            text_type: None,
            attributes: Vec::new(),
            children: Vec::new(),
            ordered: true,
            with_text: 0,
        }
    }

    fn child_path(&self, tag: &str) -> String {
        format!("{}/{}", self.path, tag)
    }
}

/// Structural description of a document: element shapes keyed by tag path
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescription {
    pub target_namespace: String,
    pub root_tag: String,
    /// Shapes in pre-order of first appearance; the root is first
    pub elements: Vec<ElementShape>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Column types declared in a tabular `metadata/columns` block, keyed
    /// by the column's element tag
    #[serde(skip)]
    column_types: HashMap<String, PrimitiveType>,
}

/// Builds a [`SchemaDescription`] from a tree
pub struct SchemaGenerator;

impl SchemaGenerator {
    pub fn generate(root: &HierarchicalNode, target_namespace: &str) -> SchemaDescription {
        let mut description = SchemaDescription {
            target_namespace: target_namespace.to_string(),
            root_tag: root.tag.clone(),
            elements: Vec::new(),
            index: HashMap::new(),
            column_types: declared_column_types(root),
        };
        description.observe(root, format!("/{}", root.tag));
        description.finish();

        debug!(
            root = %root.tag,
            paths = description.elements.len(),
            tabular = description.is_tabular(),
            "schema inferred"
        );
        description
    }
}

impl SchemaDescription {
    /// Shape for a tag path such as `/dataset/data/record`
    pub fn element(&self, path: &str) -> Option<&ElementShape> {
        self.index.get(path).map(|&i| &self.elements[i])
    }

    pub fn root(&self) -> Option<&ElementShape> {
        self.elements.first()
    }

    /// Whether the document has the tabular layout: a root holding
    /// `metadata` then `data`, with flat rows of one tag
    pub fn is_tabular(&self) -> bool {
        self.tabular_rows().is_some()
    }

    fn shape_index(&mut self, path: &str, tag: &str) -> usize {
        if let Some(&i) = self.index.get(path) {
            return i;
        }
        self.elements.push(ElementShape::new(path, tag));
        let i = self.elements.len() - 1;
        self.index.insert(path.to_string(), i);
        i
    }

    fn observe(&mut self, node: &HierarchicalNode, path: String) {
        let i = self.shape_index(&path, &node.tag);
        let shape = &mut self.elements[i];
        shape.instances += 1;

        for (name, value) in node.attributes.iter() {
            if name.starts_with("xmlns") {
                continue;
            }
            let observed = XsdType::of_value(value);
            match shape.attributes.iter_mut().find(|a| a.name == name) {
                Some(attribute) => {
                    attribute.xsd_type = attribute.xsd_type.merge(observed);
                    attribute.seen += 1;
                }
                None => shape.attributes.push(AttributeShape {
                    name: name.to_string(),
                    xsd_type: observed,
                    required: false,
                    seen: 1,
                }),
            }
        }

        if let Some(text) = node.text() {
            let observed = XsdType::of_value(text);
            shape.text_type = Some(shape.text_type.map_or(observed, |t| t.merge(observed)));
        }
        if node.text().is_some() || node.attribute("null") == Some("true") {
            shape.with_text += 1;
        }

        // Count children per tag; a tag split into several runs breaks ordering
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut previous: Option<&str> = None;
        for child in &node.children {
            let tag = child.tag.as_str();
            match counts.iter_mut().find(|(t, _)| *t == tag) {
                Some(entry) => {
                    if previous != Some(tag) {
                        shape.ordered = false;
                    }
                    entry.1 += 1;
                }
                None => counts.push((tag, 1)),
            }
            previous = Some(tag);
        }

        let mut last_position = None;
        for (tag, count) in counts {
            let position = match shape.children.iter().position(|c| c.tag == tag) {
                Some(p) => {
                    let occurrence = &mut shape.children[p];
                    occurrence.min_occurs = occurrence.min_occurs.min(count);
                    occurrence.max_occurs = occurrence.max_occurs.max(count);
                    occurrence.seen_in += 1;
                    p
                }
                None => {
                    shape.children.push(ChildOccurrence {
                        tag: tag.to_string(),
                        min_occurs: count,
                        max_occurs: count,
                        seen_in: 1,
                    });
                    shape.children.len() - 1
                }
            };
            if matches!(last_position, Some(last) if position < last) {
                shape.ordered = false;
            }
            last_position = Some(position);
        }

        for child in &node.children {
            self.observe(child, format!("{}/{}", path, child.tag));
        }
    }

    fn finish(&mut self) {
        for shape in &mut self.elements {
            let instances = shape.instances;
            if shape.text_type.is_some() && shape.with_text < instances {
                shape.text_type = Some(XsdType::String);
            }
            for attribute in &mut shape.attributes {
                attribute.required = attribute.seen == instances;
            }
            for child in &mut shape.children {
                if child.seen_in < instances {
                    child.min_occurs = 0;
                }
            }
        }
    }

    /// Row shape of a tabular document (`None` when data has no rows)
    /// wrapped in `Some` when the layout is tabular
    fn tabular_rows(&self) -> Option<Option<&ElementShape>> {
        let root = self.root()?;
        let tags: Vec<&str> = root.children.iter().map(|c| c.tag.as_str()).collect();
        if tags != ["metadata", "data"] || !root.ordered {
            return None;
        }

        let data = self.element(&root.child_path("data"))?;
        match data.children.as_slice() {
            [] => Some(None),
            [row] => {
                let row = self.element(&data.child_path(&row.tag))?;
                let flat = row.children.iter().all(|c| {
                    self.element(&row.child_path(&c.tag))
                        .is_some_and(|column| column.children.is_empty())
                });
                flat.then_some(Some(row))
            }
            _ => None,
        }
    }

    /// Render as XSD text
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(2048);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let namespace = escape_attribute(&self.target_namespace);
        out.push_str(&format!(
            "<xs:schema xmlns:xs=\"{}\" targetNamespace=\"{}\" xmlns=\"{}\" elementFormDefault=\"qualified\">\n",
            XS_NAMESPACE, namespace, namespace
        ));

        if let Some(root) = self.root() {
            match self.tabular_rows() {
                Some(row) => self.render_tabular(root, row, &mut out),
                None => self.render_element(root, None, 1, &mut out),
            }
        }

        out.push_str("</xs:schema>\n");
        out
    }

    fn render_element(
        &self,
        shape: &ElementShape,
        occurs: Option<&ChildOccurrence>,
        depth: usize,
        out: &mut String,
    ) {
        let bounds = occurs.map(occurs_attributes).unwrap_or_default();
        let text_type = shape.text_type.unwrap_or(XsdType::String);

        if shape.children.is_empty() && shape.attributes.is_empty() {
            line(
                out,
                depth,
                &format!(
                    "<xs:element name=\"{}\" type=\"{}\"{}/>",
                    shape.tag,
                    text_type.xsd_name(),
                    bounds
                ),
            );
            return;
        }

        line(out, depth, &format!("<xs:element name=\"{}\"{}>", shape.tag, bounds));

        if shape.children.is_empty() {
            match shape.text_type {
                Some(t) => {
                    line(out, depth + 1, "<xs:complexType>");
                    line(out, depth + 2, "<xs:simpleContent>");
                    line(out, depth + 3, &format!("<xs:extension base=\"{}\">", t.xsd_name()));
                    render_attributes(&shape.attributes, depth + 4, out);
                    line(out, depth + 3, "</xs:extension>");
                    line(out, depth + 2, "</xs:simpleContent>");
                    line(out, depth + 1, "</xs:complexType>");
                }
                None => {
                    line(out, depth + 1, "<xs:complexType>");
                    render_attributes(&shape.attributes, depth + 2, out);
                    line(out, depth + 1, "</xs:complexType>");
                }
            }
        } else {
            let mixed = if shape.text_type.is_some() { " mixed=\"true\"" } else { "" };
            line(out, depth + 1, &format!("<xs:complexType{}>", mixed));
            let (open, close) = if shape.ordered {
                ("<xs:sequence>", "</xs:sequence>")
            } else {
                ("<xs:choice minOccurs=\"0\" maxOccurs=\"unbounded\">", "</xs:choice>")
            };
            line(out, depth + 2, open);
            for occurrence in &shape.children {
                if let Some(child) = self.element(&shape.child_path(&occurrence.tag)) {
                    let bounds = shape.ordered.then_some(occurrence);
                    self.render_element(child, bounds, depth + 3, out);
                }
            }
            line(out, depth + 2, close);
            render_attributes(&shape.attributes, depth + 2, out);
            line(out, depth + 1, "</xs:complexType>");
        }

        line(out, depth, "</xs:element>");
    }

    fn render_tabular(&self, root: &ElementShape, row: Option<&ElementShape>, out: &mut String) {
        line(out, 1, &format!("<xs:element name=\"{}\">", root.tag));
        line(out, 2, "<xs:complexType>");
        line(out, 3, "<xs:sequence>");

        if let Some(metadata) = self.element(&root.child_path("metadata")) {
            let optional = ChildOccurrence {
                tag: metadata.tag.clone(),
                min_occurs: 0,
                max_occurs: 1,
                seen_in: 0,
            };
            self.render_element(metadata, Some(&optional), 4, out);
        }

        line(out, 4, "<xs:element name=\"data\">");
        line(out, 5, "<xs:complexType>");
        line(out, 6, "<xs:sequence>");
        match row {
            Some(row) => {
                line(
                    out,
                    7,
                    &format!("<xs:element name=\"{}\" maxOccurs=\"unbounded\">", row.tag),
                );
                line(out, 8, "<xs:complexType>");
                line(out, 9, "<xs:sequence>");
                line(out, 10, ANY_LAX);
                line(out, 9, "</xs:sequence>");
                render_attributes(&row.attributes, 9, out);
                line(out, 9, "<xs:anyAttribute processContents=\"lax\"/>");
                line(out, 8, "</xs:complexType>");
                line(out, 7, "</xs:element>");
            }
            None => line(out, 7, ANY_LAX),
        }
        line(out, 6, "</xs:sequence>");
        line(out, 5, "</xs:complexType>");
        line(out, 4, "</xs:element>");

        line(out, 3, "</xs:sequence>");
        render_attributes(&root.attributes, 3, out);
        line(out, 2, "</xs:complexType>");
        line(out, 1, "</xs:element>");

        // Columns are global so the open row content can match them
        let Some(row) = row else { return };
        for occurrence in &row.children {
            if occurrence.tag == root.tag {
                continue;
            }
            let observed = self
                .element(&row.child_path(&occurrence.tag))
                .and_then(|c| c.text_type);
            let column_type = self.column_type(&occurrence.tag, observed);
            line(out, 1, &format!("<xs:element name=\"{}\">", occurrence.tag));
            line(out, 2, "<xs:complexType>");
            line(out, 3, "<xs:simpleContent>");
            line(
                out,
                4,
                &format!("<xs:extension base=\"{}\">", column_type.xsd_name()),
            );
            line(out, 5, "<xs:attribute name=\"data_type\" type=\"xs:string\"/>");
            line(out, 5, "<xs:attribute name=\"null\" type=\"xs:boolean\"/>");
            line(out, 4, "</xs:extension>");
            line(out, 3, "</xs:simpleContent>");
            line(out, 2, "</xs:complexType>");
            line(out, 1, "</xs:element>");
        }
    }
}

impl SchemaDescription {
    /// Schema type of a tabular column: the declared metadata type when
    /// every observed cell fits it, otherwise the observed type
    fn column_type(&self, tag: &str, observed: Option<XsdType>) -> XsdType {
        let declared = self.column_types.get(tag).map(|&t| XsdType::from(t));
        match (declared, observed) {
            (Some(XsdType::Date), Some(XsdType::DateTime)) => XsdType::DateTime,
            (Some(declared), Some(observed)) if observed.merge(declared) == declared => declared,
            (Some(declared), None) => declared,
            (_, observed) => observed.unwrap_or(XsdType::String),
        }
    }
}

fn declared_column_types(root: &HierarchicalNode) -> HashMap<String, PrimitiveType> {
    let Some(columns) = root.child("metadata").and_then(|m| m.child("columns")) else {
        return HashMap::new();
    };
    columns
        .children
        .iter()
        .filter(|c| c.tag == "column")
        .filter_map(|c| {
            let tag = c.attribute("normalized").or_else(|| c.attribute("name"))?;
            let declared = PrimitiveType::from_str(c.attribute("type")?)?;
            Some((tag.to_string(), declared))
        })
        .collect()
}

const ANY_LAX: &str = "<xs:any minOccurs=\"0\" maxOccurs=\"unbounded\" processContents=\"lax\"/>";

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn occurs_attributes(occurrence: &ChildOccurrence) -> String {
    let mut bounds = String::new();
    if occurrence.min_occurs == 0 {
        bounds.push_str(" minOccurs=\"0\"");
    }
    if occurrence.max_occurs > 1 {
        bounds.push_str(" maxOccurs=\"unbounded\"");
    }
    bounds
}

fn render_attributes(attributes: &[AttributeShape], depth: usize, out: &mut String) {
    for attribute in attributes {
        let required = if attribute.required { " use=\"required\"" } else { "" };
        line(
            out,
            depth,
            &format!(
                "<xs:attribute name=\"{}\" type=\"{}\"{}/>",
                attribute.name,
                attribute.xsd_type.xsd_name(),
                required
            ),
        );
    }
}
