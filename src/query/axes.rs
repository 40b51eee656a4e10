//! Node addressing and axis navigation over a [`HierarchicalNode`] tree
//!
//! The tree is flattened into an arena numbered in pre-order. Entry 0 is the
//! document node, entry 1 the root element. Attributes and text are not
//! arena entries of their own: a [`NodeRef`] addresses them through a
//! sub-index of their owning element, so ordering `NodeRef`s gives document
//! order.

use crate::query::parser::{Axis, NodeTest};
use crate::tree::HierarchicalNode;

/// Address of one node: an element (or the document), one of its
/// attributes, or its text.
///
/// `sub` is 0 for the element itself, `1..=n` for its attributes and `n + 1`
/// for its text node, where `n` is the attribute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    pub id: usize,
    pub sub: usize,
}

impl NodeRef {
    pub const DOCUMENT: NodeRef = NodeRef { id: 0, sub: 0 };

    fn element(id: usize) -> Self {
        Self { id, sub: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
}

struct Entry<'a> {
    element: Option<&'a HierarchicalNode>,
    parent: Option<usize>,
    children: Vec<usize>,
    /// One past the last descendant id
    end: usize,
}

/// Flattened, read-only view of a tree for evaluation
pub struct QueryDocument<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> QueryDocument<'a> {
    pub fn new(root: &'a HierarchicalNode) -> Self {
        let mut entries = vec![Entry {
            element: None,
            parent: None,
            children: vec![1],
            end: 0,
        }];
        flatten(root, 0, &mut entries);
        entries[0].end = entries.len();
        Self { entries }
    }

    pub fn root_element(&self) -> NodeRef {
        NodeRef::element(1)
    }

    fn entry(&self, node: NodeRef) -> Option<&Entry<'a>> {
        self.entries.get(node.id)
    }

    /// Element owning `node`, or the element itself
    pub fn element(&self, node: NodeRef) -> Option<&'a HierarchicalNode> {
        self.entry(node).and_then(|e| e.element)
    }

    pub fn kind(&self, node: NodeRef) -> NodeKind {
        match self.element(node) {
            None => NodeKind::Document,
            Some(_) if node.sub == 0 => NodeKind::Element,
            Some(element) if node.sub <= element.attributes.len() => NodeKind::Attribute,
            Some(_) => NodeKind::Text,
        }
    }

    fn attribute(&self, node: NodeRef) -> Option<(&'a str, &'a str)> {
        let element = self.element(node)?;
        if node.sub == 0 {
            return None;
        }
        element.attributes.iter().nth(node.sub - 1)
    }

    /// Qualified name: tag for elements, attribute name, empty otherwise
    pub fn name(&self, node: NodeRef) -> &'a str {
        match self.kind(node) {
            NodeKind::Element => self.element(node).map_or("", |e| e.tag.as_str()),
            NodeKind::Attribute => self.attribute(node).map_or("", |(name, _)| name),
            NodeKind::Document | NodeKind::Text => "",
        }
    }

    pub fn local_name(&self, node: NodeRef) -> &'a str {
        let name = self.name(node);
        name.rsplit_once(':').map_or(name, |(_, local)| local)
    }

    pub fn string_value(&self, node: NodeRef) -> String {
        match self.kind(node) {
            NodeKind::Document => self
                .element(self.root_element())
                .map(HierarchicalNode::string_value)
                .unwrap_or_default(),
            NodeKind::Element => self
                .element(node)
                .map(HierarchicalNode::string_value)
                .unwrap_or_default(),
            NodeKind::Attribute => self
                .attribute(node)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default(),
            NodeKind::Text => self
                .element(node)
                .and_then(HierarchicalNode::text)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        if node.sub > 0 {
            return Some(NodeRef::element(node.id));
        }
        self.entry(node)?.parent.map(NodeRef::element)
    }

    /// Text node followed by child elements
    pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        let Some(entry) = self.entry(node) else {
            return Vec::new();
        };
        if node.sub != 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(entry.children.len() + 1);
        if let Some(element) = entry.element {
            if element.text().is_some() {
                out.push(NodeRef {
                    id: node.id,
                    sub: element.attributes.len() + 1,
                });
            }
        }
        out.extend(entry.children.iter().map(|&id| NodeRef::element(id)));
        out
    }

    pub fn attributes(&self, node: NodeRef) -> Vec<NodeRef> {
        match self.element(node) {
            Some(element) if node.sub == 0 => (1..=element.attributes.len())
                .map(|sub| NodeRef { id: node.id, sub })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// All descendants in document order, excluding `node`
    pub fn descendants(&self, node: NodeRef) -> Vec<NodeRef> {
        let Some(entry) = self.entry(node) else {
            return Vec::new();
        };
        if node.sub != 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for id in node.id..entry.end {
            if id != node.id {
                out.push(NodeRef::element(id));
            }
            if let Some(element) = self.entries[id].element {
                if element.text().is_some() {
                    out.push(NodeRef {
                        id,
                        sub: element.attributes.len() + 1,
                    });
                }
            }
        }
        out
    }
}

fn flatten<'a>(node: &'a HierarchicalNode, parent: usize, entries: &mut Vec<Entry<'a>>) -> usize {
    let id = entries.len();
    entries.push(Entry {
        element: Some(node),
        parent: Some(parent),
        children: Vec::with_capacity(node.children.len()),
        end: id + 1,
    });
    for child in &node.children {
        let child_id = flatten(child, id, entries);
        entries[id].children.push(child_id);
    }
    entries[id].end = entries.len();
    id
}

/// Nodes reached from `node` along `axis`, in document order
pub fn navigate(doc: &QueryDocument<'_>, node: NodeRef, axis: Axis) -> Vec<NodeRef> {
    match axis {
        Axis::Child => doc.children(node),
        Axis::Descendant => doc.descendants(node),
        Axis::DescendantOrSelf => {
            let mut out = vec![node];
            out.extend(doc.descendants(node));
            out
        }
        Axis::SelfAxis => vec![node],
        Axis::Parent => doc.parent(node).into_iter().collect(),
        Axis::Attribute => doc.attributes(node),
    }
}

/// Whether `node` passes `test` on `axis`.
///
/// Name tests and `*` select the principal node type of the axis:
/// attributes on the attribute axis, elements everywhere else.
pub fn matches_node_test(
    doc: &QueryDocument<'_>,
    node: NodeRef,
    axis: Axis,
    test: &NodeTest,
) -> bool {
    let kind = doc.kind(node);
    let principal = if axis == Axis::Attribute {
        NodeKind::Attribute
    } else {
        NodeKind::Element
    };
    match test {
        NodeTest::Node => true,
        NodeTest::Text => kind == NodeKind::Text,
        NodeTest::Wildcard => kind == principal,
        NodeTest::Name(name) => {
            kind == principal && match name.strip_suffix(":*") {
                Some(prefix) => doc
                    .name(node)
                    .split_once(':')
                    .is_some_and(|(p, _)| p == prefix),
                None => doc.name(node) == name,
            }
        }
    }
}
