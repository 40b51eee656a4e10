//! In-memory data model shared by every engine component
//!
//! A [`HierarchicalNode`] is one element of a markup tree: a tag, an
//! attribute set, optional text and ordered children. Children are owned by
//! their parent, so a document is always a tree with exactly one root.

pub mod document;

pub use document::DocumentValue;

/// Attribute set of an element.
///
/// Names are unique. Insertion order is kept for stable output but is not
/// significant: two sets are equal when they hold the same name/value pairs.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing an existing value with the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl Eq for Attributes {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

/// One element of a markup tree
#[derive(Debug, Clone)]
pub struct HierarchicalNode {
    pub tag: String,
    pub attributes: Attributes,
    /// Character content. Empty text is stored as `None`.
    pub text: Option<String>,
    pub children: Vec<HierarchicalNode>,
}

impl HierarchicalNode {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf element holding text
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).with_text(text)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: HierarchicalNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
    }

    pub fn push_child(&mut self, child: HierarchicalNode) {
        self.children.push(child);
    }

    /// Text content, `None` when absent or empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// First direct child with the given tag
    pub fn child(&self, tag: &str) -> Option<&HierarchicalNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All direct children with the given tag, in document order
    pub fn children_named<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a HierarchicalNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Pre-order walk over this node and all of its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated text of this node and its descendants in document order
    pub fn string_value(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &HierarchicalNode, out: &mut String) {
    if let Some(text) = node.text() {
        out.push_str(text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

impl PartialEq for HierarchicalNode {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.attributes == other.attributes
            && self.text() == other.text()
            && self.children == other.children
    }
}

impl Eq for HierarchicalNode {}

/// Pre-order iterator returned by [`HierarchicalNode::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a HierarchicalNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a HierarchicalNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
