//! Tree <-> key-value document codec
//!
//! Encoding rules:
//! - a leaf with no attributes becomes a bare scalar (its text, or "")
//! - anything else becomes a mapping with `@attributes`, `#text` and one key
//!   per child tag; two or more same-tag siblings become a sequence
//!
//! Decoding is the inverse, with the document's own shape deciding where
//! sequences appear.

use tracing::{debug, warn};

use crate::conversion::config::ConversionConfig;
use crate::conversion::names::{is_valid_name, normalize_name};
use crate::error::{ConversionResult, EncodingError};
use crate::tree::document::{ATTRIBUTES_KEY, TEXT_KEY};
use crate::tree::{DocumentValue, HierarchicalNode};

/// Options for [`TreeCodec`]
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    /// Fail on interleaved same-tag siblings instead of grouping them
    pub strict: bool,
    /// Tag given to the members of a top-level sequence
    pub sequence_item_tag: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict: false,
            sequence_item_tag: "item".to_string(),
        }
    }
}

impl CodecConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}

impl From<&ConversionConfig> for CodecConfig {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            strict: config.strict_round_trip,
            sequence_item_tag: config.sequence_item_tag.clone(),
        }
    }
}

/// A document encoded from a tree
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTree {
    pub document: DocumentValue,
    /// Siblings moved next to an earlier same-tag run in lenient mode
    pub regrouped: usize,
}

/// Converts between [`HierarchicalNode`] and [`DocumentValue`]
#[derive(Debug, Clone, Default)]
pub struct TreeCodec {
    config: CodecConfig,
}

impl TreeCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Encode one element (not wrapped in its tag)
    pub fn encode(&self, node: &HierarchicalNode) -> ConversionResult<DocumentValue> {
        self.encode_counting(node, &mut 0)
    }

    fn encode_counting(
        &self,
        node: &HierarchicalNode,
        regrouped: &mut usize,
    ) -> ConversionResult<DocumentValue> {
        if node.children.is_empty() && node.attributes.is_empty() {
            return Ok(DocumentValue::scalar(node.text().unwrap_or("")));
        }

        let mut entries = Vec::with_capacity(node.children.len() + 2);

        if !node.attributes.is_empty() {
            let attributes = node
                .attributes
                .iter()
                .map(|(name, value)| (name.to_string(), DocumentValue::scalar(value)))
                .collect();
            entries.push((ATTRIBUTES_KEY.to_string(), DocumentValue::Mapping(attributes)));
        }

        if let Some(text) = node.text() {
            entries.push((TEXT_KEY.to_string(), DocumentValue::scalar(text)));
        }

        for (tag, members) in self.group_children(node, regrouped)? {
            let value = if members.len() == 1 {
                self.encode_counting(members[0], regrouped)?
            } else {
                DocumentValue::Sequence(
                    members
                        .into_iter()
                        .map(|member| self.encode_counting(member, regrouped))
                        .collect::<ConversionResult<Vec<_>>>()?,
                )
            };
            entries.push((tag.to_string(), value));
        }

        Ok(DocumentValue::Mapping(entries))
    }

    /// Group children by tag, in order of first occurrence
    fn group_children<'a>(
        &self,
        node: &'a HierarchicalNode,
        regrouped: &mut usize,
    ) -> ConversionResult<Vec<(&'a str, Vec<&'a HierarchicalNode>)>> {
        let mut groups: Vec<(&str, Vec<&HierarchicalNode>)> = Vec::new();
        let mut previous: Option<&str> = None;

        for child in &node.children {
            let tag = child.tag.as_str();
            if tag == ATTRIBUTES_KEY || tag == TEXT_KEY {
                return Err(EncodingError::reserved_key(tag, "cannot be used as an element tag").into());
            }

            match groups.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, members)) => {
                    if previous != Some(tag) {
                        if self.config.strict {
                            return Err(EncodingError::interleaved(&node.tag, tag).into());
                        }
                        warn!(
                            parent = %node.tag,
                            tag = %tag,
                            "interleaved siblings grouped at first occurrence"
                        );
                        *regrouped += 1;
                    }
                    members.push(child);
                }
                None => groups.push((tag, vec![child])),
            }
            previous = Some(tag);
        }

        Ok(groups)
    }

    /// Decode a value into an element tagged `tag`
    pub fn decode(&self, value: &DocumentValue, tag: &str) -> ConversionResult<HierarchicalNode> {
        let tag = element_name(tag);
        match value {
            DocumentValue::Scalar(text) => Ok(HierarchicalNode::leaf(tag, text.as_str())),
            DocumentValue::Sequence(items) => {
                let mut node = HierarchicalNode::new(tag);
                for item in items {
                    node.push_child(self.decode(item, &self.config.sequence_item_tag)?);
                }
                Ok(node)
            }
            DocumentValue::Mapping(entries) => self.decode_mapping(tag, entries),
        }
    }

    fn decode_mapping(
        &self,
        tag: String,
        entries: &[(String, DocumentValue)],
    ) -> ConversionResult<HierarchicalNode> {
        let mut node = HierarchicalNode::new(tag);

        for (key, value) in entries {
            match key.as_str() {
                ATTRIBUTES_KEY => {
                    let DocumentValue::Mapping(attributes) = value else {
                        return Err(EncodingError::reserved_key(key, "must be a mapping").into());
                    };
                    for (name, attribute) in attributes {
                        let Some(text) = attribute.as_scalar() else {
                            return Err(EncodingError::reserved_key(
                                key,
                                "must map attribute names to scalar values",
                            )
                            .into());
                        };
                        node.attributes.set(element_name(name), text);
                    }
                }
                TEXT_KEY => {
                    let Some(text) = value.as_scalar() else {
                        return Err(EncodingError::reserved_key(key, "must be a scalar").into());
                    };
                    node.set_text(text);
                }
                _ => match value {
                    DocumentValue::Sequence(items) => {
                        for item in items {
                            node.push_child(self.decode(item, key)?);
                        }
                    }
                    other => node.push_child(self.decode(other, key)?),
                },
            }
        }

        Ok(node)
    }

    /// Wrap an encoded root as `{root.tag: encode(root)}`
    pub fn tree_to_document(&self, root: &HierarchicalNode) -> ConversionResult<DocumentValue> {
        Ok(self.encode_tree(root)?.document)
    }

    /// [`TreeCodec::tree_to_document`], also counting regrouped siblings
    pub fn encode_tree(&self, root: &HierarchicalNode) -> ConversionResult<EncodedTree> {
        let mut regrouped = 0;
        let body = self.encode_counting(root, &mut regrouped)?;
        debug!(root = %root.tag, regrouped, "tree encoded");
        Ok(EncodedTree {
            document: DocumentValue::Mapping(vec![(root.tag.clone(), body)]),
            regrouped,
        })
    }

    /// Decode a whole document.
    ///
    /// A mapping with exactly one ordinary key whose value is not a sequence
    /// is unwrapped and that key becomes the root tag. Anything else is
    /// decoded under `root_tag`.
    pub fn document_to_tree(
        &self,
        doc: &DocumentValue,
        root_tag: &str,
    ) -> ConversionResult<HierarchicalNode> {
        let root = match doc {
            DocumentValue::Mapping(entries) if entries.len() == 1 => {
                let (key, value) = &entries[0];
                let reserved = key == ATTRIBUTES_KEY || key == TEXT_KEY;
                if reserved || matches!(value, DocumentValue::Sequence(_)) {
                    self.decode(doc, root_tag)?
                } else {
                    self.decode(value, key)?
                }
            }
            _ => self.decode(doc, root_tag)?,
        };
        debug!(root = %root.tag, children = root.children.len(), "document decoded");
        Ok(root)
    }
}

/// Keys that are not valid element names go through the name normalizer
fn element_name(key: &str) -> String {
    if is_valid_name(key) {
        key.to_string()
    } else {
        normalize_name(key)
    }
}
