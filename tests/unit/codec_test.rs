//! Unit tests for the tree <-> document codec
//!
//! Tests cover:
//! - Encoding of attributes, text and repeated children
//! - Decoding of document text into markup trees
//! - Strict and lenient handling of interleaved siblings

use assert_matches::assert_matches;
use serde_json::json;
use xmlconv::conversion::{CodecConfig, TreeCodec};
use xmlconv::error::{ConversionError, EncodingError};
use xmlconv::parser::{parse_document, parse_markup};
use xmlconv::tree::DocumentValue;
use xmlconv::{document_to_tree, tree_to_document, HierarchicalNode};

fn encode_markup(markup: &str) -> serde_json::Value {
    let tree = parse_markup(markup).unwrap();
    tree_to_document(&tree).unwrap().to_json()
}

#[cfg(test)]
mod codec_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_shape_for_typical_markup() {
        let doc = encode_markup(
            r#"<library name="city">
                 <book id="1"><title>Dune</title></book>
                 <book id="2"><title>Emma</title></book>
                 <owner>Ana</owner>
               </library>"#,
        );
        assert_eq!(
            doc,
            json!({
                "library": {
                    "@attributes": {"name": "city"},
                    "book": [
                        {"@attributes": {"id": "1"}, "title": "Dune"},
                        {"@attributes": {"id": "2"}, "title": "Emma"}
                    ],
                    "owner": "Ana"
                }
            })
        );
    }

    #[test]
    fn test_key_order_follows_first_occurrence() {
        let doc = encode_markup("<r><z>1</z><a>2</a><m>3</m></r>");
        let keys: Vec<&String> = doc["r"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_json_scalars_become_text() {
        let doc = parse_document(r#"{"order": {"qty": 3, "paid": true, "note": null}}"#).unwrap();
        let tree = document_to_tree(&doc, "root").unwrap();
        assert_eq!(tree.tag, "order");
        assert_eq!(tree.child("qty").unwrap().text(), Some("3"));
        assert_eq!(tree.child("paid").unwrap().text(), Some("true"));
        assert_eq!(tree.child("note").unwrap().text(), None);
    }

    #[test]
    fn test_multiple_top_level_keys_use_root_tag() {
        let doc = parse_document(r#"{"a": "1", "b": "2"}"#).unwrap();
        let tree = document_to_tree(&doc, "envelope").unwrap();
        assert_eq!(tree.tag, "envelope");
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn test_nested_sequences_repeat_the_key() {
        let doc = parse_document(r#"{"cart": {"line": [{"sku": "A"}, {"sku": "B"}]}}"#).unwrap();
        let tree = document_to_tree(&doc, "root").unwrap();
        let skus: Vec<&str> = tree
            .children_named("line")
            .filter_map(|line| line.child("sku").and_then(|s| s.text()))
            .collect();
        assert_eq!(skus, vec!["A", "B"]);
    }

    #[test]
    fn test_strict_mode_refuses_reordering() {
        let tree = parse_markup("<r><a>1</a><b>2</b><a>3</a></r>").unwrap();
        let err = TreeCodec::new(CodecConfig::strict())
            .tree_to_document(&tree)
            .unwrap_err();
        assert_matches!(
            err,
            ConversionError::EncodingError(EncodingError::InterleavedSiblings { ref tag, .. }) if tag == "a"
        );

        let lenient = tree_to_document(&tree).unwrap();
        assert_eq!(
            lenient.to_json(),
            json!({"r": {"a": ["1", "3"], "b": "2"}})
        );
    }

    #[test]
    fn test_reserved_key_as_tag_is_rejected() {
        let tree = HierarchicalNode::new("r").with_child(HierarchicalNode::leaf("#text", "x"));
        assert_matches!(
            tree_to_document(&tree),
            Err(ConversionError::EncodingError(EncodingError::ReservedKey { .. }))
        );
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let tree = parse_markup(
            r#"<catalog version="2"><item id="1">a &amp; b</item><item>c</item><empty/></catalog>"#,
        )
        .unwrap();
        let doc = tree_to_document(&tree).unwrap();
        assert_matches!(doc, DocumentValue::Mapping(_));
        assert_eq!(document_to_tree(&doc, "root").unwrap(), tree);
    }
}
