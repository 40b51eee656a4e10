//! Integration tests for markup and document text round trips
//!
//! Tests cover:
//! - Markup to JSON to markup through the engine
//! - JSON to markup to JSON
//! - Lossy and strict handling of interleaved siblings
//! - Nesting depth limit on markup input

use serde_json::{json, Value};
use xmlconv::conversion::{ConversionConfig, ConversionEngine};
use xmlconv::{parse_markup, run_path_query, HierarchicalNode};

const LIBRARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<library city="Lisboa">
  <book isbn="978-0" lang="pt">
    <title>Os Lusíadas</title>
    <author>Camões</author>
    <year>1572</year>
  </book>
  <book isbn="978-1">
    <title>Mensagem &amp; outros</title>
    <author>Pessoa</author>
    <year>1934</year>
  </book>
  <shelf/>
</library>"#;

fn markup_round_trip(engine: &ConversionEngine, markup: &str) -> HierarchicalNode {
    let json = engine.markup_to_json(markup).unwrap();
    let back = engine.json_to_markup(&json.content, None).unwrap();
    parse_markup(&back.content).unwrap()
}

#[cfg(test)]
mod round_trip_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markup_survives_json_round_trip() {
        let engine = ConversionEngine::default();
        let original = parse_markup(LIBRARY).unwrap();
        assert_eq!(markup_round_trip(&engine, LIBRARY), original);
    }

    #[test]
    fn test_json_shape() {
        let output = ConversionEngine::default().markup_to_json(LIBRARY).unwrap();
        let value: Value = serde_json::from_str(&output.content).unwrap();

        assert_eq!(value["library"]["@attributes"], json!({"city": "Lisboa"}));
        assert_eq!(value["library"]["book"].as_array().unwrap().len(), 2);
        assert_eq!(value["library"]["book"][0]["title"], "Os Lusíadas");
        assert_eq!(value["library"]["book"][1]["title"], "Mensagem & outros");
        assert_eq!(value["library"]["book"][1]["@attributes"], json!({"isbn": "978-1"}));
        assert_eq!(value["library"]["shelf"], "");
        assert_eq!(output.metadata.records, 3);
    }

    #[test]
    fn test_json_survives_markup_round_trip() {
        let source = json!({
            "catalog": {
                "@attributes": {"version": "2"},
                "entry": [
                    {"name": "a", "tags": {"tag": ["x", "y"]}},
                    {"name": "b", "tags": {"tag": ["z", "w"]}}
                ],
                "owner": "ops"
            }
        });
        let engine = ConversionEngine::default();
        let markup = engine.json_to_markup(&source.to_string(), None).unwrap();
        let back = engine.markup_to_json(&markup.content).unwrap();
        let value: Value = serde_json::from_str(&back.content).unwrap();
        assert_eq!(value, source);
    }

    #[test]
    fn test_queries_agree_after_round_trip() {
        let engine = ConversionEngine::default();
        let original = parse_markup(LIBRARY).unwrap();
        let restored = markup_round_trip(&engine, LIBRARY);

        for expression in ["count(//book)", "//book[year > 1600]/title", "//@isbn"] {
            assert_eq!(
                run_path_query(&restored, expression).unwrap(),
                run_path_query(&original, expression).unwrap(),
                "{}",
                expression
            );
        }
    }

    #[test]
    fn test_top_level_array_uses_root_and_item_tags() {
        let engine = ConversionEngine::new(ConversionConfig::compact());
        let markup = engine
            .json_to_markup(r#"[{"n": "1"}, {"n": "2"}]"#, Some("list"))
            .unwrap();
        assert_eq!(
            markup.content,
            "<list><item><n>1</n></item><item><n>2</n></item></list>"
        );
    }

    #[test]
    fn test_interleaved_siblings() {
        let markup = "<r><a>1</a><b>2</b><a>3</a></r>";

        let lenient = ConversionEngine::default().markup_to_json(markup).unwrap();
        let value: Value = serde_json::from_str(&lenient.content).unwrap();
        assert_eq!(value, json!({"r": {"a": ["1", "3"], "b": "2"}}));
        assert_eq!(lenient.metadata.regrouped_siblings, 1);

        let err = ConversionEngine::new(ConversionConfig::strict())
            .markup_to_json(markup)
            .unwrap_err();
        assert_eq!(err.kind_name(), "EncodingError");
    }

    #[test]
    fn test_order_preserving_input_reports_no_regrouping() {
        let output = ConversionEngine::default().markup_to_json(LIBRARY).unwrap();
        assert_eq!(output.metadata.regrouped_siblings, 0);
    }

    #[test]
    fn test_runaway_nesting_fails_cleanly() {
        let depth = 100_000;
        let markup = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let engine = ConversionEngine::default();

        let err = engine.markup_to_json(&markup).unwrap_err();
        assert_eq!(err.kind_name(), "ParseError");
        assert!(engine.markup_to_schema(&markup).is_err());
        assert!(engine.query_markup(&markup, "count(//a)").is_err());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ConversionEngine::default()
            .json_to_markup("{\"a\": ", None)
            .unwrap_err();
        assert_eq!(err.kind_name(), "ParseError");
    }
}
