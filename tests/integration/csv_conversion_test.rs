//! Integration tests for tabular text conversion
//!
//! Tests cover:
//! - The annotated markup layout (root, metadata, data)
//! - Null cells, type annotations and ambiguity flags
//! - Delimiters, policies and malformed input

use chrono::{TimeZone, Utc};
use xmlconv::conversion::{ColumnTypePolicy, ConversionConfig, ConversionEngine, DelimiterType};
use xmlconv::{parse_markup, run_path_query, HierarchicalNode, QueryResult, ScalarValue};

const PRODUCTS: &str = "Código,Preço\nA1,10.50\n";

fn engine(config: ConversionConfig) -> ConversionEngine {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    ConversionEngine::new(config.with_generated_at(at))
}

fn rows(root: &HierarchicalNode) -> Vec<&HierarchicalNode> {
    root.child("data").unwrap().children.iter().collect()
}

fn columns(root: &HierarchicalNode) -> Vec<&HierarchicalNode> {
    root.child("metadata")
        .unwrap()
        .child("columns")
        .unwrap()
        .children
        .iter()
        .collect()
}

#[cfg(test)]
mod csv_conversion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_product_table_layout() {
        let output = engine(ConversionConfig::default())
            .csv_to_markup(PRODUCTS, Some("produtos"), Some("item"))
            .unwrap();

        assert!(output.content.starts_with("<produtos "));
        assert!(output.content.contains("records=\"1\""));
        assert!(output.content.contains("generated=\"2024-03-01T09:30:00Z\""));
        assert!(output.content.contains("<item id=\"0\">"));
        assert!(output.content.contains("<codigo>A1</codigo>"));
        assert!(output
            .content
            .contains("<preco data_type=\"decimal\">10.50</preco>"));
        assert_eq!(output.metadata.records, 1);

        let tree = parse_markup(&output.content).unwrap();
        assert_eq!(
            run_path_query(&tree, "count(//item)").unwrap(),
            QueryResult::Scalar(ScalarValue::Number(1.0))
        );
    }

    #[test]
    fn test_column_metadata() {
        let tree = engine(ConversionConfig::default())
            .csv_to_tree(PRODUCTS, Some("produtos"), Some("item"))
            .unwrap();
        let columns = columns(&tree);

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].attribute("name"), Some("Código"));
        assert_eq!(columns[0].attribute("normalized"), Some("codigo"));
        assert_eq!(columns[0].attribute("type"), Some("string"));
        assert_eq!(columns[1].attribute("normalized"), Some("preco"));
        assert_eq!(columns[1].attribute("type"), Some("decimal"));
        assert_eq!(columns[1].attribute("null_count"), Some("0"));
    }

    #[test]
    fn test_null_cells_are_flagged() {
        let csv = "name,score\nana,7\nbob,NA\ncid,\n";
        let tree = engine(ConversionConfig::default())
            .csv_to_tree(csv, None, None)
            .unwrap();
        assert_eq!(tree.tag, "dataset");

        let rows = rows(&tree);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.tag == "record"));

        let present = &rows[0].children[1];
        assert_eq!(present.text(), Some("7"));
        assert_eq!(present.attribute("data_type"), Some("integer"));
        assert_eq!(present.attribute("null"), None);

        for row in &rows[1..] {
            let cell = &row.children[1];
            assert_eq!(cell.attribute("null"), Some("true"));
            assert_eq!(cell.text(), None);
        }
        assert_eq!(columns(&tree)[1].attribute("null_count"), Some("2"));
    }

    #[test]
    fn test_custom_null_markers_replace_defaults() {
        let config = ConversionConfig::default().with_null_markers(vec!["-".to_string()]);
        let tree = engine(config)
            .csv_to_tree("v\n-\nNA\n", None, None)
            .unwrap();
        let rows = rows(&tree);
        assert_eq!(rows[0].children[0].attribute("null"), Some("true"));
        assert_eq!(rows[1].children[0].text(), Some("NA"));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let config = ConversionConfig::default().with_delimiter(DelimiterType::Semicolon);
        let tree = engine(config)
            .csv_to_tree("a;b\n1;2,5\n", None, None)
            .unwrap();
        let row = rows(&tree)[0];
        assert_eq!(row.children.len(), 2);
        assert_eq!(row.children[1].text(), Some("2,5"));
    }

    #[test]
    fn test_ambiguous_column_under_each_policy() {
        let csv = "v\n1\n2\nx\n";

        let widening = engine(ConversionConfig::default())
            .csv_to_tree(csv, None, None)
            .unwrap();
        let column = columns(&widening)[0];
        assert_eq!(column.attribute("type"), Some("string"));
        assert_eq!(column.attribute("ambiguous"), Some("true"));
        assert_eq!(column.attribute("observed"), Some("integer:2,string:1"));
        assert_eq!(rows(&widening)[0].children[0].attribute("data_type"), None);

        let majority = engine(ConversionConfig::default().with_type_policy(ColumnTypePolicy::Majority))
            .csv_to_tree(csv, None, None)
            .unwrap();
        assert_eq!(columns(&majority)[0].attribute("type"), Some("integer"));
        assert_eq!(
            rows(&majority)[2].children[0].attribute("data_type"),
            Some("integer")
        );
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let csv = "note\n\"a < b & c\"\n";
        let output = engine(ConversionConfig::default())
            .csv_to_markup(csv, None, None)
            .unwrap();
        assert!(output.content.contains("<note>a &lt; b &amp; c</note>"));

        let tree = parse_markup(&output.content).unwrap();
        assert_eq!(rows(&tree)[0].children[0].text(), Some("a < b & c"));
    }

    #[test]
    fn test_header_only_table() {
        let output = engine(ConversionConfig::default())
            .csv_to_markup("a,b\n", None, None)
            .unwrap();
        assert_eq!(output.metadata.records, 0);
        assert!(output.content.contains("records=\"0\""));
        assert!(output.content.contains("<data/>"));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = engine(ConversionConfig::default())
            .csv_to_markup("a,b\n1,2\n3\n", None, None)
            .unwrap_err();
        assert_eq!(err.kind_name(), "ParseError");
    }

    #[test]
    fn test_convert_csv_helpers() {
        let markup = xmlconv::convert_csv("x\n1\n").unwrap();
        assert!(markup.starts_with("<dataset "));

        let compact =
            xmlconv::convert_csv_with_config("x\n1\n", &ConversionConfig::compact()).unwrap();
        assert!(!compact.contains('\n'));
    }
}
