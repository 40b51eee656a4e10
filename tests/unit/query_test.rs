//! Unit tests for path queries
//!
//! Tests cover:
//! - Location paths, axes and abbreviations
//! - Predicates, functions and comparisons
//! - Result reports and error handling

use serde_json::json;
use xmlconv::query::{run_path_query, QueryItem, QueryResult, ScalarValue};
use xmlconv::{parse_markup, HierarchicalNode};

const INVENTORY: &str = r#"<inventory warehouse="north">
  <product sku="A1" category="tools">
    <name>Hammer</name>
    <price>12.50</price>
    <stock>4</stock>
  </product>
  <product sku="B2" category="garden">
    <name>Rake</name>
    <price>20</price>
    <stock>0</stock>
  </product>
  <product sku="C3" category="tools">
    <name>Saw</name>
    <price>31</price>
    <stock>9</stock>
  </product>
</inventory>"#;

fn inventory() -> HierarchicalNode {
    parse_markup(INVENTORY).unwrap()
}

fn tags(result: &QueryResult) -> Vec<String> {
    result
        .items()
        .iter()
        .map(|item| match item {
            QueryItem::Element(node) => node.tag.clone(),
            QueryItem::Value(value) => value.clone(),
        })
        .collect()
}

fn scalar(expression: &str) -> ScalarValue {
    match run_path_query(&inventory(), expression).unwrap() {
        QueryResult::Scalar(value) => value,
        other => panic!("expected a scalar for {}, got {:?}", expression, other),
    }
}

#[cfg(test)]
mod query_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_and_absolute_paths_agree() {
        let tree = inventory();
        let relative = run_path_query(&tree, "product/name").unwrap();
        let absolute = run_path_query(&tree, "/inventory/product/name").unwrap();
        assert_eq!(relative, absolute);
        assert_eq!(relative.len(), 3);
    }

    #[test]
    fn test_attribute_and_text_selection() {
        let tree = inventory();
        let skus = run_path_query(&tree, "//product/@sku").unwrap();
        assert_eq!(tags(&skus), vec!["A1", "B2", "C3"]);

        let names = run_path_query(&tree, "//name/text()").unwrap();
        assert_eq!(tags(&names), vec!["Hammer", "Rake", "Saw"]);

        let all = run_path_query(&tree, "@*").unwrap();
        assert_eq!(tags(&all), vec!["north"]);
    }

    #[test]
    fn test_predicates_select_by_value_and_position() {
        let tree = inventory();
        let cheap = run_path_query(&tree, "product[price < 25]/name/text()").unwrap();
        assert_eq!(tags(&cheap), vec!["Hammer", "Rake"]);

        let tools = run_path_query(&tree, "product[@category='tools'][2]/@sku").unwrap();
        assert_eq!(tags(&tools), vec!["C3"]);

        let last = run_path_query(&tree, "product[last()]/@sku").unwrap();
        assert_eq!(tags(&last), vec!["C3"]);

        let out = run_path_query(&tree, "product[stock = 0 and not(price > 30)]/@sku").unwrap();
        assert_eq!(tags(&out), vec!["B2"]);
    }

    #[test]
    fn test_axes() {
        let tree = inventory();
        let parents = run_path_query(&tree, "//price/parent::product/@sku").unwrap();
        assert_eq!(parents.len(), 3);

        let itself = run_path_query(&tree, "self::inventory").unwrap();
        assert_eq!(tags(&itself), vec!["inventory"]);

        let descendants = run_path_query(&tree, "descendant::stock").unwrap();
        assert_eq!(descendants.len(), 3);

        let up = run_path_query(&tree, "product/name/../../@warehouse").unwrap();
        assert_eq!(tags(&up), vec!["north"]);
    }

    #[test]
    fn test_scalar_functions() {
        assert_eq!(scalar("count(//product)"), ScalarValue::Number(3.0));
        assert_eq!(scalar("sum(//stock)"), ScalarValue::Number(13.0));
        assert_eq!(scalar("sum(//price)"), ScalarValue::Number(63.5));
        assert_eq!(scalar("string(product[2]/name)"), ScalarValue::Text("Rake".into()));
        assert_eq!(scalar("concat(product[1]/@sku, '-', product[3]/@sku)"), ScalarValue::Text("A1-C3".into()));
        assert_eq!(scalar("contains(//product[1]/name, 'amm')"), ScalarValue::Boolean(true));
        assert_eq!(scalar("starts-with(name(), 'inv')"), ScalarValue::Boolean(true));
        assert_eq!(scalar("round(12.5) + floor(1.9) + ceiling(0.1)"), ScalarValue::Number(15.0));
        assert_eq!(scalar("string-length(normalize-space('  a  b '))"), ScalarValue::Number(3.0));
        assert_eq!(scalar("boolean(//missing)"), ScalarValue::Boolean(false));
    }

    #[test]
    fn test_union_is_in_document_order() {
        let tree = inventory();
        let result = run_path_query(&tree, "//stock | //name").unwrap();
        assert_eq!(
            tags(&result),
            vec!["name", "stock", "name", "stock", "name", "stock"]
        );
    }

    #[test]
    fn test_element_report() {
        let tree = parse_markup(r#"<r><p id="7">x &amp; y</p></r>"#).unwrap();
        let report = run_path_query(&tree, "p").unwrap().to_report("p");
        assert_eq!(
            report,
            json!({
                "xpath": "p",
                "results_count": 1,
                "results": [{
                    "tag": "p",
                    "text": "x & y",
                    "attributes": {"id": "7"},
                    "xml": "<p id=\"7\">x &amp; y</p>"
                }]
            })
        );
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let result = run_path_query(&inventory(), "//product[price > 1000]").unwrap();
        assert!(result.is_empty());
        assert_eq!(
            result.to_report("q"),
            json!({"xpath": "q", "results_count": 0, "results": []})
        );
    }

    #[test]
    fn test_invalid_expressions() {
        let tree = inventory();
        for expression in [
            "",
            "product[",
            "product]",
            "following-sibling::product",
            "comment()",
            "$x",
            "reverse(product)",
            "count()",
            "count(1)",
            "product @sku",
        ] {
            let err = run_path_query(&tree, expression).unwrap_err();
            assert_eq!(err.kind_name(), "QueryError", "expression {:?}", expression);
        }
    }
}
