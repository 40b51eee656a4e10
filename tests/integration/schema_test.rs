//! Integration tests for schema inference and validation
//!
//! Tests cover:
//! - Schemas generated from converted tables and nested documents
//! - Validating a document against the schema inferred from it
//! - Reporting violations in modified documents
//! - Column declarations typed from the column metadata

use chrono::{TimeZone, Utc};
use xmlconv::conversion::inference::PrimitiveType;
use xmlconv::conversion::{generate_schema, ConversionConfig, ConversionEngine};
use xmlconv::schema::XsdType;
use xmlconv::{parse_markup, validate_against_schema, MarkupFormatter};

const ORDERS: &str = r#"<orders region="eu">
  <order id="1" paid="true">
    <placed>2024-02-10</placed>
    <line sku="a">1.5</line>
    <line sku="b">2</line>
  </order>
  <order id="2" paid="false">
    <placed>2024-02-11</placed>
    <line sku="c">7</line>
    <note>gift</note>
  </order>
</orders>"#;

fn products_markup() -> String {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    ConversionEngine::new(ConversionConfig::default().with_generated_at(at))
        .csv_to_markup(
            "Código,Preço\nA1,10.50\nB2,\nC3,4\n",
            Some("produtos"),
            Some("item"),
        )
        .unwrap()
        .content
}

/// `(normalized name, declared type)` of every column in the metadata block
fn declared_columns(markup: &str) -> Vec<(String, String)> {
    let tree = parse_markup(markup).unwrap();
    let columns = tree.child("metadata").unwrap().child("columns").unwrap();
    columns
        .children
        .iter()
        .map(|c| {
            (
                c.attribute("normalized").unwrap().to_string(),
                c.attribute("type").unwrap().to_string(),
            )
        })
        .collect()
}

/// Base type of the global declaration for a column element
fn declared_base(xsd: &str, column: &str) -> String {
    let schema = parse_markup(xsd).unwrap();
    let element = schema
        .children
        .iter()
        .find(|e| e.tag == "xs:element" && e.attribute("name") == Some(column))
        .unwrap();
    element
        .child("xs:complexType")
        .and_then(|t| t.child("xs:simpleContent"))
        .and_then(|c| c.child("xs:extension"))
        .and_then(|e| e.attribute("base"))
        .unwrap()
        .to_string()
}

#[cfg(test)]
mod schema_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tabular_schema_shape() {
        let tree = parse_markup(&products_markup()).unwrap();
        let description = generate_schema(&tree, "urn:produtos").unwrap();
        assert!(description.is_tabular());
        assert_eq!(
            description.element("/produtos/data/item/preco").unwrap().text_type,
            Some(XsdType::Decimal)
        );

        let xsd = description.render();
        assert!(xsd.contains("targetNamespace=\"urn:produtos\""));
        assert!(xsd.contains("<xs:element name=\"item\" maxOccurs=\"unbounded\">"));
        assert!(xsd.contains("<xs:element name=\"preco\">"));
        assert!(xsd.contains("<xs:extension base=\"xs:decimal\">"));
        assert!(xsd.contains("<xs:attribute name=\"null\" type=\"xs:boolean\"/>"));
    }

    #[test]
    fn test_tabular_document_validates_against_its_schema() {
        let markup = products_markup();
        let xsd = ConversionEngine::default()
            .markup_to_schema(&markup)
            .unwrap()
            .content;

        let report = validate_against_schema(&markup, &xsd);
        assert!(report.valid, "{:?}", report.errors);

        let broken = markup.replace(">10.50<", ">cheap<");
        let report = validate_against_schema(&broken, &xsd);
        assert!(!report.valid);
    }

    #[test]
    fn test_nested_schema_occurrences_and_types() {
        let tree = parse_markup(ORDERS).unwrap();
        let description = generate_schema(&tree, "urn:orders").unwrap();
        assert!(!description.is_tabular());

        let order = description.element("/orders/order").unwrap();
        assert_eq!(order.instances, 2);
        let bounds: Vec<(&str, usize, usize)> = order
            .children
            .iter()
            .map(|c| (c.tag.as_str(), c.min_occurs, c.max_occurs))
            .collect();
        assert_eq!(
            bounds,
            vec![("placed", 1, 1), ("line", 1, 2), ("note", 0, 1)]
        );

        assert_eq!(
            description.element("/orders/order/placed").unwrap().text_type,
            Some(XsdType::Date)
        );
        assert_eq!(
            description.element("/orders/order/line").unwrap().text_type,
            Some(XsdType::Decimal)
        );
        let paid = order.attributes.iter().find(|a| a.name == "paid").unwrap();
        assert_eq!(paid.xsd_type, XsdType::Boolean);
        assert!(paid.required);
    }

    #[test]
    fn test_nested_document_validates_and_mutations_fail() {
        let xsd = generate_schema(&parse_markup(ORDERS).unwrap(), "urn:orders")
            .unwrap()
            .render();

        let report = validate_against_schema(ORDERS, &xsd);
        assert!(report.valid, "{:?}", report.errors);

        let wrong_type = ORDERS.replace("<placed>2024-02-10</placed>", "<placed>soon</placed>");
        let report = validate_against_schema(&wrong_type, &xsd);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("xs:date")), "{:?}", report.errors);

        let missing_attribute = ORDERS.replace(r#"<order id="2" paid="false">"#, r#"<order id="2">"#);
        let report = validate_against_schema(&missing_attribute, &xsd);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("missing required attribute 'paid'")));
    }

    #[test]
    fn test_rendered_schema_is_markup() {
        let xsd = generate_schema(&parse_markup(ORDERS).unwrap(), "urn:orders")
            .unwrap()
            .render();
        let schema = parse_markup(&xsd).unwrap();
        assert_eq!(schema.tag, "xs:schema");

        let compact = MarkupFormatter::compact().format(&schema).unwrap();
        assert!(compact.starts_with("<xs:schema "));
    }

    #[test]
    fn test_empty_namespace_is_rejected() {
        let tree = parse_markup("<a/>").unwrap();
        let err = generate_schema(&tree, "").unwrap_err();
        assert_eq!(err.kind_name(), "ConfigurationError");
    }

    #[test]
    fn test_column_declarations_follow_column_metadata() {
        let csv = "qty,price,when,flag,label,blank\n\
                   1,1.5,2024-01-02,true,a,\n\
                   2,3,2024-02-03,false,b,\n";
        let engine = ConversionEngine::default();
        let markup = engine.csv_to_markup(csv, None, None).unwrap().content;
        let xsd = engine.markup_to_schema(&markup).unwrap().content;

        let columns = declared_columns(&markup);
        let declared: Vec<&str> = columns.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(declared, vec!["integer", "decimal", "date", "boolean", "string", "null"]);

        for (column, declared) in &columns {
            let expected = XsdType::from(PrimitiveType::from_str(declared).unwrap());
            assert_eq!(declared_base(&xsd, column), expected.xsd_name(), "column {}", column);
        }

        let report = validate_against_schema(&markup, &xsd);
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_loose_spellings_keep_metadata_and_schema_in_step() {
        let csv = "flag,when\nyes,01/02/2024\nno,03/04/2024\n";
        let engine = ConversionEngine::default();
        let markup = engine.csv_to_markup(csv, None, None).unwrap().content;
        let xsd = engine.markup_to_schema(&markup).unwrap().content;

        for (column, declared) in declared_columns(&markup) {
            assert_eq!(declared, "string");
            assert_eq!(declared_base(&xsd, &column), "xs:string");
        }
        assert!(validate_against_schema(&markup, &xsd).valid);
    }
}
