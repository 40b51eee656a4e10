//! Unit tests for column type inference
//!
//! Tests cover:
//! - Per-cell classification order
//! - Loose date and boolean spellings staying strings
//! - Column policies applied to whole tables
//! - Null handling and ambiguity reporting

use xmlconv::conversion::inference::{infer_cell, vote_column_type, ColumnTypePolicy, PrimitiveType};
use xmlconv::conversion::{ConversionConfig, TabularConverter};
use xmlconv::parser::read_tabular;

fn analyze(text: &str, policy: ColumnTypePolicy) -> Vec<(String, PrimitiveType)> {
    let config = ConversionConfig::default().with_type_policy(policy);
    let table = read_tabular(text, &config).unwrap();
    TabularConverter::new(&config)
        .analyze_columns(&table)
        .into_iter()
        .map(|c| (c.normalized_name, c.inferred_type))
        .collect()
}

#[cfg(test)]
mod inference_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use PrimitiveType::*;

    #[test]
    fn test_cells_are_classified_in_priority_order() {
        assert_eq!(infer_cell(" 12 "), Integer);
        assert_eq!(infer_cell("+3"), Integer);
        assert_eq!(infer_cell("0.25"), Decimal);
        assert_eq!(infer_cell("2024-12-31"), Date);
        assert_eq!(infer_cell("2024-12-31T23:59:59+02:00"), Date);
        assert_eq!(infer_cell("false"), Boolean);
        assert_eq!(infer_cell("12 apples"), String);
    }

    #[test]
    fn test_loose_spellings_stay_strings() {
        assert_eq!(infer_cell("2024/12/31"), String);
        assert_eq!(infer_cell("01/02/2024"), String);
        assert_eq!(infer_cell("2024-12-31 23:59:59"), String);
        assert_eq!(infer_cell("False"), String);
        assert_eq!(infer_cell("yes"), String);
        assert_eq!(infer_cell("2.5E2"), String);
    }

    #[test]
    fn test_widening_table() {
        let csv = "id,price,when,flag,label\n1,2,2024-01-01,true,a\n2,2.5,2024-01-02,false,3\n";
        assert_eq!(
            analyze(csv, ColumnTypePolicy::Widening),
            vec![
                ("id".to_string(), Integer),
                ("price".to_string(), Decimal),
                ("when".to_string(), Date),
                ("flag".to_string(), Boolean),
                ("label".to_string(), String),
            ]
        );
    }

    #[test]
    fn test_majority_table() {
        let csv = "v\n1\n2\nx\n";
        assert_eq!(analyze(csv, ColumnTypePolicy::Majority), vec![("v".to_string(), Integer)]);
        assert_eq!(analyze(csv, ColumnTypePolicy::Widening), vec![("v".to_string(), String)]);
    }

    #[test]
    fn test_nulls_do_not_vote() {
        let csv = "v,w\nNA,\n7,\nnull,\n";
        let columns = analyze(csv, ColumnTypePolicy::Widening);
        assert_eq!(columns[0].1, Integer);
        assert_eq!(columns[1].1, Null);
    }

    #[test]
    fn test_ambiguity_is_metadata_not_error() {
        let config = ConversionConfig::default();
        let table = read_tabular("v\n1\nx\n2\n", &config).unwrap();
        let columns = TabularConverter::new(&config).analyze_columns(&table);
        let ambiguity = columns[0].ambiguity.as_ref().unwrap();
        assert_eq!(ambiguity.summary(), "integer:2,string:1");
        assert_eq!(columns[0].non_null_count, 3);
        assert_eq!(columns[0].null_count, 0);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(ColumnTypePolicy::from_str("majority").unwrap(), ColumnTypePolicy::Majority);
        assert!(ColumnTypePolicy::from_str("loudest").is_err());
        assert_eq!(vote_column_type(ColumnTypePolicy::FirstNonNull, &[]), Null);
    }
}
