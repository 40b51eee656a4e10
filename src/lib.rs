//! Tabular / markup / document conversion engine
//!
//! Converts delimited tabular text into annotated markup trees, maps markup
//! trees to and from key-value documents, infers structural schemas,
//! validates markup against them and answers path queries.

pub mod cli;
pub mod conversion;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod query;
pub mod schema;
pub mod tree;
pub mod validation;

// Re-export commonly used types
pub use conversion::{
    csv_to_tree, document_to_tree, generate_schema, tree_to_document, ConversionConfig,
    ConversionEngine, ConversionOutput,
};
pub use error::{
    ConversionError, ConversionErrorKind, ConversionResult, EncodingError, ParseError, QueryError,
};
pub use formatter::MarkupFormatter;
pub use parser::{parse_markup, InputSource};
pub use query::{run_path_query, run_xquery, QueryItem, QueryResult, ScalarValue};
pub use schema::SchemaDescription;
pub use tree::{DocumentValue, HierarchicalNode};
pub use validation::{validate_against_schema, validate_well_formed, ValidationReport};

/// Convert tabular text to markup with default configuration
pub fn convert_csv(text: &str) -> Result<String, ConversionError> {
    let config = ConversionConfig::default();
    convert_csv_with_config(text, &config)
}

/// Convert tabular text to markup with custom configuration
pub fn convert_csv_with_config(
    text: &str,
    config: &ConversionConfig,
) -> Result<String, ConversionError> {
    let result = ConversionEngine::new(config.clone()).csv_to_markup(text, None, None)?;
    Ok(result.content)
}
