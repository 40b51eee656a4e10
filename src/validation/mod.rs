//! Markup validation: well-formedness and schema checks

pub mod schema_check;

pub use schema_check::SchemaValidator;

use serde::Serialize;
use tracing::debug;

use crate::error::{ConversionResult, InputFormat, ParseError, ParseResult};
use crate::parser::parse_markup;
use crate::tree::HierarchicalNode;

/// Outcome of validating a document against a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// A failed report with a single error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::from_errors(vec![message.into()])
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Check that markup is well-formed.
///
/// Returns `Ok(true)` for well-formed input and the parse error otherwise.
pub fn validate_well_formed(markup: &str) -> ConversionResult<bool> {
    parse_markup(markup)?;
    Ok(true)
}

/// Parse schema text; failures are reported as schema parse errors
pub fn parse_schema(schema_text: &str) -> ParseResult<HierarchicalNode> {
    parse_markup(schema_text).map_err(|e| ParseError {
        format: InputFormat::Schema,
        ..e
    })
}

fn parse_failure(error: &ParseError) -> ValidationReport {
    ValidationReport::invalid(format!("{} parse error: {}", error.format.label(), error))
}

/// Validate markup against schema text.
///
/// Never fails: malformed markup or schema text produce an invalid report
/// carrying the parse error.
pub fn validate_against_schema(markup: &str, schema_text: &str) -> ValidationReport {
    let document = match parse_markup(markup) {
        Ok(document) => document,
        Err(e) => return parse_failure(&e),
    };
    let schema = match parse_schema(schema_text) {
        Ok(schema) => schema,
        Err(e) => return parse_failure(&e),
    };
    let validator = match SchemaValidator::new(&schema) {
        Ok(validator) => validator,
        Err(message) => return ValidationReport::invalid(message),
    };

    let report = ValidationReport::from_errors(validator.validate(&document));
    debug!(
        root = %document.tag,
        valid = report.valid,
        errors = report.error_count(),
        "schema validation finished"
    );
    report
}
