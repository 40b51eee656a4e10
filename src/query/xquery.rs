//! XQuery spellings run through the path engine
//!
//! Only the identity FLWOR form `for $x in PATH return $x` is rewritten, to
//! `PATH`. Any other expression is handed to the path engine unchanged, so
//! path expressions that are also valid XQuery keep working.

use serde_json::json;
use tracing::debug;

use crate::error::ConversionResult;
use crate::query::{run_path_query, QueryResult};
use crate::tree::HierarchicalNode;

/// An XQuery expression with the path expression it was run as
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub original: String,
    pub path: String,
    pub result: QueryResult,
}

impl TranslatedQuery {
    /// Path query report plus `original_xquery` and `converted_xpath`
    pub fn to_report(&self) -> serde_json::Value {
        let mut report = self.result.to_report(&self.path);
        report["original_xquery"] = json!(self.original);
        report["converted_xpath"] = json!(self.path);
        report
    }
}

/// Path expression an XQuery expression is evaluated as
pub fn translate_xquery(expression: &str) -> String {
    match identity_flwor(expression.trim()) {
        Some(path) => path.to_string(),
        None => expression.to_string(),
    }
}

/// `for $x in PATH return $x` gives `PATH`
fn identity_flwor(expression: &str) -> Option<&str> {
    let rest = expression.strip_prefix("for")?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    let rest = rest.strip_prefix('$')?;

    let name_len = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let (name, rest) = rest.split_at(name_len);

    let rest = rest.trim_start().strip_prefix("in")?;
    let rest = rest.strip_prefix(char::is_whitespace)?;
    let (path, returned) = rest.rsplit_once("return")?;
    let returned = returned.trim().strip_prefix('$')?;

    let path = path.trim();
    (returned == name && !path.is_empty()).then_some(path)
}

/// Run an XQuery expression against a tree through the path engine
pub fn run_xquery(root: &HierarchicalNode, expression: &str) -> ConversionResult<TranslatedQuery> {
    let path = translate_xquery(expression);
    let result = run_path_query(root, &path)?;
    debug!(expression, path = %path, results = result.len(), "xquery evaluated");
    Ok(TranslatedQuery {
        original: expression.to_string(),
        path,
        result,
    })
}
