//! Path queries over a markup tree
//!
//! Supports the location-path core of XPath 1.0: the `child`, `descendant`,
//! `descendant-or-self`, `self`, `parent` and `attribute` axes with their
//! abbreviations, predicates, unions, comparisons, arithmetic and a core
//! function library. Expressions are evaluated with the root element as
//! context node. [`xquery`] accepts a few XQuery spellings on top.

pub mod axes;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;
pub mod xquery;

use serde::{Serialize, Serializer};
use serde_json::json;
use tracing::debug;

use crate::error::{ConversionResult, QueryError};
use crate::formatter::MarkupFormatter;
use crate::tree::HierarchicalNode;

use self::axes::{NodeKind, NodeRef, QueryDocument};
use self::eval::Evaluator;
use self::parser::Expr;
use self::value::{format_number, Value};

pub use self::xquery::{run_xquery, translate_xquery, TranslatedQuery};

/// Single value produced by a scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl ScalarValue {
    /// JSON form: integral numbers as integers, NaN and infinities as strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScalarValue::Number(n) if !n.is_finite() => json!(format_number(*n)),
            ScalarValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => json!(*n as i64),
            ScalarValue::Number(n) => json!(n),
            ScalarValue::Boolean(b) => json!(b),
            ScalarValue::Text(s) => json!(s),
        }
    }
}

/// Element matched by a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedNode {
    pub tag: String,
    pub text: Option<String>,
    #[serde(serialize_with = "serialize_pairs")]
    pub attributes: Vec<(String, String)>,
    /// Compact serialization of the element and its subtree
    #[serde(rename = "xml")]
    pub markup: String,
}

impl MatchedNode {
    fn from_element(node: &HierarchicalNode) -> ConversionResult<Self> {
        Ok(Self {
            tag: node.tag.clone(),
            text: node.text().map(str::to_string),
            attributes: node
                .attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            markup: MarkupFormatter::compact().format(node)?,
        })
    }
}

fn serialize_pairs<S: Serializer>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

/// One member of a node-set result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryItem {
    Element(MatchedNode),
    /// String value of an attribute or text node
    Value(String),
}

/// Outcome of a path query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(ScalarValue),
    /// Matches in document order
    NodeSet(Vec<QueryItem>),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Scalar(_) => 1,
            QueryResult::NodeSet(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> &[QueryItem] {
        match self {
            QueryResult::NodeSet(items) => items,
            QueryResult::Scalar(_) => &[],
        }
    }

    pub fn scalar(&self) -> Option<&ScalarValue> {
        match self {
            QueryResult::Scalar(value) => Some(value),
            QueryResult::NodeSet(_) => None,
        }
    }

    /// Report `{xpath, results_count, results}`; a scalar is a one-element
    /// result list.
    pub fn to_report(&self, expression: &str) -> serde_json::Value {
        let results: Vec<serde_json::Value> = match self {
            QueryResult::Scalar(value) => vec![value.to_json()],
            QueryResult::NodeSet(items) => items
                .iter()
                .map(|item| serde_json::to_value(item).unwrap_or(serde_json::Value::Null))
                .collect(),
        };
        json!({
            "xpath": expression,
            "results_count": results.len(),
            "results": results,
        })
    }

    fn from_value(doc: &QueryDocument<'_>, value: Value) -> ConversionResult<Self> {
        let nodes = match value {
            Value::NodeSet(nodes) => nodes,
            Value::Number(n) => return Ok(QueryResult::Scalar(ScalarValue::Number(n))),
            Value::Boolean(b) => return Ok(QueryResult::Scalar(ScalarValue::Boolean(b))),
            Value::String(s) => return Ok(QueryResult::Scalar(ScalarValue::Text(s))),
        };

        let mut items = Vec::with_capacity(nodes.len());
        for node in nodes {
            items.push(match doc.kind(node) {
                NodeKind::Document => element_item(doc, doc.root_element())?,
                NodeKind::Element => element_item(doc, node)?,
                NodeKind::Attribute | NodeKind::Text => QueryItem::Value(doc.string_value(node)),
            });
        }
        Ok(QueryResult::NodeSet(items))
    }
}

fn element_item(doc: &QueryDocument<'_>, node: NodeRef) -> ConversionResult<QueryItem> {
    match doc.element(node) {
        Some(element) => Ok(QueryItem::Element(MatchedNode::from_element(element)?)),
        None => Ok(QueryItem::Value(doc.string_value(node))),
    }
}

/// Tokenize and parse an expression
pub fn compile(expression: &str) -> Result<Expr, String> {
    parser::parse(lexer::tokenize(expression)?)
}

/// Evaluate a path expression against a tree.
///
/// The root element is the context node, so `item` and `/root/item` select
/// the same nodes when the root is tagged `root`. Malformed or unsupported
/// expressions fail with a [`QueryError`]; an expression that matches
/// nothing yields an empty node-set.
pub fn run_path_query(root: &HierarchicalNode, expression: &str) -> ConversionResult<QueryResult> {
    let expr = compile(expression).map_err(|cause| QueryError::new(expression, cause))?;
    let doc = QueryDocument::new(root);
    let value = Evaluator::new(&doc)
        .evaluate(&expr)
        .map_err(|cause| QueryError::new(expression, cause))?;
    let result = QueryResult::from_value(&doc, value)?;

    debug!(expression, results = result.len(), "path query evaluated");
    Ok(result)
}
