//! Expression values: node-set, boolean, number and string

use crate::query::axes::{NodeRef, QueryDocument};

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Value {
    /// Nodes in document order, without duplicates
    NodeSet(Vec<NodeRef>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::NodeSet(nodes) => !nodes.is_empty(),
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    pub fn to_number(&self, doc: &QueryDocument<'_>) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::String(s) => parse_number(s),
            Value::NodeSet(_) => parse_number(&self.to_string_value(doc)),
        }
    }

    /// String conversion; a node-set yields the string value of its first node
    pub fn to_string_value(&self, doc: &QueryDocument<'_>) -> String {
        match self {
            Value::NodeSet(nodes) => nodes
                .first()
                .map(|&node| doc.string_value(node))
                .unwrap_or_default(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
        }
    }

    pub fn is_node_set(&self) -> bool {
        matches!(self, Value::NodeSet(_))
    }
}

/// Number lexical form: optional minus, digits with an optional fraction,
/// surrounded by optional whitespace. Anything else is NaN.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if unsigned.is_empty()
        || unsigned == "."
        || !digits_only(whole)
        || !digits_only(fraction)
    {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Number to string: integral values without a fraction, no exponent
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
