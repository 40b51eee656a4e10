//! Cell and column type inference
//!
//! Each present cell is classified on its own, trying integer, decimal,
//! date, boolean and string in that order. The column type is then chosen
//! from the per-cell types by a [`ColumnTypePolicy`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Primitive types a cell or column can be classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Integer,
    Decimal,
    Date,
    Boolean,
    String,
    /// Column with no present cells
    Null,
}

impl PrimitiveType {
    /// Classification order used for cells and for majority tie-breaks
    pub const PRIORITY: [PrimitiveType; 5] = [
        PrimitiveType::Integer,
        PrimitiveType::Decimal,
        PrimitiveType::Date,
        PrimitiveType::Boolean,
        PrimitiveType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Integer => "integer",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::Date => "date",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::String => "string",
            PrimitiveType::Null => "null",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(PrimitiveType::Integer),
            "decimal" => Some(PrimitiveType::Decimal),
            "date" => Some(PrimitiveType::Date),
            "boolean" => Some(PrimitiveType::Boolean),
            "string" => Some(PrimitiveType::String),
            "null" => Some(PrimitiveType::Null),
            _ => None,
        }
    }

    /// Smallest type that holds values of both types
    pub fn widen(self, other: PrimitiveType) -> PrimitiveType {
        use PrimitiveType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, t) | (t, Null) => t,
            (Integer, Decimal) | (Decimal, Integer) => Decimal,
            _ => String,
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for picking one column type from per-cell types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTypePolicy {
    /// All equal keeps the type; integer mixed with decimal is decimal; anything else is string
    Widening,
    /// Most frequent cell type; ties go to the earlier type in classification order
    Majority,
    /// Type of the first present cell
    FirstNonNull,
}

impl ColumnTypePolicy {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "widening" | "widen" => Ok(ColumnTypePolicy::Widening),
            "majority" => Ok(ColumnTypePolicy::Majority),
            "first" | "first-non-null" => Ok(ColumnTypePolicy::FirstNonNull),
            other => Err(format!(
                "Invalid type policy '{}'. Use 'widening', 'majority', or 'first-non-null'",
                other
            )),
        }
    }
}

/// Per-cell types disagreed within one column. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAmbiguity {
    /// Observed cell types with their counts, in classification order
    pub observed: Vec<(PrimitiveType, usize)>,
}

impl TypeAmbiguity {
    /// `integer:3,string:1`
    pub fn summary(&self) -> String {
        self.observed
            .iter()
            .map(|(t, n)| format!("{}:{}", t, n))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Classify one present cell value
pub fn infer_cell(raw: &str) -> PrimitiveType {
    let value = raw.trim();
    if is_integer(value) {
        PrimitiveType::Integer
    } else if is_decimal(value) {
        PrimitiveType::Decimal
    } else if is_date(value) {
        PrimitiveType::Date
    } else if is_boolean(value) {
        PrimitiveType::Boolean
    } else {
        PrimitiveType::String
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Plain decimal notation; exponents and `inf`/`NaN` spellings do not count
fn is_decimal(value: &str) -> bool {
    if !value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-'))
    {
        return false;
    }
    value.bytes().any(|b| b.is_ascii_digit()) && value.parse::<f64>().is_ok()
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

fn is_date(value: &str) -> bool {
    is_calendar_date(value) || has_time_part(value)
}

/// `YYYY-MM-DD` with a real calendar day
fn is_calendar_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Whether the value is an ISO-8601 date-time (`T` separator, with or
/// without offset)
pub fn has_time_part(value: &str) -> bool {
    let value = value.trim();
    value.as_bytes().get(10) == Some(&b'T')
        && value.get(..10).is_some_and(is_calendar_date)
        && (DateTime::parse_from_rfc3339(value).is_ok()
            || DATETIME_FORMATS
                .iter()
                .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok()))
}

fn is_boolean(value: &str) -> bool {
    matches!(value, "true" | "false")
}

/// Pick the column type from the types of its present cells.
///
/// Returns [`PrimitiveType::Null`] when `cell_types` is empty.
pub fn vote_column_type(policy: ColumnTypePolicy, cell_types: &[PrimitiveType]) -> PrimitiveType {
    let Some(&first) = cell_types.first() else {
        return PrimitiveType::Null;
    };

    match policy {
        ColumnTypePolicy::FirstNonNull => first,
        ColumnTypePolicy::Widening => cell_types.iter().fold(first, |acc, t| acc.widen(*t)),
        ColumnTypePolicy::Majority => {
            let counts = count_types(cell_types);
            let mut best = counts[0];
            for &(t, n) in &counts[1..] {
                if n > best.1 {
                    best = (t, n);
                }
            }
            best.0
        }
    }
}

/// Counts per type, in classification order, omitting absent types
fn count_types(cell_types: &[PrimitiveType]) -> Vec<(PrimitiveType, usize)> {
    PrimitiveType::PRIORITY
        .iter()
        .map(|t| (*t, cell_types.iter().filter(|c| *c == t).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Report disagreement between cell types, if any
pub fn detect_ambiguity(cell_types: &[PrimitiveType]) -> Option<TypeAmbiguity> {
    let observed = count_types(cell_types);
    if observed.len() > 1 {
        Some(TypeAmbiguity { observed })
    } else {
        None
    }
}
