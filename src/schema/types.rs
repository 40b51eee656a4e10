//! Built-in schema types used by generated schemas and by validation

use serde::Serialize;

use crate::conversion::inference::{has_time_part, infer_cell, PrimitiveType};

/// Namespace of the XML Schema vocabulary
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// The fixed set of simple types a generated schema can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum XsdType {
    Integer,
    Decimal,
    Date,
    DateTime,
    Boolean,
    String,
}

impl XsdType {
    /// Narrowest type whose lexical space contains `value`
    pub fn of_value(value: &str) -> Self {
        let value = value.trim();
        match infer_cell(value) {
            PrimitiveType::Date if has_time_part(value) => XsdType::DateTime,
            inferred => XsdType::from(inferred),
        }
    }

    /// Widening merge: equal types stay, integer with decimal is decimal,
    /// anything else is string
    pub fn merge(self, other: XsdType) -> XsdType {
        match (self, other) {
            (a, b) if a == b => a,
            (XsdType::Integer, XsdType::Decimal) | (XsdType::Decimal, XsdType::Integer) => {
                XsdType::Decimal
            }
            _ => XsdType::String,
        }
    }

    /// Qualified name as written in schema text
    pub fn xsd_name(&self) -> &'static str {
        match self {
            XsdType::Integer => "xs:integer",
            XsdType::Decimal => "xs:decimal",
            XsdType::Date => "xs:date",
            XsdType::DateTime => "xs:dateTime",
            XsdType::Boolean => "xs:boolean",
            XsdType::String => "xs:string",
        }
    }

    /// Resolve a type reference like `xs:int`. Unknown names give `None`.
    pub fn from_qualified_name(name: &str) -> Option<Self> {
        let local = name.rsplit(':').next().unwrap_or(name);
        let resolved = match local {
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" | "unsignedLong"
            | "unsignedInt" | "unsignedShort" | "unsignedByte" => XsdType::Integer,
            "decimal" => XsdType::Decimal,
            "date" => XsdType::Date,
            "dateTime" => XsdType::DateTime,
            "boolean" => XsdType::Boolean,
            "string" | "normalizedString" | "token" | "anyURI" | "ID" | "IDREF" | "NMTOKEN"
            | "Name" | "NCName" | "language" | "anySimpleType" => XsdType::String,
            _ => return None,
        };
        Some(resolved)
    }

    /// Whether `value` is in the lexical space of this type
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            XsdType::String => true,
            XsdType::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            XsdType::Decimal => matches!(
                XsdType::of_value(value),
                XsdType::Integer | XsdType::Decimal
            ),
            other => XsdType::of_value(value) == *other,
        }
    }
}

impl From<PrimitiveType> for XsdType {
    fn from(inferred: PrimitiveType) -> Self {
        match inferred {
            PrimitiveType::Integer => XsdType::Integer,
            PrimitiveType::Decimal => XsdType::Decimal,
            PrimitiveType::Date => XsdType::Date,
            PrimitiveType::Boolean => XsdType::Boolean,
            PrimitiveType::String | PrimitiveType::Null => XsdType::String,
        }
    }
}
