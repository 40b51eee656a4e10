//! Structural schema inference and XSD rendering

pub mod generator;
pub mod types;

pub use generator::{
    AttributeShape, ChildOccurrence, ElementShape, SchemaDescription, SchemaGenerator,
};
pub use types::XsdType;
