//! Conversions between tabular text, markup trees and key-value documents
//!
//! This module contains the tabular converter, the tree/document codec, name
//! normalization, type inference, configuration and the engine facade.

pub mod codec;
pub mod config;
pub mod engine;
pub mod inference;
pub mod names;
pub mod tabular;

pub use codec::{CodecConfig, EncodedTree, TreeCodec};
pub use config::{ConversionConfig, DelimiterType};
pub use engine::{
    csv_to_tree, document_to_tree, generate_schema, tree_to_document, ConversionEngine,
    ConversionMetadata, ConversionOutput,
};
pub use inference::{ColumnTypePolicy, PrimitiveType, TypeAmbiguity};
pub use names::{normalize_name, NameRegistry};
pub use tabular::{ColumnMetadata, TabularConverter};
