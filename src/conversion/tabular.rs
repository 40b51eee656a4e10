//! Tabular table to markup tree conversion
//!
//! Output layout:
//!
//! ```text
//! <root source=".." generated=".." records="N">
//!   <metadata><columns><column name=".." normalized=".." type=".." .../></columns></metadata>
//!   <data><row id="0"><col>raw</col>...</row>...</data>
//! </root>
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use crate::conversion::config::ConversionConfig;
use crate::conversion::inference::{
    detect_ambiguity, infer_cell, vote_column_type, ColumnTypePolicy, PrimitiveType,
    TypeAmbiguity,
};
use crate::conversion::names::{is_valid_name, normalize_name, NameRegistry};
use crate::error::ConversionResult;
use crate::parser::tabular::{Cell, TabularTable};
use crate::tree::HierarchicalNode;

/// Per-column facts gathered before the tree is built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    pub original_name: String,
    /// Element name used for this column, unique within the table
    pub normalized_name: String,
    pub inferred_type: PrimitiveType,
    pub null_count: usize,
    pub non_null_count: usize,
    /// Present when cells of the column were classified differently
    pub ambiguity: Option<TypeAmbiguity>,
}

impl ColumnMetadata {
    /// Whether cells of this column carry a `data_type` attribute
    pub fn annotates_cells(&self) -> bool {
        !matches!(
            self.inferred_type,
            PrimitiveType::String | PrimitiveType::Null
        )
    }

    fn to_node(&self) -> HierarchicalNode {
        let mut node = HierarchicalNode::new("column")
            .with_attribute("name", self.original_name.as_str())
            .with_attribute("normalized", self.normalized_name.as_str())
            .with_attribute("type", self.inferred_type.as_str())
            .with_attribute("non_null", self.non_null_count.to_string())
            .with_attribute("null_count", self.null_count.to_string());
        if let Some(ambiguity) = &self.ambiguity {
            node.attributes.set("ambiguous", "true");
            node.attributes.set("observed", ambiguity.summary());
        }
        node
    }
}

/// Builds a markup tree with metadata and data sections from a table
#[derive(Debug, Clone)]
pub struct TabularConverter {
    policy: ColumnTypePolicy,
    source_label: String,
    generated_at: Option<DateTime<Utc>>,
}

impl Default for TabularConverter {
    fn default() -> Self {
        Self::new(&ConversionConfig::default())
    }
}

impl TabularConverter {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            policy: config.type_policy,
            source_label: config.source_label.clone(),
            generated_at: config.generated_at,
        }
    }

    /// Infer names, types and null counts for every column
    pub fn analyze_columns(&self, table: &TabularTable) -> Vec<ColumnMetadata> {
        let mut registry = NameRegistry::new();

        table
            .columns
            .iter()
            .enumerate()
            .map(|(index, original)| {
                let cell_types: Vec<PrimitiveType> = table
                    .column_cells(index)
                    .filter_map(Cell::as_str)
                    .map(infer_cell)
                    .collect();
                let non_null_count = cell_types.len();

                ColumnMetadata {
                    original_name: original.clone(),
                    normalized_name: registry.unique(original),
                    inferred_type: vote_column_type(self.policy, &cell_types),
                    null_count: table.row_count() - non_null_count,
                    non_null_count,
                    ambiguity: detect_ambiguity(&cell_types),
                }
            })
            .collect()
    }

    /// Convert a table into a tree rooted at `root_tag` with one `row_tag`
    /// element per row. Invalid tags are normalized.
    pub fn convert(
        &self,
        table: &TabularTable,
        root_tag: &str,
        row_tag: &str,
    ) -> ConversionResult<HierarchicalNode> {
        let columns = self.analyze_columns(table);
        let generated = self
            .generated_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut column_list = HierarchicalNode::new("columns");
        for column in &columns {
            column_list.push_child(column.to_node());
        }

        let row_tag = valid_tag(row_tag);
        let mut data = HierarchicalNode::new("data");
        for (index, row) in table.rows.iter().enumerate() {
            let mut record = HierarchicalNode::new(row_tag.as_str()).with_attribute("id", index.to_string());
            for (column, cell) in columns.iter().zip(row) {
                record.push_child(cell_node(column, cell));
            }
            data.push_child(record);
        }

        let root = HierarchicalNode::new(valid_tag(root_tag))
            .with_attribute("source", self.source_label.as_str())
            .with_attribute("generated", generated)
            .with_attribute("records", table.row_count().to_string())
            .with_child(HierarchicalNode::new("metadata").with_child(column_list))
            .with_child(data);

        debug!(
            root = %root.tag,
            records = table.row_count(),
            columns = columns.len(),
            ambiguous = columns.iter().filter(|c| c.ambiguity.is_some()).count(),
            "table converted"
        );
        Ok(root)
    }
}

fn cell_node(column: &ColumnMetadata, cell: &Cell) -> HierarchicalNode {
    let node = HierarchicalNode::new(column.normalized_name.as_str());
    match cell {
        Cell::Null => node.with_attribute("null", "true"),
        Cell::Present(raw) => {
            let node = node.with_text(raw.as_str());
            if column.annotates_cells() {
                node.with_attribute("data_type", column.inferred_type.as_str())
            } else {
                node
            }
        }
    }
}

fn valid_tag(tag: &str) -> String {
    if is_valid_name(tag) {
        tag.to_string()
    } else {
        normalize_name(tag)
    }
}
