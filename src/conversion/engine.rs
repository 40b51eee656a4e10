//! Conversion engine: string-in/string-out operations over the tree model

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::conversion::codec::{CodecConfig, TreeCodec};
use crate::conversion::config::ConversionConfig;
use crate::conversion::tabular::TabularConverter;
use crate::error::{ConversionError, ConversionResult};
use crate::formatter::{format_document, format_markup, to_pretty_json};
use crate::parser::{parse_document, parse_markup_with_depth, read_tabular};
use crate::query::{run_path_query, run_xquery};
use crate::schema::{SchemaDescription, SchemaGenerator};
use crate::tree::{DocumentValue, HierarchicalNode};

/// Output text of one engine operation
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub content: String,
    pub metadata: ConversionMetadata,
}

impl ConversionOutput {
    pub fn new(content: String, metadata: ConversionMetadata) -> Self {
        Self { content, metadata }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Length of the output in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Metadata about the conversion process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMetadata {
    pub input_size: u64,
    pub output_size: u64,
    pub processing_time_ms: u64,
    /// Rows, top-level children, schema paths or query results, by operation
    pub records: usize,
    /// Interleaved siblings grouped with an earlier same-tag run; only
    /// markup-to-document conversion in lenient mode sets this
    pub regrouped_siblings: usize,
}

impl ConversionMetadata {
    fn measure(input: &str, output: &str, started: Instant, records: usize) -> Self {
        Self {
            input_size: input.len() as u64,
            output_size: output.len() as u64,
            processing_time_ms: started.elapsed().as_millis() as u64,
            records,
            regrouped_siblings: 0,
        }
    }
}

/// Main conversion engine
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    config: ConversionConfig,
}

impl ConversionEngine {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Create an engine after checking the configuration
    pub fn try_new(config: ConversionConfig) -> ConversionResult<Self> {
        config.validate().map_err(ConversionError::configuration)?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    fn codec(&self) -> TreeCodec {
        TreeCodec::new(CodecConfig::from(&self.config))
    }

    fn parse(&self, markup: &str) -> ConversionResult<HierarchicalNode> {
        Ok(parse_markup_with_depth(markup, self.config.max_depth)?)
    }

    /// Read tabular text into a tree. Tags default to the configured
    /// dataset and row tags.
    pub fn csv_to_tree(
        &self,
        text: &str,
        root_tag: Option<&str>,
        row_tag: Option<&str>,
    ) -> ConversionResult<HierarchicalNode> {
        let table = read_tabular(text, &self.config)?;
        TabularConverter::new(&self.config).convert(
            &table,
            root_tag.unwrap_or(&self.config.default_dataset_tag),
            row_tag.unwrap_or(&self.config.default_row_tag),
        )
    }

    /// Tabular text to markup
    pub fn csv_to_markup(
        &self,
        text: &str,
        root_tag: Option<&str>,
        row_tag: Option<&str>,
    ) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let tree = self.csv_to_tree(text, root_tag, row_tag)?;
        let records = tree.child("data").map_or(0, |data| data.children.len());
        let content = format_markup(&tree, &self.config)?;

        let metadata = ConversionMetadata::measure(text, &content, started, records);
        info!(
            root = %tree.tag,
            records,
            output_size = metadata.output_size,
            "converted tabular text to markup"
        );
        Ok(ConversionOutput::new(content, metadata))
    }

    /// Markup to document text
    pub fn markup_to_json(&self, markup: &str) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let tree = self.parse(markup)?;
        let encoded = self.codec().encode_tree(&tree)?;
        let content = format_document(&encoded.document, &self.config)?;

        let mut metadata =
            ConversionMetadata::measure(markup, &content, started, tree.children.len());
        metadata.regrouped_siblings = encoded.regrouped;
        if encoded.regrouped > 0 {
            warn!(
                root = %tree.tag,
                regrouped = encoded.regrouped,
                "sibling order not preserved; enable strict round trip to reject such input"
            );
        }
        info!(
            root = %tree.tag,
            records = metadata.records,
            "converted markup to document text"
        );
        Ok(ConversionOutput::new(content, metadata))
    }

    /// Document text to markup. `root_tag` names the root when the document
    /// does not have a single top-level key.
    pub fn json_to_markup(
        &self,
        json: &str,
        root_tag: Option<&str>,
    ) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let document = parse_document(json)?;
        let tree = self
            .codec()
            .document_to_tree(&document, root_tag.unwrap_or(&self.config.default_root_tag))?;
        let content = format_markup(&tree, &self.config)?;

        let metadata = ConversionMetadata::measure(json, &content, started, tree.children.len());
        info!(
            root = %tree.tag,
            records = metadata.records,
            "converted document text to markup"
        );
        Ok(ConversionOutput::new(content, metadata))
    }

    /// Infer a schema from markup and render it
    pub fn markup_to_schema(&self, markup: &str) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let tree = self.parse(markup)?;
        let description = generate_schema(&tree, &self.config.target_namespace)?;
        let content = description.render();

        let metadata =
            ConversionMetadata::measure(markup, &content, started, description.elements.len());
        info!(
            root = %tree.tag,
            paths = metadata.records,
            tabular = description.is_tabular(),
            "generated schema"
        );
        Ok(ConversionOutput::new(content, metadata))
    }

    /// Run a path query over markup and report the results as JSON
    pub fn query_markup(
        &self,
        markup: &str,
        expression: &str,
    ) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let tree = self.parse(markup)?;
        let result = run_path_query(&tree, expression)?;
        let content = to_pretty_json(&result.to_report(expression), &self.config)?;

        let metadata = ConversionMetadata::measure(markup, &content, started, result.len());
        info!(expression, results = result.len(), "query executed");
        Ok(ConversionOutput::new(content, metadata))
    }

    /// Run an XQuery expression over markup; the report also names the
    /// path expression it was evaluated as
    pub fn xquery_markup(
        &self,
        markup: &str,
        expression: &str,
    ) -> ConversionResult<ConversionOutput> {
        let started = Instant::now();
        let tree = self.parse(markup)?;
        let query = run_xquery(&tree, expression)?;
        let content = to_pretty_json(&query.to_report(), &self.config)?;

        let metadata = ConversionMetadata::measure(markup, &content, started, query.result.len());
        info!(
            expression,
            path = %query.path,
            results = query.result.len(),
            "xquery executed"
        );
        Ok(ConversionOutput::new(content, metadata))
    }
}

/// Tabular text to a tree with default configuration
pub fn csv_to_tree(text: &str, root_tag: &str, row_tag: &str) -> ConversionResult<HierarchicalNode> {
    ConversionEngine::default().csv_to_tree(text, Some(root_tag), Some(row_tag))
}

/// Encode a tree as a document keyed by its root tag
pub fn tree_to_document(node: &HierarchicalNode) -> ConversionResult<DocumentValue> {
    TreeCodec::default().tree_to_document(node)
}

/// Decode a document into a tree
pub fn document_to_tree(doc: &DocumentValue, root_tag: &str) -> ConversionResult<HierarchicalNode> {
    TreeCodec::default().document_to_tree(doc, root_tag)
}

/// Infer a schema description from a tree
pub fn generate_schema(
    node: &HierarchicalNode,
    target_namespace: &str,
) -> ConversionResult<SchemaDescription> {
    if target_namespace.trim().is_empty() {
        return Err(ConversionError::configuration(
            "Target namespace must not be empty",
        ));
    }
    Ok(SchemaGenerator::generate(node, target_namespace))
}
