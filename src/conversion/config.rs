//! Configuration options for the conversion engine

use chrono::{DateTime, Utc};

use crate::conversion::inference::ColumnTypePolicy;
use crate::parser::DEFAULT_MAX_DEPTH;

/// Tabular field delimiter options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelimiterType {
    /// Comma delimiter (,)
    Comma,
    /// Semicolon delimiter (;)
    Semicolon,
    /// Tab delimiter (\\t)
    Tab,
    /// Pipe delimiter (|)
    Pipe,
}

impl DelimiterType {
    pub fn as_byte(&self) -> u8 {
        match self {
            DelimiterType::Comma => b',',
            DelimiterType::Semicolon => b';',
            DelimiterType::Tab => b'\t',
            DelimiterType::Pipe => b'|',
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "comma" | "," => Ok(DelimiterType::Comma),
            "semicolon" | ";" => Ok(DelimiterType::Semicolon),
            "tab" | "\t" => Ok(DelimiterType::Tab),
            "pipe" | "|" => Ok(DelimiterType::Pipe),
            other => Err(format!(
                "Invalid delimiter '{}'. Use 'comma', 'semicolon', 'tab', or 'pipe'",
                other
            )),
        }
    }
}

/// Cell spellings treated as missing values
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Conversion configuration options
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Spaces per indentation level (0-8)
    pub indent_size: u8,
    /// Pretty-print output (vs compact)
    pub pretty: bool,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` before markup
    pub include_declaration: bool,
    /// Tabular field delimiter
    pub delimiter: DelimiterType,
    /// Trimmed cell values that count as null
    pub null_markers: Vec<String>,
    /// How one column type is chosen from per-cell types
    pub type_policy: ColumnTypePolicy,
    /// Value of the `source` attribute on converted tables
    pub source_label: String,
    /// Fixed `generated` timestamp; `None` uses the current time
    pub generated_at: Option<DateTime<Utc>>,
    /// Fail instead of regrouping interleaved same-tag siblings
    pub strict_round_trip: bool,
    /// Child tag used when a top-level sequence is decoded
    pub sequence_item_tag: String,
    /// Root tag used when a document has no single top-level key
    pub default_root_tag: String,
    /// Row element tag for tabular conversion
    pub default_row_tag: String,
    /// Root element tag for tabular conversion
    pub default_dataset_tag: String,
    /// Target namespace for generated schemas
    pub target_namespace: String,
    /// Deepest element nesting accepted when parsing markup
    pub max_depth: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            pretty: true,
            include_declaration: false,
            delimiter: DelimiterType::Comma,
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
            type_policy: ColumnTypePolicy::Widening,
            source_label: "csv".to_string(),
            generated_at: None,
            strict_round_trip: false,
            sequence_item_tag: "item".to_string(),
            default_root_tag: "root".to_string(),
            default_row_tag: "record".to_string(),
            default_dataset_tag: "dataset".to_string(),
            target_namespace: "http://xmlconv.local/schema".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConversionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line markup output
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Default::default()
        }
    }

    /// Refuse lossy tree/document conversions
    pub fn strict() -> Self {
        Self {
            strict_round_trip: true,
            ..Default::default()
        }
    }

    /// Set indentation size
    pub fn with_indent_size(mut self, size: u8) -> Result<Self, String> {
        if size > 8 {
            return Err("Indent size must be 0-8 spaces".to_string());
        }
        self.indent_size = size;
        Ok(self)
    }

    /// Enable/disable pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_declaration(mut self, enabled: bool) -> Self {
        self.include_declaration = enabled;
        self
    }

    /// Set tabular delimiter
    pub fn with_delimiter(mut self, delimiter: DelimiterType) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    pub fn with_type_policy(mut self, policy: ColumnTypePolicy) -> Self {
        self.type_policy = policy;
        self
    }

    pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }

    /// Pin the `generated` timestamp (reproducible output)
    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn with_strict_round_trip(mut self, strict: bool) -> Self {
        self.strict_round_trip = strict;
        self
    }

    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = namespace.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Whether a trimmed cell value is a null marker
    pub fn is_null_marker(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.null_markers.iter().any(|m| m == trimmed)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.indent_size > 8 {
            return Err("Indent size must be 0-8 spaces".to_string());
        }

        for (label, tag) in [
            ("sequence item tag", &self.sequence_item_tag),
            ("default root tag", &self.default_root_tag),
            ("default row tag", &self.default_row_tag),
            ("default dataset tag", &self.default_dataset_tag),
        ] {
            if !crate::conversion::names::is_valid_name(tag) {
                return Err(format!("{} '{}' is not a valid element name", label, tag));
            }
        }

        if self.target_namespace.trim().is_empty() {
            return Err("Target namespace must not be empty".to_string());
        }

        if self.max_depth == 0 {
            return Err("Max depth must be at least 1".to_string());
        }

        Ok(())
    }
}
