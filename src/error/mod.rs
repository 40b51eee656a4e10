//! Error types and handling infrastructure for the conversion engine

use std::fmt;
use std::path::PathBuf;

/// The kind of text an engine operation was reading when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Hierarchical markup (XML)
    Markup,
    /// Tabular text (CSV)
    Tabular,
    /// Key-value document text (JSON)
    Document,
    /// Structural schema text (XSD)
    Schema,
}

impl InputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            InputFormat::Markup => "XML",
            InputFormat::Tabular => "CSV",
            InputFormat::Document => "JSON",
            InputFormat::Schema => "XSD",
        }
    }
}

/// Non-parse failures that carry no structured payload
#[derive(Debug, thiserror::Error)]
pub enum ConversionErrorKind {
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Conversion failed: {message}")]
    ConversionFailed { message: String },
}

impl ConversionErrorKind {
    pub fn io(message: String, path: Option<PathBuf>) -> Self {
        Self::Io { message, path }
    }

    pub fn configuration(message: String) -> Self {
        Self::Configuration { message }
    }

    pub fn failed(message: String) -> Self {
        Self::ConversionFailed { message }
    }
}

/// Main error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    QueryError(#[from] QueryError),

    #[error(transparent)]
    EncodingError(#[from] EncodingError),

    #[error("{kind}")]
    Conversion {
        kind: ConversionErrorKind,
        source: Option<anyhow::Error>,
    },
}

impl ConversionError {
    pub fn conversion(kind: ConversionErrorKind) -> Self {
        Self::Conversion { kind, source: None }
    }

    pub fn conversion_with_source(kind: ConversionErrorKind, source: anyhow::Error) -> Self {
        Self::Conversion {
            kind,
            source: Some(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::conversion(ConversionErrorKind::configuration(message.into()))
    }

    /// Short machine-friendly name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "ParseError",
            Self::QueryError(_) => "QueryError",
            Self::EncodingError(_) => "EncodingError",
            Self::Conversion { kind, .. } => match kind {
                ConversionErrorKind::Io { .. } => "IoError",
                ConversionErrorKind::Configuration { .. } => "ConfigurationError",
                ConversionErrorKind::ConversionFailed { .. } => "ConversionError",
            },
        }
    }

    /// Create a user-friendly error message: the kind followed by the message verbatim
    pub fn user_message(&self) -> String {
        match self {
            Self::ParseError(err) => format!("{} parse error: {}", err.format.label(), err),
            Self::QueryError(err) => format!("XPath error: {}", err),
            Self::EncodingError(err) => format!("Encoding error: {}", err),
            Self::Conversion { kind, .. } => match kind {
                ConversionErrorKind::Io { message, path } => match path {
                    Some(path) => format!("IO error on {}: {}", path.display(), message),
                    None => format!("IO error: {}", message),
                },
                _ => self.to_string(),
            },
        }
    }
}

/// Malformed input text
#[derive(Debug, Clone)]
pub struct ParseError {
    pub format: InputFormat,
    pub message: String,
    /// Byte offset into the input, when the reader reports one
    pub offset: Option<usize>,
    /// 1-based line number, when the reader reports one
    pub line: Option<usize>,
}

impl ParseError {
    pub fn new(format: InputFormat, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            offset: None,
            line: None,
        }
    }

    pub fn with_offset(mut self, offset: Option<usize>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        } else if let Some(offset) = self.offset {
            write!(f, " at byte {}", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Invalid or unsupported path expression
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid expression '{expression}': {cause}")]
pub struct QueryError {
    pub expression: String,
    pub cause: String,
}

impl QueryError {
    pub fn new(expression: &str, cause: String) -> Self {
        Self {
            expression: expression.to_string(),
            cause,
        }
    }
}

/// Tree/document conversions that would otherwise lose information
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("siblings tagged '{tag}' under '{parent}' are interleaved with other tags; grouping them would reorder children")]
    InterleavedSiblings { parent: String, tag: String },

    #[error("reserved key '{key}' {message}")]
    ReservedKey { key: String, message: String },

    #[error("'{name}' is not a valid element or attribute name")]
    InvalidName { name: String },
}

impl EncodingError {
    pub fn interleaved(parent: &str, tag: &str) -> Self {
        Self::InterleavedSiblings {
            parent: parent.to_string(),
            tag: tag.to_string(),
        }
    }

    pub fn reserved_key(key: &str, message: &str) -> Self {
        Self::ReservedKey {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_name(name: &str) -> Self {
        Self::InvalidName {
            name: name.to_string(),
        }
    }
}

/// Result type for engine operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Convenience result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
