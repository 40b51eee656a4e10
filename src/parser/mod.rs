//! Input readers: markup, tabular and document text

pub mod document;
pub mod markup;
pub mod tabular;

pub use document::parse_document;
pub use markup::{parse_markup, parse_markup_with_depth, DEFAULT_MAX_DEPTH};
pub use tabular::{read_tabular, Cell, TabularTable};

use std::io::Read;
use std::path::PathBuf;

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};

/// Where a front end takes its input text from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Inline text
    Text(String),
    /// A file path
    File(PathBuf),
    /// Standard input stream
    Stdin,
}

impl InputSource {
    /// Interpret a CLI argument: `-` is stdin, anything else a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    /// Get a human-readable description of the source
    pub fn description(&self) -> String {
        match self {
            InputSource::Text(_) => "inline text".to_string(),
            InputSource::File(path) => format!("file: {}", path.display()),
            InputSource::Stdin => "standard input".to_string(),
        }
    }

    /// Read the whole source as UTF-8 text
    pub fn read(&self) -> ConversionResult<String> {
        match self {
            InputSource::Text(text) => Ok(text.clone()),
            InputSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                ConversionError::conversion(ConversionErrorKind::io(
                    e.to_string(),
                    Some(path.clone()),
                ))
            }),
            InputSource::Stdin => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer).map_err(|e| {
                    ConversionError::conversion(ConversionErrorKind::io(
                        format!("Failed to read stdin: {}", e),
                        None,
                    ))
                })?;
                Ok(buffer)
            }
        }
    }
}
